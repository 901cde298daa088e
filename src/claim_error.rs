use thiserror::Error;

/// The two ways a claim attempt can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// An equal key is already claimed by a live holder. Not retried
    /// automatically; pick another key or wait for the holder to release it.
    #[error("an equal key is already claimed")]
    DuplicateKey,
    /// The registry lock was not acquired within the caller's timeout.
    /// Retrying is the expected recovery path.
    #[error("claim lock not acquired within the timeout")]
    LockTimeout,
}
