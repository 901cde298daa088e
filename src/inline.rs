//! The inline handle: the instance lives directly in the handle.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use crate::claim_error::ClaimError;
use crate::key::Key;
use crate::registry::{Claim, Registry};

/// Handle owning its instance as a direct member, without the boxed
/// indirection of [`Handle`](crate::Handle). There is no borrowing variant.
///
/// Recommended for value types that should never incur an extra ownership
/// indirection. Supports a two-phase lifecycle: an unbound handle holds the
/// value in its default state and claims no key; an explicit [`init`] call
/// binds it. The `init` family is retryable: a failed claim leaves the handle
/// unbound, with no leaked allocation and no stray registry entry.
///
/// Dropping a bound handle removes its key from the registry, waiting for the
/// registry lock without a timeout, before the member drops.
///
/// [`init`]: InlineHandle::init
///
/// # Examples
///
/// ```
/// use keyclaim::{InlineHandle, Registry};
/// use std::time::Duration;
///
/// let registry = Registry::<u64, &'static str>::new();
///
/// let mut counter = InlineHandle::<u64, _>::unbound();
/// assert!(!counter.is_bound());
///
/// counter.init(&registry, "hits", Duration::from_millis(50)).unwrap();
/// assert!(counter.is_bound());
///
/// *counter += 1;
/// assert_eq!(*counter, 1);
/// ```
pub struct InlineHandle<T, K: Key> {
    // claim precedes value: the key is released before the member drops
    claim: Option<Claim<T, K>>,
    value: T,
}

impl<T: Default, K: Key> Default for InlineHandle<T, K> {
    fn default() -> Self {
        Self {
            claim: None,
            value: T::default(),
        }
    }
}

impl<T, K: Key> InlineHandle<T, K> {
    /// An unbound handle: value in its default state, no key claimed.
    pub fn unbound() -> Self
    where
        T: Default,
    {
        Self::default()
    }

    /// Claims `key`, then builds the member with `make`.
    ///
    /// The factory runs only after the claim succeeds.
    ///
    /// # Errors
    ///
    /// - [`ClaimError::LockTimeout`] if the registry lock was not acquired
    ///   within `timeout`.
    /// - [`ClaimError::DuplicateKey`] if an equal key is already claimed.
    pub fn with(
        registry: &Arc<Registry<T, K>>,
        key: K,
        timeout: Duration,
        make: impl FnOnce() -> T,
    ) -> Result<Self, ClaimError> {
        let claim = Claim::acquire(registry, key, timeout)?;
        Ok(Self {
            claim: Some(claim),
            value: make(),
        })
    }

    /// Claims `key`, then builds the member in its default state.
    ///
    /// # Errors
    ///
    /// Same as [`InlineHandle::with`].
    pub fn with_default(
        registry: &Arc<Registry<T, K>>,
        key: K,
        timeout: Duration,
    ) -> Result<Self, ClaimError>
    where
        T: Default,
    {
        Self::with(registry, key, timeout, T::default)
    }

    /// Claims `key`, keeping the current member value.
    ///
    /// Any existing claim is released first. On failure the handle is unbound
    /// and may be retried until it succeeds.
    ///
    /// # Errors
    ///
    /// Same as [`InlineHandle::with`].
    pub fn init(
        &mut self,
        registry: &Arc<Registry<T, K>>,
        key: K,
        timeout: Duration,
    ) -> Result<(), ClaimError> {
        self.claim = None;
        self.claim = Some(Claim::acquire(registry, key, timeout)?);
        Ok(())
    }

    /// Claims `key`, then replaces the member with `make()`.
    ///
    /// Any existing claim is released first; the factory runs only after the
    /// claim succeeds, and on failure the current value is kept untouched.
    ///
    /// # Errors
    ///
    /// Same as [`InlineHandle::with`].
    pub fn init_with(
        &mut self,
        registry: &Arc<Registry<T, K>>,
        key: K,
        timeout: Duration,
        make: impl FnOnce() -> T,
    ) -> Result<(), ClaimError> {
        self.claim = None;
        let claim = Claim::acquire(registry, key, timeout)?;
        self.value = make();
        self.claim = Some(claim);
        Ok(())
    }

    /// Whether this handle currently holds a key.
    pub fn is_bound(&self) -> bool {
        self.claim.is_some()
    }

    /// The key this handle holds, if bound.
    pub fn key(&self) -> Option<&K> {
        self.claim.as_ref().map(Claim::key)
    }

    /// The member value. Before a successful `init` it is in its default state.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutable access to the member value.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T, K: Key> Deref for InlineHandle<T, K> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, K: Key> DerefMut for InlineHandle<T, K> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T, K: Key> std::fmt::Debug for InlineHandle<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineHandle")
            .field("key", &self.key())
            .finish_non_exhaustive()
    }
}
