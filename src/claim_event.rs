/// Events emitted by a claim registry during operations.
///
/// These events are passed to the tracing callback set via
/// [`Registry::set_trace_callback`](crate::Registry::set_trace_callback).
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use keyclaim::ClaimEvent;
///
/// let event = ClaimEvent::Claim { type_name: "i32", accepted: true };
/// println!("{:?}", event);
/// ```
#[derive(Debug, Clone)]
pub enum ClaimEvent {
    /// A claim attempt reached the claimed set.
    Claim {
        /// The value type of the pairing (e.g., "i32", "alloc::string::String")
        type_name: &'static str,
        /// Whether the key was inserted (`false` means a duplicate was rejected)
        accepted: bool,
    },

    /// A claim attempt gave up waiting for the registry lock.
    LockTimeout {
        /// The value type of the pairing
        type_name: &'static str,
    },

    /// A claimed key was released.
    Release {
        /// The value type of the pairing
        type_name: &'static str,
    },

    /// A key existence check was performed.
    Contains {
        /// The value type of the pairing
        type_name: &'static str,
        /// Whether the key is currently claimed
        found: bool,
    },
}

impl std::fmt::Display for ClaimEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimEvent::Claim {
                type_name,
                accepted,
            } => {
                write!(
                    f,
                    "claim {{ type_name: {}, accepted: {} }}",
                    type_name, accepted
                )
            }
            ClaimEvent::LockTimeout { type_name } => {
                write!(f, "lock_timeout {{ type_name: {} }}", type_name)
            }
            ClaimEvent::Release { type_name } => {
                write!(f, "release {{ type_name: {} }}", type_name)
            }
            ClaimEvent::Contains { type_name, found } => {
                write!(
                    f,
                    "contains {{ type_name: {}, found: {} }}",
                    type_name, found
                )
            }
        }
    }
}
