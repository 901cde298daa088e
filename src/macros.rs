//! Macro for declaring process-wide shared claim registries.

/// Declares a module holding one process-wide registry for a pairing.
///
/// The macro generates a module containing:
/// - The shared registry static (hidden, created on first use, never torn down)
/// - Free functions delegating to it: `registry()`, `claim()`, `contains()`,
///   `set_trace_callback()`, `clear_trace_callback()`
///
/// Use this when every part of the process should see the same claimed-key set
/// for a pairing. For isolated registries (one per test case, one per
/// subsystem) construct [`Registry`](crate::Registry) instances directly.
///
/// # Examples
///
/// ```rust
/// use keyclaim::define_registry;
/// use std::time::Duration;
///
/// // One process-wide key space for database connections.
/// define_registry!(connections, String, (String, u16));
///
/// let claim = connections::claim(("db".into(), 1), Duration::from_millis(100)).unwrap();
/// assert!(connections::contains(&("db".to_string(), 1)));
///
/// drop(claim);
/// assert!(!connections::contains(&("db".to_string(), 1)));
/// ```
///
/// # Multiple Registries
///
/// Each invocation creates a completely isolated key space, even for the same
/// pairing:
///
/// ```rust
/// use keyclaim::define_registry;
/// use std::time::Duration;
///
/// define_registry!(staging, String, u32);
/// define_registry!(production, String, u32);
///
/// let _staged = staging::claim(1, Duration::from_millis(50)).unwrap();
///
/// // No interference between registries.
/// assert!(production::claim(1, Duration::from_millis(50)).is_ok());
/// ```
///
/// # Handles
///
/// Handle constructors take the shared registry through `registry()`:
///
/// ```rust
/// use keyclaim::{define_registry, Handle};
/// use std::time::Duration;
///
/// define_registry!(buffers, Vec<u8>, &'static str);
///
/// let handle = Handle::with(&buffers::registry(), "scratch", Duration::from_millis(50), || {
///     vec![0u8; 16]
/// })
/// .unwrap();
/// assert_eq!(handle.len(), 16);
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident, $value:ty, $key:ty) => {
        pub mod $name {
            use std::sync::{Arc, LazyLock};

            // Shared registry instance (module-private)
            static REGISTRY: LazyLock<Arc<$crate::Registry<$value, $key>>> =
                LazyLock::new(|| $crate::Registry::new());

            /// The shared registry for this pairing.
            pub fn registry() -> Arc<$crate::Registry<$value, $key>> {
                Arc::clone(&REGISTRY)
            }

            /// Claims `key` on the shared registry.
            pub fn claim(
                key: $key,
                timeout: std::time::Duration,
            ) -> Result<$crate::Claim<$value, $key>, $crate::ClaimError> {
                $crate::Claim::acquire(&REGISTRY, key, timeout)
            }

            /// Checks whether `key` is currently claimed on the shared registry.
            pub fn contains(key: &$key) -> bool {
                REGISTRY.contains(key)
            }

            /// Sets a tracing callback for the shared registry.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::ClaimEvent) + Send + Sync + 'static,
            ) {
                REGISTRY.set_trace_callback(callback)
            }

            /// Clears the tracing callback.
            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}
