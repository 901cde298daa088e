//! The per-pairing claim registry and the RAII claim guard.
//!
//! A [`Registry`] tracks the set of currently claimed keys for one
//! (value type, key type) pairing. Every handle of that pairing shares the same
//! registry through an `Arc`, and every constructor funnels through
//! [`Claim::acquire`] before the value instance is touched.
//!
//! # Examples
//!
//! ```
//! use keyclaim::{Claim, Registry};
//! use std::time::Duration;
//!
//! let registry = Registry::<String, i32>::new();
//!
//! let claim = Claim::acquire(&registry, 7, Duration::from_millis(50)).unwrap();
//! assert!(registry.contains(&7));
//!
//! drop(claim);
//! assert!(!registry.contains(&7));
//! ```

use std::any;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::claim_error::ClaimError;
use crate::claim_event::ClaimEvent;
use crate::key::Key;

/// Claim timeout for callers without a tighter bound: five thousand minutes,
/// in practice "wait until the key frees up".
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5000 * 60);

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a [`ClaimEvent`] every time the registry
/// is interacted with. It must be thread-safe because the registry is shared by
/// every handle of its pairing.
pub type TraceCallback = dyn Fn(&ClaimEvent) + Send + Sync + 'static;

// -------------------------------------------------------------------------------------------------
// Registry
// -------------------------------------------------------------------------------------------------

/// Tracker of the currently claimed keys for one (value type, key type) pairing.
///
/// One registry instance exists per pairing; create it once, wrap it in an `Arc`
/// (done by [`Registry::new`]) and hand it to every handle of that pairing. Two
/// registry instances never interfere, which keeps tests isolated; use the
/// [`define_registry!`](crate::define_registry) macro when a process-wide shared
/// registry is wanted instead.
///
/// The claimed-key collection never contains two keys that compare fully equal:
/// the membership check and the insertion of [`Claim::acquire`] run inside a
/// single critical section of the registry's timed lock.
pub struct Registry<T, K> {
    /// Keys with a live holder. The mutex doubles as the pairing's claim lock.
    claimed: Mutex<Vec<K>>,
    /// Optional per-registry tracing callback.
    trace: StdMutex<Option<Arc<TraceCallback>>>,
    _value: PhantomData<fn() -> T>,
}

impl<T, K: Key> Registry<T, K> {
    /// Creates an empty registry for the `(T, K)` pairing.
    ///
    /// Returns an `Arc`: every claim stores a reference back to the registry
    /// to release its key on drop.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            claimed: Mutex::new(Vec::new()),
            trace: StdMutex::new(None),
            _value: PhantomData,
        })
    }

    /// Checks whether `key` is currently claimed.
    ///
    /// Linear scan under the registry lock, O(n) in the number of live claims.
    /// Blocks if the lock is held elsewhere.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyclaim::{Claim, Registry};
    /// use std::time::Duration;
    ///
    /// let registry = Registry::<(), u32>::new();
    /// assert!(!registry.contains(&1));
    ///
    /// let _claim = Claim::acquire(&registry, 1, Duration::from_millis(50)).unwrap();
    /// assert!(registry.contains(&1));
    /// ```
    pub fn contains(&self, key: &K) -> bool {
        let found = self.claimed.lock().contains(key);

        self.emit_event(&ClaimEvent::Contains {
            type_name: any::type_name::<T>(),
            found,
        });

        found
    }

    /// Number of currently claimed keys.
    pub fn len(&self) -> usize {
        self.claimed.lock().len()
    }

    /// Whether no key is currently claimed.
    pub fn is_empty(&self) -> bool {
        self.claimed.lock().is_empty()
    }

    /// Attempts to take the registry lock within `timeout`, returning a
    /// read-only view of the claimed keys.
    ///
    /// While the returned guard is held, every claim and every release on this
    /// registry blocks. The lock is not re-entrant: a thread holding the guard
    /// must not claim or drop handles of the same pairing.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyclaim::{Claim, ClaimError, Registry};
    /// use std::time::Duration;
    ///
    /// let registry = Registry::<(), u32>::new();
    /// let guard = registry.try_lock_for(Duration::from_millis(10)).unwrap();
    ///
    /// // The lock is held, so a claim with a short timeout fails.
    /// let err = Claim::acquire(&registry, 1, Duration::from_millis(10)).unwrap_err();
    /// assert_eq!(err, ClaimError::LockTimeout);
    ///
    /// drop(guard);
    /// assert!(Claim::acquire(&registry, 1, Duration::from_millis(10)).is_ok());
    /// ```
    pub fn try_lock_for(&self, timeout: Duration) -> Option<ClaimedKeys<'_, K>> {
        self.claimed.try_lock_for(timeout).map(ClaimedKeys)
    }

    /// Runs the claim protocol: timed lock, membership check, insertion.
    ///
    /// The three steps form one critical section, so two racing claims of an
    /// equal key cannot both succeed.
    pub(crate) fn insert(&self, key: &K, timeout: Duration) -> Result<(), ClaimError> {
        let type_name = any::type_name::<T>();

        let Some(mut claimed) = self.claimed.try_lock_for(timeout) else {
            tracing::trace!(value = type_name, ?timeout, "claim lock timed out");
            self.emit_event(&ClaimEvent::LockTimeout { type_name });
            return Err(ClaimError::LockTimeout);
        };

        if claimed.contains(key) {
            drop(claimed);
            tracing::trace!(value = type_name, key = ?key, "duplicate key rejected");
            self.emit_event(&ClaimEvent::Claim {
                type_name,
                accepted: false,
            });
            return Err(ClaimError::DuplicateKey);
        }

        claimed.push(key.clone());
        drop(claimed);

        tracing::trace!(value = type_name, key = ?key, "key claimed");
        self.emit_event(&ClaimEvent::Claim {
            type_name,
            accepted: true,
        });

        Ok(())
    }

    /// Removes the first (and expected-only) entry equal to `key`.
    ///
    /// The lock acquisition is unconditional and untimed: release can block
    /// behind a long-running claim, but it can never fail.
    pub(crate) fn release(&self, key: &K) {
        let mut claimed = self.claimed.lock();
        if let Some(index) = claimed.iter().position(|held| held == key) {
            claimed.remove(index);
        }
        drop(claimed);

        tracing::trace!(value = any::type_name::<T>(), key = ?key, "key released");
        self.emit_event(&ClaimEvent::Release {
            type_name: any::type_name::<T>(),
        });
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing callback support
    // -------------------------------------------------------------------------------------------------

    /// Sets a tracing callback that will be invoked on every registry interaction.
    ///
    /// The callback must not call back into the same registry: events are
    /// delivered outside the claim lock, but the callback slot itself is locked
    /// during delivery.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyclaim::Registry;
    ///
    /// let registry = Registry::<String, i32>::new();
    /// registry.set_trace_callback(|event| println!("[claim-trace] {event}"));
    /// ```
    pub fn set_trace_callback(&self, callback: impl Fn(&ClaimEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clears the tracing callback (disables registry tracing).
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Convenience wrapper to emit a registry event using the current callback.
    fn emit_event(&self, event: &ClaimEvent) {
        // lock poisoning unlikely; if poisoned, keep emitting with recovered lock
        let guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(callback) = guard.as_ref() {
            callback(event);
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Claimed-keys view
// -------------------------------------------------------------------------------------------------

/// Read-only view of a registry's claimed keys, holding the registry lock.
///
/// Obtained from [`Registry::try_lock_for`]. Dropping the view releases the lock.
pub struct ClaimedKeys<'a, K>(MutexGuard<'a, Vec<K>>);

impl<K: Key> ClaimedKeys<'_, K> {
    /// Whether `key` is in the claimed set.
    pub fn contains(&self, key: &K) -> bool {
        self.0.contains(key)
    }

    /// The claimed keys, in claim order.
    pub fn keys(&self) -> &[K] {
        &self.0
    }

    /// Number of claimed keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the claimed set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// -------------------------------------------------------------------------------------------------
// Claim guard
// -------------------------------------------------------------------------------------------------

/// RAII guard for one claimed key.
///
/// While the guard is alive, no other claim of an equal key on the same registry
/// can succeed. Dropping the guard removes the key, after which the key may be
/// claimed again. Both handle kinds are built on this guard; it can also be used
/// standalone to reserve a key without binding a value to it.
///
/// # Examples
///
/// ```
/// use keyclaim::{Claim, ClaimError, Registry};
/// use std::time::Duration;
///
/// let registry = Registry::<String, (String, u16)>::new();
/// let key = ("db".to_string(), 1);
///
/// let first = Claim::acquire(&registry, key.clone(), Duration::from_millis(100)).unwrap();
///
/// // The key is taken while `first` is alive.
/// let err = Claim::acquire(&registry, key.clone(), Duration::from_millis(100)).unwrap_err();
/// assert_eq!(err, ClaimError::DuplicateKey);
///
/// drop(first);
/// assert!(Claim::acquire(&registry, key, Duration::from_millis(100)).is_ok());
/// ```
pub struct Claim<T, K: Key> {
    registry: Arc<Registry<T, K>>,
    key: K,
}

impl<T, K: Key> Claim<T, K> {
    /// Claims `key` on `registry` within `timeout`.
    ///
    /// # Errors
    ///
    /// - [`ClaimError::LockTimeout`] if the registry lock was not acquired
    ///   within `timeout`.
    /// - [`ClaimError::DuplicateKey`] if an equal key is already claimed.
    pub fn acquire(
        registry: &Arc<Registry<T, K>>,
        key: K,
        timeout: Duration,
    ) -> Result<Self, ClaimError> {
        registry.insert(&key, timeout)?;
        Ok(Self {
            registry: Arc::clone(registry),
            key,
        })
    }

    /// The key this claim holds.
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<T, K: Key> Drop for Claim<T, K> {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

impl<T, K: Key> std::fmt::Debug for Claim<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Claim").field("key", &self.key).finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // NOTE: No #[serial] needed, every test creates its own registry instance.

    const T: Duration = Duration::from_millis(50);

    #[test]
    fn test_claim_and_release() {
        let registry = Registry::<String, i32>::new();

        let claim = Claim::acquire(&registry, 7, T).unwrap();
        assert_eq!(claim.key(), &7);
        assert!(registry.contains(&7));
        assert_eq!(registry.len(), 1);

        drop(claim);
        assert!(!registry.contains(&7));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let registry = Registry::<String, (String, u16)>::new();
        let key = ("db".to_string(), 1);

        let _first = Claim::acquire(&registry, key.clone(), T).unwrap();
        let err = Claim::acquire(&registry, key, T).unwrap_err();
        assert_eq!(err, ClaimError::DuplicateKey);
    }

    #[test]
    fn test_key_reusable_after_release() {
        let registry = Registry::<String, i32>::new();

        let first = Claim::acquire(&registry, 1, T).unwrap();
        drop(first);

        let second = Claim::acquire(&registry, 1, T);
        assert!(second.is_ok());
    }

    #[test]
    fn test_distinct_keys_coexist() {
        let registry = Registry::<String, (String, u16)>::new();

        let _a = Claim::acquire(&registry, ("db".to_string(), 1), T).unwrap();
        let _b = Claim::acquire(&registry, ("db".to_string(), 2), T).unwrap();
        let _c = Claim::acquire(&registry, ("cache".to_string(), 1), T).unwrap();

        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_claim_times_out_while_lock_held() {
        let registry = Registry::<String, i32>::new();

        let guard = registry.try_lock_for(T).unwrap();
        let err = Claim::acquire(&registry, 1, Duration::from_millis(20)).unwrap_err();
        assert_eq!(err, ClaimError::LockTimeout);

        // The failed attempt must not have inserted anything.
        assert!(guard.is_empty());
        drop(guard);

        assert!(Claim::acquire(&registry, 1, T).is_ok());
    }

    #[test]
    fn test_claimed_keys_view() {
        let registry = Registry::<String, i32>::new();
        let _a = Claim::acquire(&registry, 1, T).unwrap();
        let _b = Claim::acquire(&registry, 2, T).unwrap();

        let view = registry.try_lock_for(T).unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.contains(&1));
        assert!(!view.contains(&3));
        assert_eq!(view.keys(), &[1, 2]);
    }

    #[test]
    fn test_trace_callback_claim_and_release_events() {
        let registry = Registry::<u8, u8>::new();

        let events = Arc::new(StdMutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |event| {
            events_clone.lock().unwrap().push(event.to_string());
        });

        let claim = Claim::acquire(&registry, 3, T).unwrap();
        drop(claim);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0], "claim { type_name: u8, accepted: true }");
        assert_eq!(captured[1], "release { type_name: u8 }");
    }

    #[test]
    fn test_trace_callback_rejection_events() {
        let registry = Registry::<u8, u8>::new();
        let _held = Claim::acquire(&registry, 3, T).unwrap();

        let events = Arc::new(StdMutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |event| {
            events_clone.lock().unwrap().push(event.to_string());
        });

        let _ = Claim::acquire(&registry, 3, T);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0], "claim { type_name: u8, accepted: false }");
    }

    #[test]
    fn test_clear_trace_callback_stops_events() {
        let registry = Registry::<u8, u8>::new();

        let events = Arc::new(StdMutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |event| {
            events_clone.lock().unwrap().push(event.to_string());
        });

        let _claim = Claim::acquire(&registry, 1, T).unwrap();
        assert_eq!(events.lock().unwrap().len(), 1);

        registry.clear_trace_callback();

        let _other = Claim::acquire(&registry, 2, T).unwrap();
        let _ = registry.contains(&1);
        assert_eq!(events.lock().unwrap().len(), 1); // still only the first event
    }
}
