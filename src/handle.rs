//! The indirect handle: one key bound to an owned or borrowed instance.

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use crate::claim_error::ClaimError;
use crate::key::Key;
use crate::registry::{Claim, Registry};

/// Ownership-tagged union behind the handle. Exactly two shapes ever exist.
enum Holder<'a, T> {
    Owned(Box<T>),
    Borrowed(&'a T),
}

impl<T> Holder<'_, T> {
    fn get(&self) -> &T {
        match self {
            Holder::Owned(value) => value,
            Holder::Borrowed(value) => value,
        }
    }
}

/// Handle binding one key to one instance of `T`.
///
/// While the handle is alive, no other handle of the same registry can claim an
/// equal key. The instance is either owned by the handle (allocated only after
/// the claim succeeds, dropped when the handle drops) or borrowed from the
/// caller (never allocated nor freed by the handle). The mode is fixed at
/// construction.
///
/// Dropping the handle removes its key from the registry, waiting for the
/// registry lock without a timeout, before the owned instance (if any) is
/// dropped.
///
/// # Examples
///
/// ```
/// use keyclaim::{ClaimError, Handle, Registry};
/// use std::time::Duration;
///
/// #[derive(Debug, PartialEq)]
/// struct Connection {
///     host: String,
///     port: u16,
/// }
///
/// let registry = Registry::<Connection, (String, u16)>::new();
/// let key = ("db".to_string(), 1);
///
/// let a = Handle::with(&registry, key.clone(), Duration::from_millis(100), || Connection {
///     host: "localhost".into(),
///     port: 5432,
/// })
/// .unwrap();
/// assert_eq!(a.port, 5432);
///
/// // The key is taken while `a` is alive.
/// let err = Handle::with(&registry, key.clone(), Duration::from_millis(100), || Connection {
///     host: "localhost".into(),
///     port: 5432,
/// })
/// .unwrap_err();
/// assert_eq!(err, ClaimError::DuplicateKey);
///
/// drop(a);
/// assert!(Handle::with_default(&registry, key, Duration::from_millis(100)).is_ok());
/// # impl Default for Connection {
/// #     fn default() -> Self { Self { host: String::new(), port: 0 } }
/// # }
/// ```
pub struct Handle<'a, T, K: Key> {
    // claim precedes holder: the key is released before the instance drops
    claim: Claim<T, K>,
    holder: Holder<'a, T>,
}

impl<'a, T, K: Key> Handle<'a, T, K> {
    /// Claims `key`, then builds an owned instance with `make`.
    ///
    /// The factory runs only after the claim succeeds, so a failed claim
    /// allocates nothing; retrying means calling `with` again.
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
            claim,
            holder: Holder::Owned(Box::new(make())),
        })
    }

    /// Claims `key`, then builds an owned instance in its default state.
    ///
    /// # Errors
    ///
    /// Same as [`Handle::with`].
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

    /// Claims `key`, then binds the handle to the caller-owned `value`.
    ///
    /// The handle never allocates or frees the instance; dropping the handle
    /// only releases the key.
    ///
    /// # Errors
    ///
    /// Same as [`Handle::with`].
    ///
    /// # Examples
    ///
    /// ```
    /// use keyclaim::{Handle, Registry};
    /// use std::time::Duration;
    ///
    /// let registry = Registry::<Vec<u8>, &'static str>::new();
    /// let buffer = vec![1, 2, 3];
    ///
    /// {
    ///     let handle = Handle::borrowed(&registry, "scratch", Duration::from_millis(50), &buffer)
    ///         .unwrap();
    ///     assert_eq!(handle.len(), 3);
    /// }
    ///
    /// // The caller's storage is intact after the handle is gone.
    /// assert_eq!(buffer, vec![1, 2, 3]);
    /// ```
    pub fn borrowed(
        registry: &Arc<Registry<T, K>>,
        key: K,
        timeout: Duration,
        value: &'a T,
    ) -> Result<Self, ClaimError> {
        let claim = Claim::acquire(registry, key, timeout)?;
        Ok(Self {
            claim,
            holder: Holder::Borrowed(value),
        })
    }

    /// The key this handle holds.
    pub fn key(&self) -> &K {
        self.claim.key()
    }

    /// The live instance.
    pub fn get(&self) -> &T {
        self.holder.get()
    }

    /// Mutable access to the instance; `None` for borrowing handles.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match &mut self.holder {
            Holder::Owned(value) => Some(value),
            Holder::Borrowed(_) => None,
        }
    }

    /// Whether this handle owns its instance.
    pub fn is_owned(&self) -> bool {
        matches!(self.holder, Holder::Owned(_))
    }
}

impl<T, K: Key> Deref for Handle<'_, T, K> {
    type Target = T;

    fn deref(&self) -> &T {
        self.holder.get()
    }
}

impl<T, K: Key> std::fmt::Debug for Handle<'_, T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("key", self.claim.key())
            .field("owned", &self.is_owned())
            .finish_non_exhaustive()
    }
}
