//! The key contract and the address-identity key element.

use std::any;
use std::fmt;
use std::marker::PhantomData;

/// Contract every key type must satisfy.
///
/// Keys identify a logical identity for uniqueness purposes. Equality is
/// structural: tuples of comparable elements compare element-wise, and two keys
/// are the same identity iff all elements compare equal. The claim protocol
/// stores a copy of the key, hence `Clone`; `Debug` feeds the structured log
/// fields.
///
/// Blanket-implemented; there is nothing to implement by hand.
pub trait Key: Clone + PartialEq + fmt::Debug + Send + 'static {}

impl<K> Key for K where K: Clone + PartialEq + fmt::Debug + Send + 'static {}

/// Key element comparing by referent address, never by pointed-to content.
///
/// Rust references compare by value, so a key that should mean "this exact
/// object" needs an explicit opt-in. `ByAddr::of(&thing)` captures the address
/// of `thing`; two `ByAddr` elements are equal iff they were taken from the
/// same address.
///
/// The wrapper stores only the address. It neither borrows nor keeps the
/// referent alive. A key taken from a since-freed object can collide with a
/// new object at the same address; keep the referent alive for as long as the
/// key is claimed.
///
/// # Examples
///
/// ```
/// use keyclaim::ByAddr;
///
/// let a = String::from("config");
/// let b = String::from("config");
///
/// // Same content, different identity.
/// assert_ne!(ByAddr::of(&a), ByAddr::of(&b));
/// assert_eq!(ByAddr::of(&a), ByAddr::of(&a));
/// ```
pub struct ByAddr<T> {
    addr: usize,
    _ty: PhantomData<fn(&T)>,
}

impl<T> ByAddr<T> {
    /// Captures the address of `value`.
    pub fn of(value: &T) -> Self {
        Self {
            addr: value as *const T as usize,
            _ty: PhantomData,
        }
    }

    /// The captured address.
    pub fn addr(&self) -> usize {
        self.addr
    }
}

impl<T> Clone for ByAddr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ByAddr<T> {}

impl<T> PartialEq for ByAddr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for ByAddr<T> {}

impl<T> fmt::Debug for ByAddr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByAddr<{}>({:#x})", any::type_name::<T>(), self.addr)
    }
}
