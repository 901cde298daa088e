//! # Keyclaim
//!
//! A thread-safe claim registry guaranteeing **at most one live value per key**
//! within a process, with handle types that release the key automatically when
//! they are dropped.
//!
//! A key is any tuple of comparable values naming a logical identity, such as
//! a connection string and port, a device id, or an address. Claiming a key inserts
//! it into the registry of its (value type, key type) pairing under a
//! timeout-capable lock; while the claim lives, every further claim of an equal
//! key fails. Dropping the holder releases the key for reuse.
//!
//! ## Quick Start
//!
//! ```rust
//! use keyclaim::{Handle, Registry};
//! use std::time::Duration;
//!
//! // One registry per (value type, key type) pairing.
//! let registry = Registry::<String, (String, u16)>::new();
//! let key = ("db".to_string(), 1);
//!
//! // Claim the key, then bind a freshly built value to it.
//! let handle = Handle::with(&registry, key.clone(), Duration::from_millis(100), || {
//!     "connection".to_string()
//! })
//! .unwrap();
//! assert_eq!(&*handle, "connection");
//!
//! // While the handle lives, the key cannot be claimed again.
//! assert!(Handle::with_default(&registry, key.clone(), Duration::from_millis(100)).is_err());
//!
//! // Dropping the handle releases the key.
//! drop(handle);
//! assert!(Handle::with_default(&registry, key, Duration::from_millis(100)).is_ok());
//! ```
//!
//! ## Features
//!
//! - **Thread-safe**: claims are arbitrated under one timed lock per registry,
//!   and the membership check and insertion form a single critical section
//! - **RAII release**: keys are released by `Drop`, before the bound instance
//!   is torn down, waiting on the lock without a timeout so release never fails
//! - **Owning or borrowing**: [`Handle`] either owns a value built after the
//!   claim succeeds or borrows one the caller owns; [`InlineHandle`] stores its
//!   value without indirection
//! - **Tracing support**: optional per-registry callback system plus
//!   `tracing` events for monitoring claim activity
//!
//! ## Main Types
//!
//! - [`Registry`] - claimed-key tracker for one (value type, key type) pairing
//! - [`Claim`] - RAII guard for one claimed key
//! - [`Handle`] - handle binding a key to an owned or borrowed instance
//! - [`InlineHandle`] - handle owning its instance as a direct member
//! - [`ClaimError`] - the two failure kinds, [`ClaimError::DuplicateKey`] and
//!   [`ClaimError::LockTimeout`]
//! - [`define_registry!`] - declare a process-wide shared registry for a pairing

mod claim_error;
mod claim_event;
mod handle;
mod inline;
mod key;
mod macros;
mod registry;

// Re-export the main public API
pub use claim_error::ClaimError;
pub use claim_event::ClaimEvent;
pub use handle::Handle;
pub use inline::InlineHandle;
pub use key::{ByAddr, Key};
pub use registry::{Claim, ClaimedKeys, Registry, TraceCallback, DEFAULT_TIMEOUT};
