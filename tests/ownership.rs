//! Ownership isolation and no-leak-on-failure, verified with an instrumented
//! value type that counts its drops.

use keyclaim::{Claim, ClaimError, Handle, InlineHandle, Registry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(100);

/// Value type instrumented to count drops through a shared counter.
#[derive(Debug, Default)]
struct Probe {
    drops: Arc<AtomicUsize>,
}

impl Probe {
    fn new(drops: &Arc<AtomicUsize>) -> Self {
        Self {
            drops: Arc::clone(drops),
        }
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_owning_handle_drops_instance_exactly_once() {
    let registry = Registry::<Probe, i32>::new();
    let drops = Arc::new(AtomicUsize::new(0));

    let handle = Handle::with(&registry, 1, TIMEOUT, || Probe::new(&drops)).unwrap();
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    drop(handle);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_borrowing_handle_leaves_caller_storage_intact() {
    let registry = Registry::<Probe, i32>::new();
    let drops = Arc::new(AtomicUsize::new(0));
    let storage = Probe::new(&drops);

    let handle = Handle::borrowed(&registry, 1, TIMEOUT, &storage).unwrap();
    drop(handle);

    // The handle released its key without touching the caller's instance.
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    assert!(!registry.contains(&1));

    drop(storage);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_inline_handle_drops_member_exactly_once() {
    let registry = Registry::<Probe, i32>::new();
    let drops = Arc::new(AtomicUsize::new(0));

    let handle = InlineHandle::with(&registry, 1, TIMEOUT, || Probe::new(&drops)).unwrap();
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    drop(handle);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_duplicate_claim_allocates_nothing() {
    let registry = Registry::<Probe, i32>::new();
    let drops = Arc::new(AtomicUsize::new(0));
    let mut built = 0;

    let _held = Handle::with(&registry, 1, TIMEOUT, || Probe::new(&drops)).unwrap();

    let result = Handle::with(&registry, 1, TIMEOUT, || {
        built += 1;
        Probe::new(&drops)
    });

    assert_eq!(result.unwrap_err(), ClaimError::DuplicateKey);
    assert_eq!(built, 0);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
}

#[test]
fn test_timed_out_claim_allocates_nothing() {
    let registry = Registry::<Probe, i32>::new();
    let drops = Arc::new(AtomicUsize::new(0));
    let mut built = 0;

    let guard = registry.try_lock_for(TIMEOUT).unwrap();
    let result = Handle::with(&registry, 1, Duration::from_millis(20), || {
        built += 1;
        Probe::new(&drops)
    });
    drop(guard);

    assert_eq!(result.unwrap_err(), ClaimError::LockTimeout);
    assert_eq!(built, 0);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
}

#[test]
fn test_inline_init_with_failure_runs_no_factory() {
    let registry = Registry::<Probe, i32>::new();
    let drops = Arc::new(AtomicUsize::new(0));
    let _held = Claim::acquire(&registry, 1, TIMEOUT).unwrap();

    let mut handle = InlineHandle::<Probe, i32>::unbound();
    let result = handle.init_with(&registry, 1, TIMEOUT, || Probe::new(&drops));

    assert_eq!(result, Err(ClaimError::DuplicateKey));
    assert!(!handle.is_bound());
    assert_eq!(drops.load(Ordering::SeqCst), 0);
}

#[test]
fn test_borrowed_storage_usable_after_handle_drop() {
    let registry = Registry::<String, i32>::new();
    let storage = "still here".to_string();

    {
        let handle = Handle::borrowed(&registry, 1, TIMEOUT, &storage).unwrap();
        assert_eq!(handle.get(), "still here");
    }

    assert_eq!(storage, "still here");
}
