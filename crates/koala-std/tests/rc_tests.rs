//! Tests for the strong/weak reference-counted handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use koala_std::{Ref, WeakRef};
use quickcheck_macros::quickcheck;

/// Payload that records how many times it has been dropped.
struct DropCounter {
    drops: Arc<AtomicUsize>,
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        let _ = self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn counted() -> (Ref<DropCounter>, Arc<AtomicUsize>) {
    let drops = Arc::new(AtomicUsize::new(0));
    let handle = Ref::new(DropCounter {
        drops: Arc::clone(&drops),
    });
    (handle, drops)
}

#[test]
fn test_new_handle_counts() {
    let handle = Ref::new(5_u32);
    assert_eq!(Ref::strong_count(&handle), 1);
    assert_eq!(Ref::weak_count(&handle), 0);
    assert_eq!(*handle, 5);
}

#[test]
fn test_clone_and_drop_adjust_strong_count() {
    let handle = Ref::new("koala".to_string());
    let second = handle.clone();
    assert_eq!(Ref::strong_count(&handle), 2);
    assert!(Ref::ptr_eq(&handle, &second));

    drop(second);
    assert_eq!(Ref::strong_count(&handle), 1);
}

#[test]
fn test_payload_destroyed_synchronously_at_zero() {
    let (handle, drops) = counted();
    let second = handle.clone();

    drop(handle);
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    // The last strong handle destroys the payload before `drop` returns.
    drop(second);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_payload_destroyed_exactly_once_with_weak_outstanding() {
    let (handle, drops) = counted();
    let weak = Ref::downgrade(&handle);
    let weak_copy = weak.clone();

    drop(handle);
    assert_eq!(drops.load(Ordering::SeqCst), 1);

    drop(weak);
    drop(weak_copy);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_weak_reports_null_after_last_strong_dropped() {
    let (handle, _drops) = counted();
    let weak = Ref::downgrade(&handle);
    assert!(weak.upgrade().is_some());
    assert!(weak.is_live());

    drop(handle);

    assert!(weak.upgrade().is_none());
    assert!(!weak.is_live());
    assert_eq!(weak.strong_count(), 0);
    // Still bound to the (now empty) block.
    assert!(!weak.is_null());
}

#[test]
fn test_unbound_weak_is_null() {
    let weak: WeakRef<u8> = WeakRef::new();
    assert!(weak.is_null());
    assert!(weak.upgrade().is_none());
    assert_eq!(weak.strong_count(), 0);
    assert_eq!(weak.weak_count(), 0);

    let cloned = weak.clone();
    assert!(cloned.is_null());
}

#[test]
fn test_weak_count_tracks_weak_handles() {
    let handle = Ref::new(1_i32);
    let a = Ref::downgrade(&handle);
    let b = WeakRef::from(&handle);
    assert_eq!(Ref::weak_count(&handle), 2);
    assert_eq!(a.weak_count(), 2);
    assert!(a.ptr_eq(&b));
    assert!(a.points_to(&handle));

    drop(b);
    assert_eq!(Ref::weak_count(&handle), 1);
}

#[test]
fn test_upgrade_keeps_payload_alive() {
    let (handle, drops) = counted();
    let weak = Ref::downgrade(&handle);
    let upgraded = weak.upgrade().expect("payload alive");

    drop(handle);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    assert!(weak.is_live());

    drop(upgraded);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_try_unwrap_unique() {
    let handle = Ref::new(vec![1, 2, 3]);
    let weak = Ref::downgrade(&handle);
    let value = Ref::try_unwrap(handle).expect("unique");
    assert_eq!(value, vec![1, 2, 3]);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_try_unwrap_shared_fails() {
    let handle = Ref::new(7_u64);
    let other = handle.clone();
    let handle = Ref::try_unwrap(handle).expect_err("shared");
    assert_eq!(Ref::strong_count(&handle), 2);
    drop(other);
}

#[test]
fn test_get_mut_requires_unique() {
    let mut handle = Ref::new(String::from("a"));
    Ref::get_mut(&mut handle).expect("unique").push('b');
    assert_eq!(handle.as_str(), "ab");

    let weak = Ref::downgrade(&handle);
    assert!(Ref::get_mut(&mut handle).is_none());
    drop(weak);
    assert!(Ref::get_mut(&mut handle).is_some());
}

#[test]
fn test_dynamic_capability_test() {
    let handle = Ref::new(42_u16);
    assert!(handle.is::<u16>());
    assert!(!handle.is::<u32>());
    assert_eq!(handle.downcast_ref::<u16>(), Some(&42));
    assert!(handle.downcast_ref::<String>().is_none());
}

#[test]
fn test_handles_cross_threads() {
    let (handle, drops) = counted();
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let local = handle.clone();
            thread::spawn(move || {
                let weak = Ref::downgrade(&local);
                let again = weak.upgrade();
                assert!(again.is_some());
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }
    assert_eq!(Ref::strong_count(&handle), 1);
    assert_eq!(Ref::weak_count(&handle), 0);
    drop(handle);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_debug_reports_weak_state() {
    let handle = Ref::new(0_u8);
    let weak = Ref::downgrade(&handle);
    assert_eq!(format!("{weak:?}"), "WeakRef(live)");
    drop(handle);
    assert_eq!(format!("{weak:?}"), "WeakRef(expired)");
    assert_eq!(format!("{:?}", WeakRef::<u8>::new()), "WeakRef(null)");
}

#[quickcheck]
fn prop_any_number_of_clones_drops_once(clones: u8, weaks: u8) -> bool {
    let (handle, drops) = counted();
    let strong: Vec<_> = (0..clones).map(|_| handle.clone()).collect();
    let weak: Vec<_> = (0..weaks).map(|_| Ref::downgrade(&handle)).collect();

    let counts_ok = Ref::strong_count(&handle) == usize::from(clones) + 1
        && Ref::weak_count(&handle) == usize::from(weaks);

    drop(strong);
    let alive_before_last = drops.load(Ordering::SeqCst) == 0;
    drop(handle);
    let all_expired = weak.iter().all(|w| w.upgrade().is_none());
    drop(weak);

    counts_ok && alive_before_last && all_expired && drops.load(Ordering::SeqCst) == 1
}
