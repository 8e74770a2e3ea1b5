//! Atomically reference-counted strong and weak handles.
//!
//! A [`Ref`] owns its payload together with every other `Ref` to the same
//! allocation. A [`WeakRef`] observes the allocation without keeping the
//! payload alive. Both kinds share one heap block:
//!
//! ```text
//! +-----------------+
//! | strong: usize   |  live Ref handles
//! | weak:   usize   |  live WeakRef handles (+1 while any Ref exists)
//! | value:  T       |  dropped when strong reaches zero
//! +-----------------+
//! ```
//!
//! The payload is dropped synchronously by whichever `Ref` brings the strong
//! count to zero. The block itself is freed once the weak count also reaches
//! zero. A weak handle stops upgrading the instant the payload is gone.
//!
//! Counts are atomic, so handles may be cloned and dropped from several
//! threads. Nothing else about the payload is synchronized.

#![allow(unsafe_code)]

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ops::Deref;
use core::ptr::{self, NonNull};
use core::sync::atomic::{self, AtomicUsize, Ordering};

/// Counts beyond this point are treated as a leak and abort the operation.
const MAX_REFCOUNT: usize = isize::MAX as usize;

/// The shared allocation behind both handle kinds.
struct CountBlock<T> {
    strong: AtomicUsize,
    /// Live weak handles, plus one held collectively by the strong handles.
    weak: AtomicUsize,
    value: ManuallyDrop<T>,
}

impl<T> CountBlock<T> {
    /// # Safety
    ///
    /// `this` must point at a block whose weak count has not reached zero.
    unsafe fn strong<'a>(this: NonNull<Self>) -> &'a AtomicUsize {
        // SAFETY: the block is still allocated; only the counter is borrowed,
        // never the payload, so a concurrent payload drop does not alias.
        unsafe { &*ptr::addr_of!((*this.as_ptr()).strong) }
    }

    /// # Safety
    ///
    /// Same contract as [`CountBlock::strong`].
    unsafe fn weak<'a>(this: NonNull<Self>) -> &'a AtomicUsize {
        // SAFETY: see `strong`.
        unsafe { &*ptr::addr_of!((*this.as_ptr()).weak) }
    }
}

/// A strong, atomically reference-counted handle.
///
/// Cloning increments the strong count; dropping decrements it. The payload
/// is destroyed exactly once, at the moment the last strong handle goes away.
pub struct Ref<T> {
    block: NonNull<CountBlock<T>>,
    owns: PhantomData<CountBlock<T>>,
}

/// A weak handle to a [`Ref`] allocation.
///
/// A weak handle never keeps the payload alive. It may be unbound
/// ([`WeakRef::new`]), in which case [`WeakRef::is_null`] is true.
pub struct WeakRef<T> {
    block: Option<NonNull<CountBlock<T>>>,
}

// SAFETY: the counts are atomic and the payload is only ever reached through
// shared references, so sharing handles is sound whenever the payload itself
// is both `Send` and `Sync`.
unsafe impl<T: Send + Sync> Send for Ref<T> {}
// SAFETY: see above.
unsafe impl<T: Send + Sync> Sync for Ref<T> {}
// SAFETY: see above.
unsafe impl<T: Send + Sync> Send for WeakRef<T> {}
// SAFETY: see above.
unsafe impl<T: Send + Sync> Sync for WeakRef<T> {}

impl<T> Ref<T> {
    /// Allocate a new count block holding `value` with a strong count of one.
    pub fn new(value: T) -> Self {
        let block = Box::new(CountBlock {
            strong: AtomicUsize::new(1),
            weak: AtomicUsize::new(1),
            value: ManuallyDrop::new(value),
        });
        Self::from_block(NonNull::from(Box::leak(block)))
    }

    const fn from_block(block: NonNull<CountBlock<T>>) -> Self {
        Self {
            block,
            owns: PhantomData,
        }
    }

    fn strong_counter(&self) -> &AtomicUsize {
        // SAFETY: a live strong handle keeps the implicit weak reference, so
        // the block is allocated for at least as long as `self`.
        unsafe { CountBlock::strong(self.block) }
    }

    fn weak_counter(&self) -> &AtomicUsize {
        // SAFETY: see `strong_counter`.
        unsafe { CountBlock::weak(self.block) }
    }

    /// Number of live strong handles, including `this`.
    #[must_use]
    pub fn strong_count(this: &Self) -> usize {
        this.strong_counter().load(Ordering::Acquire)
    }

    /// Number of live weak handles.
    #[must_use]
    pub fn weak_count(this: &Self) -> usize {
        // The strong side holds one implicit weak reference while `this` lives.
        this.weak_counter().load(Ordering::Acquire) - 1
    }

    /// Create a weak handle bound to this allocation.
    ///
    /// # Panics
    ///
    /// Panics if the weak count would overflow.
    #[must_use]
    pub fn downgrade(this: &Self) -> WeakRef<T> {
        let old = this.weak_counter().fetch_add(1, Ordering::Relaxed);
        assert!(old < MAX_REFCOUNT, "weak reference count overflow");
        WeakRef {
            block: Some(this.block),
        }
    }

    /// Whether two handles share one allocation.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.block == other.block
    }

    /// Raw pointer to the payload, for identity comparisons only.
    #[must_use]
    pub fn as_ptr(this: &Self) -> *const T {
        let value: &T = this;
        ptr::from_ref(value)
    }

    /// Mutable access to the payload when `this` is the only handle of either
    /// kind.
    #[must_use]
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        let unique = this.strong_counter().load(Ordering::Acquire) == 1
            && this.weak_counter().load(Ordering::Acquire) == 1;
        if !unique {
            return None;
        }
        // SAFETY: no other strong handle exists and no weak handle exists that
        // could upgrade, and `&mut this` prevents new ones being made.
        let value: &mut ManuallyDrop<T> =
            unsafe { &mut *ptr::addr_of_mut!((*this.block.as_ptr()).value) };
        Some(&mut **value)
    }

    /// Move the payload out if `this` is the only strong handle.
    ///
    /// Outstanding weak handles stop upgrading once this succeeds.
    ///
    /// # Errors
    ///
    /// Returns `this` unchanged if other strong handles exist.
    pub fn try_unwrap(this: Self) -> Result<T, Self> {
        if this
            .strong_counter()
            .compare_exchange(1, 0, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return Err(this);
        }
        atomic::fence(Ordering::Acquire);

        let block = this.block;
        mem::forget(this);

        // SAFETY: the strong count is now zero and we were the last strong
        // handle, so nothing else can reach the payload. It is taken exactly
        // once and the `ManuallyDrop` wrapper stops the block freeing it again.
        let value = unsafe { ManuallyDrop::take(&mut *ptr::addr_of_mut!((*block.as_ptr()).value)) };

        // Release the implicit weak reference held by the strong side.
        drop(WeakRef { block: Some(block) });
        Ok(value)
    }
}

impl<T: Any> Ref<T> {
    /// Dynamic capability test: whether the payload is of type `U`.
    #[must_use]
    pub fn is<U: Any>(&self) -> bool {
        let value: &dyn Any = &**self;
        value.is::<U>()
    }

    /// Narrow the payload to `U`, or `None` on mismatch.
    #[must_use]
    pub fn downcast_ref<U: Any>(&self) -> Option<&U> {
        let value: &dyn Any = &**self;
        value.downcast_ref::<U>()
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        let old = self.strong_counter().fetch_add(1, Ordering::Relaxed);
        assert!(old < MAX_REFCOUNT, "strong reference count overflow");
        Self::from_block(self.block)
    }
}

impl<T> Deref for Ref<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the strong count is at least one while `self` lives, so the
        // payload has not been dropped.
        unsafe { &(*self.block.as_ptr()).value }
    }
}

impl<T> Drop for Ref<T> {
    fn drop(&mut self) {
        if self.strong_counter().fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        atomic::fence(Ordering::Acquire);

        // SAFETY: the strong count just reached zero. Weak handles never touch
        // the payload and can no longer upgrade, so this is the only access.
        unsafe {
            ManuallyDrop::drop(&mut *ptr::addr_of_mut!((*self.block.as_ptr()).value));
        }

        // Release the implicit weak reference; frees the block if no weak
        // handles remain.
        drop(WeakRef {
            block: Some(self.block),
        });
    }
}

impl<T> From<T> for Ref<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: PartialEq> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Eq> Eq for Ref<T> {}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: fmt::Display> fmt::Display for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl<T> WeakRef<T> {
    /// An unbound weak handle. [`WeakRef::is_null`] is true for it.
    #[must_use]
    pub const fn new() -> Self {
        Self { block: None }
    }

    /// Whether this handle was ever bound to an allocation.
    ///
    /// This says nothing about whether the payload is still alive; use
    /// [`WeakRef::is_live`] or [`WeakRef::upgrade`] for that.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.block.is_none()
    }

    /// Whether the payload is still alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.strong_count() > 0
    }

    /// Obtain a strong handle, or `None` once every strong handle is gone.
    ///
    /// # Panics
    ///
    /// Panics if the strong count would overflow.
    #[must_use]
    pub fn upgrade(&self) -> Option<Ref<T>> {
        let block = self.block?;
        // SAFETY: `self` holds a weak reference, keeping the block allocated.
        let strong = unsafe { CountBlock::strong(block) };
        let mut current = strong.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                return None;
            }
            assert!(current < MAX_REFCOUNT, "strong reference count overflow");
            match strong.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(Ref::from_block(block)),
                Err(observed) => current = observed,
            }
        }
    }

    /// Number of live strong handles to the allocation, zero if unbound.
    #[must_use]
    pub fn strong_count(&self) -> usize {
        self.block.map_or(0, |block| {
            // SAFETY: `self` holds a weak reference, keeping the block allocated.
            unsafe { CountBlock::strong(block) }.load(Ordering::Acquire)
        })
    }

    /// Number of live weak handles to the allocation, zero if unbound.
    #[must_use]
    pub fn weak_count(&self) -> usize {
        self.block.map_or(0, |block| {
            // SAFETY: `self` holds a weak reference, keeping the block allocated.
            let weak = unsafe { CountBlock::weak(block) }.load(Ordering::Acquire);
            if self.strong_count() > 0 {
                weak - 1
            } else {
                weak
            }
        })
    }

    /// Whether two weak handles are bound to the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.block == other.block
    }

    /// Whether this handle is bound to the allocation behind `strong`.
    #[must_use]
    pub fn points_to(&self, strong: &Ref<T>) -> bool {
        self.block == Some(strong.block)
    }
}

impl<T> Clone for WeakRef<T> {
    fn clone(&self) -> Self {
        if let Some(block) = self.block {
            // SAFETY: `self` holds a weak reference, keeping the block allocated.
            let old = unsafe { CountBlock::weak(block) }.fetch_add(1, Ordering::Relaxed);
            assert!(old < MAX_REFCOUNT, "weak reference count overflow");
        }
        Self { block: self.block }
    }
}

impl<T> Drop for WeakRef<T> {
    fn drop(&mut self) {
        let Some(block) = self.block else {
            return;
        };
        // SAFETY: `self` holds a weak reference, keeping the block allocated.
        if unsafe { CountBlock::weak(block) }.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        atomic::fence(Ordering::Acquire);

        // SAFETY: that was the last reference of either kind. The payload was
        // already dropped by the last strong handle; `ManuallyDrop` keeps the
        // box from dropping it again.
        drop(unsafe { Box::from_raw(block.as_ptr()) });
    }
}

impl<T> Default for WeakRef<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<&Ref<T>> for WeakRef<T> {
    fn from(strong: &Ref<T>) -> Self {
        Ref::downgrade(strong)
    }
}

impl<T> fmt::Debug for WeakRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("WeakRef(null)")
        } else if self.is_live() {
            f.write_str("WeakRef(live)")
        } else {
            f.write_str("WeakRef(expired)")
        }
    }
}
