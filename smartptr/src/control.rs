//! Shared bookkeeping behind `SharedOwner` and `WeakObserver`.
//!
//! A control block owns the resource's storage and two atomic counts. The
//! resource is destroyed when the strong count reaches zero; the block itself
//! is freed when the weak count reaches zero.
//!
//! While any strong owner exists, the strong owners collectively hold one
//! extra weak reference. The block is therefore freed by exactly one atomic
//! decrement observing zero, whichever side gives up its last reference.

use std::fmt;
use std::process::abort;
use std::ptr::NonNull;
use std::sync::atomic::{self, AtomicBool, AtomicUsize, Ordering};

use tracing::trace;

use crate::errors::PointerResult;
use crate::monitor::{self, OwnershipKind};
use crate::storage;

// Counts beyond this would risk wrapping; give up like `std::sync::Arc` does.
const MAX_REFCOUNT: usize = usize::MAX >> 1;

/// Strong and weak counts plus the storage of one shared resource.
pub struct ControlBlock<T> {
    strong: AtomicUsize,
    weak: AtomicUsize,
    // Set while the strong owners still hold their shared weak reference.
    implicit_weak: AtomicBool,
    destroyed: AtomicBool,
    resource: NonNull<T>,
}

impl<T> ControlBlock<T> {
    fn with_resource(resource: Box<T>) -> Self {
        let resource = NonNull::from(Box::leak(resource));
        monitor::note_acquired(resource.as_ptr(), OwnershipKind::Shared);
        Self {
            strong: AtomicUsize::new(1),
            weak: AtomicUsize::new(1),
            implicit_weak: AtomicBool::new(true),
            destroyed: AtomicBool::new(false),
            resource,
        }
    }

    /// Allocate a block with strong = 1 around `resource`.
    pub(crate) fn allocate(resource: Box<T>) -> NonNull<Self> {
        let block = Box::new(Self::with_resource(resource));
        trace!(type_name = std::any::type_name::<T>(), "Control block allocated");
        NonNull::from(Box::leak(block))
    }

    /// Like [`allocate`](Self::allocate), reporting allocator failure.
    ///
    /// The resource is destroyed when the block cannot be allocated.
    pub(crate) fn try_allocate(resource: Box<T>) -> PointerResult<NonNull<Self>> {
        let block = Self::with_resource(resource);
        let resource = block.resource;
        match storage::try_box(block) {
            Ok(block) => Ok(NonNull::from(Box::leak(block))),
            Err(err) => {
                monitor::note_released(resource.as_ptr());
                // SAFETY: `resource` came from `Box::leak` above and the block
                // that held it was dropped without ever being shared.
                drop(unsafe { Box::from_raw(resource.as_ptr()) });
                Err(err)
            }
        }
    }

    /// Current number of strong owners.
    pub fn strong_count(&self) -> usize {
        self.strong.load(Ordering::Acquire)
    }

    /// Current number of weak observers.
    ///
    /// Approximate while other threads are releasing references.
    pub fn weak_count(&self) -> usize {
        let implicit = self.implicit_weak.load(Ordering::Acquire);
        self.weak
            .load(Ordering::Acquire)
            .saturating_sub(usize::from(implicit))
    }

    /// Whether the resource has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    pub(crate) const fn resource_ptr(&self) -> *const T {
        self.resource.as_ptr()
    }

    /// # Safety
    ///
    /// The caller must hold a strong reference for the lifetime of the borrow.
    pub(crate) unsafe fn resource(&self) -> &T {
        // SAFETY: a strong reference keeps the resource alive.
        unsafe { self.resource.as_ref() }
    }

    pub(crate) fn increment_strong(&self) {
        if self.strong.fetch_add(1, Ordering::Relaxed) > MAX_REFCOUNT {
            abort();
        }
    }

    /// Add a strong reference unless the count is already zero.
    ///
    /// Check and increment are one compare-and-swap, so a resource whose
    /// destruction has begun is never handed out again.
    pub(crate) fn try_increment_strong(&self) -> bool {
        let mut current = self.strong.load(Ordering::Relaxed);

        while current > 0 {
            if current > MAX_REFCOUNT {
                abort();
            }
            match self.strong.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }

        false
    }

    pub(crate) fn increment_weak(&self) {
        if self.weak.fetch_add(1, Ordering::Relaxed) > MAX_REFCOUNT {
            abort();
        }
    }

    fn decrement_strong(&self) -> bool {
        // Release so every use of the resource happens before its destruction.
        if self.strong.fetch_sub(1, Ordering::Release) != 1 {
            return false;
        }
        atomic::fence(Ordering::Acquire);
        true
    }

    fn decrement_weak(&self) -> bool {
        if self.weak.fetch_sub(1, Ordering::Release) != 1 {
            return false;
        }
        atomic::fence(Ordering::Acquire);
        true
    }

    /// # Safety
    ///
    /// The strong count must have just reached zero.
    unsafe fn destroy_resource(&self) {
        let already_destroyed = self.destroyed.swap(true, Ordering::AcqRel);
        debug_assert!(!already_destroyed, "resource destroyed twice");
        if already_destroyed {
            return;
        }

        let resource = self.resource.as_ptr();
        monitor::note_released(resource);
        trace!(type_name = std::any::type_name::<T>(), "Resource destroyed");
        // SAFETY: the resource came from `Box::leak` in `with_resource`, and
        // the `destroyed` flag guarantees this runs once.
        drop(unsafe { Box::from_raw(resource) });
    }

    /// Give up one strong reference.
    ///
    /// Destroys the resource when it was the last strong reference, and the
    /// block when no observers remain either.
    ///
    /// # Safety
    ///
    /// `block` must come from [`allocate`](Self::allocate), the caller must
    /// own one strong reference to it, and must not use `block` afterwards.
    pub(crate) unsafe fn release_strong(block: NonNull<Self>) {
        // SAFETY: the caller's strong reference keeps the block allocated.
        let this = unsafe { block.as_ref() };
        if !this.decrement_strong() {
            return;
        }

        // Releases the implicit weak reference even if the destructor panics.
        let _implicit_weak = WeakRelease(block);
        // SAFETY: the strong count just reached zero.
        unsafe { this.destroy_resource() };
    }

    /// Give up one weak reference, freeing the block on the last one.
    ///
    /// # Safety
    ///
    /// `block` must come from [`allocate`](Self::allocate), the caller must
    /// own one weak reference to it, and must not use `block` afterwards.
    pub(crate) unsafe fn release_weak(block: NonNull<Self>) {
        // SAFETY: the caller's weak reference keeps the block allocated.
        if unsafe { block.as_ref() }.decrement_weak() {
            trace!(type_name = std::any::type_name::<T>(), "Control block freed");
            // SAFETY: the weak count reached zero, nobody else refers to the
            // block, and it was allocated as a `Box<Self>`.
            drop(unsafe { Box::from_raw(block.as_ptr()) });
        }
    }
}

struct WeakRelease<T>(NonNull<ControlBlock<T>>);

impl<T> Drop for WeakRelease<T> {
    fn drop(&mut self) {
        // SAFETY: holds the implicit weak reference of the strong owners,
        // which keeps the block allocated until `release_weak` below.
        unsafe { self.0.as_ref() }
            .implicit_weak
            .store(false, Ordering::Release);
        // SAFETY: gives up the implicit weak reference held above.
        unsafe { ControlBlock::release_weak(self.0) };
    }
}

impl<T> fmt::Debug for ControlBlock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlBlock")
            .field("strong", &self.strong_count())
            .field("weak", &self.weak_count())
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Counted(Arc<AtomicUsize>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn new_block_has_one_strong_and_no_observers() {
        let block = ControlBlock::allocate(Box::new(5_u32));
        // SAFETY: freshly allocated, one strong reference held here.
        let this = unsafe { block.as_ref() };

        assert_eq!(this.strong_count(), 1);
        assert_eq!(this.weak_count(), 0);
        assert!(!this.is_destroyed());

        // SAFETY: releases the only strong reference.
        unsafe { ControlBlock::release_strong(block) };
    }

    #[test]
    fn last_strong_release_destroys_resource_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let block = ControlBlock::allocate(Box::new(Counted(Arc::clone(&drops))));
        // SAFETY: block is live while we hold references below.
        unsafe { block.as_ref() }.increment_strong();

        // SAFETY: each call gives up one of the two strong references.
        unsafe { ControlBlock::release_strong(block) };
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        unsafe { ControlBlock::release_strong(block) };
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observer_keeps_block_after_resource_is_gone() {
        let drops = Arc::new(AtomicUsize::new(0));
        let block = ControlBlock::allocate(Box::new(Counted(Arc::clone(&drops))));
        // SAFETY: block is live; we add one weak reference.
        unsafe { block.as_ref() }.increment_weak();

        // SAFETY: gives up the only strong reference; the weak one remains.
        unsafe { ControlBlock::release_strong(block) };
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        // SAFETY: the weak reference keeps the block allocated.
        let this = unsafe { block.as_ref() };
        assert!(this.is_destroyed());
        assert_eq!(this.strong_count(), 0);
        assert_eq!(this.weak_count(), 1);
        assert!(!this.try_increment_strong());

        // SAFETY: gives up the last weak reference.
        unsafe { ControlBlock::release_weak(block) };
    }

    #[test]
    fn try_increment_succeeds_while_alive() {
        let block = ControlBlock::allocate(Box::new(String::from("Fredzilla")));
        // SAFETY: one strong reference held.
        let this = unsafe { block.as_ref() };

        assert!(this.try_increment_strong());
        assert_eq!(this.strong_count(), 2);

        // SAFETY: gives up both strong references.
        unsafe {
            ControlBlock::release_strong(block);
            ControlBlock::release_strong(block);
        }
    }

    #[test]
    fn try_allocate_wraps_resource() {
        let block = ControlBlock::try_allocate(Box::new(vec![1, 2, 3])).unwrap();
        // SAFETY: one strong reference held for the borrow.
        assert_eq!(unsafe { block.as_ref().resource() }, &vec![1, 2, 3]);
        // SAFETY: gives up the only strong reference.
        unsafe { ControlBlock::release_strong(block) };
    }
}
