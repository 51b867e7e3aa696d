//! Non-owning observation of a shared resource.
//!
//! A [`WeakObserver`] keeps the control block alive but not the resource.
//! To look at the resource it must be [`lock`](WeakObserver::lock)ed into a
//! temporary [`SharedOwner`], which fails once the last strong owner is gone.
//!
//! # Example
//! ```rust
//! use smartptr::{SharedOwner, WeakObserver};
//!
//! let mut observer = WeakObserver::empty();
//! {
//!     let fredzilla = SharedOwner::new(String::from("Fredzilla"));
//!     observer = fredzilla.downgrade();
//!     assert_eq!(observer.use_count(), 1);
//!
//!     let temp = observer.lock();
//!     assert_eq!(temp.get().map(String::as_str), Ok("Fredzilla"));
//! }
//!
//! assert_eq!(observer.use_count(), 0);
//! assert!(observer.lock().is_empty());
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::control::ControlBlock;
use crate::shared::SharedOwner;

/// Observer of a resource owned by [`SharedOwner`]s.
pub struct WeakObserver<T> {
    block: Option<NonNull<ControlBlock<T>>>,
    _observes: PhantomData<ControlBlock<T>>,
}

// SAFETY: `lock` can produce a `SharedOwner<T>` on any thread, so the same
// bounds apply.
unsafe impl<T: Send + Sync> Send for WeakObserver<T> {}
// SAFETY: as above.
unsafe impl<T: Send + Sync> Sync for WeakObserver<T> {}

impl<T> WeakObserver<T> {
    /// Observe the resource of `owner`. An empty owner gives an empty observer.
    pub fn new(owner: &SharedOwner<T>) -> Self {
        let block = owner.control_block().map(|block| {
            block.increment_weak();
            NonNull::from(block)
        });
        Self {
            block,
            _observes: PhantomData,
        }
    }

    /// An observer of nothing.
    pub const fn empty() -> Self {
        Self {
            block: None,
            _observes: PhantomData,
        }
    }

    /// A new strong owner if the resource is still alive, otherwise an empty one.
    ///
    /// The liveness check and the strong increment happen as one atomic step.
    pub fn lock(&self) -> SharedOwner<T> {
        match self.control_block() {
            Some(block) if block.try_increment_strong() => {
                SharedOwner::from_block(NonNull::from(block))
            }
            _ => SharedOwner::empty(),
        }
    }

    /// Strong count of the observed resource, 0 once it is destroyed.
    pub fn use_count(&self) -> usize {
        self.control_block().map_or(0, ControlBlock::strong_count)
    }

    /// Whether the observed resource is gone (or nothing is observed).
    pub fn expired(&self) -> bool {
        self.use_count() == 0
    }

    /// The observed control block, if any.
    pub fn control_block(&self) -> Option<&ControlBlock<T>> {
        // SAFETY: our weak reference keeps the block allocated.
        self.block.map(|block| unsafe { &*block.as_ptr() })
    }

    /// Stop observing and become empty.
    pub fn reset(&mut self) {
        if let Some(block) = self.block.take() {
            // SAFETY: we owned one weak reference and no longer keep `block`.
            unsafe { ControlBlock::release_weak(block) };
        }
    }

    /// Whether both observers share the same control block (or are both empty).
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.block == other.block
    }
}

impl<T> Clone for WeakObserver<T> {
    fn clone(&self) -> Self {
        if let Some(block) = self.control_block() {
            block.increment_weak();
        }
        Self {
            block: self.block,
            _observes: PhantomData,
        }
    }
}

impl<T> Drop for WeakObserver<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Default for WeakObserver<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<&SharedOwner<T>> for WeakObserver<T> {
    fn from(owner: &SharedOwner<T>) -> Self {
        Self::new(owner)
    }
}

impl<T> fmt::Debug for WeakObserver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObserver")
            .field("use_count", &self.use_count())
            .finish()
    }
}
