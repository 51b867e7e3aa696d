//! Reference-counted shared ownership.
//!
//! Every [`SharedOwner`] that refers to the same resource shares one
//! [`ControlBlock`]. Cloning an owner adds a strong reference; dropping or
//! resetting it removes one. The resource is destroyed with the last strong
//! reference, while the block itself lives on until the last
//! [`WeakObserver`] is gone too.
//!
//! # Cycles
//!
//! Strong-reference cycles are not detected or broken. A resource that
//! (directly or through others) holds a `SharedOwner` to itself keeps its
//! strong count above zero forever and leaks, unless the caller breaks the
//! cycle with an explicit [`reset`](SharedOwner::reset). Use a
//! [`WeakObserver`] for back references.
//!
//! # Example
//! ```rust
//! use smartptr::SharedOwner;
//!
//! let professor = SharedOwner::new(String::from("Professor"));
//! let bubbles_parent = professor.clone();
//! let buttercup_parent = bubbles_parent.clone();
//! assert_eq!(professor.use_count(), 3);
//!
//! drop(professor);
//! drop(bubbles_parent);
//! assert_eq!(buttercup_parent.use_count(), 1);
//! assert_eq!(*buttercup_parent, "Professor");
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::Deref;
use std::ptr::NonNull;

use crate::control::ControlBlock;
use crate::errors::{PointerError, PointerResult};
use crate::exclusive::ExclusiveOwner;
use crate::storage;
use crate::weak::WeakObserver;

const POINTER: &str = "SharedOwner";

/// One of possibly many owners of a reference-counted resource.
pub struct SharedOwner<T> {
    block: Option<NonNull<ControlBlock<T>>>,
    _owns: PhantomData<ControlBlock<T>>,
}

// SAFETY: the counts are atomic; sending or sharing an owner hands out `&T`
// on other threads and may drop `T` there, hence both bounds.
unsafe impl<T: Send + Sync> Send for SharedOwner<T> {}
// SAFETY: as above.
unsafe impl<T: Send + Sync> Sync for SharedOwner<T> {}

impl<T> SharedOwner<T> {
    /// Allocate `value` and a new control block with a strong count of 1.
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Like [`new`](Self::new), reporting allocation failure.
    pub fn try_new(value: T) -> PointerResult<Self> {
        let block = ControlBlock::try_allocate(storage::try_box(value)?)?;
        Ok(Self::from_block(block))
    }

    /// Wrap an already allocated resource in a new control block.
    pub fn from_box(resource: Box<T>) -> Self {
        Self::from_block(ControlBlock::allocate(resource))
    }

    /// Turn an exclusive owner into a shared one. Empty stays empty.
    pub fn from_exclusive(mut owner: ExclusiveOwner<T>) -> Self {
        owner.release().map_or_else(Self::empty, Self::from_box)
    }

    /// An owner that holds nothing.
    pub const fn empty() -> Self {
        Self {
            block: None,
            _owns: PhantomData,
        }
    }

    /// Adopt one strong reference the caller already counted.
    pub(crate) const fn from_block(block: NonNull<ControlBlock<T>>) -> Self {
        Self {
            block: Some(block),
            _owns: PhantomData,
        }
    }

    /// Number of strong owners of the resource, 0 when empty.
    ///
    /// Diagnostic only: other threads may change it right after it is read.
    pub fn use_count(&self) -> usize {
        self.control_block().map_or(0, ControlBlock::strong_count)
    }

    /// Number of weak observers of the resource, 0 when empty.
    pub fn weak_count(&self) -> usize {
        self.control_block().map_or(0, ControlBlock::weak_count)
    }

    /// The shared control block, if any.
    pub fn control_block(&self) -> Option<&ControlBlock<T>> {
        // SAFETY: our strong reference keeps the block allocated.
        self.block.map(|block| unsafe { &*block.as_ptr() })
    }

    /// Give up this owner's strong reference and become empty.
    ///
    /// Destroys the resource if this was the last strong reference. Calling
    /// it on an empty owner does nothing.
    pub fn reset(&mut self) {
        if let Some(block) = self.block.take() {
            // SAFETY: we owned one strong reference and no longer keep `block`.
            unsafe { ControlBlock::release_strong(block) };
        }
    }

    /// Exchange resources with `other`. Counts are unchanged.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.block, &mut other.block);
    }

    /// Create a weak observer of this resource.
    pub fn downgrade(&self) -> WeakObserver<T> {
        WeakObserver::new(self)
    }

    /// Borrow the resource.
    pub fn get(&self) -> PointerResult<&T> {
        self.control_block()
            // SAFETY: our strong reference keeps the resource alive.
            .map(|block| unsafe { block.resource() })
            .ok_or(PointerError::NullDereference { pointer: POINTER })
    }

    /// Whether the owner holds nothing.
    pub const fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// Address of the resource, or null when empty.
    pub fn as_ptr(&self) -> *const T {
        self.control_block()
            .map_or(std::ptr::null(), ControlBlock::resource_ptr)
    }

    /// Whether both owners share the same control block (or are both empty).
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.block == other.block
    }
}

impl<T> Clone for SharedOwner<T> {
    fn clone(&self) -> Self {
        if let Some(block) = self.control_block() {
            block.increment_strong();
        }
        Self {
            block: self.block,
            _owns: PhantomData,
        }
    }
}

impl<T> Drop for SharedOwner<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Default for SharedOwner<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Box<T>> for SharedOwner<T> {
    fn from(resource: Box<T>) -> Self {
        Self::from_box(resource)
    }
}

impl<T> From<ExclusiveOwner<T>> for SharedOwner<T> {
    fn from(owner: ExclusiveOwner<T>) -> Self {
        Self::from_exclusive(owner)
    }
}

/// # Panics
///
/// Panics with [`PointerError::NullDereference`] when the owner is empty.
impl<T> Deref for SharedOwner<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get().unwrap_or_else(|err| panic!("{err}"))
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedOwner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Ok(resource) => f
                .debug_struct("SharedOwner")
                .field("resource", resource)
                .field("use_count", &self.use_count())
                .finish(),
            Err(_) => f.write_str("SharedOwner(<empty>)"),
        }
    }
}
