//! Unique ownership of a single heap resource.
//!
//! An [`ExclusiveOwner`] is the sole owner of its resource. It cannot be
//! copied; ownership moves out through [`release`](ExclusiveOwner::release),
//! [`take_from`](ExclusiveOwner::take_from) or a plain Rust move, and the
//! resource is destroyed as soon as the owner lets go of it without handing
//! it to anyone else.
//!
//! # Example
//! ```rust
//! use smartptr::ExclusiveOwner;
//!
//! let mut who = ExclusiveOwner::new(String::from("who"));
//! let mut what = ExclusiveOwner::new(String::from("what"));
//!
//! who.swap(&mut what);
//! assert_eq!(*who, "what");
//! assert_eq!(*what, "who");
//!
//! // Replacing the resource destroys the old one.
//! who.reset(Some(Box::new(String::from("who"))));
//! assert_eq!(*who, "who");
//!
//! // Releasing hands the resource back without destroying it.
//! let raw = what.release();
//! assert!(what.is_empty());
//! assert_eq!(raw.as_deref().map(String::as_str), Some("who"));
//! ```

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::errors::{PointerError, PointerResult};
use crate::monitor::{self, OwnershipKind};
use crate::storage;

const POINTER: &str = "ExclusiveOwner";

/// Sole owner of at most one heap resource.
pub struct ExclusiveOwner<T> {
    resource: Option<Box<T>>,
}

impl<T> ExclusiveOwner<T> {
    /// Allocate `value` on the heap and own it.
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Allocate `value` on the heap and own it, reporting allocation failure.
    pub fn try_new(value: T) -> PointerResult<Self> {
        Ok(Self::from_box(storage::try_box(value)?))
    }

    /// Take ownership of an already allocated resource.
    pub fn from_box(resource: Box<T>) -> Self {
        monitor::note_acquired(&*resource, OwnershipKind::Exclusive);
        Self {
            resource: Some(resource),
        }
    }

    /// Take ownership of a raw resource handle.
    ///
    /// A null pointer yields an empty owner. When the lifecycle monitor is
    /// enabled with double ownership detection, an address that another owner
    /// still holds is rejected and no owner is created.
    ///
    /// # Safety
    ///
    /// `resource` must be null or come from `Box::into_raw` (or
    /// [`release`](Self::release)) and must not be owned by anyone else.
    /// Outside the monitor this is not checked.
    pub unsafe fn from_raw(resource: *mut T) -> PointerResult<Self> {
        if resource.is_null() {
            return Ok(Self::empty());
        }
        monitor::check_unowned(resource)?;
        // SAFETY: upheld by the caller.
        Ok(Self::from_box(unsafe { Box::from_raw(resource) }))
    }

    /// An owner that holds nothing.
    pub const fn empty() -> Self {
        Self { resource: None }
    }

    /// Give up ownership without destroying the resource.
    ///
    /// The owner is left empty.
    pub fn release(&mut self) -> Option<Box<T>> {
        let resource = self.resource.take();
        if let Some(resource) = &resource {
            monitor::note_released(&**resource);
        }
        resource
    }

    /// Destroy the current resource, if any, and own `resource` instead.
    ///
    /// The previous resource is destroyed before this returns.
    pub fn reset(&mut self, resource: Option<Box<T>>) {
        if let Some(resource) = &resource {
            monitor::note_acquired(&**resource, OwnershipKind::Exclusive);
        }
        let previous = mem::replace(&mut self.resource, resource);
        destroy(previous);
    }

    /// Exchange resources with `other`. Nothing is created or destroyed.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.resource, &mut other.resource);
    }

    /// Move-assign from `source`.
    ///
    /// Destroys the resource currently owned, takes `source`'s resource and
    /// leaves `source` empty.
    pub fn take_from(&mut self, source: &mut Self) {
        let incoming = source.resource.take();
        let previous = mem::replace(&mut self.resource, incoming);
        destroy(previous);
    }

    /// Move the resource into a new owner, leaving this one empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            resource: self.resource.take(),
        }
    }

    /// Borrow the resource.
    pub fn get(&self) -> PointerResult<&T> {
        self.resource
            .as_deref()
            .ok_or(PointerError::NullDereference { pointer: POINTER })
    }

    /// Mutably borrow the resource.
    pub fn get_mut(&mut self) -> PointerResult<&mut T> {
        self.resource
            .as_deref_mut()
            .ok_or(PointerError::NullDereference { pointer: POINTER })
    }

    /// Whether the owner holds nothing.
    pub const fn is_empty(&self) -> bool {
        self.resource.is_none()
    }

    /// Address of the resource, or null when empty.
    pub fn as_ptr(&self) -> *const T {
        self.resource
            .as_deref()
            .map_or(std::ptr::null(), |resource| resource as *const T)
    }
}

fn destroy<T>(resource: Option<Box<T>>) {
    if let Some(resource) = resource {
        monitor::note_released(&*resource);
        trace!(type_name = std::any::type_name::<T>(), "Resource destroyed");
        drop(resource);
    }
}

impl<T> Drop for ExclusiveOwner<T> {
    fn drop(&mut self) {
        destroy(self.resource.take());
    }
}

impl<T> Default for ExclusiveOwner<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Box<T>> for ExclusiveOwner<T> {
    fn from(resource: Box<T>) -> Self {
        Self::from_box(resource)
    }
}

/// # Panics
///
/// Panics with [`PointerError::NullDereference`] when the owner is empty.
impl<T> Deref for ExclusiveOwner<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get().unwrap_or_else(|err| panic!("{err}"))
    }
}

impl<T> DerefMut for ExclusiveOwner<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut().unwrap_or_else(|err| panic!("{err}"))
    }
}

impl<T: fmt::Debug> fmt::Debug for ExclusiveOwner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource.as_deref() {
            Some(resource) => f.debug_tuple("ExclusiveOwner").field(resource).finish(),
            None => f.write_str("ExclusiveOwner(<empty>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::probes::{DropCounter, DropLog, Named};

    struct Person {
        me: Named,
        parent: ExclusiveOwner<Person>,
    }

    impl Person {
        fn new(log: &DropLog, name: &str) -> Self {
            Self {
                me: log.named(name),
                parent: ExclusiveOwner::empty(),
            }
        }
    }

    #[test]
    fn release_returns_resource_without_destroying_it() {
        let drops = DropCounter::new();
        let resource = Box::new(drops.track(7));
        let address: *const _ = &*resource;

        let mut owner = ExclusiveOwner::from_box(resource);
        let released = owner.release().unwrap();

        assert!(owner.is_empty());
        assert_eq!(&*released as *const _, address);
        assert_eq!(drops.count(), 0);
        drop(owner);
        assert_eq!(drops.count(), 0);
        drop(released);
        assert_eq!(drops.count(), 1);
    }

    #[test]
    fn drop_destroys_resource_once() {
        let drops = DropCounter::new();
        drop(ExclusiveOwner::new(drops.track("tim")));
        assert_eq!(drops.count(), 1);
    }

    #[test]
    fn destroying_owner_destroys_whole_chain() {
        let log = DropLog::new();
        let mut joe = ExclusiveOwner::new(Person::new(&log, "Joe the third"));
        joe.parent = ExclusiveOwner::new(Person::new(&log, "Joe the second"));
        joe.parent.parent = ExclusiveOwner::new(Person::new(&log, "Joe the first"));
        assert_eq!(joe.parent.parent.me.name(), "Joe the first");

        drop(joe);

        assert_eq!(
            log.entries(),
            vec!["Joe the third", "Joe the second", "Joe the first"]
        );
    }

    #[test]
    fn reset_destroys_previous_and_owns_new() {
        let log = DropLog::new();
        let mut who = ExclusiveOwner::new(log.named("who"));

        who.reset(Some(Box::new(log.named("who again"))));
        assert_eq!(log.entries(), vec!["who"]);
        assert_eq!(who.name(), "who again");

        who.reset(None);
        assert!(who.is_empty());
        assert_eq!(log.entries(), vec!["who", "who again"]);
    }

    #[test]
    fn swap_twice_restores_original_state() {
        let drops = DropCounter::new();
        let mut a = ExclusiveOwner::new(drops.track(1));
        let mut b = ExclusiveOwner::new(drops.track(2));
        let (pa, pb) = (a.as_ptr(), b.as_ptr());

        a.swap(&mut b);
        assert_eq!((**a, **b), (2, 1));
        a.swap(&mut b);

        assert_eq!((a.as_ptr(), b.as_ptr()), (pa, pb));
        assert_eq!(drops.count(), 0);
    }

    #[test]
    fn swap_with_empty_moves_resource() {
        let mut full = ExclusiveOwner::new(5);
        let mut empty = ExclusiveOwner::empty();

        full.swap(&mut empty);

        assert!(full.is_empty());
        assert_eq!(*empty, 5);
    }

    #[test]
    fn take_from_destroys_previous_and_empties_source() {
        let log = DropLog::new();
        let mut target = ExclusiveOwner::new(log.named("old"));
        let mut source = ExclusiveOwner::new(log.named("new"));

        target.take_from(&mut source);

        assert_eq!(log.entries(), vec!["old"]);
        assert!(source.is_empty());
        assert_eq!(target.name(), "new");
    }

    #[test]
    fn take_moves_without_destroying() {
        let drops = DropCounter::new();
        let mut original = ExclusiveOwner::new(drops.track(()));
        let moved = original.take();

        assert!(original.is_empty());
        assert!(!moved.is_empty());
        assert_eq!(drops.count(), 0);
    }

    #[test]
    fn empty_owner_reports_null_dereference() {
        let mut owner: ExclusiveOwner<u8> = ExclusiveOwner::default();

        assert_eq!(
            owner.get(),
            Err(PointerError::NullDereference { pointer: "ExclusiveOwner" })
        );
        assert!(owner.get_mut().unwrap_err().is_null_dereference());
        assert!(owner.as_ptr().is_null());
    }

    #[test]
    #[should_panic(expected = "Null dereference: ExclusiveOwner does not own a resource")]
    fn deref_of_empty_owner_panics() {
        let owner: ExclusiveOwner<String> = ExclusiveOwner::empty();
        let _ = owner.len();
    }

    #[test]
    fn from_raw_round_trips_released_resource() {
        let mut owner = ExclusiveOwner::new(String::from("jimothy"));
        let raw = Box::into_raw(owner.release().unwrap());

        // SAFETY: `raw` came from `Box::into_raw` and nobody owns it.
        let owner = unsafe { ExclusiveOwner::from_raw(raw) }.unwrap();
        assert_eq!(*owner, "jimothy");

        // SAFETY: null is always accepted.
        let empty = unsafe { ExclusiveOwner::<String>::from_raw(std::ptr::null_mut()) }.unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn mutation_through_deref_mut() {
        let mut owner = ExclusiveOwner::new(vec![1, 2]);
        owner.push(3);
        *owner.get_mut().unwrap() = vec![9];
        assert_eq!(*owner, vec![9]);
    }

    #[test]
    fn try_new_owns_value() {
        let owner = ExclusiveOwner::try_new(String::from("Joe")).unwrap();
        assert_eq!(owner.get().map(String::as_str), Ok("Joe"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn destruction_is_traced() {
        drop(ExclusiveOwner::new(5_u16));
        assert!(logs_contain("Resource destroyed"));
        assert!(logs_contain("u16"));
    }

    #[test]
    fn debug_shows_resource_or_empty() {
        assert_eq!(format!("{:?}", ExclusiveOwner::new(3)), "ExclusiveOwner(3)");
        assert_eq!(
            format!("{:?}", ExclusiveOwner::<i32>::empty()),
            "ExclusiveOwner(<empty>)"
        );
    }
}
