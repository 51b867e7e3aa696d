//! Fallible heap storage for resources and control blocks.

use std::alloc::{alloc, Layout};
use std::ptr::NonNull;

use crate::errors::{PointerError, PointerResult};

/// Move `value` into a fresh heap allocation, reporting allocator failure
/// instead of aborting.
///
/// On failure `value` is dropped before the error is returned.
pub(crate) fn try_box<T>(value: T) -> PointerResult<Box<T>> {
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        return Ok(Box::new(value));
    }

    // SAFETY: `layout` has a non-zero size.
    let raw = unsafe { alloc(layout) }.cast::<T>();
    let Some(slot) = NonNull::new(raw) else {
        return Err(PointerError::AllocationFailed {
            size: layout.size(),
            align: layout.align(),
        });
    };

    // SAFETY: `slot` was allocated by the global allocator with the layout of
    // `T`, which is exactly the memory `Box<T>` expects to own. It is
    // initialised before the box is created.
    unsafe {
        slot.as_ptr().write(value);
        Ok(Box::from_raw(slot.as_ptr()))
    }
}
