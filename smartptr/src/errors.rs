//! Error types for smartptr.
//!
//! Every error is returned to the immediate caller and nothing is retried
//! internally.
//!
//! # Error Categories
//!
//! - **NullDereference**: an empty owner was dereferenced
//! - **DoubleOwnership**: a resource that is already owned was wrapped again
//! - **AllocationFailed**: the global allocator could not provide storage
//!
//! Strong-reference cycles are not an error. They leak until the caller
//! breaks them with an explicit `reset()`.
//!
//! # Example Usage
//!
//! ```rust
//! use smartptr::errors::PointerError;
//! use smartptr::ExclusiveOwner;
//!
//! let owner: ExclusiveOwner<String> = ExclusiveOwner::empty();
//! match owner.get() {
//!     Err(PointerError::NullDereference { pointer }) => {
//!         assert_eq!(pointer, "ExclusiveOwner");
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Errors reported by the ownership pointers.
///
/// # Error Handling Strategy
///
/// - **NullDereference**: check `is_empty()` first, or handle the error
/// - **DoubleOwnership**: a caller bug; the second owner was never created
/// - **AllocationFailed**: propagate; the library does not recover
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    /// An empty owner was dereferenced.
    #[error("Null dereference: {pointer} does not own a resource")]
    NullDereference {
        /// Name of the pointer type that was dereferenced
        pointer: &'static str,
    },

    /// A resource was wrapped while another owner already held it.
    ///
    /// Only detectable while the lifecycle monitor runs with double
    /// ownership detection enabled.
    #[error("Double ownership: {type_name} at {address:#x} is already owned")]
    DoubleOwnership {
        /// Address of the resource
        address: usize,
        /// Type name of the resource
        type_name: &'static str,
    },

    /// The allocator could not provide storage for a resource or control block.
    #[error("Allocation of {size} bytes (align {align}) failed")]
    AllocationFailed {
        /// Requested size in bytes
        size: usize,
        /// Requested alignment in bytes
        align: usize,
    },
}

impl PointerError {
    /// Returns true if this is a null dereference.
    pub const fn is_null_dereference(&self) -> bool {
        matches!(self, Self::NullDereference { .. })
    }

    /// Returns true if this is a detected double ownership.
    pub const fn is_double_ownership(&self) -> bool {
        matches!(self, Self::DoubleOwnership { .. })
    }

    /// Returns true if this is an allocation failure.
    pub const fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}

/// Type alias for pointer operation results
pub type PointerResult<T> = Result<T, PointerError>;
