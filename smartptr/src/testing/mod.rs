//! Testing utilities for the smartptr library.
//!
//! Enabled with the `testing` feature.
//!
//! - [`probes`]: values that report their own destruction
//! - [`generators`]: `proptest` strategies for ownership operation scripts
//! - [`harness`]: a model checker driving shared owners and observers
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use smartptr::testing::prelude::*;
//! use smartptr::SharedOwner;
//!
//! let log = DropLog::new();
//! let professor = SharedOwner::new(log.named("Professor"));
//! let copy = professor.clone();
//!
//! drop(professor);
//! assert!(!log.contains("Professor"));
//! drop(copy);
//! assert_eq!(log.entries(), vec!["Professor"]);
//! ```

pub mod generators;
pub mod harness;
pub mod probes;

/// Convenient re-exports for tests.
pub mod prelude {
    pub use super::generators::{arb_ownership_op, arb_ownership_script, OwnershipOp};
    pub use super::harness::OwnershipHarness;
    pub use super::probes::{DropCounter, DropLog, Named, Tracked};
}
