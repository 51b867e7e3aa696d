//! `smartptr` - exclusive, shared and weak ownership of heap resources
//!
//! Three pointer types wrap a heap-allocated resource:
//!
//! - [`ExclusiveOwner`]: the only owner; destroys the resource when it lets go
//! - [`SharedOwner`]: one of many owners counted in a [`ControlBlock`]; the
//!   resource is destroyed with the last one
//! - [`WeakObserver`]: watches a shared resource without keeping it alive and
//!   can [`lock`](WeakObserver::lock) it into a temporary owner
//!
//! Counts are atomic and `lock` is a single compare-and-swap, so shared
//! owners and observers may cross threads when the resource allows it.
//! Strong-reference cycles are not collected; break them with `reset()` or
//! use an observer for the back edge.
//!
//! An opt-in [`monitor`] keeps a registry of live resources for diagnostics.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
#[allow(unsafe_code)]
pub mod control;
pub mod errors;
#[allow(unsafe_code)]
pub mod exclusive;
pub mod monitor;
#[allow(unsafe_code)]
pub mod shared;
#[allow(unsafe_code)]
mod storage;
#[allow(unsafe_code)]
pub mod weak;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{LongLivedThresholdMs, MonitorConfig};
pub use control::ControlBlock;
pub use errors::{PointerError, PointerResult};
pub use exclusive::ExclusiveOwner;
pub use monitor::{global_monitor, LifecycleMonitor, LifecycleStats, OwnershipKind};
pub use shared::SharedOwner;
pub use weak::WeakObserver;

/// Convenient re-exports for library users.
pub mod prelude {
    pub use crate::errors::{PointerError, PointerResult};
    pub use crate::exclusive::ExclusiveOwner;
    pub use crate::shared::SharedOwner;
    pub use crate::weak::WeakObserver;
}
