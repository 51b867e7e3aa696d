//! Lifecycle monitoring of owned resources
//!
//! This module provides an opt-in registry of live resources. Owners report
//! every resource they start and stop owning while the monitor is enabled,
//! which gives per-type live counts for debugging and lets
//! `ExclusiveOwner::from_raw` reject addresses that are already owned.
//!
//! The monitor only counts. It never inspects ownership graphs, so a
//! strong-reference cycle shows up as resources that stay live, nothing more.

use std::collections::HashMap;
use std::mem::size_of;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::config::MonitorConfig;
use crate::errors::{PointerError, PointerResult};

/// Which kind of owner holds a registered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnershipKind {
    /// Held by an `ExclusiveOwner`
    Exclusive,
    /// Held by the control block behind one or more `SharedOwner`s
    Shared,
}

#[derive(Debug, Clone)]
struct LiveResource {
    type_name: &'static str,
    kind: OwnershipKind,
    registered_at: Instant,
}

/// Registry of live resources
#[derive(Debug)]
pub struct LifecycleMonitor {
    enabled: AtomicBool,
    config: RwLock<MonitorConfig>,
    live: Mutex<HashMap<usize, LiveResource>>,
    acquisitions: AtomicU64,
    releases: AtomicU64,
}

impl LifecycleMonitor {
    /// Create a disabled monitor with the given configuration
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            config: RwLock::new(config),
            live: Mutex::new(HashMap::new()),
            acquisitions: AtomicU64::new(0),
            releases: AtomicU64::new(0),
        }
    }

    /// Start recording acquisitions and releases
    pub fn enable(&self, config: MonitorConfig) {
        info!(
            detect_double_ownership = config.detect_double_ownership,
            long_lived_threshold_ms = u64::from(config.long_lived_threshold),
            "Lifecycle monitor enabled"
        );
        *self.config.write() = config;
        self.enabled.store(true, Ordering::Release);
    }

    /// Stop recording and forget every registered resource
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
        let forgotten = {
            let mut live = self.live.lock();
            let count = live.len();
            live.clear();
            count
        };
        info!(forgotten, "Lifecycle monitor disabled");
    }

    /// Whether the monitor is currently recording
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Snapshot of the active configuration
    pub fn config(&self) -> MonitorConfig {
        self.config.read().clone()
    }

    /// Register a resource that an owner has started holding
    pub fn register_acquisition(
        &self,
        address: usize,
        type_name: &'static str,
        kind: OwnershipKind,
    ) {
        if !self.is_enabled() {
            return;
        }

        self.live.lock().insert(
            address,
            LiveResource {
                type_name,
                kind,
                registered_at: Instant::now(),
            },
        );
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        debug!(address, type_name, ?kind, "Resource acquired");
    }

    /// Register a resource that is no longer held by any owner
    pub fn register_release(&self, address: usize) {
        if !self.is_enabled() {
            return;
        }

        let removed = self.live.lock().remove(&address);
        if let Some(resource) = removed {
            self.releases.fetch_add(1, Ordering::Relaxed);
            debug!(address, type_name = resource.type_name, "Resource released");
        }
    }

    /// Whether an owner currently holds the resource at `address`
    pub fn is_owned(&self, address: usize) -> bool {
        self.live.lock().contains_key(&address)
    }

    /// Fail if double ownership detection is on and `address` is already owned
    pub fn check_unowned(&self, address: usize, type_name: &'static str) -> PointerResult<()> {
        if !self.is_enabled() || !self.config.read().detect_double_ownership {
            return Ok(());
        }

        if self.is_owned(address) {
            error!(address, type_name, "Resource is already owned");
            return Err(PointerError::DoubleOwnership { address, type_name });
        }
        Ok(())
    }

    /// Get statistics about live resources
    pub fn stats(&self) -> LifecycleStats {
        let live = self.live.lock();
        let mut by_type = HashMap::new();
        let mut by_kind = HashMap::new();
        let mut oldest_age = Duration::ZERO;

        for resource in live.values() {
            *by_type.entry(resource.type_name).or_insert(0) += 1;
            *by_kind.entry(resource.kind).or_insert(0) += 1;
            oldest_age = oldest_age.max(resource.registered_at.elapsed());
        }

        LifecycleStats {
            total_live: live.len(),
            by_type,
            by_kind,
            oldest_age,
            total_acquired: self.acquisitions.load(Ordering::Relaxed),
            total_released: self.releases.load(Ordering::Relaxed),
        }
    }

    /// Resources registered for longer than the configured threshold
    pub fn long_lived(&self) -> Vec<LiveResourceReport> {
        let threshold = self.config.read().long_lived_threshold.as_duration();
        let mut reports: Vec<_> = self
            .live
            .lock()
            .iter()
            .filter_map(|(&address, resource)| {
                let age = resource.registered_at.elapsed();
                (age > threshold).then_some(LiveResourceReport {
                    address,
                    type_name: resource.type_name,
                    kind: resource.kind,
                    age,
                })
            })
            .collect();
        reports.sort_by(|a, b| b.age.cmp(&a.age));
        reports
    }
}

impl Default for LifecycleMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

/// Statistics about live resources
#[derive(Debug, Default)]
pub struct LifecycleStats {
    /// Total number of live resources
    pub total_live: usize,
    /// Count of live resources by type name
    pub by_type: HashMap<&'static str, usize>,
    /// Count of live resources by owner kind
    pub by_kind: HashMap<OwnershipKind, usize>,
    /// Age of the oldest live resource
    pub oldest_age: Duration,
    /// Acquisitions recorded since the monitor was created
    pub total_acquired: u64,
    /// Releases recorded since the monitor was created
    pub total_released: u64,
}

impl LifecycleStats {
    /// Live resources of the given type
    pub fn live_of(&self, type_name: &str) -> usize {
        self.by_type.get(type_name).copied().unwrap_or(0)
    }
}

/// A live resource older than the long-lived threshold
#[derive(Debug, Clone)]
pub struct LiveResourceReport {
    /// Address of the resource
    pub address: usize,
    /// Type name of the resource
    pub type_name: &'static str,
    /// Kind of owner holding it
    pub kind: OwnershipKind,
    /// Time since registration
    pub age: Duration,
}

static GLOBAL_MONITOR: OnceLock<LifecycleMonitor> = OnceLock::new();

/// Get the process-wide lifecycle monitor
///
/// Owners report to this instance. It starts disabled.
pub fn global_monitor() -> &'static LifecycleMonitor {
    GLOBAL_MONITOR.get_or_init(LifecycleMonitor::default)
}

// Zero-sized resources share one dangling address and are never registered.
fn tracked_address<T>(resource: *const T) -> Option<usize> {
    (size_of::<T>() != 0).then_some(resource as usize)
}

pub(crate) fn note_acquired<T>(resource: *const T, kind: OwnershipKind) {
    if let (Some(monitor), Some(address)) = (GLOBAL_MONITOR.get(), tracked_address(resource)) {
        monitor.register_acquisition(address, std::any::type_name::<T>(), kind);
    }
}

pub(crate) fn note_released<T>(resource: *const T) {
    if let (Some(monitor), Some(address)) = (GLOBAL_MONITOR.get(), tracked_address(resource)) {
        monitor.register_release(address);
    }
}

pub(crate) fn check_unowned<T>(resource: *const T) -> PointerResult<()> {
    match (GLOBAL_MONITOR.get(), tracked_address(resource)) {
        (Some(monitor), Some(address)) => {
            monitor.check_unowned(address, std::any::type_name::<T>())
        }
        _ => Ok(()),
    }
}
