//! Model-checking harness for shared ownership.
//!
//! The harness holds a population of [`SharedOwner`]s and [`WeakObserver`]s
//! of one resource and checks the library's counts against the obvious
//! model: the strong count is the number of owners, the weak count is the
//! number of observers, and the resource is destroyed exactly once, exactly
//! when the last owner is gone.

use crate::shared::SharedOwner;
use crate::testing::generators::OwnershipOp;
use crate::testing::probes::{DropCounter, Tracked};
use crate::weak::WeakObserver;

type Resource = Tracked<&'static str>;

/// Owners and observers of one tracked resource.
#[derive(Debug)]
pub struct OwnershipHarness {
    owners: Vec<SharedOwner<Resource>>,
    observers: Vec<WeakObserver<Resource>>,
    drops: DropCounter,
}

impl OwnershipHarness {
    /// Start with a single owner and no observers.
    pub fn new() -> Self {
        let drops = DropCounter::new();
        let owner = SharedOwner::new(drops.track("resource"));
        Self {
            owners: vec![owner],
            observers: Vec::new(),
            drops,
        }
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: OwnershipOp) {
        match op {
            OwnershipOp::CloneOwner(index) => {
                if let Some(owner) = pick(&self.owners, index) {
                    let copy = owner.clone();
                    self.owners.push(copy);
                }
            }
            OwnershipOp::DropOwner(index) => {
                if !self.owners.is_empty() {
                    drop(self.owners.swap_remove(index % self.owners.len()));
                }
            }
            OwnershipOp::ResetOwner(index) => {
                if !self.owners.is_empty() {
                    let mut owner = self.owners.swap_remove(index % self.owners.len());
                    owner.reset();
                    owner.reset();
                }
            }
            OwnershipOp::Downgrade(index) => {
                if let Some(owner) = pick(&self.owners, index) {
                    let observer = owner.downgrade();
                    self.observers.push(observer);
                }
            }
            OwnershipOp::Lock(index) => {
                if let Some(observer) = pick(&self.observers, index) {
                    let locked = observer.lock();
                    if !locked.is_empty() {
                        self.owners.push(locked);
                    }
                }
            }
            OwnershipOp::DropObserver(index) => {
                if !self.observers.is_empty() {
                    drop(self.observers.swap_remove(index % self.observers.len()));
                }
            }
        }
    }

    /// Compare every count against the model.
    pub fn check(&self) -> Result<(), String> {
        let strong = self.owners.len();
        let weak = self.observers.len();
        let expected_drops = usize::from(strong == 0);

        if self.drops.count() != expected_drops {
            return Err(format!(
                "resource destroyed {} times with {strong} owners left",
                self.drops.count()
            ));
        }

        for owner in &self.owners {
            if owner.use_count() != strong {
                return Err(format!(
                    "owner reports use_count {} but {strong} owners exist",
                    owner.use_count()
                ));
            }
            if owner.weak_count() != weak {
                return Err(format!(
                    "owner reports weak_count {} but {weak} observers exist",
                    owner.weak_count()
                ));
            }
        }

        for observer in &self.observers {
            if observer.use_count() != strong {
                return Err(format!(
                    "observer reports use_count {} but {strong} owners exist",
                    observer.use_count()
                ));
            }
            if observer.lock().is_empty() != (strong == 0) {
                return Err(format!("lock disagrees with {strong} live owners"));
            }
        }

        Ok(())
    }

    /// Number of live owners.
    pub fn owners(&self) -> usize {
        self.owners.len()
    }

    /// Number of live observers.
    pub fn observers(&self) -> usize {
        self.observers.len()
    }

    /// How many times the resource has been destroyed.
    pub fn destroyed(&self) -> usize {
        self.drops.count()
    }
}

impl Default for OwnershipHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn pick<P>(population: &[P], selector: usize) -> Option<&P> {
    (!population.is_empty()).then(|| &population[selector % population.len()])
}
