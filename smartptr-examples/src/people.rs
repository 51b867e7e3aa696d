use std::cell::RefCell;

use smartptr::{ExclusiveOwner, SharedOwner, WeakObserver};
use tracing::info;

/// Someone who is the only owner of their parent
pub struct Heir {
    /// Display name
    pub name: String,
    /// The parent, owned by nobody else
    pub parent: ExclusiveOwner<Heir>,
}

impl Heir {
    /// A new heir with the given parent
    pub fn new(name: impl Into<String>, parent: ExclusiveOwner<Self>) -> Self {
        let name = name.into();
        info!(%name, "Created");
        Self { name, parent }
    }
}

impl Drop for Heir {
    fn drop(&mut self) {
        info!(name = %self.name, "Destroyed");
    }
}

/// Someone who shares their parent with their siblings
pub struct Relative {
    /// Display name
    pub name: String,
    /// The parent, assigned after construction
    pub parent: RefCell<SharedOwner<Relative>>,
}

impl Relative {
    /// A new relative with no parent yet
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        info!(%name, "Created");
        Self {
            name,
            parent: RefCell::new(SharedOwner::empty()),
        }
    }
}

impl Drop for Relative {
    fn drop(&mut self) {
        info!(name = %self.name, "Destroyed");
    }
}

/// Someone who holds a strong reference to themselves
pub struct Narcissus {
    /// Display name
    pub name: String,
    /// Usually an owner of this very value
    pub myself: RefCell<SharedOwner<Narcissus>>,
}

impl Narcissus {
    /// A new value that already owns itself
    pub fn new(name: impl Into<String>) -> SharedOwner<Self> {
        let name = name.into();
        info!(%name, "Created");
        let owner = SharedOwner::new(Self {
            name,
            myself: RefCell::new(SharedOwner::empty()),
        });
        *owner.myself.borrow_mut() = owner.clone();
        owner
    }
}

impl Drop for Narcissus {
    fn drop(&mut self) {
        info!(name = %self.name, "Destroyed");
    }
}

/// Someone who only observes themselves
pub struct Observer {
    /// Display name
    pub name: String,
    /// An observer of this very value
    pub myself: RefCell<WeakObserver<Observer>>,
}

impl Observer {
    /// A new value that watches itself without keeping itself alive
    pub fn new(name: impl Into<String>) -> SharedOwner<Self> {
        let name = name.into();
        info!(%name, "Created");
        let owner = SharedOwner::new(Self {
            name,
            myself: RefCell::new(WeakObserver::empty()),
        });
        *owner.myself.borrow_mut() = owner.downgrade();
        owner
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        info!(name = %self.name, "Destroyed");
    }
}
