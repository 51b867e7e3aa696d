//! The process-wide lifecycle monitor observing real owners.
//!
//! Every test enables the global monitor with the same configuration and
//! only inspects counts for a resource type it owns, so the tests can run
//! in parallel without seeing each other's resources.

use std::any::type_name;
use std::cell::RefCell;

use smartptr::{
    global_monitor, ExclusiveOwner, MonitorConfig, OwnershipKind, PointerError, SharedOwner,
    WeakObserver,
};

const CONFIG: &str = r#"{"long_lived_threshold":60000,"detect_double_ownership":true}"#;

fn enable_monitor() {
    let config: MonitorConfig = serde_json::from_str(CONFIG).unwrap();
    global_monitor().enable(config);
}

fn live<T>() -> usize {
    global_monitor().stats().live_of(type_name::<T>())
}

#[derive(Debug)]
struct Ledger(u32);

#[derive(Debug)]
struct Gadget(u32);

#[derive(Debug)]
struct Sprocket(u32);

#[derive(Debug)]
struct Widget(u32);

struct Node {
    next: RefCell<SharedOwner<Node>>,
}

#[test]
fn configuration_loads_from_json() {
    let config: MonitorConfig = serde_json::from_str(CONFIG).unwrap();

    assert_eq!(config, MonitorConfig::default());
    assert!(serde_json::from_str::<MonitorConfig>(
        r#"{"long_lived_threshold":0,"detect_double_ownership":true}"#
    )
    .is_err());
}

#[test]
fn wrapping_an_owned_address_is_rejected() {
    enable_monitor();
    let owner = ExclusiveOwner::new(Widget(1));
    let raw = owner.as_ptr().cast_mut();

    // SAFETY: the monitor rejects the address before any owner is created.
    #[allow(unsafe_code)]
    let result = unsafe { ExclusiveOwner::from_raw(raw) };

    let err = result.unwrap_err();
    assert!(err.is_double_ownership());
    assert!(matches!(
        err,
        PointerError::DoubleOwnership { address, type_name: name }
            if address == raw as usize && name == type_name::<Widget>()
    ));
    assert_eq!(owner.0, 1);
}

#[test]
fn shared_resources_are_guarded_too() {
    enable_monitor();
    let owner = SharedOwner::new(Sprocket(2));
    let raw = owner.as_ptr().cast_mut();

    // SAFETY: the monitor rejects the address before any owner is created.
    #[allow(unsafe_code)]
    let result = unsafe { ExclusiveOwner::from_raw(raw) };

    assert!(result.unwrap_err().is_double_ownership());
    assert_eq!(live::<Sprocket>(), 1);
    drop(owner);
    assert_eq!(live::<Sprocket>(), 0);
}

#[test]
fn released_resources_can_be_owned_again() {
    enable_monitor();
    let mut owner = ExclusiveOwner::new(Gadget(3));
    assert_eq!(live::<Gadget>(), 1);

    let raw = owner.release().map(Box::into_raw).unwrap();
    assert_eq!(live::<Gadget>(), 0);
    assert!(!global_monitor().is_owned(raw as usize));

    // SAFETY: `raw` came from `Box::into_raw` and nobody owns it.
    #[allow(unsafe_code)]
    let readopted = unsafe { ExclusiveOwner::from_raw(raw) }.unwrap();

    assert_eq!(readopted.0, 3);
    assert_eq!(live::<Gadget>(), 1);
    drop(readopted);
    assert_eq!(live::<Gadget>(), 0);
}

#[test]
fn stats_count_live_resources_by_type_and_kind() {
    enable_monitor();
    let ledgers: Vec<_> = (0..3).map(|n| ExclusiveOwner::new(Ledger(n))).collect();
    let shared = SharedOwner::new(Ledger(99));
    let copies: Vec<_> = (0..4).map(|_| shared.clone()).collect();

    let stats = global_monitor().stats();
    assert_eq!(stats.live_of(type_name::<Ledger>()), 4);
    assert!(stats.by_kind[&OwnershipKind::Exclusive] >= 3);
    assert!(stats.by_kind[&OwnershipKind::Shared] >= 1);

    drop(copies);
    assert_eq!(live::<Ledger>(), 4);
    drop(shared);
    drop(ledgers);
    assert_eq!(live::<Ledger>(), 0);
}

#[test]
fn cycle_leak_shows_up_as_a_live_resource() {
    enable_monitor();
    let node = SharedOwner::new(Node {
        next: RefCell::new(SharedOwner::empty()),
    });
    *node.next.borrow_mut() = node.clone();
    let observer: WeakObserver<Node> = node.downgrade();

    drop(node);
    assert_eq!(live::<Node>(), 1);

    let stranded = observer.lock();
    stranded.next.borrow_mut().reset();
    drop(stranded);

    assert_eq!(live::<Node>(), 0);
    assert!(observer.expired());
}

#[test]
fn zero_sized_resources_are_not_registered() {
    #[derive(Debug)]
    struct Marker;

    enable_monitor();
    let exclusive = ExclusiveOwner::new(Marker);
    let shared = SharedOwner::new(Marker);

    assert_eq!(live::<Marker>(), 0);
    drop((exclusive, shared));
}
