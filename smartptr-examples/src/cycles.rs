//! Reference cycle example
//!
//! A value that owns itself is never destroyed on its own: nothing outside
//! holds it, yet its count never reaches zero. The leak ends only when the
//! self-link is reset by hand. A value that merely observes itself has no
//! such problem.

use anyhow::Result;
use smartptr::{global_monitor, MonitorConfig};
use smartptr_examples::{
    init_tracing,
    people::{Narcissus, Observer},
};
use tracing::{info, warn};

fn main() -> Result<()> {
    init_tracing()?;
    global_monitor().enable(MonitorConfig::default());

    let fred = Narcissus::new("Fred");
    let watcher = fred.downgrade();
    info!(use_count = fred.use_count(), "Fred owns himself");

    drop(fred);
    let live = global_monitor().stats().live_of(std::any::type_name::<Narcissus>());
    warn!(
        live,
        use_count = watcher.use_count(),
        "Last outside owner gone, Fred leaked"
    );

    let stranded = watcher.lock();
    stranded.myself.borrow_mut().reset();
    drop(stranded);
    info!(expired = watcher.expired(), "Self-link reset by hand");

    let fredzilla = Observer::new("Fredzilla");
    info!(
        use_count = fredzilla.use_count(),
        weak_count = fredzilla.weak_count(),
        "Fredzilla only observes herself"
    );
    drop(fredzilla);

    let stats = global_monitor().stats();
    info!(
        total_live = stats.total_live,
        acquired = stats.total_acquired,
        released = stats.total_released,
        "Nothing left behind"
    );

    Ok(())
}
