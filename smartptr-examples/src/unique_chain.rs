//! Exclusive ownership example
//!
//! This example demonstrates:
//! - A chain of people who each own their parent exclusively
//! - Destroying the youngest taking the whole chain with it
//! - Swapping, resetting and releasing exclusive owners

use anyhow::Result;
use smartptr::ExclusiveOwner;
use smartptr_examples::{init_tracing, people::Heir};
use tracing::info;

fn main() -> Result<()> {
    init_tracing()?;

    info!("Building the chain of Joes");
    let first = ExclusiveOwner::new(Heir::new("Joe the first", ExclusiveOwner::empty()));
    let second = ExclusiveOwner::new(Heir::new("Joe the second", first));
    let mut third = ExclusiveOwner::new(Heir::new("Joe the third", second));
    info!(
        youngest = %third.name,
        grandparent = %third.parent.parent.name,
        "Chain complete"
    );

    info!("Resetting the youngest destroys every ancestor");
    third.reset(None);
    info!(empty = third.is_empty(), "Chain gone");

    let mut who = ExclusiveOwner::new(String::from("who"));
    let mut what = ExclusiveOwner::new(String::from("what"));
    who.swap(&mut what);
    info!(who = %who.as_str(), what = %what.as_str(), "Swapped");

    let released = what.release();
    info!(
        released = ?released.as_deref(),
        empty = what.is_empty(),
        "Released without destroying"
    );
    let readopted = released.map_or_else(ExclusiveOwner::empty, ExclusiveOwner::from_box);
    info!(readopted = ?readopted, "Owned again");

    if let Err(err) = what.get() {
        info!(%err, "Empty owner refuses to dereference");
    }

    Ok(())
}
