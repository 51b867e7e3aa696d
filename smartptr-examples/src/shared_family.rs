//! Shared ownership example
//!
//! Three sisters share one parent. The parent outlives everyone who lets go
//! of it and is destroyed together with the last sister.

use anyhow::Result;
use smartptr::SharedOwner;
use smartptr_examples::{init_tracing, people::Relative};
use tracing::info;

fn main() -> Result<()> {
    init_tracing()?;

    let professor = SharedOwner::new(Relative::new("Professor"));
    let blossom = SharedOwner::new(Relative::new("Blossom"));
    let bubbles = SharedOwner::new(Relative::new("Bubbles"));
    let buttercup = SharedOwner::new(Relative::new("Buttercup"));

    for child in [&blossom, &bubbles, &buttercup] {
        *child.parent.borrow_mut() = professor.clone();
    }
    info!(
        parent = %buttercup.parent.borrow().name,
        use_count = professor.use_count(),
        "Family assembled"
    );

    drop(professor);
    drop(blossom);
    drop(bubbles);
    info!(
        use_count = buttercup.parent.borrow().use_count(),
        "Only Buttercup still holds the Professor"
    );

    let mut cousin = SharedOwner::new(Relative::new("Cousin"));
    let mut copy = buttercup.clone();
    copy.swap(&mut cousin);
    info!(copy = %copy.name, cousin = %cousin.name, "Swapped shared owners");

    drop(cousin);
    drop(buttercup);
    info!("Everyone but the Cousin copy is gone");

    Ok(())
}
