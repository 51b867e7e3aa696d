//! Example programs for the `smartptr` ownership pointers
//!
//! The [`people`] module holds the small family types the examples pass
//! around. Each one announces its own destruction, so running an example
//! shows exactly when every resource goes away.

#![warn(missing_docs)]
// These are examples, so we don't need to be as pedantic
#![allow(clippy::missing_const_for_fn)]

/// People who own, share or observe their relatives
pub mod people;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber for an example.
///
/// `RUST_LOG` overrides the default of `info` for the example and `debug`
/// for the library, e.g. `RUST_LOG=smartptr=trace`.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,smartptr=debug"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
