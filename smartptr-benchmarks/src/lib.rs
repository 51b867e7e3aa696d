//! smartptr Benchmarks
//!
//! This crate contains performance benchmarks for the smartptr library:
//! construction, cloning, dropping and locking on one thread, and the same
//! hot paths under contention from several threads.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
