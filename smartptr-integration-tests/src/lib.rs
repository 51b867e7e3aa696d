//! Integration tests for `smartptr`
//!
//! This crate contains tests that drive exclusive owners, shared owners and
//! weak observers together, across threads and with the lifecycle monitor
//! switched on.

// This is a test-only crate
#![cfg(test)]
