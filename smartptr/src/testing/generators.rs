//! Property test generators for ownership operations.
//!
//! Scripts of [`OwnershipOp`]s drive an [`OwnershipHarness`](super::harness::OwnershipHarness)
//! through random interleavings of copies, drops, resets, downgrades and locks.

use proptest::prelude::*;

/// One step applied to a population of shared owners and weak observers.
///
/// Selectors pick an existing owner or observer modulo the population size;
/// a step that finds its population empty does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipOp {
    /// Copy an owner
    CloneOwner(usize),
    /// Drop an owner
    DropOwner(usize),
    /// Reset an owner twice, then drop the empty shell
    ResetOwner(usize),
    /// Create an observer from an owner
    Downgrade(usize),
    /// Lock an observer, keeping the result if it is non-empty
    Lock(usize),
    /// Drop an observer
    DropObserver(usize),
}

/// Generates a single ownership operation.
pub fn arb_ownership_op() -> impl Strategy<Value = OwnershipOp> {
    prop_oneof![
        3 => any::<usize>().prop_map(OwnershipOp::CloneOwner),
        3 => any::<usize>().prop_map(OwnershipOp::DropOwner),
        1 => any::<usize>().prop_map(OwnershipOp::ResetOwner),
        2 => any::<usize>().prop_map(OwnershipOp::Downgrade),
        2 => any::<usize>().prop_map(OwnershipOp::Lock),
        2 => any::<usize>().prop_map(OwnershipOp::DropObserver),
    ]
}

/// Generates scripts of up to `max_len` operations.
///
/// # Example
/// ```rust,ignore
/// use proptest::prelude::*;
/// use smartptr::testing::prelude::*;
///
/// proptest! {
///     #[test]
///     fn counts_follow_model(script in arb_ownership_script(64)) {
///         let mut harness = OwnershipHarness::new();
///         for op in script {
///             harness.apply(op);
///             harness.check().map_err(TestCaseError::fail)?;
///         }
///     }
/// }
/// ```
pub fn arb_ownership_script(max_len: usize) -> impl Strategy<Value = Vec<OwnershipOp>> {
    prop::collection::vec(arb_ownership_op(), 0..=max_len)
}
