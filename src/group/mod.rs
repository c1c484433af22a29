//! Task group coordination
//!
//! A task group wraps whatever process-group machinery bootstraps the run and
//! exposes exactly what the executor needs: the calling task's ordinal, the
//! group size, a barrier, and collective reductions. The group is injected
//! into the executor as a dependency, so unit tests substitute a trivial
//! size-1 group and multi-task tests use the shared-memory [`thread`] group.
//!
//! # Collective-call contract
//!
//! `barrier` and `reduce_*` are collective: every task in the group must call
//! them, in the same order and (for reductions) with the same operator at the
//! same logical point, or the group deadlocks. That contract is documented,
//! not detectable by the group itself.
//!
//! Fatal per-task errors are propagated group-wide by reducing an error flag
//! with [`ReduceOp::Max`] before any task exits, so a partial-group failure
//! never leaves the remaining tasks waiting on a barrier that cannot be
//! reached.

pub mod thread;

pub use thread::ThreadGroup;

/// Reduction operator for collective reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Sum,
    Min,
    Max,
}

/// Barrier and reduction primitives shared by all tasks in a run
pub trait TaskGroup {
    /// This task's ordinal in `[0, size())`, stable for the run's lifetime
    fn ordinal(&self) -> usize;

    /// Number of tasks in the group, identical for every member
    fn size(&self) -> usize;

    /// Block until every task in the group has reached this point
    fn barrier(&self);

    /// Collective integer reduction; every task receives the reduced value
    fn reduce_u64(&self, value: u64, op: ReduceOp) -> u64;

    /// Collective floating-point reduction; every task receives the reduced value
    fn reduce_f64(&self, value: f64, op: ReduceOp) -> f64;
}

/// Trivial group of size 1
///
/// Barriers and reductions degenerate to no-ops and identity, which is what
/// single-process unit tests want.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoloGroup;

impl TaskGroup for SoloGroup {
    fn ordinal(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) {}

    fn reduce_u64(&self, value: u64, _op: ReduceOp) -> u64 {
        value
    }

    fn reduce_f64(&self, value: f64, _op: ReduceOp) -> f64 {
        value
    }
}

pub(crate) fn fold_u64(values: &[u64], op: ReduceOp) -> u64 {
    match op {
        ReduceOp::Sum => values.iter().sum(),
        ReduceOp::Min => values.iter().copied().min().unwrap_or(0),
        ReduceOp::Max => values.iter().copied().max().unwrap_or(0),
    }
}

pub(crate) fn fold_f64(values: &[f64], op: ReduceOp) -> f64 {
    match op {
        ReduceOp::Sum => values.iter().sum(),
        ReduceOp::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        ReduceOp::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
