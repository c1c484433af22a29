//! Test executor
//!
//! One executor runs per task, all tasks in lockstep: the same state machine,
//! synchronized only at phase boundaries. Phase timing is barrier-bounded,
//! measured from just after the entry synchronization point to just before
//! the exit one, so the slowest task dominates the reported run duration by
//! design.
//!
//! # State machine
//!
//! `Configuring → Opening → Writing → SyncingWrite → Reading → Verifying →
//! Closing → Done`, with `Aborting → Closing → Done` reachable from every
//! non-terminal state on error. A fatal local error (open, write, read or
//! sync failure, short transfer) is propagated to the whole group through a
//! max-reduction on an error flag at the next synchronization point; every
//! peer then aborts too instead of waiting on a barrier that will never be
//! reached. Verification mismatches are different: they are counted and the
//! run continues, because destroying the timing measurement over a rare
//! corruption is worse than completing it.
//!
//! Closing always runs, even on the abort path.

use crate::backend::{BackendError, IoDirection, OpenMode, StorageBackend};
use crate::config::RunConfig;
use crate::group::{ReduceOp, TaskGroup};
use crate::pattern::{self, TaskPlan};
use crate::stats::TaskRecord;
use crate::util::fill;
use std::time::Instant;

/// Executor state, observable after `run` for inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Opening,
    Writing,
    SyncingWrite,
    Reading,
    Verifying,
    Closing,
    Aborting,
    Done,
}

/// Per-task benchmark executor
///
/// Owns its backend for the run's duration; the group primitives are injected
/// so tests can substitute a size-1 group or a shared-memory thread group.
pub struct TestExecutor<'a> {
    config: &'a RunConfig,
    group: &'a dyn TaskGroup,
    backend: Box<dyn StorageBackend>,
    phase: Phase,
}

impl<'a> TestExecutor<'a> {
    /// Create an executor for one task
    ///
    /// `config` must already be validated (see [`crate::config::validator`]);
    /// the executor trusts it.
    pub fn new(
        config: &'a RunConfig,
        group: &'a dyn TaskGroup,
        backend: Box<dyn StorageBackend>,
    ) -> Self {
        Self {
            config,
            group,
            backend,
            phase: Phase::Configuring,
        }
    }

    /// Current executor state
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Execute one full benchmark run for this task
    ///
    /// Always returns a record, even after an abort: partial results are
    /// reported and marked, never discarded. Collective calls are kept
    /// symmetric across all exit paths, so no task is ever left waiting.
    pub fn run(&mut self) -> TaskRecord {
        let ordinal = self.group.ordinal();
        let mut record = TaskRecord::new(ordinal);
        let mut buffer = vec![0u8; self.config.transfer_size as usize];

        // Configuring: the full pattern is precomputed before the ready
        // barrier so no task starts timed IO before the slowest is ready.
        self.phase = Phase::Configuring;
        let plan = pattern::plan_for_task(ordinal, self.group.size(), self.config);
        self.group.barrier();

        self.phase = Phase::Opening;
        let mode = if self.config.write_phase {
            OpenMode::Create
        } else {
            OpenMode::Read
        };
        let mut failure = self
            .backend
            .open_target(&plan.target, mode)
            .err()
            .map(|e| e.to_string());
        if self.propagate_fault(failure.is_some()) {
            return self.abort(record, failure);
        }

        if self.config.write_phase {
            self.phase = Phase::Writing;
            let start = Instant::now();
            let mut outcome = self.write_pass(&plan, &mut record, &mut buffer);
            if outcome.is_ok() && self.config.fsync {
                self.phase = Phase::SyncingWrite;
                outcome = self.backend.sync_target();
            }
            record.elapsed_write_seconds = start.elapsed().as_secs_f64();

            failure = outcome.err().map(|e| e.to_string());
            if self.propagate_fault(failure.is_some()) {
                return self.abort(record, failure);
            }
        }

        if self.config.read_phase {
            self.phase = Phase::Reading;
            let start = Instant::now();
            let outcome = self.read_pass(&plan, &mut record, &mut buffer);
            record.elapsed_read_seconds = start.elapsed().as_secs_f64();

            failure = outcome.err().map(|e| e.to_string());
            if self.propagate_fault(failure.is_some()) {
                return self.abort(record, failure);
            }
        }

        self.phase = Phase::Closing;
        if let Err(e) = self.backend.close_target() {
            record.aborted = true;
            record.failure = Some(e.to_string());
        }
        self.phase = Phase::Done;
        record
    }

    /// Reduce the local error flag group-wide; true when any task faulted
    ///
    /// Doubles as the phase-boundary synchronization point, which is exactly
    /// when peers are allowed to observe a remote failure.
    fn propagate_fault(&self, local_fault: bool) -> bool {
        self.group.reduce_u64(local_fault as u64, ReduceOp::Max) != 0
    }

    /// Abort path: record the failure, close the target, finish
    fn abort(&mut self, mut record: TaskRecord, failure: Option<String>) -> TaskRecord {
        self.phase = Phase::Aborting;
        record.aborted = true;
        record.failure = failure;

        self.phase = Phase::Closing;
        if let Err(e) = self.backend.close_target() {
            if record.failure.is_none() {
                record.failure = Some(e.to_string());
            }
        }
        self.phase = Phase::Done;
        record
    }

    fn write_pass(
        &mut self,
        plan: &TaskPlan,
        record: &mut TaskRecord,
        buffer: &mut [u8],
    ) -> Result<(), BackendError> {
        for regions in &plan.segments {
            for region in regions {
                let buf = &mut buffer[..region.length];
                fill::fill_transfer(buf, record.ordinal, region.offset);

                let written = self.backend.write_at(region.offset, buf)?;
                if written < region.length {
                    return Err(BackendError::ShortTransfer {
                        direction: IoDirection::Write,
                        offset: region.offset,
                        expected: region.length,
                        actual: written,
                    });
                }
                record.bytes_written += written as u64;
            }
        }
        Ok(())
    }

    fn read_pass(
        &mut self,
        plan: &TaskPlan,
        record: &mut TaskRecord,
        buffer: &mut [u8],
    ) -> Result<(), BackendError> {
        for regions in &plan.segments {
            for region in regions {
                let buf = &mut buffer[..region.length];

                let read = self.backend.read_at(region.offset, buf)?;
                if read < region.length {
                    return Err(BackendError::ShortTransfer {
                        direction: IoDirection::Read,
                        offset: region.offset,
                        expected: region.length,
                        actual: read,
                    });
                }
                record.bytes_read += read as u64;

                if self.config.verify {
                    self.phase = Phase::Verifying;
                    if fill::verify_transfer(buf, record.ordinal, region.offset).is_some() {
                        record.verification_error_count += 1;
                    }
                    self.phase = Phase::Reading;
                }
            }
        }
        Ok(())
    }
}
