//! Per-task records and collective result aggregation
//!
//! Each task owns exactly one [`TaskRecord`] for the run's duration; nothing
//! else mutates it. Once the executor finishes, the record is handed by value
//! into [`aggregate`], which reduces every task's record into one run-level
//! [`RunResult`] using the group's collective reduce primitive. Aggregation
//! therefore inherits the collective-call contract: every task must call
//! [`aggregate`] exactly once per run.

use crate::group::{ReduceOp, TaskGroup};
use serde::{Deserialize, Serialize};

/// Per-task measurement record for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskRecord {
    /// Ordinal of the owning task
    pub ordinal: usize,
    /// Bytes successfully written during the write phase
    pub bytes_written: u64,
    /// Bytes successfully read during the read phase
    pub bytes_read: u64,
    /// Wall-clock seconds spent in the write phase (barrier-bounded)
    pub elapsed_write_seconds: f64,
    /// Wall-clock seconds spent in the read phase (barrier-bounded)
    pub elapsed_read_seconds: f64,
    /// Byte-level mismatches found while verifying read-back data
    pub verification_error_count: u64,
    /// Whether this task aborted before completing all phases
    pub aborted: bool,
    /// Description of the fatal error, when aborted locally
    pub failure: Option<String>,
}

impl TaskRecord {
    /// Create the record for one task at run start
    pub fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            ..Self::default()
        }
    }

    /// Total wall-clock seconds this task spent moving data
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_write_seconds + self.elapsed_read_seconds
    }
}

/// Run-level result, the collective reduction of every task's record
///
/// Exists only after the reduction completes and is immutable thereafter.
/// Throughput is derived on demand, never stored redundantly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Number of tasks that participated
    pub task_count: usize,
    /// Sum of bytes written across all tasks
    pub total_bytes_written: u64,
    /// Sum of bytes read across all tasks
    pub total_bytes_read: u64,
    /// Slowest task's write-phase time; defines write wall-clock duration
    pub max_elapsed_write_seconds: f64,
    /// Slowest task's read-phase time; defines read wall-clock duration
    pub max_elapsed_read_seconds: f64,
    /// Slowest task's combined time; defines run wall-clock duration
    pub max_elapsed_seconds: f64,
    /// Sum of verification mismatches across all tasks
    pub total_verification_errors: u64,
    /// True when any task aborted; the totals then cover a partial run
    pub incomplete: bool,
}

impl RunResult {
    /// Total bytes moved by the whole group
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes_written + self.total_bytes_read
    }

    /// Aggregate throughput in bytes per second over the whole run
    pub fn aggregate_throughput(&self) -> f64 {
        throughput(self.total_bytes(), self.max_elapsed_seconds)
    }

    /// Write-phase throughput in bytes per second
    pub fn write_throughput(&self) -> f64 {
        throughput(self.total_bytes_written, self.max_elapsed_write_seconds)
    }

    /// Read-phase throughput in bytes per second
    pub fn read_throughput(&self) -> f64 {
        throughput(self.total_bytes_read, self.max_elapsed_read_seconds)
    }
}

fn throughput(bytes: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        bytes as f64 / seconds
    } else {
        0.0
    }
}

/// Collectively reduce every task's record into the run-level result
///
/// Every task calls this with its own finalized record and receives the same
/// `RunResult`. Totals reduce by sum, durations by max (the slowest task
/// defines the run's wall-clock duration), and the abort flag by max so a
/// single task's failure marks the whole run incomplete.
pub fn aggregate(record: &TaskRecord, group: &dyn TaskGroup) -> RunResult {
    RunResult {
        task_count: group.size(),
        total_bytes_written: group.reduce_u64(record.bytes_written, ReduceOp::Sum),
        total_bytes_read: group.reduce_u64(record.bytes_read, ReduceOp::Sum),
        max_elapsed_write_seconds: group.reduce_f64(record.elapsed_write_seconds, ReduceOp::Max),
        max_elapsed_read_seconds: group.reduce_f64(record.elapsed_read_seconds, ReduceOp::Max),
        max_elapsed_seconds: group.reduce_f64(record.elapsed_seconds(), ReduceOp::Max),
        total_verification_errors: group.reduce_u64(record.verification_error_count, ReduceOp::Sum),
        incomplete: group.reduce_u64(record.aborted as u64, ReduceOp::Max) != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{SoloGroup, ThreadGroup};

    #[test]
    fn test_aggregate_solo() {
        let mut record = TaskRecord::new(0);
        record.bytes_written = 1 << 20;
        record.bytes_read = 1 << 20;
        record.elapsed_write_seconds = 2.0;
        record.elapsed_read_seconds = 1.0;

        let result = aggregate(&record, &SoloGroup);
        assert_eq!(result.task_count, 1);
        assert_eq!(result.total_bytes(), 2 << 20);
        assert_eq!(result.max_elapsed_seconds, 3.0);
        assert_eq!(result.total_verification_errors, 0);
        assert!(!result.incomplete);

        let expected = (2 << 20) as f64 / 3.0;
        assert!((result.aggregate_throughput() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_across_threads() {
        // Task k writes k+1 MiB in k+1 seconds; the slowest task defines the
        // run duration and every task must see identical totals.
        let members = ThreadGroup::members(4);
        std::thread::scope(|scope| {
            let handles: Vec<_> = members
                .into_iter()
                .map(|member| {
                    scope.spawn(move || {
                        let mut record = TaskRecord::new(member.ordinal());
                        let k = member.ordinal() as u64 + 1;
                        record.bytes_written = k << 20;
                        record.elapsed_write_seconds = k as f64;
                        aggregate(&record, &member)
                    })
                })
                .collect();

            let results: Vec<RunResult> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();
            for result in &results {
                assert_eq!(result, &results[0]);
            }
            assert_eq!(results[0].total_bytes_written, 10 << 20);
            assert_eq!(results[0].max_elapsed_write_seconds, 4.0);
            assert_eq!(results[0].max_elapsed_seconds, 4.0);
        });
    }

    #[test]
    fn test_one_abort_marks_run_incomplete() {
        let members = ThreadGroup::members(3);
        std::thread::scope(|scope| {
            let handles: Vec<_> = members
                .into_iter()
                .map(|member| {
                    scope.spawn(move || {
                        let mut record = TaskRecord::new(member.ordinal());
                        record.aborted = member.ordinal() == 1;
                        aggregate(&record, &member)
                    })
                })
                .collect();

            for handle in handles {
                assert!(handle.join().unwrap().incomplete);
            }
        });
    }

    #[test]
    fn test_verification_errors_sum() {
        let mut record = TaskRecord::new(0);
        record.verification_error_count = 7;
        let result = aggregate(&record, &SoloGroup);
        assert_eq!(result.total_verification_errors, 7);
        assert!(!result.incomplete);
    }

    #[test]
    fn test_zero_duration_throughput_is_zero() {
        let record = TaskRecord::new(0);
        let result = aggregate(&record, &SoloGroup);
        assert_eq!(result.aggregate_throughput(), 0.0);
        assert_eq!(result.write_throughput(), 0.0);
    }
}
