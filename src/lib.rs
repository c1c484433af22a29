//! iorbench - Distributed IO benchmarking harness
//!
//! iorbench exercises a shared or parallel filesystem with a deterministic,
//! collision-free access pattern spread across a fixed set of cooperating
//! tasks, then collectively measures throughput and data correctness.
//!
//! # Architecture
//!
//! - **Access patterns**: pure per-task (file, offset, length) region plans
//! - **Pluggable backends**: POSIX pread/pwrite, in-memory (for dry runs and tests)
//! - **Task groups**: barrier and reduce primitives injected into the executor
//! - **Executor**: barrier-delimited write/sync/read/verify state machine
//! - **Aggregation**: collective reduction of per-task records into one result

pub mod backend;
pub mod config;
pub mod executor;
pub mod group;
pub mod output;
pub mod pattern;
pub mod runner;
pub mod stats;
pub mod util;

// Re-export commonly used types
pub use backend::StorageBackend;
pub use config::RunConfig;
pub use executor::TestExecutor;
pub use group::TaskGroup;
pub use stats::{RunResult, TaskRecord};

/// Result type used throughout iorbench
pub type Result<T> = anyhow::Result<T>;
