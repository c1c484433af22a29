//! CLI argument parsing using clap
//!
//! The option letters follow the original tool (`-a`, `-b`, `-C`, `-e`, `-s`,
//! `-t`); everything else is harness-side plumbing for running a local group
//! of tasks and controlling output.

use super::{Api, RunConfig};
use clap::Parser;

/// iorbench - distributed IO benchmarking harness
#[derive(Parser, Debug)]
#[command(name = "iorbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Storage API to drive
    #[arg(short = 'a', long, value_enum, default_value = "posix")]
    pub api: Api,

    /// Block size in bytes (one task's contiguous region per segment)
    #[arg(short = 'b', long, default_value = "1048576")]
    pub block_size: u64,

    /// Reorder task-to-block ownership by a constant shift
    #[arg(short = 'C', long)]
    pub reorder_tasks_constant: bool,

    /// fsync after the write phase
    #[arg(short = 'e', long)]
    pub fsync: bool,

    /// Number of segments (repetitions of the per-task block layout)
    #[arg(short = 's', long, default_value = "1")]
    pub segment_count: u64,

    /// Transfer size in bytes (one IO operation)
    #[arg(short = 't', long, default_value = "262144")]
    pub transfer_size: u64,

    /// Number of cooperating tasks to run locally
    #[arg(short = 'n', long, default_value = "1")]
    pub tasks: usize,

    /// Skip byte-for-byte verification during the read phase
    #[arg(long)]
    pub skip_verify: bool,

    /// Perform only the write phase
    #[arg(short = 'w', long, conflicts_with = "read_only")]
    pub write_only: bool,

    /// Perform only the read phase (target must already hold the pattern)
    #[arg(short = 'r', long)]
    pub read_only: bool,

    /// Emit the run result as JSON instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Keep the target file after the run instead of removing it
    #[arg(short = 'k', long)]
    pub keep_file: bool,

    /// Target path (shared file all tasks drive)
    #[arg(value_name = "PATH", default_value = "testFile")]
    pub target: String,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the finalized run configuration from the parsed arguments
    pub fn to_config(&self) -> RunConfig {
        RunConfig {
            api: self.api,
            block_size: self.block_size,
            transfer_size: self.transfer_size,
            segment_count: self.segment_count,
            reorder_tasks: self.reorder_tasks_constant,
            fsync: self.fsync,
            verify: !self.skip_verify,
            write_phase: !self.read_only,
            read_phase: !self.write_only,
            target: self.target.clone(),
        }
    }
}
