//! Run configuration
//!
//! Handles CLI argument parsing and validation. The execution engine itself
//! receives a finalized [`RunConfig`] and trusts it: validation happens here,
//! before any task starts computing patterns or opening targets.

pub mod cli;
pub mod validator;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage API driven by the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Api {
    /// POSIX pread/pwrite against a shared file
    Posix,
    /// In-memory backend (dry runs, tests; no filesystem involved)
    Memory,
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Api::Posix => write!(f, "POSIX"),
            Api::Memory => write!(f, "MEMORY"),
        }
    }
}

/// Finalized benchmark configuration
///
/// Immutable once validated. The sizing fields tile the target exactly:
/// total target size = `segment_count * task_count * block_size`, with each
/// block subdivided into `block_size / transfer_size` transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Storage API selector
    pub api: Api,
    /// Bytes per block (one task's contiguous region within a segment)
    pub block_size: u64,
    /// Bytes per IO operation; must evenly divide `block_size`
    pub transfer_size: u64,
    /// Number of repetitions of the per-task block layout across the target
    pub segment_count: u64,
    /// Decouple task ordinal from the data region it drives
    pub reorder_tasks: bool,
    /// Force a durability sync after the write phase
    pub fsync: bool,
    /// Compare read-back data against the written pattern
    pub verify: bool,
    /// Perform the write phase
    pub write_phase: bool,
    /// Perform the read phase
    pub read_phase: bool,
    /// Identifier of the shared target (path for file-backed APIs)
    pub target: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            api: Api::Posix,
            block_size: 1_048_576,  // 1 MiB
            transfer_size: 262_144, // 256 KiB
            segment_count: 1,
            reorder_tasks: false,
            fsync: false,
            verify: true,
            write_phase: true,
            read_phase: true,
            target: "testFile".to_string(),
        }
    }
}

impl RunConfig {
    /// Number of transfers in one block
    pub fn transfers_per_block(&self) -> u64 {
        self.block_size / self.transfer_size
    }

    /// Total target size for a given task count
    pub fn target_size(&self, task_count: usize) -> u64 {
        self.segment_count * task_count as u64 * self.block_size
    }
}
