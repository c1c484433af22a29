//! Deterministic per-task access patterns
//!
//! This module computes the ordered sequence of file regions each task drives
//! during a run. The target address space is tiled segment by segment: within
//! one segment every task owns exactly one contiguous block of `block_size`
//! bytes, subdivided into transfer-sized regions issued in ascending offset
//! order. Regions owned by different tasks never overlap, which is what makes
//! concurrent shared-file access safe without any locking.
//!
//! All functions here are pure: identical inputs always produce identical
//! output, independent of call order or concurrent calls from other tasks.

use crate::config::RunConfig;

/// Rank shift applied when task reordering is enabled
///
/// Any fixed non-zero shift gives a cyclic permutation with no fixed point for
/// task counts above one, which is all the reordering needs: each task does
/// the same volume of IO, just at another rank's home block, so rank-correlated
/// placement bugs stop hiding behind rank-aligned access.
pub const REORDER_CONSTANT: usize = 1;

/// One region of the target assigned to a single task
///
/// Regions assigned to one task within a segment are contiguous and ascending;
/// regions assigned to different tasks within a segment never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRegion {
    /// Absolute byte offset within the target
    pub offset: u64,
    /// Region length in bytes (always one transfer)
    pub length: usize,
}

impl AccessRegion {
    /// Exclusive end offset of the region
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }
}

/// Full precomputed plan for one task: every segment's regions plus totals
#[derive(Debug, Clone)]
pub struct TaskPlan {
    /// Identifier of the shared target all regions refer to
    pub target: String,
    /// Regions per segment, in issue order
    pub segments: Vec<Vec<AccessRegion>>,
}

impl TaskPlan {
    /// Total bytes this task moves in one full pass over the plan
    pub fn bytes_per_pass(&self) -> u64 {
        self.segments
            .iter()
            .map(|regs| regs.iter().map(|r| r.length as u64).sum::<u64>())
            .sum()
    }
}

/// Map a task ordinal to the logical owner of the block it drives
///
/// With reordering disabled each task drives its own rank-aligned block. With
/// reordering enabled the ownership is shifted by [`REORDER_CONSTANT`] so the
/// task ordinal and the data region it touches are decoupled.
pub fn logical_owner(ordinal: usize, task_count: usize, reorder: bool) -> usize {
    debug_assert!(ordinal < task_count);
    if reorder {
        (ordinal + REORDER_CONSTANT) % task_count
    } else {
        ordinal
    }
}

/// Compute the ordered regions one task drives within one segment
///
/// Segment `s`'s block for logical owner `k` starts at
/// `s * task_count * block_size + k * block_size` and is subdivided into
/// `block_size / transfer_size` transfer-sized regions in ascending order.
/// The caller must have validated the configuration: `transfer_size` evenly
/// divides `block_size` (see [`crate::config::validator`]).
pub fn regions_for_segment(
    ordinal: usize,
    task_count: usize,
    config: &RunConfig,
    segment_index: u64,
) -> Vec<AccessRegion> {
    let owner = logical_owner(ordinal, task_count, config.reorder_tasks);
    let block_start = segment_index * task_count as u64 * config.block_size
        + owner as u64 * config.block_size;

    let transfers = (config.block_size / config.transfer_size) as usize;
    let mut regions = Vec::with_capacity(transfers);
    for t in 0..transfers {
        regions.push(AccessRegion {
            offset: block_start + t as u64 * config.transfer_size,
            length: config.transfer_size as usize,
        });
    }
    regions
}

/// Precompute the full plan for one task across all segments
pub fn plan_for_task(ordinal: usize, task_count: usize, config: &RunConfig) -> TaskPlan {
    let segments = (0..config.segment_count)
        .map(|s| regions_for_segment(ordinal, task_count, config, s))
        .collect();
    TaskPlan {
        target: config.target.clone(),
        segments,
    }
}
