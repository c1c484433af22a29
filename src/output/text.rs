//! Text report output

use super::{format_bytes, format_throughput};
use crate::config::RunConfig;
use crate::stats::{RunResult, TaskRecord};

/// Render the configuration echo printed before a run starts
pub fn render_header(config: &RunConfig, tasks: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("api           : {}\n", config.api));
    out.push_str(&format!("target        : {}\n", config.target));
    out.push_str(&format!("tasks         : {}\n", tasks));
    out.push_str(&format!(
        "block size    : {}\n",
        format_bytes(config.block_size)
    ));
    out.push_str(&format!(
        "transfer size : {}\n",
        format_bytes(config.transfer_size)
    ));
    out.push_str(&format!("segments      : {}\n", config.segment_count));
    out.push_str(&format!(
        "total size    : {}\n",
        format_bytes(config.target_size(tasks))
    ));
    out.push_str(&format!("reorder tasks : {}\n", config.reorder_tasks));
    out.push_str(&format!("fsync         : {}\n", config.fsync));
    out.push_str(&format!("verify        : {}\n", config.verify));
    out
}

/// Render the run-level result as the final report
pub fn render_result(result: &RunResult, records: &[TaskRecord]) -> String {
    let mut out = String::new();

    if result.total_bytes_written > 0 {
        out.push_str(&format!(
            "write : {:>14}  {:>16}  {:.4}s\n",
            format_bytes(result.total_bytes_written),
            format_throughput(result.write_throughput()),
            result.max_elapsed_write_seconds,
        ));
    }
    if result.total_bytes_read > 0 {
        out.push_str(&format!(
            "read  : {:>14}  {:>16}  {:.4}s\n",
            format_bytes(result.total_bytes_read),
            format_throughput(result.read_throughput()),
            result.max_elapsed_read_seconds,
        ));
    }
    out.push_str(&format!(
        "total : {:>14}  {:>16}  {:.4}s\n",
        format_bytes(result.total_bytes()),
        format_throughput(result.aggregate_throughput()),
        result.max_elapsed_seconds,
    ));

    if result.total_verification_errors > 0 {
        out.push_str(&format!(
            "VERIFICATION FAILED: {} mismatched transfer(s)\n",
            result.total_verification_errors
        ));
    }
    if result.incomplete {
        out.push_str("RUN INCOMPLETE: one or more tasks aborted\n");
        for record in records.iter().filter(|r| r.failure.is_some()) {
            out.push_str(&format!(
                "  task {}: {}\n",
                record.ordinal,
                record.failure.as_deref().unwrap_or("unknown")
            ));
        }
    }
    out
}
