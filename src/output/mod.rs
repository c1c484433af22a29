//! Report rendering
//!
//! Consumes the run-level [`crate::stats::RunResult`] and turns it into
//! human-readable text or JSON. The execution engine itself never prints;
//! everything user-facing funnels through here.

pub mod json;
pub mod text;

/// Format a byte count with a binary-unit suffix
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Format a throughput in MiB/s
pub fn format_throughput(bytes_per_second: f64) -> String {
    format!("{:.2} MiB/s", bytes_per_second / (1024.0 * 1024.0))
}
