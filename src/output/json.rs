//! JSON report output

use crate::config::RunConfig;
use crate::stats::RunResult;
use crate::Result;
use anyhow::Context;
use serde::Serialize;

/// Complete run report for machine consumption
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub tasks: usize,
    pub config: &'a RunConfig,
    pub result: &'a RunResult,
    /// Derived throughput figures, bytes per second
    pub throughput: Throughput,
}

#[derive(Debug, Serialize)]
pub struct Throughput {
    pub write_bytes_per_second: f64,
    pub read_bytes_per_second: f64,
    pub aggregate_bytes_per_second: f64,
}

/// Render a run as pretty-printed JSON
pub fn render(config: &RunConfig, tasks: usize, result: &RunResult) -> Result<String> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        tasks,
        config,
        result,
        throughput: Throughput {
            write_bytes_per_second: result.write_throughput(),
            read_bytes_per_second: result.read_throughput(),
            aggregate_bytes_per_second: result.aggregate_throughput(),
        },
    };
    serde_json::to_string_pretty(&report).context("failed to serialize run report")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_round_trips_through_serde() {
        let config = RunConfig::default();
        let result = RunResult {
            task_count: 2,
            total_bytes_written: 2_097_152,
            total_bytes_read: 2_097_152,
            max_elapsed_write_seconds: 1.0,
            max_elapsed_read_seconds: 0.5,
            max_elapsed_seconds: 1.5,
            total_verification_errors: 0,
            incomplete: false,
        };

        let rendered = render(&config, 2, &result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["tasks"], 2);
        assert_eq!(value["config"]["api"], "posix");
        assert_eq!(value["result"]["total_bytes_written"], 2_097_152);
        assert_eq!(value["result"]["incomplete"], false);
        let agg = value["throughput"]["aggregate_bytes_per_second"]
            .as_f64()
            .unwrap();
        assert!((agg - (4_194_304.0 / 1.5)).abs() < 1e-6);
    }

    #[test]
    fn test_incomplete_flag_serialized() {
        let config = RunConfig::default();
        let result = RunResult {
            task_count: 1,
            total_bytes_written: 0,
            total_bytes_read: 0,
            max_elapsed_write_seconds: 0.0,
            max_elapsed_read_seconds: 0.0,
            max_elapsed_seconds: 0.0,
            total_verification_errors: 0,
            incomplete: true,
        };
        let rendered = render(&config, 1, &result).unwrap();
        assert!(rendered.contains("\"incomplete\": true"));
    }
}
