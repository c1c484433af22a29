//! Configuration validation
//!
//! Runs once, before any task computes a pattern or opens a target. The
//! execution engine trusts the values it is handed, so every rejection has to
//! happen here. In particular a transfer size that does not evenly divide the
//! block size is refused outright: silently truncating or padding the final
//! partial transfer would corrupt both the tiling invariant and the
//! measurement.

use super::RunConfig;
use thiserror::Error;

/// Configuration rejection reasons
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("block size must be greater than 0")]
    BlockSizeZero,

    #[error("transfer size must be greater than 0")]
    TransferSizeZero,

    #[error("segment count must be greater than 0")]
    SegmentCountZero,

    #[error("transfer size {transfer} exceeds block size {block}")]
    TransferExceedsBlock { transfer: u64, block: u64 },

    #[error("transfer size {transfer} does not evenly divide block size {block}")]
    TransferDoesNotDivideBlock { transfer: u64, block: u64 },

    #[error("at least one of the write and read phases must be enabled")]
    NoPhases,

    #[error("task count must be at least 1")]
    NoTasks,
}

/// Validate a finalized configuration for a given task count
pub fn validate(config: &RunConfig, task_count: usize) -> Result<(), ConfigError> {
    if config.block_size == 0 {
        return Err(ConfigError::BlockSizeZero);
    }
    if config.transfer_size == 0 {
        return Err(ConfigError::TransferSizeZero);
    }
    if config.segment_count == 0 {
        return Err(ConfigError::SegmentCountZero);
    }
    if config.transfer_size > config.block_size {
        return Err(ConfigError::TransferExceedsBlock {
            transfer: config.transfer_size,
            block: config.block_size,
        });
    }
    if config.block_size % config.transfer_size != 0 {
        return Err(ConfigError::TransferDoesNotDivideBlock {
            transfer: config.transfer_size,
            block: config.block_size,
        });
    }
    if !config.write_phase && !config.read_phase {
        return Err(ConfigError::NoPhases);
    }
    if task_count == 0 {
        return Err(ConfigError::NoTasks);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate(&RunConfig::default(), 1), Ok(()));
        assert_eq!(validate(&RunConfig::default(), 64), Ok(()));
    }

    #[test]
    fn test_scenario_b_indivisible_transfer_rejected() {
        let cfg = RunConfig {
            block_size: 1_048_576,
            transfer_size: 300_000,
            ..RunConfig::default()
        };
        assert_eq!(
            validate(&cfg, 4),
            Err(ConfigError::TransferDoesNotDivideBlock {
                transfer: 300_000,
                block: 1_048_576,
            })
        );
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let cfg = RunConfig {
            block_size: 0,
            ..RunConfig::default()
        };
        assert_eq!(validate(&cfg, 1), Err(ConfigError::BlockSizeZero));

        let cfg = RunConfig {
            transfer_size: 0,
            ..RunConfig::default()
        };
        assert_eq!(validate(&cfg, 1), Err(ConfigError::TransferSizeZero));

        let cfg = RunConfig {
            segment_count: 0,
            ..RunConfig::default()
        };
        assert_eq!(validate(&cfg, 1), Err(ConfigError::SegmentCountZero));
    }

    #[test]
    fn test_transfer_larger_than_block_rejected() {
        let cfg = RunConfig {
            block_size: 4096,
            transfer_size: 8192,
            ..RunConfig::default()
        };
        assert!(matches!(
            validate(&cfg, 1),
            Err(ConfigError::TransferExceedsBlock { .. })
        ));
    }

    #[test]
    fn test_no_phases_rejected() {
        let cfg = RunConfig {
            write_phase: false,
            read_phase: false,
            ..RunConfig::default()
        };
        assert_eq!(validate(&cfg, 1), Err(ConfigError::NoPhases));
    }

    #[test]
    fn test_zero_tasks_rejected() {
        assert_eq!(validate(&RunConfig::default(), 0), Err(ConfigError::NoTasks));
    }
}
