//! iorbench CLI entry point

use anyhow::{bail, Context, Result};
use iorbench::config::{cli::Cli, validator, Api};
use iorbench::{backend, output, runner};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = cli.to_config();

    validator::validate(&config, cli.tasks).context("configuration validation failed")?;

    if !cli.json {
        println!("iorbench v{}", env!("CARGO_PKG_VERSION"));
        println!();
        print!("{}", output::text::render_header(&config, cli.tasks));
        println!();
    }

    let (result, records) =
        runner::run_local_group(&config, cli.tasks, |_| backend::create(config.api))?;

    if cli.json {
        println!("{}", output::json::render(&config, cli.tasks, &result)?);
    } else {
        print!("{}", output::text::render_result(&result, &records));
    }

    // The target only outlives the run when explicitly kept (or when it was
    // someone else's file to begin with, as in read-only mode).
    if config.api == Api::Posix && config.write_phase && !cli.keep_file {
        if let Err(e) = std::fs::remove_file(&config.target) {
            eprintln!("warning: failed to remove {}: {}", config.target, e);
        }
    }

    if result.incomplete {
        bail!("run aborted: one or more tasks failed");
    }
    if result.total_verification_errors > 0 {
        bail!(
            "verification failed: {} mismatched transfer(s)",
            result.total_verification_errors
        );
    }
    Ok(())
}
