//! Combine command: merge per-month observation files.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use mef_io::{CombineConfig, combine_monthly};

use crate::cli::CombineArgs;

/// Merge the input files and write the combined series.
pub fn run(args: CombineArgs) -> Result<()> {
    let _cmd = info_span!("combine").entered();
    let mut config = CombineConfig::default();
    if let Some(v) = &args.variable {
        config = config.with_variable(v);
    }
    if let Some(v) = &args.percent_variable {
        config = config.with_percent_variable(v);
    }
    if let Some(d) = args.divisor {
        config = config.with_divisor(d);
    }

    info!(n_files = args.inputs.len(), "combining observation files");
    let combined = combine_monthly(&args.inputs, &config).context("failed to combine files")?;
    combined
        .write(&args.output, &config)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(path = %args.output.display(), nt = combined.raw().len(), "combined file written");
    Ok(())
}
