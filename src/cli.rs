use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Model Efficiency Factor scoring of sea-ice concentration.
#[derive(Parser)]
#[command(
    name = "mef",
    version,
    about = "Score CMIP sea-ice concentration against observations with the Model Efficiency Factor"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Score every configured model and write the compiled dataset.
    Run(RunArgs),
    /// Prepare the observation baseline and report its summary.
    Baseline(BaselineArgs),
    /// Merge per-month observation files into one monthly series.
    Combine(CombineArgs),
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "mef.toml")]
    pub config: PathBuf,

    /// Override output NetCDF path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the JSON summary path from config.
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Override the observation range filter from config.
    #[arg(long = "range-filter")]
    pub range_filter: Option<String>,
}

/// Arguments for the `baseline` subcommand.
#[derive(clap::Args)]
pub struct BaselineArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "mef.toml")]
    pub config: PathBuf,

    /// Override the observation range filter from config.
    #[arg(long = "range-filter")]
    pub range_filter: Option<String>,

    /// Write the prepared observation series to this NetCDF file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `combine` subcommand.
#[derive(clap::Args)]
pub struct CombineArgs {
    /// Monthly observation files, in any order.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Path for the combined NetCDF file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Variable read from every input file.
    #[arg(long)]
    pub variable: Option<String>,

    /// Name of the derived percent variable.
    #[arg(long = "percent-variable")]
    pub percent_variable: Option<String>,

    /// Divisor applied before scaling to percent.
    #[arg(long)]
    pub divisor: Option<f64>,
}
