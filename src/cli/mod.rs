//! Command-line interface for markfarm
//!
//! One subcommand per execution strategy. Positional arguments carry the run
//! parameters; `--config` and the environment only tune output.

use crate::config::MarkfarmConfig;
use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
mod output;

pub use output::Output;

/// Batch image marking with sequential, farm and pipeline execution
#[derive(Parser, Debug)]
#[command(name = "markfarm", author, version = crate::VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logging and status output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file (TOML or JSON)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mark every image on the calling thread
    Sequential(commands::sequential::SequentialArgs),
    /// Mark images on N lanes, each loading, marking and storing
    Farm(commands::farm::FarmArgs),
    /// Mark images on N lanes of chained stages
    Pipeline(commands::pipeline::PipelineArgs),
}

impl Cli {
    /// Parse `std::env::args`. On failure clap's message is printed and
    /// the process exit code is returned instead.
    pub fn parse_args() -> std::result::Result<Self, u8> {
        Self::try_parse().map_err(|err| {
            let _ = err.print();
            exit_code_for(err.kind())
        })
    }

    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        let config = MarkfarmConfig::load(self.config.as_deref())
            .context("Failed to load configuration")?;
        tracing::debug!("Configuration: {:?}", config);

        match self.command {
            Commands::Sequential(args) => commands::sequential::execute(args, &config, &output),
            Commands::Farm(args) => commands::farm::execute(args, &config, &output),
            Commands::Pipeline(args) => commands::pipeline::execute(args, &config, &output),
        }
    }
}

/// Help, version and usage printed for missing arguments are not failures
pub fn exit_code_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        | ErrorKind::MissingRequiredArgument
        | ErrorKind::MissingSubcommand => 0,
        _ => 1,
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
