use crate::cli::Output;
use crate::config::{MarkfarmConfig, RunSettings};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FarmArgs {
    /// Number of lanes (at least 1)
    #[arg(allow_negative_numbers = true)]
    pub degree: i64,

    /// Directory holding the images to mark
    pub input_dir: PathBuf,

    /// Mark image; its pure black pixels gray out the input
    pub mark_file: PathBuf,

    /// Milliseconds between two dispatches (negative means none)
    #[arg(allow_negative_numbers = true)]
    pub delay_ms: i64,
}

pub fn execute(args: FarmArgs, config: &MarkfarmConfig, output: &Output) -> Result<()> {
    let settings = RunSettings::farm(args.degree, args.input_dir, args.mark_file, args.delay_ms)?;
    super::run_strategy(settings, config, output)
}
