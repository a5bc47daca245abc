use crate::cli::Output;
use crate::config::{MarkfarmConfig, RunSettings};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SequentialArgs {
    /// Directory holding the images to mark
    pub input_dir: PathBuf,

    /// Mark image; its pure black pixels gray out the input
    pub mark_file: PathBuf,
}

pub fn execute(args: SequentialArgs, config: &MarkfarmConfig, output: &Output) -> Result<()> {
    let settings = RunSettings::sequential(args.input_dir, args.mark_file)?;
    super::run_strategy(settings, config, output)
}
