//! Subcommand implementations
//!
//! Every subcommand validates its positional arguments into
//! [`RunSettings`] and hands them to [`run_strategy`].

use super::Output;
use crate::codec::ImageCodec;
use crate::config::{MarkfarmConfig, RunSettings};
use crate::parallel::RunOptions;
use crate::reports::{PerformanceRecorder, RunPhase, RunReport};
use crate::shared::DirectoryInput;
use anyhow::{Context, Result};
use std::time::Instant;

pub mod farm;
pub mod pipeline;
pub mod sequential;

/// Load the mark, run the strategy, print the report on stdout
pub fn run_strategy(
    settings: RunSettings,
    config: &MarkfarmConfig,
    output: &Output,
) -> Result<()> {
    let strategy = settings.strategy;
    tracing::info!("degree: {}", strategy.lanes());
    tracing::info!("imgDir: {}", settings.input_dir.display());
    tracing::info!("mark: {}", settings.mark_file.display());
    tracing::info!("delay: {} ms", settings.delay_ms());

    output.step("Preparing mark image...");
    let mark_start = Instant::now();
    let codec = ImageCodec::load(&settings.mark_file, config.mark)
        .with_context(|| format!("Cannot load mark image {}", settings.mark_file.display()))?;
    let mark_end = Instant::now();

    let mut recorder = PerformanceRecorder::new(strategy.phases());
    recorder.record_phase(RunPhase::MarkLoading, mark_start, mark_end);

    let options = RunOptions {
        delay: settings.delay,
        prefix: config.output.prefix.clone(),
        progress: config.output.progress && !output.is_quiet(),
    };
    let source = DirectoryInput::new(&settings.input_dir);

    output.step(&format!("Running {} strategy...", strategy.name()));
    let totals = strategy
        .execute(&source, &codec, &mut recorder, &options)
        .with_context(|| format!("{} run failed", strategy.name()))?;

    let report = RunReport::new(
        strategy.name(),
        strategy.lanes(),
        settings.delay_ms(),
        totals,
        recorder.summary(),
    );
    let rendered = config
        .output
        .format
        .generator()
        .generate(&report)
        .context("Failed to render the report")?;
    print!("{rendered}");

    if !output.is_verbose() {
        return Ok(());
    }
    if report.totals.dropped > 0 {
        output.warning(&format!(
            "{} input(s) could not be processed; rerun with -vv for details",
            report.totals.dropped
        ));
    } else {
        output.success(&format!("Marked {} image(s)", report.summary.processed));
    }
    Ok(())
}
