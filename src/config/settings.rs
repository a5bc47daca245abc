//! Command line values checked before a run starts

use crate::error::MarkError;
use crate::parallel::ExecutionStrategy;
use std::path::PathBuf;
use std::time::Duration;

/// Validated positional arguments of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub strategy: ExecutionStrategy,
    pub input_dir: PathBuf,
    pub mark_file: PathBuf,
    pub delay: Duration,
}

impl RunSettings {
    pub fn sequential(input_dir: PathBuf, mark_file: PathBuf) -> Result<Self, MarkError> {
        Self::validate(ExecutionStrategy::Sequential, input_dir, mark_file, 0)
    }

    pub fn farm(
        degree: i64,
        input_dir: PathBuf,
        mark_file: PathBuf,
        delay_ms: i64,
    ) -> Result<Self, MarkError> {
        let lanes = parse_degree(degree)?;
        Self::validate(ExecutionStrategy::Farm { lanes }, input_dir, mark_file, delay_ms)
    }

    pub fn pipeline(
        degree: i64,
        input_dir: PathBuf,
        mark_file: PathBuf,
        delay_ms: i64,
        preload: bool,
    ) -> Result<Self, MarkError> {
        let lanes = parse_degree(degree)?;
        Self::validate(
            ExecutionStrategy::Pipeline { lanes, preload },
            input_dir,
            mark_file,
            delay_ms,
        )
    }

    fn validate(
        strategy: ExecutionStrategy,
        input_dir: PathBuf,
        mark_file: PathBuf,
        delay_ms: i64,
    ) -> Result<Self, MarkError> {
        if !input_dir.is_dir() {
            return Err(MarkError::configuration(format!(
                "image directory not found: {}",
                input_dir.display()
            )));
        }
        if !mark_file.is_file() {
            return Err(MarkError::configuration(format!(
                "mark file not found: {}",
                mark_file.display()
            )));
        }

        Ok(Self {
            strategy,
            input_dir,
            mark_file,
            delay: clamp_delay(delay_ms),
        })
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay.as_millis() as u64
    }
}

/// Lane count from the command line; zero and negative values are rejected
pub fn parse_degree(degree: i64) -> Result<usize, MarkError> {
    match usize::try_from(degree) {
        Ok(lanes) if lanes >= 1 => Ok(lanes),
        _ => Err(MarkError::configuration(format!(
            "invalid parallelism degree: {degree}"
        ))),
    }
}

/// Negative delays mean no delay
pub fn clamp_delay(delay_ms: i64) -> Duration {
    Duration::from_millis(delay_ms.max(0) as u64)
}
