//! Performance recording and reporting
//!
//! The Collector feeds a [`PerformanceRecorder`]; once the run joined, the
//! recorder's [`PerformanceSummary`] is wrapped in a [`RunReport`] and
//! rendered by a pluggable [`ReportGenerator`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Renders a finished run
pub trait ReportGenerator {
    fn generate(&self, report: &RunReport) -> Result<String>;
}

/// Output format of the run report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn generator(&self) -> Box<dyn ReportGenerator> {
        match self {
            ReportFormat::Text => Box::new(TextReportGenerator),
            ReportFormat::Json => Box::new(JsonReportGenerator),
        }
    }
}

pub use json::JsonReportGenerator;
pub use recorder::{JobEntry, PerformanceRecorder, RunPhase};
pub use summary::{PerformanceSummary, RunReport};
pub use text::TextReportGenerator;

mod json;
mod recorder;
mod summary;
mod text;
pub mod utils;
