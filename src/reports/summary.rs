//! Report data computed from a recorder

use super::recorder::RunPhase;
use crate::parallel::job::Phase;
use crate::parallel::stats::RunTotals;
use serde::Serialize;
use uuid::Uuid;

/// Mean of `values`, `None` for an empty sequence
pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseMean {
    pub phase: Phase,
    pub label: String,
    pub mean_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunPhaseTiming {
    pub phase: RunPhase,
    pub label: String,
    pub millis: f64,
}

/// One row of the per-job table
#[derive(Debug, Clone, Serialize)]
pub struct EntryRow {
    /// Arrival rank at the Collector, from 1
    pub n: usize,
    /// Enumeration rank
    pub id: usize,
    pub file: String,
    pub latency_ms: Option<f64>,
    /// Aligned with [`PerformanceSummary::phase_means`]
    pub phases: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub processed: usize,
    /// Ts avg
    pub inter_arrival_ms: Option<f64>,
    /// L avg
    pub end_to_end_ms: Option<f64>,
    pub phase_means: Vec<PhaseMean>,
    pub run_phases: Vec<RunPhaseTiming>,
    pub entries: Vec<EntryRow>,
}

/// Everything a report generator renders
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Execution strategy name
    pub version: String,
    pub degree: usize,
    pub delay_ms: u64,
    pub cores: usize,
    pub totals: RunTotals,
    pub summary: PerformanceSummary,
}

impl RunReport {
    pub fn new(
        version: impl Into<String>,
        degree: usize,
        delay_ms: u64,
        totals: RunTotals,
        summary: PerformanceSummary,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            version: version.into(),
            degree,
            delay_ms,
            cores: num_cpus::get(),
            totals,
            summary,
        }
    }
}
