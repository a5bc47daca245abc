//! Timing collection for a single run

use super::summary::{EntryRow, PerformanceSummary, PhaseMean, RunPhaseTiming, mean};
use crate::parallel::job::{Job, Phase, Span, Timings};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

/// Whole-run intervals, as opposed to per-job phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Decoding the mark image
    MarkLoading,
    /// Queue and thread construction
    Setup,
    /// Directory listing plus optional pre-load
    Enumeration,
    /// First spawn until every thread joined
    Completion,
}

impl RunPhase {
    pub fn label(&self) -> &'static str {
        match self {
            RunPhase::MarkLoading => "Mark loading",
            RunPhase::Setup => "Setup",
            RunPhase::Enumeration => "Enumeration",
            RunPhase::Completion => "Completion (Tc)",
        }
    }
}

/// A job as seen by the Collector
#[derive(Debug, Clone)]
pub struct JobEntry {
    pub id: usize,
    pub source: PathBuf,
    pub arrived_at: Instant,
    pub timings: Timings,
}

/// Append-only store of completed jobs and whole-run intervals.
///
/// Single writer: the Collector during a run, the orchestrator before and
/// after it. Entries are kept in arrival order.
#[derive(Debug, Clone, Default)]
pub struct PerformanceRecorder {
    phases: Vec<Phase>,
    entries: Vec<JobEntry>,
    run_phases: BTreeMap<RunPhase, Span>,
}

impl PerformanceRecorder {
    /// `phases` are the per-job columns reported, in display order
    pub fn new(phases: Vec<Phase>) -> Self {
        Self {
            phases,
            entries: Vec::new(),
            run_phases: BTreeMap::new(),
        }
    }

    pub fn reserve(&mut self, expected: usize) {
        self.entries.reserve(expected);
    }

    /// Consume a completed job; its image is released here
    pub fn record_job<I>(&mut self, job: Job<I>, arrived_at: Instant) {
        let (id, source, timings) = job.into_parts();
        self.entries.push(JobEntry {
            id,
            source,
            arrived_at,
            timings,
        });
    }

    /// Record a whole-run interval. A later write for the same phase wins.
    pub fn record_phase(&mut self, phase: RunPhase, start: Instant, end: Instant) {
        self.run_phases.insert(phase, Span::new(start, end));
    }

    pub fn record_span(&mut self, phase: RunPhase, span: Span) {
        self.run_phases.insert(phase, span);
    }

    pub fn entries(&self) -> &[JobEntry] {
        &self.entries
    }

    pub fn run_phase(&self, phase: RunPhase) -> Option<&Span> {
        self.run_phases.get(&phase)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Means, per-job rows and run intervals. Every mean over an empty set
    /// is `None`.
    pub fn summary(&self) -> PerformanceSummary {
        let inter_arrival_ms = mean(
            self.entries
                .windows(2)
                .map(|pair| Span::new(pair[0].arrived_at, pair[1].arrived_at).millis()),
        );
        let end_to_end_ms = self.phase_mean(Phase::EndToEnd);

        let phase_means = self
            .phases
            .iter()
            .map(|&phase| PhaseMean {
                phase,
                label: phase.to_string(),
                mean_ms: self.phase_mean(phase),
            })
            .collect();

        let run_phases = self
            .run_phases
            .iter()
            .map(|(&phase, span)| RunPhaseTiming {
                phase,
                label: phase.label().to_string(),
                millis: span.millis(),
            })
            .collect();

        let entries = self
            .entries
            .iter()
            .enumerate()
            .map(|(n, entry)| EntryRow {
                n: n + 1,
                id: entry.id,
                file: entry
                    .source
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| entry.source.display().to_string()),
                latency_ms: entry.timings.get(Phase::EndToEnd).map(Span::millis),
                phases: self
                    .phases
                    .iter()
                    .map(|&phase| entry.timings.get(phase).map(Span::millis))
                    .collect(),
            })
            .collect();

        PerformanceSummary {
            processed: self.entries.len(),
            inter_arrival_ms,
            end_to_end_ms,
            phase_means,
            run_phases,
            entries,
        }
    }

    fn phase_mean(&self, phase: Phase) -> Option<f64> {
        mean(
            self.entries
                .iter()
                .filter_map(|entry| entry.timings.get(phase))
                .map(Span::millis),
        )
    }
}
