//! Plain text report written to stdout

use super::utils::{format_cell, format_mean, format_millis};
use super::{ReportGenerator, RunReport};
use anyhow::Result;
use std::fmt::Write;

/// Human-readable summary followed by the per-job table
pub struct TextReportGenerator;

impl ReportGenerator for TextReportGenerator {
    fn generate(&self, report: &RunReport) -> Result<String> {
        let summary = &report.summary;
        let mut out = String::new();

        writeln!(out, "---Data---")?;
        writeln!(out, "Version: {}", report.version)?;
        writeln!(out, "Parallelism Degree: {}", report.degree)?;
        writeln!(out, "Delay: {}", report.delay_ms)?;
        writeln!(out, "Cores: {}", report.cores)?;

        writeln!(out, "---Results---")?;
        writeln!(out, "Processed: {}", summary.processed)?;
        writeln!(out, "Enumerated: {}", report.totals.enumerated)?;
        writeln!(out, "Dropped: {}", report.totals.dropped)?;
        for timing in &summary.run_phases {
            writeln!(out, "{}: {}", timing.label, format_millis(timing.millis))?;
        }
        writeln!(out, "Ts avg: {}", format_mean(summary.inter_arrival_ms))?;
        writeln!(out, "L avg: {}", format_mean(summary.end_to_end_ms))?;
        for phase in &summary.phase_means {
            writeln!(out, "{} avg: {}", phase.label, format_mean(phase.mean_ms))?;
        }

        writeln!(out, "Entries:")?;
        let mut header = format!("{:>5} {:>12}", "n", "L");
        for phase in &summary.phase_means {
            write!(header, " {:>14}", phase.label)?;
        }
        writeln!(out, "{header}  file")?;

        for row in &summary.entries {
            write!(out, "{:>5} {:>12}", row.n, format_cell(row.latency_ms))?;
            for cell in &row.phases {
                write!(out, " {:>14}", format_cell(*cell))?;
            }
            writeln!(out, "  {}", row.file)?;
        }

        Ok(out)
    }
}
