//! JSON report generator

use super::{ReportGenerator, RunReport};
use anyhow::Result;
use serde_json::{Value, json};

/// Machine-friendly report; not-applicable means are `null`
pub struct JsonReportGenerator;

impl ReportGenerator for JsonReportGenerator {
    fn generate(&self, report: &RunReport) -> Result<String> {
        let summary = &report.summary;
        let value = json!({
            "run_id": report.run_id,
            "data": {
                "version": report.version,
                "parallelism_degree": report.degree,
                "delay_ms": report.delay_ms,
                "cores": report.cores,
            },
            "results": {
                "processed": summary.processed,
                "totals": report.totals,
                "run_phases": summary.run_phases,
                "ts_avg_ms": summary.inter_arrival_ms,
                "l_avg_ms": summary.end_to_end_ms,
                "phase_means": summary.phase_means.iter().map(|m| {
                    json!({
                        "phase": m.label,
                        "mean_ms": m.mean_ms,
                    })
                }).collect::<Vec<Value>>(),
            },
            "entries": summary.entries,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
