//! Report Output
//!
//! JSON for machines, a plain table for people. Results are listed as
//! measured; nothing here compares or interprets them.

use crate::bencher::Schedule;
use crate::executor::RunRecord;
use crate::verify::VerifyOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Run metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Tool version
    pub version: String,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
    /// Iteration schedule every operation ran with
    pub schedule: Schedule,
    /// Base seed, if the run was seeded
    pub seed: Option<u64>,
}

/// Complete run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// One record per configuration × operation
    pub results: Vec<RunRecord>,
}

impl Report {
    /// Wrap finished records with metadata stamped now
    pub fn new(schedule: Schedule, seed: Option<u64>, results: Vec<RunRecord>) -> Self {
        Self {
            meta: ReportMeta {
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: Utc::now(),
                schedule,
                seed,
            },
            results,
        }
    }
}

/// Generate a prettified JSON report.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Plain-text table, one block per configuration.
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("BranchBench Results\n");
    output.push_str(&"=".repeat(72));
    output.push('\n');
    let _ = writeln!(
        output,
        "warm-up {} x {:.2}s, measurement {} x {:.2}s, throughput in ops/ms",
        report.meta.schedule.warmup_iterations,
        report.meta.schedule.warmup_ns as f64 / 1e9,
        report.meta.schedule.measurement_iterations,
        report.meta.schedule.measurement_ns as f64 / 1e9,
    );

    let mut current: Option<(usize, u32)> = None;
    for record in &report.results {
        let key = (record.size, record.probability);
        if current != Some(key) {
            current = Some(key);
            output.push('\n');
            let _ = writeln!(
                output,
                "size={} probability={}%  (seed {}, {} attempt{})",
                record.size,
                record.probability,
                record.seed,
                record.attempts,
                if record.attempts == 1 { "" } else { "s" }
            );
            output.push_str(&"-".repeat(72));
            output.push('\n');
            let _ = writeln!(
                output,
                "  {:<20} {:>14} {:>14} {:>14}",
                "operation", "mean", "min", "max"
            );
        }
        let _ = writeln!(
            output,
            "  {:<20} {:>14.3} {:>14.3} {:>14.3}",
            record.operation, record.mean_ops_per_ms, record.min_ops_per_ms, record.max_ops_per_ms
        );
    }

    output
}

/// Plain-text verification summary.
pub fn format_verify_output(outcomes: &[VerifyOutcome]) -> String {
    let mut output = String::new();
    let passed = outcomes.iter().filter(|o| o.passed()).count();

    for outcome in outcomes {
        let icon = if outcome.passed() { "✓" } else { "✗" };
        let _ = writeln!(
            output,
            "  {icon} {}  (seed {}, {} attempts)",
            outcome.config, outcome.seed, outcome.attempts
        );
        for failure in &outcome.failures {
            let _ = writeln!(output, "      {failure}");
        }
    }
    let _ = writeln!(output, "\n{passed}/{} configurations verified", outcomes.len());

    output
}
