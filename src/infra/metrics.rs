// ============================================================
// Layer 6 — Metrics Reporter
// ============================================================
// Persists one evaluation run to the checkpoint directory:
//
//   summary.csv  — named scalar records (metric,value), one row
//                  per headline number. Easy to diff between runs
//                  and to load into a spreadsheet.
//   report.json  — the full ClassificationReport, per-class rows
//                  and aggregates included, for any downstream
//                  tool that wants more than the headlines.
//
// The console table is the caller's job; this module only writes
// files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::domain::report::ClassificationReport;

/// The headline numbers of one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub accuracy:        f64,
    pub macro_precision: f64,
    pub macro_recall:    f64,
    pub macro_f1:        f64,

    /// Number of evaluated examples
    pub test_size: usize,
}

impl RunSummary {
    pub fn from_report(report: &ClassificationReport) -> Self {
        Self {
            accuracy:        report.accuracy,
            macro_precision: report.macro_avg.precision,
            macro_recall:    report.macro_avg.recall,
            macro_f1:        report.macro_avg.f1,
            test_size:       report.micro_avg.support,
        }
    }
}

/// Writes evaluation artifacts into a target directory.
pub struct MetricsReporter {
    dir: PathBuf,
}

impl MetricsReporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Persist the run: summary.csv with the headline scalars and
    /// report.json with the full per-class breakdown.
    pub fn write(&self, report: &ClassificationReport) -> Result<RunSummary> {
        let summary = RunSummary::from_report(report);

        // ── summary.csv: named scalar records ─────────────────────────────────
        let csv_path = self.dir.join("summary.csv");
        let mut wtr = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;

        wtr.write_record(["metric", "value"])?;
        wtr.write_record(["accuracy",        format!("{:.6}", summary.accuracy).as_str()])?;
        wtr.write_record(["macro_precision", format!("{:.6}", summary.macro_precision).as_str()])?;
        wtr.write_record(["macro_recall",    format!("{:.6}", summary.macro_recall).as_str()])?;
        wtr.write_record(["macro_f1",        format!("{:.6}", summary.macro_f1).as_str()])?;
        wtr.write_record(["test_size",       summary.test_size.to_string().as_str()])?;
        wtr.flush()?;

        // ── report.json: the full report ──────────────────────────────────────
        let json_path = self.dir.join("report.json");
        fs::write(&json_path, serde_json::to_string_pretty(report)?)
            .with_context(|| format!("Cannot write '{}'", json_path.display()))?;

        tracing::info!(
            "Evaluation written: '{}' and '{}'",
            csv_path.display(),
            json_path.display()
        );

        Ok(summary)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ClassificationReport {
        let truth = [0, 0, 1, 1];
        let pred  = [0, 1, 1, 1];
        let names = vec!["fiction".to_string(), "travel".to_string()];
        ClassificationReport::compute(&truth, &pred, &names)
    }

    #[test]
    fn test_summary_mirrors_report() {
        let report  = sample_report();
        let summary = RunSummary::from_report(&report);

        assert!((summary.accuracy - 0.75).abs() < 1e-12);
        assert_eq!(summary.test_size, 4);
        assert!((summary.macro_f1 - report.macro_avg.f1).abs() < 1e-12);
    }

    #[test]
    fn test_write_produces_both_artifacts() {
        let tmp      = tempfile::tempdir().unwrap();
        let reporter = MetricsReporter::new(tmp.path());
        let report   = sample_report();

        let summary = reporter.write(&report).unwrap();
        assert!((summary.accuracy - report.accuracy).abs() < 1e-12);

        let csv_text = fs::read_to_string(tmp.path().join("summary.csv")).unwrap();
        assert!(csv_text.starts_with("metric,value"));
        assert!(csv_text.contains("accuracy,0.750000"));
        assert!(csv_text.contains("test_size,4"));

        let json_text = fs::read_to_string(tmp.path().join("report.json")).unwrap();
        let loaded: ClassificationReport = serde_json::from_str(&json_text).unwrap();
        assert_eq!(loaded.classes.len(), 2);
        assert!((loaded.accuracy - report.accuracy).abs() < 1e-12);
    }
}
