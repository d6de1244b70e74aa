// ============================================================
// Layer 3 — Classification Report (Evaluator)
// ============================================================
// Computes accuracy and per-class precision / recall / F1 /
// support from predicted vs. true class indices, plus the three
// standard multi-class aggregates:
//
//   micro avg    — pool TP/FP/FN counts across classes, then ratio
//   macro avg    — unweighted mean of the per-class metrics
//   weighted avg — per-class metrics weighted by support
//
// Convention (matching standard classification-report tools):
// an undefined ratio (zero denominator) reports as 0.0 — a class
// that was never predicted has precision 0, not an error.

use serde::{Deserialize, Serialize};

/// Precision / recall / F1 / support for one class or one aggregate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// TP / (TP + FP) — of everything predicted as this class, how much was right
    pub precision: f64,

    /// TP / (TP + FN) — of everything truly this class, how much was found
    pub recall: f64,

    /// Harmonic mean of precision and recall
    pub f1: f64,

    /// Number of true instances of this class in the evaluation set
    pub support: usize,
}

/// The full metrics report for one evaluation run.
/// Produced once, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Fraction of predictions exactly equal to the true label
    pub accuracy: f64,

    /// Per-class metrics, in class-index order, keyed by class name
    pub classes: Vec<(String, ClassMetrics)>,

    /// Aggregate counts pooled before the ratio
    pub micro_avg: ClassMetrics,

    /// Unweighted mean across classes
    pub macro_avg: ClassMetrics,

    /// Mean across classes weighted by support
    pub weighted_avg: ClassMetrics,
}

/// Ratio that reports 0.0 instead of failing on a zero denominator
fn safe_ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Harmonic mean of precision and recall, 0.0 when both are 0
fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

impl ClassificationReport {
    /// Compute the report from parallel slices of true and predicted
    /// class indices. `class_names[i]` names class index `i`.
    ///
    /// # Panics
    /// Panics if the two slices differ in length or if an index is
    /// outside 0..class_names.len() — both indicate a pipeline bug
    /// upstream, not an operator error.
    pub fn compute(truth: &[usize], predicted: &[usize], class_names: &[String]) -> Self {
        assert_eq!(
            truth.len(),
            predicted.len(),
            "true and predicted label slices must be the same length"
        );

        let k = class_names.len();
        let mut tp = vec![0usize; k];
        let mut fp = vec![0usize; k];
        let mut fn_ = vec![0usize; k];
        let mut correct = 0usize;

        for (&t, &p) in truth.iter().zip(predicted.iter()) {
            assert!(t < k && p < k, "class index out of range");
            if t == p {
                correct += 1;
                tp[t] += 1;
            } else {
                fp[p] += 1;
                fn_[t] += 1;
            }
        }

        let total = truth.len();
        let accuracy = safe_ratio(correct, total);

        // ── Per-class rows ────────────────────────────────────────────────────
        let mut classes = Vec::with_capacity(k);
        for i in 0..k {
            let precision = safe_ratio(tp[i], tp[i] + fp[i]);
            let recall    = safe_ratio(tp[i], tp[i] + fn_[i]);
            classes.push((
                class_names[i].clone(),
                ClassMetrics {
                    precision,
                    recall,
                    f1: f1_score(precision, recall),
                    support: tp[i] + fn_[i],
                },
            ));
        }

        // ── Micro average: pool counts first, then take the ratio ─────────────
        let tp_sum: usize = tp.iter().sum();
        let fp_sum: usize = fp.iter().sum();
        let fn_sum: usize = fn_.iter().sum();
        let micro_p = safe_ratio(tp_sum, tp_sum + fp_sum);
        let micro_r = safe_ratio(tp_sum, tp_sum + fn_sum);
        let micro_avg = ClassMetrics {
            precision: micro_p,
            recall:    micro_r,
            f1:        f1_score(micro_p, micro_r),
            support:   total,
        };

        // ── Macro average: unweighted mean of per-class rows ──────────────────
        let macro_avg = if k == 0 {
            ClassMetrics { precision: 0.0, recall: 0.0, f1: 0.0, support: total }
        } else {
            let p = classes.iter().map(|(_, m)| m.precision).sum::<f64>() / k as f64;
            let r = classes.iter().map(|(_, m)| m.recall).sum::<f64>() / k as f64;
            let f = classes.iter().map(|(_, m)| m.f1).sum::<f64>() / k as f64;
            ClassMetrics { precision: p, recall: r, f1: f, support: total }
        };

        // ── Weighted average: mean weighted by class support ──────────────────
        let weighted_avg = {
            let mut p = 0.0;
            let mut r = 0.0;
            let mut f = 0.0;
            for (_, m) in &classes {
                let w = safe_ratio(m.support, total);
                p += m.precision * w;
                r += m.recall * w;
                f += m.f1 * w;
            }
            ClassMetrics { precision: p, recall: r, f1: f, support: total }
        };

        Self { accuracy, classes, micro_avg, macro_avg, weighted_avg }
    }

    /// Sum of per-class supports — equals the evaluation-set size
    pub fn total_support(&self) -> usize {
        self.classes.iter().map(|(_, m)| m.support).sum()
    }

    /// Render the report as a fixed-width console table
    pub fn format_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<14} {:>9} {:>9} {:>9} {:>9}\n",
            "", "precision", "recall", "f1-score", "support"
        ));
        for (name, m) in &self.classes {
            out.push_str(&format!(
                "{:<14} {:>9.4} {:>9.4} {:>9.4} {:>9}\n",
                name, m.precision, m.recall, m.f1, m.support
            ));
        }
        out.push('\n');
        out.push_str(&format!("{:<14} {:>39.4}\n", "accuracy", self.accuracy));
        for (name, m) in [
            ("micro avg", &self.micro_avg),
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ] {
            out.push_str(&format!(
                "{:<14} {:>9.4} {:>9.4} {:>9.4} {:>9}\n",
                name, m.precision, m.recall, m.f1, m.support
            ));
        }
        out
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn names(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_class_example() {
        // true=[0,0,1,1], pred=[0,1,1,1]:
        //   accuracy = 3/4
        //   class 1: TP=2, FP=1, FN=0 → precision 2/3, recall 1.0
        let truth = [0, 0, 1, 1];
        let pred  = [0, 1, 1, 1];
        let r = ClassificationReport::compute(&truth, &pred, &names(&["0", "1"]));

        assert!((r.accuracy - 0.75).abs() < 1e-12);
        let (_, c1) = &r.classes[1];
        assert!((c1.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((c1.recall - 1.0).abs() < 1e-12);
        assert_eq!(c1.support, 2);
    }

    #[test]
    fn test_zero_denominator_reports_zero() {
        // Class 2 never occurs in truth and is never predicted:
        // precision, recall, and f1 must all be 0.0, not NaN or a panic
        let truth = [0, 1];
        let pred  = [0, 1];
        let r = ClassificationReport::compute(&truth, &pred, &names(&["a", "b", "c"]));

        let (_, c) = &r.classes[2];
        assert_eq!(c.precision, 0.0);
        assert_eq!(c.recall, 0.0);
        assert_eq!(c.f1, 0.0);
        assert_eq!(c.support, 0);
    }

    #[test]
    fn test_supports_sum_to_set_size() {
        let truth = [0, 1, 2, 1, 0, 2, 2];
        let pred  = [0, 2, 2, 1, 1, 2, 0];
        let r = ClassificationReport::compute(&truth, &pred, &names(&["x", "y", "z"]));
        assert_eq!(r.total_support(), truth.len());
    }

    #[test]
    fn test_micro_average_equals_accuracy_for_single_label() {
        // With exactly one predicted and one true label per example,
        // every FP is some other class's FN, so pooled precision ==
        // pooled recall == accuracy
        let truth = [0, 1, 2, 1, 0];
        let pred  = [0, 2, 2, 1, 1];
        let r = ClassificationReport::compute(&truth, &pred, &names(&["x", "y", "z"]));
        assert!((r.micro_avg.precision - r.accuracy).abs() < 1e-12);
        assert!((r.micro_avg.recall - r.accuracy).abs() < 1e-12);
        assert!((r.micro_avg.f1 - r.accuracy).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_predictions() {
        let truth = [0, 1, 1, 0];
        let r = ClassificationReport::compute(&truth, &truth, &names(&["a", "b"]));
        assert_eq!(r.accuracy, 1.0);
        assert_eq!(r.macro_avg.f1, 1.0);
        assert_eq!(r.weighted_avg.precision, 1.0);
    }

    #[test]
    #[should_panic]
    fn test_length_mismatch_panics() {
        let _ = ClassificationReport::compute(&[0, 1], &[0], &names(&["a", "b"]));
    }
}
