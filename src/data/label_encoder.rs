// ============================================================
// Layer 4 — Label Encoder
// ============================================================
// Bijective mapping between genre strings and dense class
// indices 0..K-1.
//
// fit() observes the distinct labels of the TRAINING split and
// assigns contiguous codes in sorted order — sorting makes the
// mapping independent of row order, so the same corpus always
// produces the same code assignment.
//
// transform() fails with UnknownLabel when given a label absent
// from the fitted vocabulary. This matters: if the test split
// contained a genre unseen in training, silently inventing a
// code would corrupt every downstream metric.
//
// Serialisable so the mapping can be stored next to the model
// checkpoint and reloaded by the classify command.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::errors::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Distinct labels in sorted order — index == class code.
    /// Kept sorted so encode() can binary-search instead of
    /// carrying a separate map.
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Observe the distinct labels and assign codes in sorted order
    pub fn fit(labels: &[String]) -> Self {
        let distinct: BTreeSet<&str> = labels.iter().map(String::as_str).collect();
        let classes = distinct.into_iter().map(str::to_string).collect();
        Self { classes }
    }

    /// Map one label string to its class code
    pub fn encode(&self, label: &str) -> Result<usize, PipelineError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| PipelineError::UnknownLabel(label.to_string()))
    }

    /// Map a slice of label strings to class codes, failing on the
    /// first label absent from the fitted vocabulary
    pub fn transform(&self, labels: &[String]) -> Result<Vec<usize>, PipelineError> {
        labels.iter().map(|l| self.encode(l)).collect()
    }

    /// Map a class code back to its label string
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// The fitted label vocabulary, in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_codes_are_sorted_and_contiguous() {
        let enc = LabelEncoder::fit(&labels(&["travel", "fiction", "slate", "fiction"]));
        assert_eq!(enc.classes(), &["fiction", "slate", "travel"]);
        assert_eq!(enc.encode("fiction").unwrap(), 0);
        assert_eq!(enc.encode("slate").unwrap(), 1);
        assert_eq!(enc.encode("travel").unwrap(), 2);
    }

    #[test]
    fn test_round_trip() {
        let enc = LabelEncoder::fit(&labels(&["government", "telephone", "fiction"]));
        for label in enc.classes().to_vec() {
            let code = enc.encode(&label).unwrap();
            assert_eq!(enc.decode(code), Some(label.as_str()));
        }
    }

    #[test]
    fn test_unknown_label_fails() {
        let enc = LabelEncoder::fit(&labels(&["fiction", "travel"]));
        let err = enc.encode("verbatim").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownLabel(l) if l == "verbatim"));
    }

    #[test]
    fn test_transform_surfaces_first_unknown() {
        let enc = LabelEncoder::fit(&labels(&["fiction", "travel"]));
        let out = enc.transform(&labels(&["travel", "slate", "fiction"]));
        assert!(matches!(out, Err(PipelineError::UnknownLabel(l)) if l == "slate"));
    }

    #[test]
    fn test_decode_out_of_range() {
        let enc = LabelEncoder::fit(&labels(&["fiction"]));
        assert_eq!(enc.decode(5), None);
    }
}
