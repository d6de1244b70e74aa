// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams of the pipeline, expressed as traits so the
// application layer never depends on a concrete corpus format
// or a concrete model backend:
//
//   - MnliLoader implements ExampleSource (TSV-in-zip corpus)
//   - ClassifyUseCase implements SentenceClassifier

use anyhow::Result;
use crate::domain::example::Example;

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can produce labelled examples.
///
/// Implementations:
///   - MnliLoader → downloads and parses the MultiNLI corpus
pub trait ExampleSource {
    /// Load all available examples from this source.
    fn load_all(&self) -> Result<Vec<Example>>;
}

// ─── SentenceClassifier ───────────────────────────────────────────────────────
/// Any component that can assign a genre to a sentence.
///
/// Implementations:
///   - ClassifyUseCase → uses the fine-tuned transformer checkpoint
pub trait SentenceClassifier {
    /// Return the predicted genre name and a confidence in [0, 1].
    fn classify(&self, text: &str) -> Result<(String, f32)>;
}
