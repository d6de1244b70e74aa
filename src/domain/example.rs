// ============================================================
// Layer 3 — Example Domain Type
// ============================================================
// Represents a single labelled sentence drawn from the corpus.
// Plain data, immutable after loading: the pipeline reads each
// example once from the source TSV and never mutates it.
//
// Reference: Williams et al. (2018) MultiNLI

use serde::{Deserialize, Serialize};

/// One (sentence, genre) pair from the corpus.
///
/// The `id` is the raw join key from the source file (pairID) —
/// kept for traceability and so splits can be compared by row
/// identity rather than by text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Raw join id from the source corpus (pairID column)
    pub id: String,

    /// The sentence text to classify
    pub text: String,

    /// The genre label — one of a fixed small set of textual domains
    /// (e.g. fiction, government, telephone, travel, slate)
    pub genre: String,
}

impl Example {
    /// Create a new Example.
    /// Uses impl Into<String> so callers can pass &str or String.
    pub fn new(
        id:    impl Into<String>,
        text:  impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            id:    id.into(),
            text:  text.into(),
            genre: genre.into(),
        }
    }
}
