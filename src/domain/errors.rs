// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// The four failure classes of the pipeline as a typed enum.
// Every stage failure aborts the whole run — there are no
// partial results and no automatic retries anywhere.
//
// The application layer propagates these through anyhow, so
// callers see both the typed class and the full context chain.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The corpus archive could not be fetched or read.
    /// Fatal — no retry is attempted.
    #[error("download failed for '{url}': {reason}")]
    DownloadFailure { url: String, reason: String },

    /// A label appeared at transform time that the encoder never saw
    /// during fitting. Surfaced immediately: silently mapping unseen
    /// test labels would corrupt every downstream metric.
    #[error("unknown label '{0}': not present in the fitted label vocabulary")]
    UnknownLabel(String),

    /// The tokenizer adapter was given a zero-length text list.
    #[error("empty input: at least one text is required")]
    EmptyInput,

    /// The requested batch footprint exceeds the device budget.
    /// Remediation is the operator's: reduce --train-batch-size or
    /// --max-seq-len. The pipeline never retries with smaller batches.
    #[error(
        "out of resource: batch of {batch_size} x {max_seq_len} tokens exceeds \
         the device budget of {budget} elements (reduce --train-batch-size or --max-seq-len)"
    )]
    OutOfResource {
        batch_size:  usize,
        max_seq_len: usize,
        budget:      usize,
    },
}
