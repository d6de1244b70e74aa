// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong in any specific
// business layer:
//
//   device.rs          — Compute capability probe
//                        Typed answer to "how many devices do I
//                        actually get?", plus the pre-flight
//                        batch-footprint guard.
//
//   tokenizer_store.rs — Vocabulary persistence
//                        Loads a cached pretrained tokenizer, or
//                        builds one from the training corpus and
//                        caches it. Ensures the same vocabulary
//                        is used for training and classify.
//
//   checkpoint.rs      — Model checkpoint persistence
//                        Burn CompactRecorder weights per epoch,
//                        the run config, and the label mapping —
//                        everything classify needs to rebuild
//                        the trained classifier.
//
//   metrics.rs         — Metrics reporter
//                        Persists the evaluation summary as named
//                        scalar records (CSV) and the full report
//                        as JSON for downstream consumption.

/// Compute capability probe and batch-footprint guard
pub mod device;

/// Tokenizer caching and loading
pub mod tokenizer_store;

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Evaluation report persistence
pub mod metrics;
