// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums, and traits that define the core
// concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - NO ML-specific code
//
// Keeping this layer pure means every invariant of the pipeline
// (label round-trips, metric arithmetic, error taxonomy) can be
// unit tested without a GPU or a downloaded corpus.

// A single labelled sentence from the corpus
pub mod example;

// The classification report produced by the evaluator
pub mod report;

// The typed failure taxonomy of the pipeline
pub mod errors;

// Core abstractions (traits) that other layers implement
pub mod traits;
