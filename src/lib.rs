// ============================================================
// mnli-genre — MultiNLI sentence-genre classification pipeline
// ============================================================
// Fine-tunes a transformer encoder to predict which genre a
// MultiNLI sentence was drawn from, then reports standard
// classification metrics (accuracy, precision, recall, F1).
//
// The pipeline is strictly linear and single-pass:
//
//   load corpus → filter → split → encode labels → tokenise
//        → fit → predict → evaluate → report
//
// Layer map (each layer only depends on layers below it):
//   cli          — argument parsing and dispatch
//   application  — pipeline orchestration (use cases)
//   domain       — core types, traits, errors, metrics report
//   data         — corpus loading, splitting, label/token encoding
//   ml           — all Burn-specific model/training/inference code
//   infra        — checkpoints, tokenizer store, device probe, reporter

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
