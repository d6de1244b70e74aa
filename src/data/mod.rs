// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw corpus archive and GPU-ready
// tensor batches.
//
// The pipeline flows in this order:
//
//   MultiNLI archive (zip)
//       │
//       ▼
//   MnliLoader        → downloads/extracts once, parses the TSV
//       │
//       ▼
//   splitter          → seeded train/test partition + subsampling
//       │
//       ▼
//   LabelEncoder      → genre string ↔ class index
//       │
//       ▼
//   TokenizerAdapter  → fixed-length token ids + attention mask
//       │
//       ▼
//   GenreDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   GenreBatcher      → stacks samples into tensor batches
//
// Each module is responsible for exactly one step, so each step
// is independently testable without a GPU.

/// Downloads, caches, and parses the MultiNLI corpus
pub mod loader;

/// Seeded train/test splitting and subsampling
pub mod splitter;

/// Bijective genre-string ↔ class-index mapping
pub mod label_encoder;

/// Tokenisation and fixed-length sequence preprocessing
pub mod encoding;

/// Implements Burn's Dataset trait for tokenised samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
