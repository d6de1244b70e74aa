// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `classify`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: fetch MultiNLI, fine-tune, evaluate, report
    Train(TrainArgs),

    /// Classify a single sentence using a trained checkpoint
    Classify(ClassifyArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory the MultiNLI archive is downloaded and extracted into
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Directory for cached pretrained artifacts (vocabulary, encoder weights)
    #[arg(long, default_value = "cache")]
    pub cache_dir: String,

    /// Directory to save model checkpoints, label mapping, and the report
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Maximum number of tokens per input sequence, including [CLS] and [SEP]
    #[arg(long, default_value_t = 128)]
    pub max_seq_len: usize,

    /// Mini-batch size during fine-tuning (device-memory dependent)
    #[arg(long, default_value_t = 32)]
    pub train_batch_size: usize,

    /// Batch size during prediction — larger is fine, no gradients are kept
    #[arg(long, default_value_t = 64)]
    pub predict_batch_size: usize,

    /// Fraction of rows assigned to the training split, the rest is test
    #[arg(long, default_value_t = 0.8)]
    pub train_split: f64,

    /// Fraction of each split to keep after subsampling.
    /// For fast iteration only — this is not a validation split.
    #[arg(long, default_value_t = 1.0)]
    pub sample_fraction: f64,

    /// Name of the corpus column holding the genre label
    #[arg(long, default_value = "genre")]
    pub label_column: String,

    /// Name of the corpus column holding the sentence text
    #[arg(long, default_value = "sentence2")]
    pub text_column: String,

    /// Entailment category kept when filtering (deduplicates sentences,
    /// since each sentence pair appears once per gold label)
    #[arg(long, default_value = "neutral")]
    pub entailment_category: String,

    /// Number of full passes through the training split
    #[arg(long, default_value_t = 3)]
    pub epochs: usize,

    /// Peak learning rate for the warmup + linear-decay schedule
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Seed used for the split, subsampling, and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of compute devices requested for data-parallel training.
    /// Falls back to one device (with a warning) if fewer are available.
    #[arg(long, default_value_t = 1)]
    pub devices: usize,

    /// Disable case-folding during tokenisation (the default vocabulary
    /// is uncased, matching the original corpus setup)
    #[arg(long)]
    pub keep_case: bool,

    /// Quick smoke run: forces sample_fraction down to 1% and epochs to 1
    #[arg(long)]
    pub quick: bool,

    /// Hidden dimension of the transformer encoder (d_model)
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Number of attention heads — d_model must be divisible by this
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 4)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Dropout probability during fine-tuning
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Total number of unique tokens in the vocabulary
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:            a.data_dir,
            cache_dir:           a.cache_dir,
            checkpoint_dir:      a.checkpoint_dir,
            max_seq_len:         a.max_seq_len,
            train_batch_size:    a.train_batch_size,
            predict_batch_size:  a.predict_batch_size,
            train_split:         a.train_split,
            sample_fraction:     a.sample_fraction,
            label_column:        a.label_column,
            text_column:         a.text_column,
            entailment_category: a.entailment_category,
            epochs:              a.epochs,
            lr:                  a.lr,
            seed:                a.seed,
            devices:             a.devices,
            lowercase:           !a.keep_case,
            quick:               a.quick,
            d_model:             a.d_model,
            num_heads:           a.num_heads,
            num_layers:          a.num_layers,
            d_ff:                a.d_ff,
            dropout:             a.dropout,
            vocab_size:          a.vocab_size,
        }
    }
}

/// All arguments for the `classify` command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// The sentence to classify
    #[arg(long)]
    pub text: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
