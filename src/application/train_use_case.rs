// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full pipeline in order:
//
//   Step 1: Fetch + parse the corpus    (Layer 4 - data)
//   Step 2: Filter to one gold label    (Layer 2, here)
//   Step 3: Split train/test            (Layer 4 - data)
//   Step 4: Subsample for fast runs     (Layer 4 - data)
//   Step 5: Fit + apply label encoder   (Layer 4 - data)
//   Step 6: Build / load tokenizer      (Layer 6 - infra)
//   Step 7: Tokenize + preprocess       (Layer 4 - data)
//   Step 8: Save config + labels        (Layer 6 - infra)
//   Step 9: Fine-tune the classifier    (Layer 5 - ml)
//   Step 10: Predict the test split     (Layer 5 - ml)
//   Step 11: Compute + persist report   (Layer 3 + 6)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{GenreDataset, GenreSample},
    encoding::TokenizerAdapter,
    label_encoder::LabelEncoder,
    loader::{MnliLoader, MnliRecord},
    splitter::{split_train_test, subsample},
};
use crate::domain::example::Example;
use crate::domain::report::ClassificationReport;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{MetricsReporter, RunSummary},
    tokenizer_store::TokenizerStore,
};
use crate::ml::{inferencer::predict_all, trainer::run_training};

// ─── Training Configuration ──────────────────────────────────────────────────
// All knobs for a full run, with no ambient state: everything the
// pipeline reads is a field here, so two runs with equal configs
// and equal seeds produce equal splits and equal batches.
// Serialisable so it can be saved to disk and reloaded for
// classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:            String,
    pub cache_dir:           String,
    pub checkpoint_dir:      String,
    pub max_seq_len:         usize,
    pub train_batch_size:    usize,
    pub predict_batch_size:  usize,
    pub train_split:         f64,
    pub sample_fraction:     f64,
    pub label_column:        String,
    pub text_column:         String,
    pub entailment_category: String,
    pub epochs:              usize,
    pub lr:                  f64,
    pub seed:                u64,
    pub devices:             usize,
    pub lowercase:           bool,
    pub quick:               bool,
    pub d_model:             usize,
    pub num_heads:           usize,
    pub num_layers:          usize,
    pub d_ff:                usize,
    pub dropout:             f64,
    pub vocab_size:          usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:            "data".to_string(),
            cache_dir:           "cache".to_string(),
            checkpoint_dir:      "checkpoints".to_string(),
            max_seq_len:         128,
            train_batch_size:    32,
            predict_batch_size:  64,
            train_split:         0.8,
            sample_fraction:     1.0,
            label_column:        "genre".to_string(),
            text_column:         "sentence2".to_string(),
            entailment_category: "neutral".to_string(),
            epochs:              3,
            lr:                  1e-4,
            seed:                42,
            devices:             1,
            lowercase:           true,
            quick:               false,
            d_model:             256,
            num_heads:           8,
            num_layers:          4,
            d_ff:                1024,
            dropout:             0.1,
            vocab_size:          30522,
        }
    }
}

impl TrainConfig {
    /// Reject configurations that would fail deep inside the run.
    /// Called once at the CLI boundary, before any work starts.
    pub fn validate(&self) -> Result<()> {
        if !(self.train_split > 0.0 && self.train_split < 1.0) {
            anyhow::bail!(
                "--train-split must be strictly between 0 and 1 (got {})",
                self.train_split
            );
        }
        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            anyhow::bail!(
                "--sample-fraction must be in (0, 1] (got {})",
                self.sample_fraction
            );
        }
        if self.max_seq_len < 3 {
            anyhow::bail!("--max-seq-len must be at least 3 (got {})", self.max_seq_len);
        }
        if self.train_batch_size == 0 || self.predict_batch_size == 0 {
            anyhow::bail!("batch sizes must be at least 1");
        }
        if self.epochs == 0 {
            anyhow::bail!("--epochs must be at least 1");
        }
        if self.num_heads == 0 || self.d_model % self.num_heads != 0 {
            anyhow::bail!(
                "--d-model ({}) must be divisible by --num-heads ({})",
                self.d_model,
                self.num_heads
            );
        }
        Ok(())
    }

    /// Apply the quick-run override: 1% of the data for one epoch.
    /// Everything else (splits, seeds, schedule shape) is untouched,
    /// so a quick run exercises the exact same code paths.
    fn apply_quick(mut self) -> Self {
        if self.quick {
            self.sample_fraction = self.sample_fraction.min(0.01);
            self.epochs          = 1;
            tracing::info!("Quick run: sample_fraction=0.01, epochs=1");
        }
        self
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full pipeline end to end.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full pipeline and return the evaluation summary
    pub fn execute(&self) -> Result<RunSummary> {
        let cfg = self.config.clone().apply_quick();

        // ── Step 1: Fetch + parse the corpus ──────────────────────────────────
        tracing::info!("Preparing corpus in '{}'", cfg.data_dir);
        let loader  = MnliLoader::new(&cfg.data_dir, &cfg.label_column, &cfg.text_column);
        let records = loader.load_records()?;

        // ── Step 2: Filter to one entailment category ─────────────────────────
        // The corpus repeats each sentence pair once per gold label, so
        // keeping a single category is what deduplicates the sentences
        let examples = filter_to_category(records, &cfg.entailment_category);
        tracing::info!(
            "{} examples after filtering to gold_label='{}'",
            examples.len(),
            cfg.entailment_category
        );
        if examples.is_empty() {
            anyhow::bail!(
                "No rows matched gold_label '{}' — check --entailment-category",
                cfg.entailment_category
            );
        }

        // ── Step 3: Split train/test ──────────────────────────────────────────
        let (train, test) = split_train_test(examples, cfg.train_split, cfg.seed);

        // ── Step 4: Subsample for fast runs (no-op at fraction 1.0) ───────────
        let train = subsample(train, cfg.sample_fraction, cfg.seed);
        let test  = subsample(test, cfg.sample_fraction, cfg.seed);
        tracing::info!("Split: {} train, {} test", train.len(), test.len());

        // ── Step 5: Fit the label encoder on the TRAINING split only ──────────
        // A test genre unseen in training fails here with UnknownLabel
        // rather than corrupting the metrics downstream
        let train_genres: Vec<String> = train.iter().map(|e| e.genre.clone()).collect();
        let labels       = LabelEncoder::fit(&train_genres);
        tracing::info!("Fitted {} genre classes: {:?}", labels.num_classes(), labels.classes());

        let train_labels = labels.transform(&train_genres)?;
        let test_genres: Vec<String> = test.iter().map(|e| e.genre.clone()).collect();
        let test_labels  = labels.transform(&test_genres)?;

        // ── Step 6: Build / load tokenizer ────────────────────────────────────
        // A pretrained vocabulary in the cache dir is pulled next to the
        // checkpoint; otherwise one is built from the training texts.
        // Either way the vocabulary ends up in the checkpoint dir, which
        // is all the classify command gets.
        let train_texts: Vec<String> = train.iter().map(|e| e.text.clone()).collect();
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        tok_store.import_pretrained(std::path::Path::new(&cfg.cache_dir))?;
        let tokenizer = tok_store.load_or_build(&train_texts, cfg.vocab_size, cfg.lowercase)?;

        // ── Step 7: Tokenize + preprocess both splits ─────────────────────────
        let adapter       = TokenizerAdapter::new(tokenizer);
        let train_samples = build_samples(&adapter, &train_texts, &train_labels, cfg.max_seq_len)?;
        let test_texts: Vec<String> = test.iter().map(|e| e.text.clone()).collect();
        let test_samples  = build_samples(&adapter, &test_texts, &test_labels, cfg.max_seq_len)?;

        // ── Step 8: Persist config + labels for the classify command ──────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir, &cfg.cache_dir);
        ckpt_manager.save_config(&cfg)?;
        ckpt_manager.save_labels(&labels)?;

        // ── Step 9: Fine-tune (Layer 5) ───────────────────────────────────────
        let train_dataset = GenreDataset::new(train_samples);
        let model = run_training(&cfg, labels.num_classes(), train_dataset, &ckpt_manager)?;

        // ── Step 10: Predict the test split in fixed order ────────────────────
        let device = burn::backend::wgpu::WgpuDevice::default();
        let predicted = predict_all(&model, &test_samples, cfg.predict_batch_size, &device)?;

        // ── Step 11: Evaluate and persist the report ──────────────────────────
        let report = ClassificationReport::compute(&test_labels, &predicted, labels.classes());
        println!("\n{}", report.format_table());

        let reporter = MetricsReporter::new(&cfg.checkpoint_dir);
        let summary  = reporter.write(&report)?;
        Ok(summary)
    }
}

/// Keep only the rows of one entailment category, then drop any
/// residual duplicate (text, genre) pairs. The duplicates that
/// matter — the same sentence repeated under each gold label — are
/// already gone after the category filter; this pass is best
/// effort for whatever the corpus repeats beyond that. The same
/// text under two DIFFERENT genres is two distinct examples and
/// survives.
fn filter_to_category(records: Vec<MnliRecord>, category: &str) -> Vec<Example> {
    use std::collections::HashSet;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut out  = Vec::new();
    let mut residual_dupes = 0usize;

    for record in records {
        if record.gold_label != category {
            continue;
        }
        let example = record.into_example();
        if seen.insert((example.text.clone(), example.genre.clone())) {
            out.push(example);
        } else {
            residual_dupes += 1;
        }
    }

    if residual_dupes > 0 {
        tracing::debug!("Dropped {} residual duplicate rows", residual_dupes);
    }
    out
}

/// Tokenize, preprocess, and pair each text with its class code.
fn build_samples(
    adapter:     &TokenizerAdapter,
    texts:       &[String],
    class_codes: &[usize],
    max_seq_len: usize,
) -> Result<Vec<GenreSample>> {
    let sequences = adapter.tokenize(texts)?;
    let encoded   = adapter.preprocess(&sequences, max_seq_len);

    Ok(encoded
        .into_iter()
        .zip(class_codes.iter().copied())
        .map(|(enc, label)| GenreSample::from_encoded(enc, label))
        .collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(gold: &str, genre: &str, text: &str, id: &str) -> MnliRecord {
        MnliRecord {
            pair_id:    id.to_string(),
            gold_label: gold.to_string(),
            genre:      genre.to_string(),
            text:       text.to_string(),
        }
    }

    #[test]
    fn test_filter_keeps_only_the_requested_category() {
        let records = vec![
            record("neutral",       "fiction", "A dog ran.", "1n"),
            record("entailment",    "fiction", "A dog ran.", "1e"),
            record("contradiction", "fiction", "A dog ran.", "1c"),
        ];
        let kept = filter_to_category(records, "neutral");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "1n");
    }

    #[test]
    fn test_filter_drops_residual_duplicates() {
        let records = vec![
            record("neutral", "fiction", "Same sentence.", "1n"),
            record("neutral", "fiction", "Same sentence.", "2n"),
        ];
        let kept = filter_to_category(records, "neutral");
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_same_text_under_different_genres_survives() {
        let records = vec![
            record("neutral", "fiction", "It was fine.", "1n"),
            record("neutral", "travel",  "It was fine.", "2n"),
        ];
        let kept = filter_to_category(records, "neutral");
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_fractions() {
        let mut cfg = TrainConfig::default();
        cfg.train_split = 1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = TrainConfig::default();
        cfg.sample_fraction = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = TrainConfig::default();
        cfg.sample_fraction = 1.0;
        cfg.train_split     = 0.8;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_indivisible_heads() {
        let mut cfg = TrainConfig::default();
        cfg.d_model   = 250;
        cfg.num_heads = 8;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_quick_override_shrinks_the_run() {
        let mut cfg = TrainConfig::default();
        cfg.quick  = true;
        cfg.epochs = 10;
        let cfg = cfg.apply_quick();
        assert_eq!(cfg.epochs, 1);
        assert!((cfg.sample_fraction - 0.01).abs() < 1e-12);

        // A fraction already below 1% is left alone
        let mut cfg = TrainConfig::default();
        cfg.quick           = true;
        cfg.sample_fraction = 0.005;
        let cfg = cfg.apply_quick();
        assert!((cfg.sample_fraction - 0.005).abs() < 1e-12);
    }
}
