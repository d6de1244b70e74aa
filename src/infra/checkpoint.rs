// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved per training run:
//   1. Model weights (.mpk.gz file per epoch) — all parameters
//   2. latest_epoch.json   — which epoch was last saved
//   3. train_config.json   — run configuration, so classify can
//                            rebuild the exact architecture
//   4. labels.json         — the fitted label mapping, so class
//                            indices decode to genre names
//
// The cache directory may additionally hold pretrained encoder
// weights (encoder_pretrained.mpk.gz). When present they seed
// fine-tuning; when absent the model starts from random
// initialisation — reported with a warning, since "fine-tuning"
// silently becoming "training from scratch" is the kind of
// degradation an operator must see.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::label_encoder::LabelEncoder;
use crate::ml::model::GenreClassifierModel;

const PRETRAINED_STEM: &str = "encoder_pretrained";

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    /// Directory for run artifacts (weights, config, labels)
    dir: PathBuf,

    /// Directory for cached pretrained artifacts
    cache_dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the checkpoint directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir, cache_dir: cache_dir.into() }
    }

    /// Save model weights for a given epoch and update the
    /// latest-epoch pointer the inferencer reads.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &GenreClassifierModel<B>,
        epoch: usize,
    ) -> Result<()> {
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load model weights from the latest saved checkpoint.
    /// The model parameter must have the matching architecture
    /// or loading fails.
    pub fn load_model<B: Backend>(
        &self,
        model:  GenreClassifierModel<B>,
        device: &B::Device,
    ) -> Result<GenreClassifierModel<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Seed the model with cached pretrained encoder weights when the
    /// cache holds them; otherwise warn and return the model as-is.
    pub fn load_pretrained_if_available<B: Backend>(
        &self,
        model:  GenreClassifierModel<B>,
        device: &B::Device,
    ) -> Result<GenreClassifierModel<B>> {
        let stem = self.cache_dir.join(PRETRAINED_STEM);

        // CompactRecorder appends .mpk.gz to the stem it is given
        let on_disk = self.cache_dir.join(format!("{PRETRAINED_STEM}.mpk.gz"));
        if !on_disk.exists() {
            tracing::warn!(
                "No pretrained weights in '{}' — fine-tuning from random initialisation",
                self.cache_dir.display()
            );
            return Ok(model);
        }

        let record = CompactRecorder::new()
            .load(stem.clone(), device)
            .with_context(|| {
                format!(
                    "Pretrained weights '{}' exist but don't match this architecture",
                    on_disk.display()
                )
            })?;

        tracing::info!("Loaded pretrained encoder weights from cache");
        Ok(model.load_record(record))
    }

    /// Save the run configuration so classify can rebuild the
    /// exact model architecture. Called before training starts.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }

    /// Load the run configuration from JSON
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'classify'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Save the fitted label mapping next to the weights
    pub fn save_labels(&self, labels: &LabelEncoder) -> Result<()> {
        let path = self.dir.join("labels.json");
        fs::write(&path, serde_json::to_string_pretty(labels)?)
            .with_context(|| format!("Cannot write labels to '{}'", path.display()))?;
        Ok(())
    }

    /// Load the label mapping saved during training
    pub fn load_labels(&self) -> Result<LabelEncoder> {
        let path = self.dir.join("labels.json");
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read labels from '{}'. \
                     Make sure you have run 'train' before 'classify'.",
                    path.display()
                )
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Read latest_epoch.json and return the epoch number.
    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path().join("ckpt"), tmp.path().join("cache"));

        let cfg = TrainConfig::default();
        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();

        assert_eq!(loaded.max_seq_len, cfg.max_seq_len);
        assert_eq!(loaded.label_column, cfg.label_column);
        assert_eq!(loaded.epochs, cfg.epochs);
    }

    #[test]
    fn test_labels_round_trip() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path().join("ckpt"), tmp.path().join("cache"));

        let labels = LabelEncoder::fit(&[
            "travel".to_string(),
            "fiction".to_string(),
            "slate".to_string(),
        ]);
        ckpt.save_labels(&labels).unwrap();
        let loaded = ckpt.load_labels().unwrap();

        assert_eq!(loaded, labels);
        assert_eq!(loaded.decode(0), Some("fiction"));
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path().join("ckpt"), tmp.path().join("cache"));
        assert!(ckpt.latest_epoch().is_err());
        assert!(ckpt.load_config().is_err());
    }
}
