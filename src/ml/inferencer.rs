// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Batched prediction over tokenised samples.
//
// Ordering contract: batches are taken in FIXED input order (no
// shuffling), so the i-th returned class index belongs to the
// i-th input sample. Prediction reads trained parameters and
// never mutates them.

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::data::batcher::GenreBatcher;
use crate::data::dataset::GenreSample;
use crate::data::encoding::TokenizerAdapter;
use crate::data::label_encoder::LabelEncoder;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{GenreClassifierConfig, GenreClassifierModel};

type InferBackend = burn::backend::Wgpu;

/// Predict one class index per sample, in input order.
///
/// Iterates `samples` in fixed-order chunks of `batch_size` —
/// chunking by hand (instead of a DataLoader) is what guarantees
/// output order == input order.
pub fn predict_all(
    model:      &GenreClassifierModel<InferBackend>,
    samples:    &[GenreSample],
    batch_size: usize,
    device:     &burn::backend::wgpu::WgpuDevice,
) -> Result<Vec<usize>> {
    let batcher = GenreBatcher::<InferBackend>::new(device.clone());
    let mut predictions = Vec::with_capacity(samples.len());

    for chunk in samples.chunks(batch_size.max(1)) {
        let batch  = burn::data::dataloader::batcher::Batcher::batch(
            &batcher, chunk.to_vec(),
        );
        let logits = model.forward(batch.input_ids, batch.attention_mask);

        // argmax(1) returns shape [batch, 1] — flatten to [batch].
        // A failed device readback is a real error: defaulting to an
        // empty batch would desynchronise predictions from inputs.
        let classes: Vec<i32> = logits
            .argmax(1)
            .flatten::<1>(0, 1)
            .into_data()
            .to_vec::<i32>()
            .map_err(|e| anyhow::anyhow!("Cannot read predictions off the device: {e:?}"))?;

        predictions.extend(classes.into_iter().map(|c| c as usize));
    }

    Ok(predictions)
}

/// Loads a trained checkpoint and classifies single sentences —
/// the read side of the pipeline, used by the `classify` command.
pub struct GenreInferencer {
    model:       GenreClassifierModel<InferBackend>,
    labels:      LabelEncoder,
    max_seq_len: usize,
    device:      burn::backend::wgpu::WgpuDevice,
}

impl GenreInferencer {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg    = ckpt_manager.load_config()?;
        let labels = ckpt_manager.load_labels()?;

        // Rebuild the exact architecture before loading weights into it.
        // Dropout 0.0: inference only.
        let model_cfg = GenreClassifierConfig::new(
            cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
            cfg.num_heads, cfg.num_layers, cfg.d_ff, 0.0,
            labels.num_classes(),
        );
        let model: GenreClassifierModel<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Ok(Self { model, labels, max_seq_len: cfg.max_seq_len, device })
    }

    /// Predict the genre of one sentence.
    /// Returns the genre name and the softmax confidence in [0, 1].
    pub fn classify(&self, text: &str, tokenizer: &Tokenizer) -> Result<(String, f32)> {
        let adapter = TokenizerAdapter::new(tokenizer.clone());
        let encoded = adapter.encode_one(text, self.max_seq_len)?;
        let sample  = GenreSample::from_encoded(encoded, 0);

        let batcher = GenreBatcher::<InferBackend>::new(self.device.clone());
        let batch   = burn::data::dataloader::batcher::Batcher::batch(
            &batcher, vec![sample],
        );

        let logits = self.model.forward(batch.input_ids, batch.attention_mask);
        let probs: Vec<f32> = burn::tensor::activation::softmax(logits, 1)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities off the device: {e:?}"))?;

        // Best class and its probability
        let (best_idx, best_prob) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0, 0.0));

        let genre = self
            .labels
            .decode(best_idx)
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!("Predicted class {} conf={:.4}", best_idx, best_prob);
        Ok((genre, best_prob))
    }
}
