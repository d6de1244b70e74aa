// ============================================================
// Layer 5 — Fine-Tuning Loop
// ============================================================
// Full fit() loop using Burn's DataLoader and Adam.
//
// Contract (per the pipeline design):
//   - iterates the training set in SHUFFLED mini-batches, for the
//     configured number of full epochs
//   - one optimizer step per mini-batch, with a warmup + linear
//     decay learning-rate schedule tied to the TOTAL step count
//   - logs a running average loss periodically (side effect only)
//   - degradation from the requested device count to what is
//     actually available is reported with a warning, never silent
//   - device-memory exhaustion is an OutOfResource condition; the
//     documented remediation (smaller batch or shorter sequences)
//     is the operator's — there is no automatic retry here
//
// Key Burn insight:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on MyInnerBackend (Wgpu),
//     with dropout disabled, for prediction
//
// Reference: Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::GenreBatcher, dataset::GenreDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::device;
use crate::ml::model::{GenreClassifierConfig, GenreClassifierModel};

pub type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
pub type MyInnerBackend = burn::backend::Wgpu;

/// Log the running average loss every this many mini-batches
const LOG_EVERY: usize = 50;

/// Fraction of total steps spent linearly warming the LR up
const WARMUP_FRACTION: f64 = 0.1;

/// Learning rate for one optimizer step, tied to the total step
/// count: linear warmup to the peak rate, then linear decay to 0.
pub fn scheduled_lr(base_lr: f64, step: usize, total_steps: usize) -> f64 {
    if total_steps == 0 {
        return base_lr;
    }
    let warmup = ((total_steps as f64) * WARMUP_FRACTION).ceil().max(1.0) as usize;
    if step < warmup {
        base_lr * (step + 1) as f64 / warmup as f64
    } else if step >= total_steps {
        0.0
    } else {
        let remaining = (total_steps - step) as f64;
        let decay_len = (total_steps - warmup).max(1) as f64;
        base_lr * (remaining / decay_len).clamp(0.0, 1.0)
    }
}

/// Resource pre-flight shared by fit and predict.
///
/// Both batch footprints are checked up front: an oversized predict
/// batch that only surfaced after training would abort the run with
/// the epochs already paid for. An explicit probe instead of
/// silently running on whatever is there — a degraded result (fewer
/// devices than requested) is warned about, and an oversized batch
/// footprint fails before the backend aborts.
pub fn preflight(cfg: &TrainConfig) -> Result<()> {
    let capability = device::probe(cfg.devices);
    capability.warn_if_degraded();
    device::ensure_batch_fits(cfg.train_batch_size, cfg.max_seq_len)?;
    device::ensure_batch_fits(cfg.predict_batch_size, cfg.max_seq_len)?;
    Ok(())
}

/// Fine-tune the classifier on the training split and return the
/// trained model on the inference backend (dropout disabled).
pub fn run_training(
    cfg:           &TrainConfig,
    num_classes:   usize,
    train_dataset: GenreDataset,
    ckpt_manager:  &CheckpointManager,
) -> Result<GenreClassifierModel<MyInnerBackend>> {
    preflight(cfg)?;

    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = GenreClassifierConfig::new(
        cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
        cfg.num_heads, cfg.num_layers, cfg.d_ff, cfg.dropout,
        num_classes,
    );
    let model: GenreClassifierModel<MyBackend> = model_cfg.init(&device);

    // Start from cached pretrained encoder weights when available;
    // otherwise fine-tuning degenerates to training from scratch,
    // which is reported, not hidden.
    let mut model = ckpt_manager.load_pretrained_if_available(model, &device)?;
    tracing::info!(
        "Model ready: {} layers, d_model={}, {} classes",
        cfg.num_layers, cfg.d_model, num_classes,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend, shuffled per epoch) ────────────
    let sample_count  = train_dataset.sample_count();
    let train_batcher = GenreBatcher::<MyBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.train_batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // Total optimizer steps across the whole run — the LR schedule
    // is anchored to this, not to any single epoch
    let batches_per_epoch = sample_count.div_ceil(cfg.train_batch_size);
    let total_steps       = cfg.epochs * batches_per_epoch;
    let mut step          = 0usize;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut epoch_loss_sum = 0.0f64;
        let mut epoch_batches  = 0usize;
        let mut window_loss    = 0.0f64;
        let mut window_batches = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(
                batch.input_ids,
                batch.attention_mask,
                batch.labels,
            );

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            epoch_loss_sum += loss_val;
            epoch_batches  += 1;
            window_loss    += loss_val;
            window_batches += 1;

            // Backward pass + Adam update at the scheduled rate
            let lr    = scheduled_lr(cfg.lr, step, total_steps);
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);
            step += 1;

            if window_batches == LOG_EVERY {
                tracing::info!(
                    "epoch {} step {}/{} | running loss {:.4} | lr {:.2e}",
                    epoch, step, total_steps,
                    window_loss / window_batches as f64,
                    lr,
                );
                window_loss = 0.0;
                window_batches = 0;
            }
        }

        let avg_loss = if epoch_batches > 0 {
            epoch_loss_sum / epoch_batches as f64
        } else { f64::NAN };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4}",
            epoch, cfg.epochs, avg_loss,
        );

        ckpt_manager.save_model(&model, epoch)?;
        tracing::debug!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Fine-tuning complete after {} steps", step);

    // model.valid() → inference backend, dropout disabled.
    // Prediction never mutates the trained parameters.
    Ok(model.valid())
}
