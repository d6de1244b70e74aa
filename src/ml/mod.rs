// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one
// (plus the data layer's Dataset/Batcher impls).
//
// What's in this layer:
//
//   model.rs      — The transformer encoder + classification head
//                   Token and positional embeddings, mask-aware
//                   multi-head self-attention blocks, [CLS]
//                   pooling, and a K-way genre head with
//                   cross-entropy loss
//
//   trainer.rs    — The fine-tuning loop
//                   Shuffled mini-batches, warmup + linear-decay
//                   learning-rate schedule tied to the total step
//                   count, running-loss logging, per-epoch
//                   checkpointing
//
//   inferencer.rs — Batched prediction
//                   Fixed-order batches (output order == input
//                   order), argmax over the class logits; also
//                   the single-sentence classify path
//
// Reference: Vaswani et al. (2017) Attention Is All You Need
//            Devlin et al. (2019) BERT

/// Transformer encoder genre classification model
pub mod model;

/// Fine-tuning loop with LR schedule and checkpointing
pub mod trainer;

/// Order-preserving batched prediction
pub mod inferencer;
