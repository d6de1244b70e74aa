// ============================================================
// Layer 2 — ClassifyUseCase
// ============================================================
// Loads everything a trained run left in the checkpoint
// directory — vocabulary, run config, label mapping, weights —
// and classifies single sentences with it.
//
// The checkpoint directory is the whole contract: if training
// finished, classification needs nothing else.

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::domain::errors::PipelineError;
use crate::domain::traits::SentenceClassifier;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::inferencer::GenreInferencer;

pub struct ClassifyUseCase {
    tokenizer:  Tokenizer,
    inferencer: GenreInferencer,
}

impl ClassifyUseCase {
    pub fn new(checkpoint_dir: String) -> Result<Self> {
        let tok_store = TokenizerStore::new(&checkpoint_dir);
        let tokenizer = tok_store.load()?;

        // The cache dir only matters for training (pretrained seeding);
        // classification reads trained weights from the checkpoint dir
        let ckpt       = CheckpointManager::new(&checkpoint_dir, &checkpoint_dir);
        let inferencer = GenreInferencer::from_checkpoint(&ckpt)?;

        Ok(Self { tokenizer, inferencer })
    }

    /// Predict the genre of one sentence.
    /// Returns the genre name and the softmax confidence in [0, 1].
    pub fn classify(&self, text: &str) -> Result<(String, f32)> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput.into());
        }
        self.inferencer.classify(text, &self.tokenizer)
    }
}

impl SentenceClassifier for ClassifyUseCase {
    fn classify(&self, text: &str) -> Result<(String, f32)> {
        ClassifyUseCase::classify(self, text)
    }
}
