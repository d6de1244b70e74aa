// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Manages the subword vocabulary in the cache directory.
//
// A pretrained tokenizer.json dropped into the cache dir is
// loaded as-is (the format is owned by the external provider).
// When none exists, a word-level vocabulary is built from the
// training corpus and written in the same HuggingFace JSON
// format, so training and classify always share one vocabulary.
//
// Case-folding is a property of the vocabulary, so the lowercase
// flag is baked into the cached normalizer rather than applied
// ad hoc at encode time.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the cached tokenizer or build a new one from texts
    pub fn load_or_build(
        &self,
        texts:      &[String],
        vocab_size: usize,
        lowercase:  bool,
    ) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading cached tokenizer from disk");
            self.load()
        } else {
            tracing::info!(
                "No cached tokenizer — building one (vocab_size={}, lowercase={})",
                vocab_size,
                lowercase,
            );
            self.build_and_save(texts, vocab_size, lowercase)
        }
    }

    /// Copy a pretrained tokenizer.json from another directory into
    /// this store, unless the store already has one. Returns true
    /// when a copy happened.
    ///
    /// Used at training time to pull a provider tokenizer out of the
    /// cache directory and keep it next to the checkpoint, so the
    /// classify command only ever needs the checkpoint directory.
    pub fn import_pretrained(&self, source_dir: &std::path::Path) -> Result<bool> {
        let local  = self.dir.join("tokenizer.json");
        let remote = source_dir.join("tokenizer.json");
        if local.exists() || !remote.exists() {
            return Ok(false);
        }

        std::fs::create_dir_all(&self.dir).ok();
        std::fs::copy(&remote, &local).with_context(|| {
            format!(
                "Cannot copy tokenizer from '{}' to '{}'",
                remote.display(),
                local.display()
            )
        })?;
        tracing::info!("Imported pretrained tokenizer from '{}'", remote.display());
        Ok(true)
    }

    /// Load a previously cached tokenizer from its JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    /// Build a word-level vocabulary from the training texts and
    /// write it as a tokenizer JSON the `tokenizers` crate loads
    /// directly.
    fn build_and_save(
        &self,
        texts:      &[String],
        vocab_size: usize,
        lowercase:  bool,
    ) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Build vocabulary from word frequencies ────────────────────
        use std::collections::HashMap;
        let mut freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text.split_whitespace() {
                let w = if lowercase { word.to_lowercase() } else { word.to_string() };
                // Strip punctuation from edges
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Sort by frequency descending, take top vocab_size - 5
        // (reserve 5 slots for special tokens)
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let max_words = vocab_size.saturating_sub(5);
        words.truncate(max_words);

        // ── Step 2: Build vocab JSON ──────────────────────────────────────────
        // Special tokens get fixed IDs matching BERT convention
        let mut vocab = serde_json::json!({
            "[PAD]":  0,
            "[UNK]":  1,
            "[CLS]":  101,
            "[SEP]":  102,
            "[MASK]": 103,
        });

        let mut next_id = 104usize;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        // ── Step 3: Write tokenizer JSON in HuggingFace format ────────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0,   "content": "[PAD]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1,   "content": "[UNK]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 101, "content": "[CLS]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 102, "content": "[SEP]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 103, "content": "[MASK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": lowercase
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(
            &tok_path,
            serde_json::to_string_pretty(&tokenizer_json)?
        ).with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} words, cached at '{}'",
            next_id,
            tok_path.display()
        );

        // Load back as a proper Tokenizer instance
        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}
