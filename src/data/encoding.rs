// ============================================================
// Layer 4 — Tokenizer Adapter
// ============================================================
// Converts raw text into fixed-length token-id sequences plus
// attention masks, using the (pretrained or cached) subword
// vocabulary managed by infra::tokenizer_store.
//
// preprocess() applies the standard single-sequence BERT layout:
//
//   [CLS] t1 t2 ... tN [SEP] [PAD] [PAD] ...
//    └─ sequences longer than max_len - 2 are truncated so the
//       two boundary markers always fit
//
// Parallel arrays per example, all of length max_len:
//   input_ids      — token ids, right-padded with PAD_ID
//   attention_mask — 1 for every real position, 0 for padding
//   segment_ids    — all zero; present for API symmetry with
//                    pair-classification, unused here
//
// Reference: Devlin et al. (2019) BERT

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::domain::errors::PipelineError;

/// Fallback token ids, matching BERT convention. Only used when
/// the loaded vocabulary does not define the marker tokens itself.
pub const PAD_ID: u32 = 0;
pub const CLS_ID: u32 = 101;
pub const SEP_ID: u32 = 102;

/// The marker-token ids of one vocabulary.
///
/// A pretrained tokenizer.json brings its own id assignment, so the
/// markers are resolved from the loaded vocabulary rather than
/// assumed — hardcoded ids would silently emit wrong boundary
/// markers for any provider that numbers them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub pad: u32,
    pub cls: u32,
    pub sep: u32,
}

impl SpecialTokens {
    /// BERT-convention ids
    pub fn bert() -> Self {
        Self { pad: PAD_ID, cls: CLS_ID, sep: SEP_ID }
    }

    /// Resolve the marker ids from a loaded vocabulary, falling back
    /// to the BERT convention for any marker the vocabulary lacks
    pub fn from_tokenizer(tokenizer: &Tokenizer) -> Self {
        Self {
            pad: tokenizer.token_to_id("[PAD]").unwrap_or(PAD_ID),
            cls: tokenizer.token_to_id("[CLS]").unwrap_or(CLS_ID),
            sep: tokenizer.token_to_id("[SEP]").unwrap_or(SEP_ID),
        }
    }
}

/// One fully preprocessed example, ready for batching.
/// Invariant: all three vectors have the same length (max_len).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedExample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub segment_ids:    Vec<u32>,
}

/// Wraps the pretrained subword tokenizer behind the two
/// operations the pipeline needs: tokenize and preprocess.
pub struct TokenizerAdapter {
    tokenizer: Tokenizer,
    specials:  SpecialTokens,
}

impl TokenizerAdapter {
    pub fn new(tokenizer: Tokenizer) -> Self {
        let specials = SpecialTokens::from_tokenizer(&tokenizer);
        Self { tokenizer, specials }
    }

    /// Convert texts to raw (unpadded, unwrapped) token-id sequences.
    /// Fails with EmptyInput on a zero-length text list.
    pub fn tokenize(&self, texts: &[String]) -> Result<Vec<Vec<u32>>> {
        if texts.is_empty() {
            return Err(PipelineError::EmptyInput.into());
        }

        let mut sequences = Vec::with_capacity(texts.len());
        for text in texts {
            let enc = self
                .tokenizer
                .encode(text.as_str(), false)
                .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
            sequences.push(enc.get_ids().to_vec());
        }
        Ok(sequences)
    }

    /// Wrap, truncate, and pad raw token sequences using the marker
    /// ids of THIS vocabulary (batch path)
    pub fn preprocess(&self, sequences: &[Vec<u32>], max_len: usize) -> Vec<EncodedExample> {
        preprocess_with(sequences, max_len, self.specials)
    }

    /// Tokenize and preprocess a single sentence (classify path)
    pub fn encode_one(&self, text: &str, max_len: usize) -> Result<EncodedExample> {
        let seqs = self.tokenize(&[text.to_string()])?;
        Ok(self.preprocess(&seqs, max_len).remove(0))
    }
}

/// preprocess_with using the BERT-convention marker ids
pub fn preprocess(sequences: &[Vec<u32>], max_len: usize) -> Vec<EncodedExample> {
    preprocess_with(sequences, max_len, SpecialTokens::bert())
}

/// Wrap, truncate, and pad raw token sequences to fixed length.
///
/// # Panics
/// Panics if max_len < 3 — there must be room for [CLS], [SEP],
/// and at least one real token.
pub fn preprocess_with(
    sequences: &[Vec<u32>],
    max_len:   usize,
    specials:  SpecialTokens,
) -> Vec<EncodedExample> {
    assert!(max_len >= 3, "max_len ({}) must be at least 3", max_len);

    // Room left for real tokens once the two boundary markers are in
    let body_len = max_len - 2;

    sequences
        .iter()
        .map(|seq| {
            let mut input_ids = Vec::with_capacity(max_len);
            input_ids.push(specials.cls);
            input_ids.extend(seq.iter().take(body_len));
            input_ids.push(specials.sep);

            // Everything up to here is a real token; the rest is padding
            let real_len = input_ids.len();
            input_ids.resize(max_len, specials.pad);

            let mut attention_mask = vec![1u32; real_len];
            attention_mask.resize(max_len, 0);

            EncodedExample {
                input_ids,
                attention_mask,
                segment_ids: vec![0u32; max_len],
            }
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Build a tiny word-level tokenizer whose marker tokens carry
    /// NON-BERT ids: [PAD]=7, [CLS]=1, [SEP]=2.
    fn custom_id_tokenizer(dir: &std::path::Path) -> Tokenizer {
        let json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": { "[PAD]": 7, "[CLS]": 1, "[SEP]": 2, "[UNK]": 3, "hello": 4 },
                "unk_token": "[UNK]"
            }
        });
        let path = dir.join("tokenizer.json");
        std::fs::write(&path, json.to_string()).unwrap();
        Tokenizer::from_file(&path).unwrap()
    }

    #[test]
    fn test_marker_ids_follow_the_loaded_vocabulary() {
        let tmp     = tempfile::tempdir().unwrap();
        let adapter = TokenizerAdapter::new(custom_id_tokenizer(tmp.path()));

        // The boundary markers and padding must use the vocabulary's
        // own ids, not the BERT-convention fallbacks
        let ex = adapter.encode_one("hello", 5).unwrap();
        assert_eq!(ex.input_ids, vec![1, 4, 2, 7, 7]);
        assert_eq!(ex.attention_mask, vec![1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_marker_ids_fall_back_to_bert_convention() {
        let specials = SpecialTokens::bert();
        let out = preprocess_with(&[vec![10]], 4, specials);
        assert_eq!(out[0].input_ids, vec![CLS_ID, 10, SEP_ID, PAD_ID]);
    }

    #[test]
    fn test_fixed_length_invariant() {
        // For every max_len >= 3 and non-empty input:
        // len(ids) == len(mask) == max_len and 2 <= sum(mask) <= max_len
        for max_len in [3usize, 8, 16, 128] {
            let seqs = vec![vec![5u32; 4], vec![7u32; 300], Vec::new()];
            for ex in preprocess(&seqs, max_len) {
                assert_eq!(ex.input_ids.len(), max_len);
                assert_eq!(ex.attention_mask.len(), max_len);
                assert_eq!(ex.segment_ids.len(), max_len);

                let real: u32 = ex.attention_mask.iter().sum();
                assert!(real >= 2, "at least the two boundary markers");
                assert!(real as usize <= max_len);
            }
        }
    }

    #[test]
    fn test_wrapping_and_padding() {
        let out = preprocess(&[vec![10, 11, 12]], 8);
        let ex  = &out[0];
        assert_eq!(ex.input_ids, vec![CLS_ID, 10, 11, 12, SEP_ID, PAD_ID, PAD_ID, PAD_ID]);
        assert_eq!(ex.attention_mask, vec![1, 1, 1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_truncation_leaves_room_for_markers() {
        let out = preprocess(&[vec![9u32; 50]], 8);
        let ex  = &out[0];
        assert_eq!(ex.input_ids[0], CLS_ID);
        assert_eq!(ex.input_ids[7], SEP_ID);
        // Fully occupied: no padding at all
        assert_eq!(ex.attention_mask.iter().sum::<u32>(), 8);
    }

    #[test]
    fn test_minimum_max_len() {
        // max_len == 3: one real token survives truncation
        let out = preprocess(&[vec![42, 43]], 3);
        assert_eq!(out[0].input_ids, vec![CLS_ID, 42, SEP_ID]);
    }

    #[test]
    fn test_segment_ids_all_zero() {
        let out = preprocess(&[vec![1, 2, 3]], 6);
        assert!(out[0].segment_ids.iter().all(|&s| s == 0));
    }

    #[test]
    #[should_panic]
    fn test_max_len_below_three_panics() {
        let _ = preprocess(&[vec![1]], 2);
    }
}
