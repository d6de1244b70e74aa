use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::encoding::EncodedExample;

/// One fully tokenised and padded training sample.
/// Sequence format: [CLS] sentence [SEP] [PAD]...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreSample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub label:          usize,
}

impl GenreSample {
    pub fn from_encoded(encoded: EncodedExample, label: usize) -> Self {
        Self {
            input_ids:      encoded.input_ids,
            attention_mask: encoded.attention_mask,
            label,
        }
    }

    pub fn real_token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

pub struct GenreDataset {
    samples: Vec<GenreSample>,
}

impl GenreDataset {
    pub fn new(samples: Vec<GenreSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<GenreSample> for GenreDataset {
    fn get(&self, index: usize) -> Option<GenreSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
