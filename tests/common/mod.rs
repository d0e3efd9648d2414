//! Test doubles: a word-level tokenizer and a keyword-counting classifier.

#![allow(dead_code)]

use candle_core::{Device, Tensor};
use classification_server::error::{Result, ServeError};
use classification_server::{
    ClassificationPipeline, LabelMap, PipelineLoader, SequenceClassificationModel,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokenizers::Tokenizer;

pub const PAD_ID: u32 = 0;

pub const TOKENIZER_JSON: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [],
  "normalizer": {"type": "Lowercase"},
  "pre_tokenizer": {"type": "Whitespace"},
  "post_processor": null,
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": {
      "[PAD]": 0,
      "[UNK]": 1,
      "great": 2,
      "product": 3,
      "terrible": 4,
      "service": 5,
      "love": 6,
      "awful": 7,
      "okay": 8
    },
    "unk_token": "[UNK]"
  }
}"#;

pub const CONFIG_JSON: &str = r#"{
  "model_type": "modernbert",
  "id2label": {"0": "NEGATIVE", "1": "POSITIVE", "2": "NEUTRAL"},
  "label2id": {"NEGATIVE": 0, "POSITIVE": 1, "NEUTRAL": 2}
}"#;

const POSITIVE_IDS: [u32; 2] = [2, 6];
const NEGATIVE_IDS: [u32; 2] = [4, 7];

pub fn word_tokenizer() -> Tokenizer {
    Tokenizer::from_str(TOKENIZER_JSON).expect("test tokenizer parses")
}

pub fn sentiment_labels() -> LabelMap {
    let table: HashMap<String, String> = [("0", "NEGATIVE"), ("1", "POSITIVE"), ("2", "NEUTRAL")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    LabelMap::from_id2label(&table).expect("labels parse")
}

/// Scores each row by counting positive and negative keywords.
///
/// Logits are `[negatives, positives, 0.5]`, so a row with no keywords is NEUTRAL.
pub struct KeywordModel {
    labels: LabelMap,
    device: Device,
    pub forward_calls: Arc<AtomicUsize>,
}

impl KeywordModel {
    pub fn new(forward_calls: Arc<AtomicUsize>) -> Self {
        Self {
            labels: sentiment_labels(),
            device: Device::Cpu,
            forward_calls,
        }
    }
}

impl SequenceClassificationModel for KeywordModel {
    fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);

        let ids = input_ids.to_vec2::<u32>()?;
        let mask = attention_mask.to_vec2::<u32>()?;

        let mut logits = Vec::with_capacity(ids.len() * 3);
        for (row, mask_row) in ids.iter().zip(&mask) {
            for (id, m) in row.iter().zip(mask_row) {
                if (*m == 0) != (*id == PAD_ID) {
                    return Err(ServeError::Unexpected(format!(
                        "attention mask {m} disagrees with token {id}"
                    )));
                }
            }
            let positives = row.iter().filter(|id| POSITIVE_IDS.contains(id)).count() as f32;
            let negatives = row.iter().filter(|id| NEGATIVE_IDS.contains(id)).count() as f32;
            logits.extend([negatives, positives, 0.5]);
        }

        Ok(Tensor::from_vec(logits, (ids.len(), 3), &self.device)?)
    }

    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn pad_token_id(&self) -> Option<u32> {
        Some(PAD_ID)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

/// Loader that fails with a retryable error `failures` times before succeeding.
#[derive(Default)]
pub struct KeywordLoader {
    pub loads: Arc<AtomicUsize>,
    pub forward_calls: Arc<AtomicUsize>,
    pub failures: usize,
    pub fatal: bool,
}

impl KeywordLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }

    pub fn fatal() -> Self {
        Self {
            fatal: true,
            ..Self::default()
        }
    }
}

impl PipelineLoader for KeywordLoader {
    type Model = KeywordModel;

    fn load(&self) -> Result<ClassificationPipeline<KeywordModel>> {
        let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fatal {
            return Err(ServeError::ModelNotFound("/opt/ml/model/config.json".into()));
        }
        if attempt < self.failures {
            return Err(ServeError::Download("hub temporarily unavailable".into()));
        }
        Ok(ClassificationPipeline::new(
            KeywordModel::new(Arc::clone(&self.forward_calls)),
            word_tokenizer(),
        ))
    }

    fn describe(&self) -> String {
        "keyword test model".into()
    }
}
