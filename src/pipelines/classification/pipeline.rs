use super::model::SequenceClassificationModel;
use crate::error::{Result, ServeError};
use crate::labels::LabelMap;
use crate::pipelines::stats::InferenceStats;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::ops::softmax;
use tokenizers::{Encoding, Tokenizer};

// ============ Output types ============

/// A single classification with label, class index and confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Label from the model's id2label table.
    pub label: String,
    /// Index of the highest logit.
    pub class_id: u32,
    /// Softmax probability of the predicted class (0.0 to 1.0).
    pub score: f32,
}

/// Output of [`ClassificationPipeline::run`], one prediction per input in input order.
#[derive(Debug, Clone)]
pub struct ClassificationOutput {
    pub predictions: Vec<Prediction>,
    pub stats: InferenceStats,
}

impl ClassificationOutput {
    pub fn labels(&self) -> Vec<String> {
        self.predictions.iter().map(|p| p.label.clone()).collect()
    }

    pub fn into_labels(self) -> Vec<String> {
        self.predictions.into_iter().map(|p| p.label).collect()
    }
}

// ============ Pipeline ============

/// Tokenizer plus sequence-classification model.
///
/// Construct with [`ClassificationPipelineBuilder`](super::ClassificationPipelineBuilder),
/// or [`ClassificationPipeline::new`] when the parts are already loaded.
pub struct ClassificationPipeline<M: SequenceClassificationModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: SequenceClassificationModel> ClassificationPipeline<M> {
    pub fn new(model: M, tokenizer: Tokenizer) -> Self {
        Self { model, tokenizer }
    }

    /// Classify a batch of texts.
    ///
    /// Inputs are padded to the longest sequence and run through the model in
    /// one forward pass. A tokenization or model failure fails the whole batch.
    pub fn run(&self, texts: &[&str]) -> Result<ClassificationOutput> {
        let stats_builder = InferenceStats::start();

        if texts.is_empty() {
            return Ok(ClassificationOutput {
                predictions: vec![],
                stats: stats_builder.finish(0, 0),
            });
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| ServeError::Tokenization(format!("Batch tokenization failed: {e}")))?;

        let (input_ids, attention_mask, max_len) =
            pad_batch(&encodings, self.pad_token_id(), self.model.device())?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let (rows, _num_labels) = logits.dims2()?;
        if rows != texts.len() {
            return Err(ServeError::ModelFormat(format!(
                "Model returned {rows} rows of logits for {} inputs",
                texts.len()
            )));
        }

        let predictions = predictions_from_logits(&logits, self.model.labels())?;

        Ok(ClassificationOutput {
            predictions,
            stats: stats_builder.finish(texts.len(), max_len),
        })
    }

    pub fn labels(&self) -> &LabelMap {
        self.model.labels()
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &Device {
        self.model.device()
    }

    fn pad_token_id(&self) -> u32 {
        self.tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| self.model.pad_token_id())
            .or_else(|| self.tokenizer.token_to_id("<pad>"))
            .or_else(|| self.tokenizer.token_to_id("[PAD]"))
            .unwrap_or(0)
    }
}

/// Right-pad every encoding to the longest one; padded positions get mask 0.
fn pad_batch(
    encodings: &[Encoding],
    pad_token_id: u32,
    device: &Device,
) -> Result<(Tensor, Tensor, usize)> {
    let max_len = encodings.iter().map(|e| e.len()).max().unwrap_or(0);
    if max_len == 0 {
        return Err(ServeError::Tokenization(
            "All inputs tokenized to empty sequences".into(),
        ));
    }

    let mut all_token_ids: Vec<u32> = Vec::with_capacity(encodings.len() * max_len);
    let mut all_attention_masks: Vec<u32> = Vec::with_capacity(encodings.len() * max_len);

    for encoding in encodings {
        let mut token_ids = encoding.get_ids().to_vec();
        let mut attention_mask = encoding.get_attention_mask().to_vec();
        token_ids.resize(max_len, pad_token_id);
        attention_mask.resize(max_len, 0);
        all_token_ids.extend(token_ids);
        all_attention_masks.extend(attention_mask);
    }

    let batch_size = encodings.len();
    let input_ids = Tensor::from_vec(all_token_ids, (batch_size, max_len), device)?;
    let attention_mask = Tensor::from_vec(all_attention_masks, (batch_size, max_len), device)?;

    Ok((input_ids, attention_mask, max_len))
}

fn predictions_from_logits(logits: &Tensor, labels: &LabelMap) -> Result<Vec<Prediction>> {
    let logits = logits.to_dtype(DType::F32)?;
    let pred_ids = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;
    let probs = softmax(&logits, D::Minus1)?.to_vec2::<f32>()?;

    pred_ids
        .into_iter()
        .zip(probs)
        .map(|(class_id, row)| {
            let score = row.get(class_id as usize).copied().unwrap_or(0.0);
            let label = labels.label(class_id)?.to_string();
            Ok(Prediction {
                label,
                class_id,
                score,
            })
        })
        .collect()
}
