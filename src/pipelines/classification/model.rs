use crate::error::Result;
use crate::labels::LabelMap;
use candle_core::{Device, Tensor};

/// A model that maps a padded token batch to per-class logits.
pub trait SequenceClassificationModel: Send + Sync {
    /// `input_ids` and `attention_mask` are `(batch, seq_len)` u32 tensors.
    /// Returns logits shaped `(batch, num_labels)`.
    fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor>;

    fn labels(&self) -> &LabelMap;

    /// Pad id from the model config, used when the tokenizer does not declare one.
    fn pad_token_id(&self) -> Option<u32> {
        None
    }

    fn device(&self) -> &Device;
}
