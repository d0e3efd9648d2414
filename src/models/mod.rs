pub mod modernbert;

use candle_core::{Device, Tensor};

use crate::error::{Result, ServeError};
use crate::labels::LabelMap;
use crate::loaders::{AssetLocation, ClassifierConfig};
use crate::pipelines::classification::SequenceClassificationModel;

pub use modernbert::ModernBertClassifier;

/// Sequence classifier picked from the `model_type` in a model's `config.json`.
#[derive(Clone)]
pub enum AutoClassifier {
    ModernBert(ModernBertClassifier),
}

impl AutoClassifier {
    pub const SUPPORTED: &'static [&'static str] = &[ModernBertClassifier::MODEL_TYPE];

    pub fn load(
        location: &AssetLocation,
        config: ClassifierConfig,
        device: Device,
    ) -> Result<Self> {
        match config.model_type.as_str() {
            ModernBertClassifier::MODEL_TYPE => Ok(AutoClassifier::ModernBert(
                ModernBertClassifier::load(location, config, device)?,
            )),
            other => Err(ServeError::ModelFormat(format!(
                "Unsupported model_type '{other}'. Supported: {}",
                Self::SUPPORTED.join(", ")
            ))),
        }
    }

    pub fn model_type(&self) -> &'static str {
        match self {
            AutoClassifier::ModernBert(_) => ModernBertClassifier::MODEL_TYPE,
        }
    }
}

impl SequenceClassificationModel for AutoClassifier {
    fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        match self {
            AutoClassifier::ModernBert(m) => m.forward(input_ids, attention_mask),
        }
    }

    fn labels(&self) -> &LabelMap {
        match self {
            AutoClassifier::ModernBert(m) => m.labels(),
        }
    }

    fn pad_token_id(&self) -> Option<u32> {
        match self {
            AutoClassifier::ModernBert(m) => m.pad_token_id(),
        }
    }

    fn device(&self) -> &Device {
        match self {
            AutoClassifier::ModernBert(m) => m.device(),
        }
    }
}
