use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::modernbert::{
    ClassifierConfig as CandleClassifierConfig, ClassifierPooling, Config,
    ModernBertForSequenceClassification as CandleModernBertForSequenceClassification,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, ServeError};
use crate::labels::LabelMap;
use crate::loaders::{AssetLocation, ClassifierConfig, WeightsLoader};
use crate::pipelines::classification::SequenceClassificationModel;

/// ModernBERT with a sequence-classification head.
#[derive(Clone)]
pub struct ModernBertClassifier {
    model: CandleModernBertForSequenceClassification,
    device: Device,
    labels: LabelMap,
    pad_token_id: u32,
}

#[derive(Deserialize)]
struct PoolingJson {
    #[serde(default)]
    classifier_pooling: ClassifierPooling,
}

impl ModernBertClassifier {
    pub const MODEL_TYPE: &'static str = "modernbert";

    pub fn load(
        location: &AssetLocation,
        config: ClassifierConfig,
        device: Device,
    ) -> Result<Self> {
        let mut candle_config: Config = serde_json::from_str(&config.raw)
            .map_err(|e| ServeError::ModelFormat(format!("Invalid ModernBERT config: {e}")))?;
        let pooling: PoolingJson = serde_json::from_str(&config.raw)
            .map_err(|e| ServeError::ModelFormat(format!("Invalid classifier_pooling: {e}")))?;

        patch_classifier_config(&mut candle_config, &config.labels, pooling.classifier_pooling);

        let weights_path = WeightsLoader::new(location.clone()).load()?;
        let vb = load_var_builder(&weights_path, &device)?;
        let model = CandleModernBertForSequenceClassification::load(vb, &candle_config)?;

        Ok(Self {
            model,
            device,
            labels: config.labels,
            pad_token_id: candle_config.pad_token_id,
        })
    }
}

impl SequenceClassificationModel for ModernBertClassifier {
    fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        Ok(self.model.forward(input_ids, attention_mask)?)
    }

    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn pad_token_id(&self) -> Option<u32> {
        Some(self.pad_token_id)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

// Hub configs carry integer label2id values, which candle's flattened
// classifier config cannot parse, so the head is always rebuilt from id2label.
fn patch_classifier_config(config: &mut Config, labels: &LabelMap, pooling: ClassifierPooling) {
    let id2label = labels.to_id2label();
    let label2id: HashMap<String, String> = id2label
        .iter()
        .map(|(k, v)| (v.clone(), k.clone()))
        .collect();

    config.classifier_config = Some(CandleClassifierConfig {
        id2label,
        label2id,
        classifier_pooling: pooling,
    });
}

fn load_var_builder(weights_path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? }
    } else {
        VarBuilder::from_pth(weights_path, DType::F32, device)?
    };
    Ok(vb)
}
