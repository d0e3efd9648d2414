use super::model::SequenceClassificationModel;
use super::pipeline::ClassificationPipeline;
use crate::config::ModelSource;
use crate::error::Result;
use crate::loaders::{ClassifierConfigLoader, TokenizerLoader};
use crate::models::AutoClassifier;
use crate::pipelines::utils::DeviceRequest;
use tracing::info;

/// Anything that can produce a ready [`ClassificationPipeline`].
///
/// The inference handler loads its pipeline through this seam exactly once.
pub trait PipelineLoader: Send + Sync + 'static {
    type Model: SequenceClassificationModel + 'static;

    fn load(&self) -> Result<ClassificationPipeline<Self::Model>>;

    /// Human-readable description of what gets loaded, for logs.
    fn describe(&self) -> String {
        std::any::type_name::<Self::Model>().to_string()
    }
}

/// Builds a pipeline from a tokenizer location and a model location.
///
/// The architecture is picked from the model's `config.json`.
#[derive(Debug, Clone)]
pub struct ClassificationPipelineBuilder {
    source: ModelSource,
    device_request: DeviceRequest,
}

impl ClassificationPipelineBuilder {
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            device_request: DeviceRequest::default(),
        }
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    pub fn device_request(mut self, request: DeviceRequest) -> Self {
        self.device_request = request;
        self
    }

    pub fn build(&self) -> Result<ClassificationPipeline<AutoClassifier>> {
        let device = self.device_request.clone().resolve()?;

        let tokenizer = TokenizerLoader::new(self.source.tokenizer.clone()).load()?;
        let config = ClassifierConfigLoader::new(self.source.model.clone()).load()?;
        let model = AutoClassifier::load(&self.source.model, config, device)?;
        info!(
            model_type = model.model_type(),
            num_labels = model.labels().len(),
            "Loaded sequence classifier"
        );

        Ok(ClassificationPipeline::new(model, tokenizer))
    }
}

impl PipelineLoader for ClassificationPipelineBuilder {
    type Model = AutoClassifier;

    fn load(&self) -> Result<ClassificationPipeline<AutoClassifier>> {
        self.build()
    }

    fn describe(&self) -> String {
        format!(
            "model={} tokenizer={} device={:?}",
            self.source.model, self.source.tokenizer, self.device_request
        )
    }
}
