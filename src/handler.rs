//! Inference handler: owns the model lifecycle and turns request payloads into predictions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::error::{Result, ServeError};
use crate::pipelines::classification::{ClassificationPipeline, PipelineLoader};

/// Body of `POST /invocations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub inputs: Vec<String>,
}

/// Response of `POST /invocations`: one label per input, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub predictions: Vec<String>,
}

/// Loads a classification pipeline once and serves predictions from it.
///
/// Starts uninitialized. [`initialize`](Self::initialize) flips it to ready for
/// the rest of the process lifetime; the pipeline is read-only afterwards, so
/// the handler can be shared across request threads.
pub struct ModelHandler<L: PipelineLoader> {
    loader: L,
    pipeline: OnceLock<ClassificationPipeline<L::Model>>,
}

impl<L: PipelineLoader> ModelHandler<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            pipeline: OnceLock::new(),
        }
    }

    /// Load tokenizer and model. Blocking.
    ///
    /// A second call after success does nothing.
    pub fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            debug!("Model already initialized, skipping load");
            return Ok(());
        }

        info!(source = %self.loader.describe(), "Initializing model...");
        let pipeline = self.loader.load()?;
        let labels = pipeline.labels().len();

        if self.pipeline.set(pipeline).is_err() {
            debug!("Model was initialized concurrently, keeping the first instance");
        }
        info!(num_labels = labels, "...done.");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.pipeline.get().is_some()
    }

    /// Extract the sentence list from the `inputs` key.
    pub fn preprocess(&self, data: Value) -> Result<Vec<String>> {
        let request: InvocationRequest = serde_json::from_value(data)
            .map_err(|e| ServeError::InvalidRequest(e.to_string()))?;
        Ok(request.inputs)
    }

    /// Classify `sentences` in one padded batch, returning one label per sentence.
    pub fn inference(&self, sentences: &[String]) -> Result<Vec<String>> {
        let pipeline = self.pipeline.get().ok_or(ServeError::NotInitialized)?;

        let texts: Vec<&str> = sentences.iter().map(String::as_str).collect();
        let output = pipeline.run(&texts)?;

        debug!(
            items = output.stats.items_processed,
            padded_len = output.stats.padded_len,
            elapsed_ms = output.stats.total_time.as_secs_f64() * 1000.0,
            items_per_second = output.stats.items_per_second(),
            scores = ?output.predictions.iter().map(|p| p.score).collect::<Vec<_>>(),
            "Batch classified"
        );

        Ok(output.into_labels())
    }

    /// preprocess → inference → wrap under `predictions`.
    ///
    /// An empty input list never reaches the model.
    pub fn handle(&self, data: Value) -> Result<InvocationResponse> {
        let instances = self.preprocess(data)?;

        let predictions = if instances.is_empty() {
            Vec::new()
        } else {
            self.inference(&instances)?
        };

        Ok(InvocationResponse { predictions })
    }

    pub fn pipeline(&self) -> Option<&ClassificationPipeline<L::Model>> {
        self.pipeline.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_requires_inputs() {
        let err = serde_json::from_value::<InvocationRequest>(json!({"text": "hi"})).unwrap_err();
        assert!(err.to_string().contains("inputs"));
    }

    #[test]
    fn request_rejects_non_string_inputs() {
        assert!(serde_json::from_value::<InvocationRequest>(json!({"inputs": [1, 2]})).is_err());
        assert!(serde_json::from_value::<InvocationRequest>(json!({"inputs": "one"})).is_err());
    }

    #[test]
    fn response_serializes_under_predictions() {
        let response = InvocationResponse {
            predictions: vec!["POSITIVE".into(), "NEGATIVE".into()],
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"predictions": ["POSITIVE", "NEGATIVE"]})
        );
    }
}
