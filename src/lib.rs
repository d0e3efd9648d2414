//! # Classification server
//!
//! HTTP inference for pretrained sequence-classification models, powered by
//! [Candle](https://github.com/huggingface/candle).
//!
//! `POST /invocations` takes `{"inputs": [...]}` and answers
//! `{"predictions": [...]}` with one label per input; `GET /ping` reports
//! whether the model is loaded.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod labels;
pub mod loaders;
pub mod models;
pub mod pipelines;
pub mod retry;
pub mod server;

pub use error::{Result, ServeError};
pub use handler::{InvocationRequest, InvocationResponse, ModelHandler};
pub use labels::LabelMap;
pub use pipelines::classification::{
    ClassificationPipeline, ClassificationPipelineBuilder, PipelineLoader,
    SequenceClassificationModel,
};
