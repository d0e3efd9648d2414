//! Sequence classification pipeline.
//!
//! Classify a batch of texts with a pretrained model, mapping the top logit of
//! each input to the label declared in the model's `id2label` table.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use classification_server::config::ModelSource;
//! use classification_server::pipelines::classification::ClassificationPipelineBuilder;
//!
//! # fn main() -> classification_server::error::Result<()> {
//! let source = ModelSource::same("clapAI/modernBERT-base-multilingual-sentiment");
//! let pipeline = ClassificationPipelineBuilder::new(source).cpu().build()?;
//!
//! let output = pipeline.run(&["great product", "terrible service"])?;
//! for p in &output.predictions {
//!     println!("{} ({:.2})", p.label, p.score);
//! }
//! # Ok(())
//! # }
//! ```

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

pub use builder::{ClassificationPipelineBuilder, PipelineLoader};
pub use model::SequenceClassificationModel;
pub use pipeline::{ClassificationOutput, ClassificationPipeline, Prediction};
