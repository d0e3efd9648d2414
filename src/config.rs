//! Runtime configuration.
//!
//! Values come from CLI flags with environment fallbacks (see [`crate::cli`]).
//! [`ServeConfig::default`] is the built-in defaults only and never reads the
//! environment.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{Result, ServeError};
use crate::loaders::AssetLocation;
use crate::pipelines::utils::DeviceRequest;
use crate::retry::RetryPolicy;

/// Where SageMaker mounts model artifacts inside the serving container.
pub const DEFAULT_MODEL_DIR: &str = "/opt/ml/model";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 30;
/// SageMaker's invocation payload limit.
pub const DEFAULT_MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

pub const TOKENIZER_ENV: &str = "HUGGING_FACE_TOKENIZER";
pub const MODEL_ENV: &str = "HUGGING_FACE_MODEL";

/// Tokenizer and model locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    pub tokenizer: AssetLocation,
    pub model: AssetLocation,
}

impl ModelSource {
    pub fn new(tokenizer: &str, model: &str) -> Self {
        Self {
            tokenizer: AssetLocation::parse(tokenizer),
            model: AssetLocation::parse(model),
        }
    }

    /// Tokenizer and model from the same directory or repo.
    pub fn same(location: &str) -> Self {
        Self::new(location, location)
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub source: ModelSource,
    pub device: DeviceRequest,
    /// How long startup keeps retrying transient failures.
    pub startup_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            source: ModelSource::same(DEFAULT_MODEL_DIR),
            device: DeviceRequest::Cpu,
            startup_timeout: Duration::from_secs(DEFAULT_STARTUP_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServeConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServeError::Bind {
                addr: format!("{}:{}", self.host, self.port),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            })
    }

    pub fn startup_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::startup(self.startup_timeout)
    }
}
