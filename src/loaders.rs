use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use crate::error::{Result, ServeError};
use crate::labels::LabelMap;

/// Where model or tokenizer files live: a local directory or a Hugging Face Hub repo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Local(PathBuf),
    Hub(String),
}

impl AssetLocation {
    /// Anything that exists on disk or reads like a filesystem path is local;
    /// everything else is treated as a hub repo id (e.g. `org/model-name`).
    pub fn parse(location: &str) -> Self {
        let path = Path::new(location);
        let looks_like_path = path.is_absolute()
            || location.starts_with('.')
            || location.starts_with('~')
            || location.contains('\\');

        if path.exists() || looks_like_path {
            AssetLocation::Local(path.to_path_buf())
        } else {
            AssetLocation::Hub(location.to_string())
        }
    }

    /// Resolve a file inside this location, downloading it for hub repos.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf> {
        match self {
            AssetLocation::Local(dir) => {
                let path = dir.join(filename);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(ServeError::ModelNotFound(path.display().to_string()))
                }
            }
            AssetLocation::Hub(repo_id) => {
                let api = Api::new()?;
                let repo = api.repo(Repo::new(repo_id.clone(), RepoType::Model));
                repo.get(filename).map_err(|e| {
                    ServeError::Download(format!(
                        "Failed to download '{filename}' from '{repo_id}': {e}"
                    ))
                })
            }
        }
    }

    /// Resolve the first of `filenames` that this location provides.
    pub fn resolve_any(&self, filenames: &[&str]) -> Result<PathBuf> {
        let mut last_err = None;
        for filename in filenames {
            match self.resolve(filename) {
                Ok(path) => return Ok(path),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            ServeError::ModelNotFound(format!("{self}: no candidate files given"))
        }))
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLocation::Local(path) => write!(f, "{}", path.display()),
            AssetLocation::Hub(repo) => write!(f, "hf://{repo}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub location: AssetLocation,
    pub filename: String,
}

impl TokenizerLoader {
    pub fn new(location: AssetLocation) -> Self {
        Self {
            location,
            filename: "tokenizer.json".into(),
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer_file_path = self.location.resolve(&self.filename).map_err(|e| match e {
            ServeError::ModelNotFound(path) => ServeError::TokenizerNotFound(path),
            other => other,
        })?;
        let path_str = tokenizer_file_path.display().to_string();

        Tokenizer::from_file(&tokenizer_file_path).map_err(|e| {
            ServeError::Tokenization(format!(
                "Failed to load tokenizer from '{}': {}",
                path_str, e
            ))
        })
    }
}

/// The parts of a model's `config.json` the classifier needs up front.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub model_type: String,
    pub labels: LabelMap,
    /// Full file contents, for architecture-specific parsing.
    pub raw: String,
}

#[derive(Deserialize)]
struct RawClassifierConfig {
    #[serde(default)]
    model_type: Option<String>,
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    num_labels: Option<usize>,
}

impl ClassifierConfig {
    pub fn from_json(raw: String) -> Result<Self> {
        let parsed: RawClassifierConfig = serde_json::from_str(&raw)
            .map_err(|e| ServeError::ModelFormat(format!("Invalid config.json: {e}")))?;

        let model_type = parsed.model_type.ok_or_else(|| {
            ServeError::ModelFormat("config.json does not declare a model_type".into())
        })?;

        let labels = if !parsed.id2label.is_empty() {
            LabelMap::from_id2label(&parsed.id2label)?
        } else if let Some(n) = parsed.num_labels.filter(|n| *n > 0) {
            LabelMap::with_default_labels(n)
        } else {
            return Err(ServeError::ModelFormat(
                "config.json has neither id2label nor num_labels; not a classification model"
                    .into(),
            ));
        };

        Ok(Self {
            model_type,
            labels,
            raw,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierConfigLoader {
    pub location: AssetLocation,
    pub filename: String,
}

impl ClassifierConfigLoader {
    pub fn new(location: AssetLocation) -> Self {
        Self {
            location,
            filename: "config.json".into(),
        }
    }

    pub fn load(&self) -> Result<ClassifierConfig> {
        let config_path = self.location.resolve(&self.filename)?;
        let raw = std::fs::read_to_string(&config_path)?;
        ClassifierConfig::from_json(raw)
    }
}

/// Locates model weights, preferring safetensors over pickled PyTorch checkpoints.
#[derive(Debug, Clone)]
pub struct WeightsLoader {
    pub location: AssetLocation,
}

impl WeightsLoader {
    pub const CANDIDATES: [&'static str; 2] = ["model.safetensors", "pytorch_model.bin"];

    pub fn new(location: AssetLocation) -> Self {
        Self { location }
    }

    pub fn load(&self) -> Result<PathBuf> {
        self.location.resolve_any(&Self::CANDIDATES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths_and_repo_ids() {
        assert_eq!(
            AssetLocation::parse("/opt/ml/model"),
            AssetLocation::Local(PathBuf::from("/opt/ml/model"))
        );
        assert_eq!(
            AssetLocation::parse("./model"),
            AssetLocation::Local(PathBuf::from("./model"))
        );
        assert_eq!(
            AssetLocation::parse("clapAI/modernBERT-base-multilingual-sentiment"),
            AssetLocation::Hub("clapAI/modernBERT-base-multilingual-sentiment".into())
        );
    }

    #[test]
    fn missing_local_file_is_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let location = AssetLocation::Local(dir.path().to_path_buf());
        let err = location.resolve("config.json").unwrap_err();
        assert!(matches!(err, ServeError::ModelNotFound(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn missing_tokenizer_maps_to_tokenizer_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let loader = TokenizerLoader::new(AssetLocation::Local(dir.path().to_path_buf()));
        assert!(matches!(
            loader.load(),
            Err(ServeError::TokenizerNotFound(_))
        ));
    }

    #[test]
    fn weights_prefer_safetensors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pytorch_model.bin"), b"").unwrap();
        std::fs::write(dir.path().join("model.safetensors"), b"").unwrap();
        let loader = WeightsLoader::new(AssetLocation::Local(dir.path().to_path_buf()));
        let path = loader.load().unwrap();
        assert_eq!(path.file_name().unwrap(), "model.safetensors");
    }

    #[test]
    fn weights_fall_back_to_pytorch_bin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pytorch_model.bin"), b"").unwrap();
        let loader = WeightsLoader::new(AssetLocation::Local(dir.path().to_path_buf()));
        let path = loader.load().unwrap();
        assert_eq!(path.file_name().unwrap(), "pytorch_model.bin");
    }

    #[test]
    fn config_reads_id2label() {
        let raw = r#"{
            "model_type": "modernbert",
            "id2label": {"0": "negative", "1": "neutral", "2": "positive"},
            "label2id": {"negative": 0, "neutral": 1, "positive": 2}
        }"#;
        let config = ClassifierConfig::from_json(raw.to_string()).unwrap();
        assert_eq!(config.model_type, "modernbert");
        assert_eq!(config.labels.len(), 3);
        assert_eq!(config.labels.label(2).unwrap(), "positive");
    }

    #[test]
    fn config_falls_back_to_num_labels() {
        let raw = r#"{"model_type": "modernbert", "num_labels": 2}"#;
        let config = ClassifierConfig::from_json(raw.to_string()).unwrap();
        assert_eq!(config.labels.label(1).unwrap(), "LABEL_1");
    }

    #[test]
    fn config_without_labels_is_rejected() {
        let raw = r#"{"model_type": "modernbert"}"#;
        assert!(matches!(
            ClassifierConfig::from_json(raw.to_string()),
            Err(ServeError::ModelFormat(_))
        ));
    }

    #[test]
    fn loader_reads_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"model_type": "modernbert", "id2label": {"0": "NEGATIVE", "1": "POSITIVE"}}"#,
        )
        .unwrap();
        let loader = ClassifierConfigLoader::new(AssetLocation::Local(dir.path().to_path_buf()));
        let config = loader.load().unwrap();
        assert_eq!(config.labels.label(0).unwrap(), "NEGATIVE");
    }
}
