//! YAML configuration for the query pipeline.
//!
//! Every section is optional and falls back to the deployment defaults, so a
//! minimal file only needs the index endpoint:
//!
//! ```yaml
//! version: "1.0"
//!
//! embedding:
//!   location: "us-central1"
//!   api_endpoint: "us-central1-aiplatform.googleapis.com"
//!   model: "multimodalembedding@001"
//!
//! search:
//!   api_endpoint: "1234.us-central1-1045259343465.vdb.vertexai.goog"
//!   index_endpoint: "projects/1045259343465/locations/us-central1/indexEndpoints/116990236218621952"
//!   deployed_index_id: "deployed_index_id_unique"
//!   num_neighbors: 20
//!
//! presenter:
//!   image_directory: "extracted"
//!   columns: 5
//! ```
//!
//! The project id is not part of the file; it is the single startup parameter
//! and gets applied with [`LookalikeConfig::with_project`].

use std::fs;
use std::path::Path;

use embedding::EmbeddingConfig;
use neighbors::SearchConfig;
use ranker::PresenterConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LookalikeConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub presenter: PresenterConfig,
}

impl LookalikeConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: LookalikeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the project the embedding model is billed to.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.embedding.project = project.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        if self.search.num_neighbors == 0 {
            return Err(ConfigLoadError::Validation(
                "search.num_neighbors must be > 0".into(),
            ));
        }
        if self.presenter.columns == 0 {
            return Err(ConfigLoadError::Validation(
                "presenter.columns must be > 0".into(),
            ));
        }
        if self.search.deployed_index_id.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "search.deployed_index_id must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LookalikeConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
            presenter: PresenterConfig::default(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = LookalikeConfig::from_yaml("version: \"1\"\n").unwrap();
        assert_eq!(cfg.search.num_neighbors, 20);
        assert_eq!(cfg.search.deployed_index_id, "deployed_index_id_unique");
        assert_eq!(cfg.presenter.image_directory, PathBuf::from("extracted"));
        assert_eq!(cfg.embedding.model, "multimodalembedding@001");
    }

    #[test]
    fn sections_override_defaults() {
        let yaml = r#"
version: "1.0"
name: "catalog"
search:
  index_endpoint: "projects/1/locations/us-central1/indexEndpoints/2"
  num_neighbors: 8
presenter:
  image_directory: "/data/images"
  columns: 4
"#;
        let cfg = LookalikeConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.name.as_deref(), Some("catalog"));
        assert_eq!(cfg.search.num_neighbors, 8);
        assert_eq!(cfg.search.deployed_index_id, "deployed_index_id_unique");
        assert_eq!(cfg.presenter.columns, 4);
    }

    #[test]
    fn with_project_sets_embedding_project() {
        let cfg = LookalikeConfig::default().with_project("my-project");
        assert_eq!(cfg.embedding.project, "my-project");
    }

    #[test]
    fn rejects_unknown_version() {
        let err = LookalikeConfig::from_yaml("version: \"2\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2"));
    }

    #[test]
    fn rejects_zero_neighbors() {
        let err = LookalikeConfig::from_yaml("search:\n  num_neighbors: 0\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = LookalikeConfig::from_yaml("search: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigLoadError::YamlParse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "presenter:\n  columns: 3").unwrap();
        let cfg = LookalikeConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.presenter.columns, 3);

        let missing = LookalikeConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(missing, ConfigLoadError::FileRead(_)));
    }
}
