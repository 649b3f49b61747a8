use serde::{Deserialize, Serialize};

use crate::EmbeddingError;

/// Where the multimodal model lives and how to reach it.
///
/// # Example
/// ```
/// use embedding::EmbeddingConfig;
///
/// let cfg = EmbeddingConfig::for_project("my-project");
/// assert_eq!(
///     cfg.endpoint(),
///     "projects/my-project/locations/us-central1/publishers/google/models/multimodalembedding@001"
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Cloud project (tenant) that owns the prediction quota.
    pub project: String,
    /// Region hosting the model.
    pub location: String,
    /// Regional API host, without scheme.
    pub api_endpoint: String,
    /// Model publisher segment of the resource name.
    pub publisher: String,
    /// Model id, including its version suffix.
    pub model: String,
    /// Pre-minted `Authorization` header value (e.g. `"Bearer ya29..."`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<String>,
    /// Overall request timeout. `None` waits for as long as the endpoint takes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_timeout_secs: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            location: "us-central1".into(),
            api_endpoint: "us-central1-aiplatform.googleapis.com".into(),
            publisher: "google".into(),
            model: "multimodalembedding@001".into(),
            auth_header: None,
            api_timeout_secs: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Self::default()
        }
    }

    /// Fully qualified model resource name.
    pub fn endpoint(&self) -> String {
        format!(
            "projects/{}/locations/{}/publishers/{}/models/{}",
            self.project, self.location, self.publisher, self.model
        )
    }

    /// REST URL of the `:predict` method for [`endpoint`](Self::endpoint).
    pub fn predict_url(&self) -> String {
        format!("https://{}/v1/{}:predict", self.api_endpoint, self.endpoint())
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.project.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig(
                "project must not be empty".into(),
            ));
        }
        if self.location.trim().is_empty() || self.api_endpoint.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig(
                "location and api_endpoint are required".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig("model must not be empty".into()));
        }
        Ok(())
    }
}
