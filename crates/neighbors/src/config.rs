use serde::{Deserialize, Serialize};

use crate::SearchError;

/// Addressing for a deployed index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Host serving the index endpoint, without scheme. Public endpoints get their own
    /// domain (`<id>.<region>-<project-number>.vdb.vertexai.goog`); private ones use the
    /// regional API host.
    pub api_endpoint: String,
    /// Index endpoint resource name
    /// (`projects/{number}/locations/{region}/indexEndpoints/{id}`).
    pub index_endpoint: String,
    /// Deployed index id to query on that endpoint.
    pub deployed_index_id: String,
    /// Neighbors requested per query.
    pub num_neighbors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "us-central1-aiplatform.googleapis.com".into(),
            index_endpoint: String::new(),
            deployed_index_id: "deployed_index_id_unique".into(),
            num_neighbors: 20,
            auth_header: None,
            api_timeout_secs: None,
        }
    }
}

impl SearchConfig {
    /// REST URL of the `:findNeighbors` method.
    pub fn find_neighbors_url(&self) -> String {
        format!(
            "https://{}/v1/{}:findNeighbors",
            self.api_endpoint, self.index_endpoint
        )
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.index_endpoint.trim().is_empty() {
            return Err(SearchError::InvalidConfig(
                "index_endpoint must not be empty".into(),
            ));
        }
        if self.deployed_index_id.trim().is_empty() {
            return Err(SearchError::InvalidConfig(
                "deployed_index_id must not be empty".into(),
            ));
        }
        if self.num_neighbors == 0 {
            return Err(SearchError::InvalidConfig(
                "num_neighbors must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.deployed_index_id, "deployed_index_id_unique");
        assert_eq!(cfg.num_neighbors, 20);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn find_neighbors_url_targets_endpoint() {
        let cfg = SearchConfig {
            api_endpoint: "1234.us-central1-99.vdb.vertexai.goog".into(),
            index_endpoint: "projects/99/locations/us-central1/indexEndpoints/42".into(),
            ..SearchConfig::default()
        };
        assert_eq!(
            cfg.find_neighbors_url(),
            "https://1234.us-central1-99.vdb.vertexai.goog/v1/projects/99/locations/us-central1/indexEndpoints/42:findNeighbors"
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_neighbors_is_invalid() {
        let cfg = SearchConfig {
            index_endpoint: "projects/1/locations/x/indexEndpoints/2".into(),
            num_neighbors: 0,
            ..SearchConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SearchError::InvalidConfig(_))));
    }
}
