use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use lookalike::{LookalikeConfig, SearchSession};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Query pipeline (shared across requests)
    pub session: Arc<SearchSession>,
}

impl ServerState {
    /// Wrap an already-built session
    pub fn new(config: ServerConfig, session: SearchSession) -> Self {
        Self {
            config: Arc::new(config),
            session: Arc::new(session),
        }
    }

    /// Build the pipeline from `config.pipeline_config` for `project`
    pub fn from_config(config: ServerConfig, project: impl Into<String>) -> ServerResult<Self> {
        let path = config.pipeline_config.as_ref().ok_or_else(|| {
            ServerError::Config(
                "pipeline_config must point at a YAML file naming search.index_endpoint".into(),
            )
        })?;
        let pipeline = LookalikeConfig::from_file(path)
            .map_err(|e| ServerError::Config(e.to_string()))?
            .with_project(project);

        let session = SearchSession::from_config(&pipeline)
            .map_err(|e| ServerError::Config(e.to_string()))?;

        tracing::info!(
            project = %pipeline.embedding.project,
            model = %pipeline.embedding.model,
            deployed_index_id = %pipeline.search.deployed_index_id,
            num_neighbors = pipeline.search.num_neighbors,
            "search session ready"
        );

        Ok(Self::new(config, session))
    }
}
