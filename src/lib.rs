//! Umbrella crate for the lookalike image search pipeline.
//!
//! A query is one user action: a piece of text or an image goes to the
//! multimodal embedding model, the resulting vector goes to a deployed ANN
//! index, and the returned neighbors are ranked and resolved to locally stored
//! images. [`SearchSession`] owns the collaborators for that flow and runs it
//! one stage at a time.
//!
//! ```no_run
//! use lookalike::{LookalikeConfig, SearchSession};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LookalikeConfig::from_file("lookalike.yaml")?.with_project("my-project");
//! let session = SearchSession::from_config(&config)?;
//! for hit in session.search_by_text("red car").await? {
//!     println!("{} {} {}", hit.rank, hit.distance, hit.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
mod session;

pub use config::{ConfigLoadError, LookalikeConfig};
pub use embedding::{
    EmbeddingClient, EmbeddingConfig, EmbeddingError, EmbeddingRequest, EmbeddingResult,
    EmbeddingService, Modality,
};
pub use loader::{load_image_bytes, ImageSource, Loader, LoaderError};
pub use neighbors::{
    IndexEndpointClient, NeighborCandidate, NeighborQuery, NeighborSearch, SearchConfig,
    SearchError,
};
pub use ranker::{is_safe_id, rank_candidates, Presenter, PresenterConfig, RankedImage};
pub use session::{SearchSession, SearchSessionBuilder};

use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur while running a query through the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("image load failure: {0}")]
    Loader(#[from] LoaderError),

    #[error("image at {0} could not be fetched")]
    ImageUnavailable(String),

    #[error("embedding failure: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedding response carried no {0} vector")]
    MissingEmbedding(Modality),

    #[error("neighbor search failure: {0}")]
    Search(#[from] SearchError),
}

/// Observer for per-stage latency and outcome.
pub trait QueryMetrics: Send + Sync {
    fn record_embedding(&self, latency: Duration, result: Result<(), &EmbeddingError>);
    fn record_search(&self, latency: Duration, result: Result<usize, &SearchError>);
    fn record_present(&self, latency: Duration, shown: usize, skipped: usize);
}

struct MetricsSpan<'a> {
    recorder: &'a Arc<dyn QueryMetrics>,
    start: Instant,
}

impl<'a> MetricsSpan<'a> {
    fn start(recorder: Option<&'a Arc<dyn QueryMetrics>>) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_embedding(self, result: Result<(), &EmbeddingError>) {
        self.recorder
            .record_embedding(self.start.elapsed(), result);
    }

    fn record_search(self, result: Result<usize, &SearchError>) {
        self.recorder.record_search(self.start.elapsed(), result);
    }

    fn record_present(self, shown: usize, skipped: usize) {
        self.recorder
            .record_present(self.start.elapsed(), shown, skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_wraps_stage_errors() {
        let err: PipelineError = EmbeddingError::Request("HTTP error 500".into()).into();
        assert!(err.to_string().starts_with("embedding failure"));

        let err: PipelineError = SearchError::EmptyQuery.into();
        assert!(err.to_string().contains("empty query vector"));

        let err = PipelineError::MissingEmbedding(Modality::Image);
        assert_eq!(err.to_string(), "embedding response carried no image vector");
    }
}
