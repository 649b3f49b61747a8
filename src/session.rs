use std::sync::Arc;

use embedding::{EmbeddingClient, EmbeddingRequest, EmbeddingResult, EmbeddingService, Modality};
use loader::Loader;
use neighbors::{IndexEndpointClient, NeighborCandidate, NeighborQuery, NeighborSearch};
use ranker::{Presenter, RankedImage};

use crate::{LookalikeConfig, MetricsSpan, PipelineError, QueryMetrics};

/// Everything one user needs to run queries.
///
/// Collaborators are handed in at construction and only read afterwards, so a
/// session can be wrapped in an `Arc` and shared by every request handler.
pub struct SearchSession {
    embedder: Arc<dyn EmbeddingService>,
    search: Arc<dyn NeighborSearch>,
    loader: Loader,
    presenter: Presenter,
    deployed_index_id: String,
    num_neighbors: usize,
    metrics: Option<Arc<dyn QueryMetrics>>,
}

impl SearchSession {
    pub fn builder(
        embedder: Arc<dyn EmbeddingService>,
        search: Arc<dyn NeighborSearch>,
    ) -> SearchSessionBuilder {
        SearchSessionBuilder {
            embedder,
            search,
            loader: None,
            presenter: None,
            deployed_index_id: neighbors::SearchConfig::default().deployed_index_id,
            num_neighbors: neighbors::SearchConfig::default().num_neighbors,
            metrics: None,
        }
    }

    /// Wire up the REST clients described by `config`.
    pub fn from_config(config: &LookalikeConfig) -> Result<Self, PipelineError> {
        let embedder = Arc::new(EmbeddingClient::new(config.embedding.clone())?);
        let search = Arc::new(IndexEndpointClient::new(&config.search)?);
        Ok(Self::builder(embedder, search)
            .presenter(Presenter::new(config.presenter.clone()))
            .deployed_index_id(config.search.deployed_index_id.clone())
            .num_neighbors(config.search.num_neighbors)
            .build())
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }

    /// "Search by text".
    pub async fn search_by_text(&self, text: &str) -> Result<Vec<RankedImage>, PipelineError> {
        self.run(EmbeddingRequest::text(text), Modality::Text).await
    }

    /// "Search by image" with bytes already in hand (e.g. an upload).
    pub async fn search_by_image(
        &self,
        bytes: Vec<u8>,
    ) -> Result<Vec<RankedImage>, PipelineError> {
        self.run(EmbeddingRequest::image(bytes), Modality::Image)
            .await
    }

    /// "Search by image" for a local path or HTTP(S) URL.
    pub async fn search_by_image_uri(
        &self,
        uri: &str,
    ) -> Result<Vec<RankedImage>, PipelineError> {
        let bytes = self
            .loader
            .load(uri)
            .await?
            .ok_or_else(|| PipelineError::ImageUnavailable(uri.to_string()))?;
        self.search_by_image(bytes).await
    }

    pub async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResult, PipelineError> {
        let span = MetricsSpan::start(self.metrics.as_ref());
        let result = self.embedder.get_embedding(request).await;
        if let Some(span) = span {
            span.record_embedding(result.as_ref().map(|_| ()));
        }
        Ok(result?)
    }

    pub async fn find_neighbors(
        &self,
        vector: Vec<f32>,
    ) -> Result<Vec<NeighborCandidate>, PipelineError> {
        let query = NeighborQuery::new(vector, self.num_neighbors, self.deployed_index_id.as_str());
        let span = MetricsSpan::start(self.metrics.as_ref());
        let result = self.search.find_neighbors(&query).await;
        if let Some(span) = span {
            span.record_search(result.as_ref().map(Vec::len));
        }
        Ok(result?)
    }

    pub fn present(&self, candidates: Vec<NeighborCandidate>) -> Vec<RankedImage> {
        let total = candidates.len();
        let span = MetricsSpan::start(self.metrics.as_ref());
        let images = self.presenter.present(candidates);
        if let Some(span) = span {
            span.record_present(images.len(), total - images.len());
        }
        images
    }

    async fn run(
        &self,
        request: EmbeddingRequest,
        modality: Modality,
    ) -> Result<Vec<RankedImage>, PipelineError> {
        let vector = self
            .embed(&request)
            .await?
            .into_vector(modality)
            .ok_or(PipelineError::MissingEmbedding(modality))?;
        tracing::debug!(%modality, dim = vector.len(), "query embedded");

        let candidates = self.find_neighbors(vector).await?;
        let images = self.present(candidates);
        tracing::info!(%modality, results = images.len(), "query completed");
        Ok(images)
    }
}

pub struct SearchSessionBuilder {
    embedder: Arc<dyn EmbeddingService>,
    search: Arc<dyn NeighborSearch>,
    loader: Option<Loader>,
    presenter: Option<Presenter>,
    deployed_index_id: String,
    num_neighbors: usize,
    metrics: Option<Arc<dyn QueryMetrics>>,
}

impl SearchSessionBuilder {
    pub fn loader(mut self, loader: Loader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn presenter(mut self, presenter: Presenter) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn deployed_index_id(mut self, id: impl Into<String>) -> Self {
        self.deployed_index_id = id.into();
        self
    }

    pub fn num_neighbors(mut self, n: usize) -> Self {
        self.num_neighbors = n;
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn QueryMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> SearchSession {
        SearchSession {
            embedder: self.embedder,
            search: self.search,
            loader: self.loader.unwrap_or_default(),
            presenter: self.presenter.unwrap_or_default(),
            deployed_index_id: self.deployed_index_id,
            num_neighbors: self.num_neighbors,
            metrics: self.metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use embedding::EmbeddingError;
    use neighbors::SearchError;
    use ranker::PresenterConfig;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FixedEmbedder {
        calls: Mutex<Vec<EmbeddingRequest>>,
    }

    #[async_trait]
    impl EmbeddingService for FixedEmbedder {
        async fn get_embedding(
            &self,
            request: &EmbeddingRequest,
        ) -> Result<EmbeddingResult, EmbeddingError> {
            self.calls.lock().unwrap().push(request.clone());
            Ok(EmbeddingResult {
                text: request.text_input().map(|_| vec![1.0, 0.0]),
                image: request.image_input().map(|_| vec![0.0, 1.0]),
            })
        }
    }

    struct NoNeighbors;

    #[async_trait]
    impl NeighborSearch for NoNeighbors {
        async fn find_neighbors(
            &self,
            query: &NeighborQuery,
        ) -> Result<Vec<NeighborCandidate>, SearchError> {
            query.validate()?;
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct CountingMetrics {
        events: Mutex<Vec<&'static str>>,
    }

    impl QueryMetrics for CountingMetrics {
        fn record_embedding(&self, _latency: Duration, result: Result<(), &EmbeddingError>) {
            let label = if result.is_ok() { "embed_ok" } else { "embed_err" };
            self.events.lock().unwrap().push(label);
        }

        fn record_search(&self, _latency: Duration, result: Result<usize, &SearchError>) {
            let label = if result.is_ok() { "search_ok" } else { "search_err" };
            self.events.lock().unwrap().push(label);
        }

        fn record_present(&self, _latency: Duration, _shown: usize, _skipped: usize) {
            self.events.lock().unwrap().push("present");
        }
    }

    fn session(metrics: Option<Arc<CountingMetrics>>) -> (Arc<FixedEmbedder>, SearchSession) {
        let embedder = Arc::new(FixedEmbedder {
            calls: Mutex::new(Vec::new()),
        });
        let mut builder = SearchSession::builder(embedder.clone(), Arc::new(NoNeighbors))
            .presenter(Presenter::new(PresenterConfig::default()));
        if let Some(metrics) = metrics {
            builder = builder.metrics(metrics);
        }
        (embedder, builder.build())
    }

    #[tokio::test]
    async fn empty_text_reports_missing_embedding() {
        let (embedder, session) = session(None);
        let err = session.search_by_text("").await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingEmbedding(Modality::Text)));
        assert_eq!(embedder.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn image_search_sends_image_only() {
        let (embedder, session) = session(None);
        let hits = session.search_by_image(vec![7, 7, 7]).await.unwrap();
        assert!(hits.is_empty());

        let calls = embedder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].text.is_none());
        assert_eq!(calls[0].image.as_deref(), Some(&[7u8, 7, 7][..]));
    }

    #[tokio::test]
    async fn missing_local_image_uri_is_loader_error() {
        let (embedder, session) = session(None);
        let err = session
            .search_by_image_uri("/no/such/dir/query.png")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Loader(ref e) if e.is_not_found()));
        assert!(embedder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn metrics_observe_every_stage() {
        let metrics = Arc::new(CountingMetrics::default());
        let (_, session) = session(Some(metrics.clone()));
        session.search_by_text("red car").await.unwrap();

        let events = metrics.events.lock().unwrap().clone();
        assert_eq!(events, vec!["embed_ok", "search_ok", "present"]);
    }

    #[test]
    fn builder_defaults() {
        let (_, session) = session(None);
        assert_eq!(session.num_neighbors(), 20);
        assert_eq!(session.deployed_index_id, "deployed_index_id_unique");
    }
}
