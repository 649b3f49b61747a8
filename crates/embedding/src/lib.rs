//! Multimodal embedding client.
//!
//! Turns a piece of text, an image, or both into fixed-length vectors by calling
//! a remote prediction endpoint (by default Google's `multimodalembedding@001`).
//! The crate does no inference of its own: it builds the request instance,
//! sends one `:predict` call and pulls the per-modality vectors back out.
//!
//! Key behaviour:
//!
//! - Text is sent as-is under `text`; image bytes are base64-encoded under
//!   `image.bytesBase64Encoded`.
//! - A vector is only read back for a modality that was actually sent, so a
//!   text-only query never carries an image vector and vice versa.
//! - An empty request short-circuits: no call is made and both vectors are absent.
//! - No retry, no backoff. A failed call is returned to the caller untouched.
//!
//! ## Example
//!
//! ```no_run
//! use embedding::{EmbeddingClient, EmbeddingConfig, EmbeddingRequest, EmbeddingService};
//!
//! # async fn run() -> Result<(), embedding::EmbeddingError> {
//! let client = EmbeddingClient::new(EmbeddingConfig::for_project("my-project"))?;
//! let result = client.get_embedding(&EmbeddingRequest::text("red car")).await?;
//! assert!(result.image.is_none());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod types;

mod api;

pub use crate::api::{
    build_instance, build_predict_body, decode_instance_image, HttpTransport, PredictionTransport,
};
pub use crate::config::EmbeddingConfig;
pub use crate::error::EmbeddingError;
pub use crate::types::{EmbeddingRequest, EmbeddingResult, Modality};

use async_trait::async_trait;

use crate::api::parse_prediction;

/// Anything that can embed an [`EmbeddingRequest`]. The query pipeline depends on this seam
/// rather than on a concrete client.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn get_embedding(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResult, EmbeddingError>;
}

/// Prediction client bound to one project/region/model.
///
/// Construct once and share; it holds no per-request state.
pub struct EmbeddingClient<T = HttpTransport> {
    config: EmbeddingConfig,
    predict_url: String,
    transport: T,
}

impl EmbeddingClient<HttpTransport> {
    /// Build a client using the REST transport.
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let transport = HttpTransport::from_config(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: PredictionTransport> EmbeddingClient<T> {
    pub fn with_transport(config: EmbeddingConfig, transport: T) -> Result<Self, EmbeddingError> {
        config.validate()?;
        let predict_url = config.predict_url();
        Ok(Self {
            config,
            predict_url,
            transport,
        })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: PredictionTransport> EmbeddingService for EmbeddingClient<T> {
    async fn get_embedding(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResult, EmbeddingError> {
        if request.is_empty() {
            tracing::debug!("empty embedding request, skipping prediction call");
            return Ok(EmbeddingResult::default());
        }

        let want_text = request.has(Modality::Text);
        let want_image = request.has(Modality::Image);
        let body = build_predict_body(vec![build_instance(request)]);

        tracing::debug!(
            model = %self.config.model,
            text = want_text,
            image = want_image,
            "sending prediction request"
        );
        let response = self.transport.predict(&self.predict_url, body).await?;
        let result = parse_prediction(response, want_text, want_image)?;

        tracing::debug!(
            text_dim = result.text.as_ref().map(Vec::len),
            image_dim = result.image.as_ref().map(Vec::len),
            "prediction parsed"
        );
        Ok(result)
    }
}
