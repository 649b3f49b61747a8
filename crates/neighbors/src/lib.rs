//! Neighbor search against a managed ANN index.
//!
//! The index itself is someone else's problem. This crate only knows how to ask
//! a deployed index for the `k` nearest neighbors of one query vector and how
//! to read the answer back as [`NeighborCandidate`]s, in the order the service
//! returned them. Ranking is left to the caller.
//!
//! [`NeighborSearch`] is the seam; [`IndexEndpointClient`] is the REST
//! implementation for Vertex AI Matching Engine style `:findNeighbors` endpoints.

pub mod config;

mod client;

pub use crate::client::IndexEndpointClient;
pub use crate::config::SearchConfig;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by neighbor search.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("invalid search config: {0}")]
    InvalidConfig(String),
    /// The query was rejected before any call was made.
    #[error("empty query vector")]
    EmptyQuery,
    #[error("neighbor search request failed: {0}")]
    Request(String),
    #[error("malformed neighbor search response: {0}")]
    Response(String),
}

/// One neighbor returned by the index.
///
/// `distance` is reported with whatever convention the deployed index uses
/// (dot product, cosine, squared L2, ...); this crate does not interpret it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NeighborCandidate {
    /// Datapoint id; doubles as the stored image's file name.
    pub id: String,
    pub distance: f32,
}

impl NeighborCandidate {
    pub fn new(id: impl Into<String>, distance: f32) -> Self {
        Self {
            id: id.into(),
            distance,
        }
    }
}

/// A single nearest-neighbor lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborQuery {
    pub vector: Vec<f32>,
    pub num_neighbors: usize,
    pub deployed_index_id: String,
}

impl NeighborQuery {
    pub fn new(
        vector: Vec<f32>,
        num_neighbors: usize,
        deployed_index_id: impl Into<String>,
    ) -> Self {
        Self {
            vector,
            num_neighbors,
            deployed_index_id: deployed_index_id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.vector.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(())
    }
}

/// Anything that can answer a [`NeighborQuery`].
#[async_trait]
pub trait NeighborSearch: Send + Sync {
    async fn find_neighbors(
        &self,
        query: &NeighborQuery,
    ) -> Result<Vec<NeighborCandidate>, SearchError>;
}
