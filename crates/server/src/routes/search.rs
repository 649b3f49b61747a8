use crate::error::{ServerError, ServerResult};
use crate::extract::ApiJson;
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lookalike::{ImageSource, RankedImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `POST /api/v1/search/text`.
#[derive(Debug, Deserialize)]
pub struct TextSearchRequest {
    pub query: String,
}

/// Body of `POST /api/v1/search/image`. Exactly one field must be set.
#[derive(Debug, Default, Deserialize)]
pub struct ImageSearchRequest {
    /// Standard base64 of the raw image file.
    #[serde(default)]
    pub image_base64: Option<String>,
    /// HTTP(S) URL the server fetches the image from.
    #[serde(default)]
    pub image_uri: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchHit {
    pub rank: usize,
    pub id: String,
    pub score: f32,
    pub column: usize,
    /// Relative URL the image can be fetched from.
    pub path: String,
}

impl From<Vec<RankedImage>> for SearchResponse {
    fn from(hits: Vec<RankedImage>) -> Self {
        let results: Vec<SearchHit> = hits
            .into_iter()
            .map(|hit| SearchHit {
                path: format!("/api/v1/images/{}", hit.id),
                rank: hit.rank,
                score: hit.distance,
                column: hit.column,
                id: hit.id,
            })
            .collect();
        Self {
            total: results.len(),
            results,
        }
    }
}

/// Search by text
pub async fn search_text(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<TextSearchRequest>,
) -> ServerResult<Json<SearchResponse>> {
    if request.query.trim().is_empty() {
        return Err(ServerError::BadRequest("query must not be empty".into()));
    }

    let hits = state.session.search_by_text(&request.query).await?;
    tracing::info!(query = %request.query, hits = hits.len(), "text search");
    Ok(Json(hits.into()))
}

/// Search by image, either uploaded inline or fetched from a URL
pub async fn search_image(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<ImageSearchRequest>,
) -> ServerResult<Json<SearchResponse>> {
    let hits = match (request.image_base64, request.image_uri) {
        (Some(encoded), None) => {
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| ServerError::BadRequest(format!("invalid image_base64: {e}")))?;
            if bytes.is_empty() {
                return Err(ServerError::BadRequest("image_base64 is empty".into()));
            }
            state.session.search_by_image(bytes).await?
        }
        (None, Some(uri)) => {
            // local paths would expose the server filesystem
            if !ImageSource::parse(&uri).is_remote() {
                return Err(ServerError::BadRequest(
                    "image_uri must be an http(s) URL".into(),
                ));
            }
            state.session.search_by_image_uri(&uri).await?
        }
        _ => {
            return Err(ServerError::BadRequest(
                "provide exactly one of image_base64 or image_uri".into(),
            ))
        }
    };

    tracing::info!(hits = hits.len(), "image search");
    Ok(Json(hits.into()))
}
