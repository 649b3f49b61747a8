use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use lookalike::is_safe_id;
use std::sync::Arc;

/// Serve a stored result image by its index id
pub async fn get_image(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    if !is_safe_id(&id) {
        return Err(ServerError::BadRequest(format!("invalid image id: {id}")));
    }

    let path = state
        .session
        .presenter()
        .resolve(&id)
        .ok_or(ServerError::NotFound)?;
    let bytes = tokio::fs::read(&path).await?;

    Ok(([(CONTENT_TYPE, content_type(&id))], bytes))
}

fn content_type(id: &str) -> &'static str {
    let ext = std::path::Path::new(id)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
