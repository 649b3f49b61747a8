use crate::error::ServerError;
use axum::extract::FromRequest;

/// `axum::Json` whose rejections (bad syntax, wrong shape, missing
/// content type) render as a [`ServerError::BadRequest`] body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);
