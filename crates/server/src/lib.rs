//! Lookalike Server - HTTP REST API for text and image similarity search
//!
//! Wraps a [`lookalike::SearchSession`] in an Axum router. Each request is
//! one query: it is embedded, sent to the neighbor index, ranked, and only
//! results with a stored image are returned.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config, "my-project").await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `POST /api/v1/search/text` - `{"query": "red car"}`
//! - `POST /api/v1/search/image` - `{"image_base64": "..."}` or `{"image_uri": "https://..."}`
//! - `GET /api/v1/images/{id}` - Stored result image

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
