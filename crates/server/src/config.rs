use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP server settings. Every field falls back to [`ServerConfig::default`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Whole-request budget, including the embedding and index round trips.
    pub timeout_secs: u64,
    /// Uploaded query images travel base64-encoded inside the JSON body.
    pub max_body_size_mb: usize,
    pub enable_cors: bool,
    /// `EnvFilter` directive, e.g. `info` or `server=debug,lookalike=debug`.
    pub log_level: String,
    /// Pipeline YAML. Required to start: the index endpoint has no default.
    pub pipeline_config: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            port: 8080,
            timeout_secs: 60,
            max_body_size_mb: 16,
            enable_cors: true,
            log_level: "info".into(),
            pipeline_config: None,
        }
    }
}

impl ServerConfig {
    /// Layer `.env`, an optional `server.{toml,yaml,json}` in the working
    /// directory, then `LOOKALIKE_SERVER__*` variables.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("LOOKALIKE_SERVER").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind_addr, self.port).parse()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}
