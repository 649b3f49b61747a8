//! Lookalike Server binary

use clap::Parser;
use server::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "lookalike-server", version)]
struct Args {
    /// Cloud project the embedding model is billed to.
    project: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = ServerConfig::load()?;

    server::start_server(config, args.project).await?;

    Ok(())
}
