use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lookalike::{LookalikeConfig, RankedImage, SearchSession};
use tracing_subscriber::EnvFilter;

/// Query the image index by text or by example image.
#[derive(Debug, Parser)]
#[command(name = "lookalike", version)]
struct Cli {
    /// Cloud project the embedding model is billed to.
    project: String,

    /// Pipeline configuration (YAML). Must name `search.index_endpoint`,
    /// which has no built-in default.
    #[arg(long, short, env = "LOOKALIKE_CONFIG")]
    config: PathBuf,

    #[arg(long, default_value = "warn", env = "LOOKALIKE_LOG")]
    log_level: String,

    #[command(subcommand)]
    query: Query,
}

#[derive(Debug, Subcommand)]
enum Query {
    /// Search by text.
    Text { query: String },
    /// Search by image (local path or http(s) URL).
    Image { uri: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let config = LookalikeConfig::from_file(&cli.config)?.with_project(cli.project);

    let session = SearchSession::from_config(&config)?;
    let hits = match &cli.query {
        Query::Text { query } => session.search_by_text(query).await?,
        Query::Image { uri } => session.search_by_image_uri(uri).await?,
    };

    print_results(&hits);
    Ok(())
}

fn print_results(hits: &[RankedImage]) {
    if hits.is_empty() {
        println!("no matching images");
        return;
    }
    println!("{:>4}  {:>12}  path", "rank", "score");
    for hit in hits {
        println!("{:>4}  {:>12.6}  {}", hit.rank, hit.distance, hit.path.display());
    }
}
