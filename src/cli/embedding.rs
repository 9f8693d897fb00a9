//! Embedding model management commands.

use clap::Subcommand;
use color_eyre::Result;

use crate::config::Config;
use crate::embedding::create_embedder;

/// Embedding model management subcommands.
#[derive(Subcommand)]
pub enum EmbeddingCommand {
    /// Pre-download the embedding model (for Docker builds)
    Warmup,
}

impl EmbeddingCommand {
    /// Run the embedding subcommand.
    pub async fn run(&self) -> Result<()> {
        match self {
            EmbeddingCommand::Warmup => run_warmup().await,
        }
    }
}

/// Load the configured model, downloading it into the cache if needed.
async fn run_warmup() -> Result<()> {
    let config = Config::load()?;

    println!("Warming up embedding model: {}", config.embedding.model);

    let embedding = config.embedding.clone();
    let embedder =
        tokio::task::spawn_blocking(move || create_embedder(&embedding, true)).await??;

    println!(
        "Embedding model ready: {} ({} dimensions)",
        embedder.model_name(),
        embedder.dimensions()
    );
    if let Some(cache_dir) = &config.embedding.cache_dir {
        println!("Cache location: {}", cache_dir);
    }

    Ok(())
}
