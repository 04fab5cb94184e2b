//! memory-search CLI: list search indexes and run semantic queries against them.
//! Config from env (optionally `.env`).

mod format;
mod logger;

use std::sync::Arc;

use anyhow::{Context, Result};
use azure_openai_embedding::AzureOpenAIEmbedding;
use clap::{Parser, Subcommand};
use embedding::EmbeddingConfig;
use futures::StreamExt;
use memory_azure_search::{AzureSearchConfig, AzureSearchMemoryStore};
use memory_core::MemoryStore;
use semantic_memory::SemanticTextMemory;
use tracing::info;

#[derive(Parser)]
#[command(name = "memory-search")]
#[command(about = "Azure Cognitive Search memory CLI: collections, search", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the collections (indexes) of the search service.
    Collections,
    /// Embed a query and print the closest records of a collection.
    Search {
        #[arg(short, long)]
        collection: String,
        #[arg(short, long)]
        query: String,
        #[arg(short, long, default_value = "10")]
        limit: usize,
        #[arg(long, default_value = "0.0")]
        min_relevance: f64,
        #[arg(long)]
        with_embeddings: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Collections => handle_collections().await,
        Commands::Search {
            collection,
            query,
            limit,
            min_relevance,
            with_embeddings,
        } => handle_search(&collection, &query, limit, min_relevance, with_embeddings).await,
    }
}

fn load_store() -> Result<Arc<dyn MemoryStore>> {
    let config = AzureSearchConfig::from_env()
        .context("Load search config from .env (AZURE_SEARCH_ENDPOINT, AZURE_SEARCH_ADMIN_KEY)")?;
    let store = AzureSearchMemoryStore::from_config(&config)
        .context("Create Azure Cognitive Search client")?;
    Ok(Arc::new(store))
}

async fn handle_collections() -> Result<()> {
    let store = load_store()?;
    let mut names = store
        .get_collections()
        .await
        .context("List collections")?;

    let mut count = 0usize;
    while let Some(name) = names.next().await {
        println!("{}", name.context("Read collection name")?);
        count += 1;
    }
    info!(count, "step: collections listed");
    if count == 0 {
        println!("No collections.");
    }
    Ok(())
}

async fn handle_search(
    collection: &str,
    query: &str,
    limit: usize,
    min_relevance: f64,
    with_embeddings: bool,
) -> Result<()> {
    let store = load_store()?;
    let embedding_config = EmbeddingConfig::from_env()
        .context("Load embedding config from .env (AZURE_OPENAI_ENDPOINT, AZURE_OPENAI_KEY)")?;
    let embedder = AzureOpenAIEmbedding::from_config(&embedding_config)
        .context("Create Azure OpenAI embedding client")?;
    let memory = SemanticTextMemory::new(store, Arc::new(embedder));

    println!("Searching {} ..", collection);
    let mut results = memory
        .search(collection, query, limit, min_relevance, with_embeddings)
        .await
        .with_context(|| format!("Search collection {}", collection))?;

    let mut count = 0usize;
    while let Some(result) = results.next().await {
        let result = result.context("Read search result")?;
        println!("{}", format::render_result(&result));
        count += 1;
    }
    info!(collection, count, min_relevance, "step: search done");
    if count == 0 {
        println!("No results above relevance {}.", min_relevance);
    }
    Ok(())
}
