//! Command implementations for the Scour CLI.

use std::path::Path;
use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::document::Document;
use crate::engine::{Indexer, IndexerConfig};
use crate::error::{Result, ScourError};

/// Execute a CLI command.
pub async fn execute_command(args: ScourArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => index_documents(index_args, &args).await,
        Command::Search(search_args) => search_documents(search_args, &args).await,
        Command::Stats(stats_args) => show_stats(stats_args, &args).await,
    }
}

/// Build the indexer configuration: the config file if given, else defaults,
/// with `data_dir` taken from the command line.
pub fn load_config(data_dir: &Path, cli_args: &ScourArgs) -> Result<IndexerConfig> {
    let config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            IndexerConfig::from_file(path)?
        }
        None => IndexerConfig::default(),
    };

    let config = config.with_data_dir(data_dir);
    config.validate()?;
    Ok(config)
}

/// Parse documents from a JSON array or from JSON Lines.
pub fn parse_documents(content: &str) -> Result<Vec<Document>> {
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }

    let mut documents = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let doc = serde_json::from_str(line).map_err(|e| {
            ScourError::other(format!(
                "Error parsing document on line {}: {e}",
                line_num + 1
            ))
        })?;
        documents.push(doc);
    }
    Ok(documents)
}

/// Index every document in a file.
async fn index_documents(args: &IndexArgs, cli_args: &ScourArgs) -> Result<()> {
    if cli_args.verbosity() > 1 {
        println!("Indexing documents from: {}", args.document_file.display());
        println!("Into: {}", args.data_dir.display());
    }

    if args.concurrency == 0 {
        return Err(ScourError::invalid_config("concurrency must be positive"));
    }

    let config = load_config(&args.data_dir, cli_args)?;
    let indexer = Indexer::open(config).await?;

    let content = tokio::fs::read_to_string(&args.document_file).await?;
    let documents = parse_documents(&content)?;

    let start_time = Instant::now();

    let ids: Vec<_> = stream::iter(&documents)
        .map(|doc| indexer.index(doc))
        .buffered(args.concurrency)
        .try_collect()
        .await?;

    let duration = start_time.elapsed();

    output_result(
        "Documents indexed successfully",
        &IndexingResult {
            documents_indexed: ids.len(),
            duration_ms: duration.as_millis() as u64,
            docs_per_second: if duration.as_secs_f64() > 0.0 {
                ids.len() as f64 / duration.as_secs_f64()
            } else {
                0.0
            },
        },
        cli_args,
    )
}

/// Search indexed documents.
async fn search_documents(args: &SearchArgs, cli_args: &ScourArgs) -> Result<()> {
    if cli_args.verbosity() > 1 {
        println!("Searching: {}", args.data_dir.display());
        println!("Query: {}", args.query);
    }

    let config = load_config(&args.data_dir, cli_args)?;
    let indexer = Indexer::open(config).await?;

    let start_time = Instant::now();

    let documents = match args.limit {
        Some(limit) => indexer.search_with_limit(&args.query, limit).await?,
        None => indexer.search(&args.query).await?,
    };

    let search_duration = start_time.elapsed();

    output_result(
        "Search completed",
        &SearchResults {
            query: args.query.clone(),
            total_hits: documents.len(),
            documents,
            duration_ms: search_duration.as_millis() as u64,
        },
        cli_args,
    )
}

/// Show document and segment counts.
async fn show_stats(args: &StatsArgs, cli_args: &ScourArgs) -> Result<()> {
    let config = load_config(&args.data_dir, cli_args)?;
    let indexer = Indexer::open(config).await?;

    let stats = IndexStats {
        data_dir: args.data_dir.to_string_lossy().to_string(),
        total_documents: indexer.docs_count().await?,
        number_of_segments: indexer.document_store().segments().len(),
    };

    output_result("Index statistics", &stats, cli_args)
}
