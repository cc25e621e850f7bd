// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Stratum CLI
//!
//! Drives a `SheetRagEngine` end to end from the command line: ingest
//! papers, ask a question against them, inspect per-layer counts, or clear
//! the index. Each invocation builds a fresh in-memory engine and ingests
//! whatever paths are given before acting, since the store itself keeps no
//! state across processes — see DESIGN.md for why.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stratum_cache::InMemoryCache;
use stratum_core::Level;
use stratum_engine::{Document, EngineConfig, LlmBackend, LlmConfig, OpenAiLlmBackend, SheetRagEngine, StubLlmBackend};

/// Stratum: a multi-granularity retrieval-augmented-generation engine.
#[derive(Parser, Debug)]
#[command(name = "stratum")]
#[command(author = "Stratum Team")]
#[command(version)]
#[command(about = "Multi-granularity RAG engine over ingested papers", long_about = None)]
struct Args {
    /// OpenAI API key for embeddings and completion. Without one, a stub
    /// responder is used so the CLI still runs offline.
    #[arg(long, env = "OPENAI_API_KEY", global = true)]
    openai_api_key: Option<String>,

    /// Root directory reported by `stats`. Collections are in-memory
    /// regardless of this value.
    #[arg(long, env = "STRATUM_PERSIST_DIR", default_value = "./sheet_rag_data", global = true)]
    persist_dir: String,

    /// Enable verbose logging.
    #[arg(long, short, env = "VERBOSE", global = true)]
    verbose: bool,

    /// Enable trace logging.
    #[arg(long, env = "TRACE", global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest one or more text files and report the resulting layer counts.
    Ingest {
        /// Paths to plain-text documents.
        paths: Vec<PathBuf>,
    },
    /// Ingest `--from` paths (if any), then ask a question.
    Query {
        /// The question to ask.
        text: String,
        /// Paths to ingest before querying.
        #[arg(long = "from")]
        from: Vec<PathBuf>,
        /// Number of context chunks to ground the answer in.
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        /// Skip cross-layer validation and use the paragraph layer directly.
        #[arg(long)]
        no_validate: bool,
    },
    /// Ingest `--from` paths (if any), then report per-layer chunk counts.
    Stats {
        /// Paths to ingest before reporting.
        #[arg(long = "from")]
        from: Vec<PathBuf>,
    },
    /// Ingest `--from` paths (if any), then clear the index (or one layer).
    Clear {
        /// Paths to ingest before clearing, to demonstrate the operation.
        #[arg(long = "from")]
        from: Vec<PathBuf>,
        /// Restrict the clear to one level; clears everything if omitted.
        #[arg(long)]
        layer: Option<Level>,
    },
}

fn read_documents(paths: &[PathBuf]) -> anyhow::Result<Vec<Document>> {
    paths
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
            Ok(Document::new(text).with_metadata("source_path", path.display().to_string()))
        })
        .collect()
}

fn build_llm(api_key: Option<String>) -> Arc<dyn LlmBackend> {
    match api_key {
        Some(key) => match OpenAiLlmBackend::new(LlmConfig::openai(key)) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build OpenAI LLM backend, falling back to stub");
                Arc::new(StubLlmBackend::new(
                    "No LLM backend is configured; showing retrieved context only.",
                ))
            }
        },
        None => {
            tracing::warn!("no OPENAI_API_KEY set, using stub responder");
            Arc::new(StubLlmBackend::new(
                "No LLM backend is configured; showing retrieved context only.",
            ))
        }
    }
}

async fn build_engine(args: &Args) -> anyhow::Result<SheetRagEngine> {
    let mut config = EngineConfig::default().with_persist_dir(args.persist_dir.clone());
    if let Some(key) = &args.openai_api_key {
        config.embedder.api.api_key = Some(key.clone());
    }

    let cache = Arc::new(InMemoryCache::new());
    let llm = build_llm(args.openai_api_key.clone());
    let engine = SheetRagEngine::new(config, cache, llm)?;
    Ok(engine)
}

async fn ingest_paths(engine: &SheetRagEngine, paths: &[PathBuf]) -> anyhow::Result<()> {
    if paths.is_empty() {
        return Ok(());
    }
    let documents = read_documents(paths)?;
    let chunk_count = engine.ingest(&documents).await?;
    tracing::info!(documents = documents.len(), chunks = chunk_count, "ingested");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.trace {
        tracing::Level::TRACE
    } else if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();

    tracing::info!("stratum v{}", env!("CARGO_PKG_VERSION"));

    let engine = build_engine(&args).await?;

    match &args.command {
        Command::Ingest { paths } => {
            ingest_paths(&engine, paths).await?;
            let stats = engine.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Query { text, from, top_k, no_validate } => {
            ingest_paths(&engine, from).await?;
            let response = engine.query(text, *top_k, !*no_validate).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Stats { from } => {
            ingest_paths(&engine, from).await?;
            let stats = engine.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Clear { from, layer } => {
            ingest_paths(&engine, from).await?;
            match layer {
                Some(level) => engine.clear_layer(*level).await?,
                None => engine.clear_all().await?,
            }
            let stats = engine.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
