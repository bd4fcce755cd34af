use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use compliance_rag_core::{
    build_embedder, ingest_directory, Config, DiskVectorStore, Embedder, LopdfExtractor,
    QueryEngine, SearchResult, VectorStore,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Characters of chunk text shown per result before truncation.
const DISPLAY_TEXT_LIMIT: usize = 500;

#[derive(Parser)]
#[command(name = "compliance-rag", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory scanned (non-recursively) for PDF documents.
    #[arg(long, env = "RAG_DOCS_DIR", default_value = "docs")]
    docs_dir: PathBuf,

    /// Directory holding the persistent vector index.
    #[arg(long, env = "RAG_STORE_DIR", default_value = "data/index")]
    store_dir: PathBuf,

    /// Collection name inside the store directory.
    #[arg(long, default_value = "scheme_compliance")]
    collection: String,

    /// Window length in characters.
    #[arg(long, default_value_t = 1000)]
    chunk_size: usize,

    /// Characters shared between consecutive windows.
    #[arg(long, default_value_t = 200)]
    chunk_overlap: usize,

    /// Embedding model identifier.
    #[arg(long, env = "RAG_EMBEDDING_MODEL", default_value = "char-ngram-128")]
    embedding_model: String,

    /// Default number of results per query.
    #[arg(long = "default-top-k", default_value_t = 5)]
    default_top_k: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest every PDF in the docs directory into the vector index.
    Ingest {
        /// Drop all stored chunks before ingesting.
        #[arg(long, default_value_t = false)]
        reset: bool,
    },
    /// Ask a question against the ingested corpus.
    Query {
        /// The question to ask.
        question: Option<String>,

        /// Number of results to return.
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,

        /// Read questions from stdin until quit or end-of-input.
        #[arg(short, long, default_value_t = false)]
        interactive: bool,
    },
}

impl Cli {
    fn to_config(&self) -> Config {
        Config {
            docs_dir: self.docs_dir.clone(),
            store_dir: self.store_dir.clone(),
            collection: self.collection.clone(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            embedding_model: self.embedding_model.clone(),
            default_top_k: self.default_top_k,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.to_config();

    // Settings are checked before any I/O happens.
    config.validate()?;
    let embedder = build_embedder(&config)?;

    let mut store = DiskVectorStore::open(
        &config.store_dir,
        &config.collection,
        &embedder.model_id(),
        embedder.dimensions(),
    )
    .with_context(|| format!("opening vector index in {}", config.store_dir.display()))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        model = %embedder.model_id(),
        "compliance-rag boot"
    );

    match cli.command {
        Command::Ingest { reset } => {
            if reset {
                let before = store.count();
                store.clear()?;
                info!(dropped = before, "cleared collection before ingest");
            }

            let extractor = LopdfExtractor;
            let report = ingest_directory(&config, &extractor, &embedder, &mut store);

            if report.documents_processed == 0 && report.errors.is_empty() {
                println!("no pdf documents found in {}", config.docs_dir.display());
                return Ok(());
            }

            for error in &report.errors {
                warn!(
                    document = %error.document.display(),
                    cause = %error.cause,
                    "document failed to ingest"
                );
            }

            println!(
                "{} document(s) processed, {} chunk(s) written to {}",
                report.documents_processed,
                report.chunks_written,
                config.store_dir.display()
            );
            for error in &report.errors {
                println!("failed: {} ({})", error.document.display(), error.cause);
            }

            if !report.errors.is_empty() {
                bail!("{} document(s) failed to ingest", report.errors.len());
            }
        }
        Command::Query {
            question,
            top_k,
            interactive,
        } => {
            let k = top_k.unwrap_or(config.default_top_k);
            let engine = QueryEngine::new(&store, &embedder);

            if interactive {
                run_interactive(&engine, store.count(), k)?;
            } else {
                let question =
                    question.context("a question is required unless --interactive is given")?;
                let results = engine.search(&question, k)?;
                print_results(&question, &results);
            }
        }
    }

    Ok(())
}

fn run_interactive<S, E>(
    engine: &QueryEngine<'_, S, E>,
    chunk_count: usize,
    k: usize,
) -> anyhow::Result<()>
where
    S: VectorStore,
    E: Embedder,
{
    println!("compliance knowledge base ({chunk_count} chunks indexed)");
    println!("enter questions below; 'quit', 'exit' or 'q' stops.");

    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("question> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "quit" | "exit" | "q") {
            break;
        }

        // Each question stands alone; errors reprompt instead of ending the
        // session.
        match engine.search(question, k) {
            Ok(results) => print_results(question, &results),
            Err(error) => eprintln!("error: {error}"),
        }
    }

    Ok(())
}

fn print_results(question: &str, results: &[SearchResult]) {
    if results.is_empty() {
        println!("no relevant results for: {question}");
        return;
    }

    println!("{} result(s) for: {question}", results.len());
    for result in results {
        println!(
            "[{}] {} (page {}) similarity={:.4}",
            result.rank,
            result.chunk.document_id,
            result.chunk.page_number,
            result.score
        );
        println!("    {}", truncate_for_display(&result.chunk.text));
    }
}

fn truncate_for_display(text: &str) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= DISPLAY_TEXT_LIMIT {
        return flattened;
    }

    let mut truncated: String = flattened.chars().take(DISPLAY_TEXT_LIMIT).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::truncate_for_display;

    #[test]
    fn short_text_passes_through_flattened() {
        assert_eq!(
            truncate_for_display("audit\n  trail   kept"),
            "audit trail kept"
        );
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let text = "a".repeat(600);
        let shown = truncate_for_display(&text);
        assert_eq!(shown.chars().count(), 503);
        assert!(shown.ends_with("..."));
    }
}
