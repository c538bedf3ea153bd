use chrono::Utc;
use clap::{Parser, Subcommand};
use corpus_qa_core::{
    index_corpus, write_summary, Generator, HashedNgramEmbedder, IndexingOptions,
    OllamaGenerator, QdrantStore, QueryOrchestrator, QueryOutcome, Retriever, VectorIndex,
};
use corpus_qa_core::{ChunkingConfig, Embedder};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "corpus-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Qdrant base URL
    #[arg(long, default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// Qdrant collection holding the knowledge base
    #[arg(long, default_value = "knowledge_base")]
    collection: String,

    /// Ollama base URL
    #[arg(long, default_value = "http://localhost:11434")]
    ollama_url: String,

    /// Generation model name
    #[arg(long, default_value = "mistral:7b")]
    model: String,

    /// Generation timeout in seconds
    #[arg(long, default_value = "25")]
    generation_timeout_secs: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Index a corpus directory (documents/, images/, audio/) into the vector store.
    Index {
        /// Corpus root containing one subdirectory per category.
        #[arg(long)]
        corpus: String,
        /// Drop and recreate the collection before indexing.
        #[arg(long, default_value_t = false)]
        clear: bool,
        /// Chunk size in characters.
        #[arg(long, default_value = "1000")]
        chunk_size: usize,
        /// Overlap between consecutive chunks in characters.
        #[arg(long, default_value = "200")]
        overlap: usize,
        /// Where to write the run summary JSON.
        #[arg(long, default_value = "processed/indexing_summary.json")]
        summary_out: String,
    },
    /// Ask one question against the knowledge base.
    Ask {
        /// The question to answer.
        #[arg(long)]
        question: String,
        /// Number of passages to retrieve.
        #[arg(long, default_value = "3")]
        top_k: usize,
        /// Skip generation and print the retrieved context only.
        #[arg(long, default_value_t = false)]
        context_only: bool,
    },
    /// Interactive question loop; one session per question.
    Chat {
        /// Number of passages to retrieve per question.
        #[arg(long, default_value = "3")]
        top_k: usize,
    },
    /// Report index size and generator liveness.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let embedder = HashedNgramEmbedder::default();
    let index = QdrantStore::new(&cli.qdrant_url, &cli.collection, embedder.dimensions());
    let generator = OllamaGenerator::new(&cli.ollama_url, &cli.model)
        .with_timeout(Duration::from_secs(cli.generation_timeout_secs));

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "corpus-qa boot"
    );

    match cli.command {
        Command::Index {
            corpus,
            clear,
            chunk_size,
            overlap,
            summary_out,
        } => {
            let options = IndexingOptions {
                chunking: ChunkingConfig {
                    chunk_size,
                    overlap,
                },
                clear_existing: clear,
            };

            let report = index_corpus(Path::new(&corpus), options, &embedder, &index)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if !report.skipped.is_empty() {
                warn!(skipped = report.skipped.len(), corpus = %corpus, "some sources were skipped");
                for item in &report.skipped {
                    warn!(path = %item.path.display(), reason = %item.reason, "skipped source");
                }
            }

            write_summary(Path::new(&summary_out), &report.summary)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!(
                "indexed documents={} images={} audio={} total_points={} at {}",
                report.summary.counts.documents,
                report.summary.counts.images,
                report.summary.counts.audio,
                report.summary.total_indexed,
                report.summary.processed_at.to_rfc3339()
            );
            println!("summary written to {summary_out}");
        }
        Command::Ask {
            question,
            top_k,
            context_only,
        } => {
            if context_only {
                let retriever = Retriever::new(index, embedder);
                let hits = retriever
                    .retrieve(&question, top_k)
                    .await
                    .map_err(|error| anyhow::anyhow!(error.to_string()))?;
                for hit in hits {
                    println!(
                        "[{:.4}] {} (chunk {}, {}/{})",
                        hit.score,
                        hit.metadata.source,
                        hit.metadata.chunk_id,
                        hit.metadata.kind,
                        hit.metadata.category
                    );
                    println!("{}\n", hit.text);
                }
                return Ok(());
            }

            let orchestrator =
                QueryOrchestrator::new(Retriever::new(index, embedder), generator)
                    .with_top_k(top_k);
            let session = orchestrator
                .answer(&question)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            print_session(&session);
        }
        Command::Chat { top_k } => {
            let orchestrator =
                QueryOrchestrator::new(Retriever::new(index, embedder), generator)
                    .with_top_k(top_k);

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut stdout = tokio::io::stdout();

            println!("Ask questions about the knowledge base. Type 'quit' to stop.");
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            while let Some(line) = lines.next_line().await? {
                let question = line.trim();
                if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
                    break;
                }
                if question.is_empty() {
                    stdout.write_all(b"> ").await?;
                    stdout.flush().await?;
                    continue;
                }

                match orchestrator.answer(question).await {
                    Ok(session) => print_session(&session),
                    Err(error) => println!("error: {error}"),
                }

                stdout.write_all(b"> ").await?;
                stdout.flush().await?;
            }
        }
        Command::Status => {
            let points = index
                .count()
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let generator_online = generator.is_available().await;

            println!("collection: {}", cli.collection);
            println!("indexed points: {points}");
            println!(
                "generator: {}",
                if generator_online { "online" } else { "offline" }
            );
        }
    }

    Ok(())
}

fn print_session(session: &corpus_qa_core::QuerySession) {
    println!("{}", session.answer);
    if let QueryOutcome::Degraded { reason } = &session.outcome {
        println!("\n[degraded: {reason}]");
    }
    if !session.retrieved.is_empty() {
        println!("\nsources ({}):", session.retrieved.len());
        for hit in &session.retrieved {
            println!(
                "  {} (chunk {}, {}/{}, score {:.4})",
                hit.metadata.source,
                hit.metadata.chunk_id,
                hit.metadata.kind,
                hit.metadata.category,
                hit.score
            );
        }
    }
}
