use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_qa_core::{
    discover_pdf_files, Embedder, HashEmbedder, HttpEmbedder, LopdfExtractor, OpenAiCompatModel,
    QaCoordinator, QaOptions, QdrantStore, UploadStore, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_MODEL_TIMEOUT_SECS,
};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Qdrant base URL
    #[arg(long, default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// Qdrant collection holding the document chunks
    #[arg(long, default_value = "documents")]
    qdrant_collection: String,

    /// Directory where uploaded PDFs are kept
    #[arg(long, default_value = "data/uploads")]
    data_dir: String,

    /// OpenAI-compatible embeddings endpoint; the local hashing embedder is
    /// used when unset
    #[arg(long)]
    embedding_endpoint: Option<String>,

    /// Embedding model name (remote embeddings only)
    #[arg(long, default_value = "text-embedding-3-small")]
    embedding_model: String,

    /// Embedding vector dimensionality
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    embedding_dimensions: usize,

    /// OpenAI-compatible completions base URL
    #[arg(long, default_value = "https://api.openai.com/v1")]
    model_endpoint: String,

    /// Completion model name
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// API key for the embedding and completion endpoints
    #[arg(long, env = "PDF_QA_API_KEY")]
    api_key: Option<String>,

    /// Completion request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_MODEL_TIMEOUT_SECS)]
    model_timeout_secs: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Upload one PDF, index it, and print its doc_id.
    Upload {
        /// Path to the PDF file.
        #[arg(long)]
        file: String,
    },
    /// Upload every PDF found under a folder (recursively), best effort.
    UploadFolder {
        /// Folder that contains PDFs.
        #[arg(long)]
        folder: String,
    },
    /// Ask a question against one indexed document.
    Ask {
        /// Document id returned by upload.
        #[arg(long)]
        doc_id: String,
        /// Natural-language question.
        #[arg(long)]
        question: String,
        /// Number of chunks handed to the prompt.
        #[arg(long, default_value = "5")]
        top_k: usize,
    },
    /// Re-run extraction and indexing from the stored PDF.
    Reindex {
        #[arg(long)]
        doc_id: String,
    },
    /// Remove a document's vectors and its stored PDF.
    Delete {
        #[arg(long)]
        doc_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-qa boot"
    );

    match cli.embedding_endpoint.clone() {
        Some(endpoint) => {
            let embedder = HttpEmbedder::new(
                endpoint,
                cli.embedding_model.clone(),
                cli.api_key.clone(),
                cli.embedding_dimensions,
            )?;
            run(cli, embedder).await
        }
        None => {
            let embedder = HashEmbedder {
                dimensions: cli.embedding_dimensions,
            };
            run(cli, embedder).await
        }
    }
}

async fn run<E>(cli: Cli, embedder: E) -> anyhow::Result<()>
where
    E: Embedder + Send + Sync,
{
    let index = QdrantStore::new(
        &cli.qdrant_url,
        &cli.qdrant_collection,
        embedder.dimensions(),
    )?;
    index.ensure_collection().await?;

    let model = OpenAiCompatModel::new(
        &cli.model_endpoint,
        &cli.model,
        cli.api_key.clone(),
        cli.model_timeout_secs,
    )?;
    let uploads = UploadStore::open(&cli.data_dir)?;

    let qa = QaCoordinator::new(
        LopdfExtractor,
        embedder,
        index,
        model,
        uploads,
        QaOptions::default(),
    )?;

    match cli.command {
        Command::Upload { file } => {
            let record = upload_one(&qa, Path::new(&file)).await?;
            println!(
                "doc_id={} pages={} chunks={} checksum={}",
                record.doc_id, record.pages, record.chunks, record.checksum
            );
        }
        Command::UploadFolder { folder } => {
            let files = discover_pdf_files(Path::new(&folder));
            if files.is_empty() {
                anyhow::bail!("no pdf files found in {folder}");
            }

            let mut uploaded = 0usize;
            for path in files {
                match upload_one(&qa, &path).await {
                    Ok(record) => {
                        uploaded += 1;
                        println!(
                            "doc_id={} file={} pages={} chunks={}",
                            record.doc_id,
                            path.display(),
                            record.pages,
                            record.chunks
                        );
                    }
                    Err(error) => {
                        warn!(path = %path.display(), reason = %error, "skipped pdf");
                    }
                }
            }
            println!("{uploaded} documents indexed at {}", Utc::now().to_rfc3339());
        }
        Command::Ask {
            doc_id,
            question,
            top_k,
        } => {
            let result = qa.ask(&doc_id, &question, Some(top_k)).await?;

            println!("{}", result.answer);
            if !result.sources.is_empty() {
                let pages = result
                    .sources
                    .iter()
                    .map(|page| page.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("\nsources: pages {pages}");
            }
            for item in result.evidence {
                println!("evidence: (page {}) {}", item.page_number, item.excerpt);
            }
        }
        Command::Reindex { doc_id } => {
            let summary = qa.reindex(&doc_id).await?;
            println!(
                "doc_id={doc_id} pages={} chunks={} reindexed",
                summary.pages, summary.chunks
            );
        }
        Command::Delete { doc_id } => {
            let receipt = qa.delete_document(&doc_id).await?;
            println!(
                "doc_id={} deleted (blob_removed={})",
                receipt.doc_id, receipt.blob_removed
            );
        }
    }

    Ok(())
}

async fn upload_one<P, E, V, L>(
    qa: &QaCoordinator<P, E, V, L>,
    path: &Path,
) -> anyhow::Result<pdf_qa_core::DocumentRecord>
where
    P: pdf_qa_core::PdfExtractor + Send + Sync,
    E: Embedder + Send + Sync,
    V: pdf_qa_core::VectorIndex + Send + Sync,
    L: pdf_qa_core::LanguageModel + Send + Sync,
{
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("path missing filename: {}", path.display()))?;
    let bytes = std::fs::read(path)?;

    let record = qa.upload_and_index(filename, &bytes).await?;
    info!(doc_id = %record.doc_id, file = %path.display(), "document indexed");
    Ok(record)
}
