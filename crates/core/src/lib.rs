pub mod answer;
pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod indexer;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod storage;
pub mod stores;
pub mod traits;

pub use answer::{clean_answer, collect_evidence, source_pages, trim_excerpt, EXCERPT_MAX_CHARS};
pub use chunking::{chunk_pages, ChunkingConfig};
pub use embeddings::{Embedder, HashEmbedder, HttpEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{AskError, EmbedError, IndexError, ModelError, StoreError};
pub use extractor::{extract_page_texts, LopdfExtractor, PageText, PdfExtractor};
pub use indexer::index_pages;
pub use llm::{LanguageModel, OpenAiCompatModel, DEFAULT_MODEL_TIMEOUT_SECS};
pub use models::{
    AskResult, Chunk, DeleteReceipt, DocumentRecord, Evidence, IndexSummary, QaOptions,
    RetrievedChunk,
};
pub use pipeline::QaCoordinator;
pub use prompt::{build_prompt, FALLBACK_ANSWER};
pub use retriever::retrieve_top_k;
pub use storage::{discover_pdf_files, UploadStore};
pub use stores::QdrantStore;
pub use traits::{ScoredRecord, VectorIndex, VectorRecord};
