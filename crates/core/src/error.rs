use thiserror::Error;

/// Failures on the write path (upload, extraction, chunking, indexing).
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("no extractable text found (scanned PDF; OCR is not supported)")]
    NoExtractableText,

    #[error("no valid text chunks found")]
    NoValidChunks,

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("vector store error: {0}")]
    Store(#[from] StoreError),
}

/// Failures on the read path (question answering).
#[derive(Debug, Error)]
pub enum AskError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("vector store error: {0}")]
    Store(#[from] StoreError),

    #[error("upstream model error: {0}")]
    Model(#[from] ModelError),
}

/// Vector index backend failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("store request failed: {0}")]
    Request(String),
}

/// Embedding backend failures.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("embedding backend returned {returned} vectors for {expected} inputs")]
    BatchMismatch { expected: usize, returned: usize },

    #[error("invalid response from embedding backend: {0}")]
    BackendResponse(String),
}

/// Language-model backend failures. `Timeout` is kept distinct so callers
/// can tell a slow upstream from a broken one; a successful empty
/// completion is not an error.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model call timed out after {0} seconds")]
    Timeout(u64),

    #[error("http error: {0}")]
    Http(reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("model backend returned {status}: {details}")]
    BackendResponse { status: String, details: String },

    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

pub type Result<T, E = IndexError> = std::result::Result<T, E>;
