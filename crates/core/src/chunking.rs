use crate::error::IndexError;
use crate::extractor::PageText;
use crate::models::Chunk;

/// Fixed sliding-window chunking parameters, measured in `char`s.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkingConfig {
    /// `overlap < size` keeps the window stride positive; anything else is
    /// a fatal configuration error.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.chunk_size == 0 {
            return Err(IndexError::InvalidChunkConfig(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(IndexError::InvalidChunkConfig(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// Slide a fixed window over each page independently so chunks never cross
/// page boundaries. Whitespace-only windows emit nothing; `chunk_index`
/// only advances on emission and stays monotonic across the whole document.
pub fn chunk_pages(doc_id: &str, pages: &[PageText], config: ChunkingConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut chunk_index = 0u64;

    for page in pages {
        let chars: Vec<char> = page.text.chars().collect();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + config.chunk_size).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            let trimmed = window.trim();

            if !trimmed.is_empty() {
                chunks.push(Chunk {
                    doc_id: doc_id.to_string(),
                    chunk_index,
                    page_number: page.number,
                    text: trimmed.to_string(),
                });
                chunk_index += 1;
            }

            start += config.stride();
        }
    }

    chunks
}
