use crate::models::RetrievedChunk;

/// The exact sentence the model is told to emit when the context does not
/// contain the answer, and the canned reply when retrieval finds nothing.
pub const FALLBACK_ANSWER: &str = "I don't know based on the provided document.";

/// Assemble the instruction + context prompt. Pure and deterministic.
///
/// Chunk text goes into the context block verbatim so an answer can always
/// be traced back to the page it came from.
pub fn build_prompt(question: &str, retrieved: &[RetrievedChunk]) -> String {
    let context = retrieved
        .iter()
        .map(|chunk| format!("(page {}) {}", chunk.page_number, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "You are a careful, precise assistant.\n\
         Answer the user's question using ONLY the context below.\n\
         Prefer either a short paragraph or a simple list where each item is on its own line.\n\
         Write in plain text only: do NOT use Markdown formatting such as **bold**.\n\
         Do NOT include citations like [chunk X] or (page X) inside the answer.\n\
         If the answer is not in the context, say: \"{FALLBACK_ANSWER}\".\n\n\
         When listing multiple items, put each item on its own line starting with '- '. \
         Avoid cramming many items into one long sentence.\n\n\
         Question: {question}\n\n\
         Context:\n{context}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, page: u32, index: u64) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            page_number: page,
            chunk_index: index,
            similarity: 0.9,
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let retrieved = vec![chunk("alpha", 1, 0), chunk("beta", 2, 1)];
        assert_eq!(
            build_prompt("what?", &retrieved),
            build_prompt("what?", &retrieved)
        );
    }

    #[test]
    fn context_renders_chunks_in_received_order_with_page_tags() {
        let retrieved = vec![chunk("second page text", 2, 3), chunk("first page text", 1, 0)];
        let prompt = build_prompt("what?", &retrieved);

        let first = prompt.find("(page 2) second page text").unwrap();
        let second = prompt.find("(page 1) first page text").unwrap();
        assert!(first < second);
        assert!(prompt.contains("\n\n---\n\n"));
    }

    #[test]
    fn prompt_carries_question_and_fallback_instruction() {
        let prompt = build_prompt("What is the warranty period?", &[chunk("text", 1, 0)]);
        assert!(prompt.contains("Question: What is the warranty period?"));
        assert!(prompt.contains(FALLBACK_ANSWER));
        assert!(prompt.contains("ONLY the context"));
    }
}
