use crate::models::{Evidence, RetrievedChunk};
use std::collections::BTreeSet;

pub const EXCERPT_MAX_CHARS: usize = 260;
pub const EVIDENCE_LIMIT: usize = 2;

/// Light post-processing of raw model output so the displayed answer stays
/// clean: trim, strip emphasis markup, and break inlined bullet lists onto
/// their own lines.
///
/// The list reflow triggers on the literal `" - "` and is known to also
/// split legitimate dash usages. That imprecision is accepted; callers
/// should not paper over it with smarter detection here.
pub fn clean_answer(raw: &str) -> String {
    let mut answer = raw.trim().replace("**", "");
    if answer.contains(" - ") && !answer.contains("\n- ") {
        answer = answer.replace(" - ", "\n- ");
    }
    answer
}

/// Collapse a chunk into a single flowing line and cut it near `max_chars`,
/// preferring a sentence boundary. Output is bounded by `max_chars` plus
/// the ellipsis (sentence cuts may run up to 40 chars past `max_chars` to
/// finish the sentence).
pub fn trim_excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text
        .replace('\u{2022}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let chars: Vec<char> = collapsed.chars().collect();
    if chars.len() <= max_chars {
        return collapsed;
    }

    // Small buffer past max_chars to search for a sentence end.
    let window_len = (max_chars + 40).min(chars.len());
    let sentence_end = chars[..window_len].iter().rposition(|&c| c == '.');

    match sentence_end {
        Some(position) if position >= (max_chars * 6) / 10 => {
            let mut snippet: String = chars[..=position].iter().collect();
            snippet.push('\u{2026}');
            snippet
        }
        _ => {
            let snippet: String = chars[..max_chars].iter().collect();
            format!("{}\u{2026}", snippet.trim_end())
        }
    }
}

/// Distinct page numbers across all retrieved chunks, ascending. Covers
/// every retrieved chunk, not just the ones shown as evidence.
pub fn source_pages(retrieved: &[RetrievedChunk]) -> Vec<u32> {
    retrieved
        .iter()
        .map(|chunk| chunk.page_number)
        .collect::<BTreeSet<u32>>()
        .into_iter()
        .collect()
}

/// Human-readable snippets of the top retrieved chunks, at most
/// [`EVIDENCE_LIMIT`].
pub fn collect_evidence(retrieved: &[RetrievedChunk]) -> Vec<Evidence> {
    retrieved
        .iter()
        .take(EVIDENCE_LIMIT)
        .map(|chunk| Evidence {
            page_number: chunk.page_number,
            excerpt: trim_excerpt(&chunk.text, EXCERPT_MAX_CHARS),
        })
        .collect()
}
