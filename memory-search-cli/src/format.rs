//! Console rendering of search results.

use memory_core::MemoryQueryResult;

pub const TEXT_PREVIEW_CHARS: usize = 100;

/// First `max_chars` characters of `text` with line breaks flattened; shorter text is
/// returned whole.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Renders one result as a labelled block.
pub fn render_result(result: &MemoryQueryResult) -> String {
    let record = &result.record;
    let mut out = format!(
        "Id       : {}\nTitle    : {}\nUrl      : {}\nText     : {}\nRelevance: {:.4}\n",
        record.id,
        record.description,
        record.external_source_name,
        preview(&record.text, TEXT_PREVIEW_CHARS),
        result.relevance
    );
    if let Some(embedding) = &record.embedding {
        out.push_str(&format!("Embedding: {} dimensions\n", embedding.len()));
    }
    out
}
