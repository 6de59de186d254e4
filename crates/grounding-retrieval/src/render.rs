//! Renders a stitched chunk list into grounding markdown with citations.

use std::collections::HashMap;
use std::fmt::Write;

use tracing::info;

use grounding_core::Chunk;

/// Format chunks as a grounding context with footnote citations.
///
/// Chunk bodies appear in list order, each tagged with a `[^n]` reference.
/// One footnote is allocated per distinct source URI and reused across
/// chunks, then emitted under a trailing `### Sources` section.
pub fn render_grounding(chunks: &[Chunk]) -> String {
    if chunks.is_empty() {
        info!("no chunks to render");
        return String::new();
    }

    let mut out = String::new();
    let mut source_index: HashMap<&str, usize> = HashMap::new();
    let mut footnotes: Vec<&str> = Vec::new();

    for chunk in chunks {
        let index = *source_index
            .entry(chunk.source_uri.as_str())
            .or_insert_with(|| {
                footnotes.push(chunk.source_uri.as_str());
                footnotes.len()
            });
        let _ = write!(out, "{}[^{}]\n\n", chunk.text(), index);
    }

    out.push_str("### Sources\n");
    for (i, source) in footnotes.iter().enumerate() {
        let _ = writeln!(out, "[^{}]: {}", i + 1, source);
    }

    out
}
