#![forbid(unsafe_code)]

//! Document parsing: title extraction, block tokenization, and per-block
//! event extraction.
//!
//! The parser is total and stateless. Every call rebuilds a fresh
//! [`Document`]; callers re-parse on each edit (typically debounced) and no
//! incremental state survives between calls.

mod date;
mod extract;
mod tokenizer;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use zl_core::{Document, ExtractorConfig};

pub use date::{ResolvedDate, resolve};
pub use extract::extract;
pub use tokenizer::{Block, split};

static TITLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^title\s*:\s*(.+)$").expect("title regex"));
static HEADING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}\s+(.+)$").expect("heading regex"));

/// Parse a raw document with the default metadata enumerations.
#[must_use]
pub fn parse(raw: &str) -> Document {
    parse_with_config(raw, &ExtractorConfig::default())
}

/// Parse a raw document into title, body offset, and events.
///
/// Title extraction: the first non-blank line becomes the title when it is a
/// `title:` line or an ATX heading, and is excised from the body. All event
/// offsets remain absolute positions in `raw` so the editor collaborator can
/// map an event back to a selection.
#[must_use]
pub fn parse_with_config(raw: &str, config: &ExtractorConfig) -> Document {
    let (title, body_offset) = extract_title(raw);
    let body = &raw[body_offset..];

    let blocks = tokenizer::split(body, body_offset);
    let events: Vec<_> = blocks
        .iter()
        .map(|block| extract::extract(block, config))
        .collect();

    debug!(
        title = title.as_deref().unwrap_or(""),
        blocks = blocks.len(),
        "parsed document"
    );

    Document {
        title,
        body_offset,
        events,
    }
}

/// Returns the title (if any) and the byte offset where the body starts.
///
/// Lines come from the tokenizer's terminator-aware splitter so a CR-only
/// document is scanned the same way it is later split into blocks.
fn extract_title(raw: &str) -> (Option<String>, usize) {
    for (start, end, next_start) in tokenizer::line_spans(raw) {
        let content = &raw[start..end];
        if content.trim().is_empty() {
            continue;
        }
        if let Some(caps) = TITLE_LINE.captures(content) {
            return (Some(caps[1].trim().to_string()), next_start);
        }
        if let Some(caps) = HEADING_LINE.captures(content) {
            return (Some(caps[1].trim().to_string()), next_start);
        }
        break;
    }
    (None, 0)
}
