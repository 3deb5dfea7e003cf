//! Per-block metadata extraction.
//!
//! Scans a block line by line: metadata lines (`date:`, `end_date:`,
//! `class:`, `group:`/`lane:`) are consumed, everything else stays content
//! in its original order.

use once_cell::sync::Lazy;
use regex::Regex;
use zl_core::{DateFieldError, Event, ExtractorConfig, sentinel_instant};

use crate::date;
use crate::tokenizer::Block;

static METADATA_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(date|end_date|class|group|lane)\s*:\s*(.*)$").expect("metadata regex")
});

/// Extract one [`Event`] from a block.
///
/// Never fails: date problems degrade into a sentinel date plus an error
/// notice prepended to the content, and unrecognized categories or malformed
/// end dates are silently dropped.
#[must_use]
pub fn extract(block: &Block, config: &ExtractorConfig) -> Event {
    let mut date_token: Option<String> = None;
    let mut end_date_token: Option<String> = None;
    let mut category: Option<String> = None;
    let mut lane: Option<String> = None;
    let mut content_lines: Vec<&str> = Vec::new();

    for line in crate::tokenizer::lines(&block.text) {
        let Some(caps) = METADATA_LINE.captures(line.trim_end()) else {
            content_lines.push(line);
            continue;
        };
        let value = caps[2].trim().to_string();
        // A repeated key: the last occurrence wins, earlier ones are still
        // consumed as metadata.
        match caps[1].to_ascii_lowercase().as_str() {
            "date" => date_token = Some(value),
            "end_date" => end_date_token = Some(value),
            "class" => category = config.canonical_category(&value),
            "group" | "lane" => {
                if !value.is_empty() {
                    lane = Some(value);
                }
            }
            _ => unreachable!("regex alternation is exhaustive"),
        }
    }

    let mut content = content_lines.join("\n");

    let (instant, display_label, has_explicit_time) = match &date_token {
        None => {
            prepend_notice(&mut content, &DateFieldError::MissingField);
            (sentinel_instant(), None, false)
        }
        Some(token) => match date::resolve(token) {
            Some(resolved) => (
                resolved.instant,
                resolved.display_label,
                resolved.has_explicit_time,
            ),
            None => {
                prepend_notice(
                    &mut content,
                    &DateFieldError::Unparseable {
                        token: token.clone(),
                    },
                );
                (sentinel_instant(), None, false)
            }
        },
    };

    // Malformed end dates are dropped without a notice.
    let end_date = end_date_token
        .as_deref()
        .and_then(date::resolve)
        .map(|resolved| resolved.instant);

    Event {
        date: instant,
        end_date,
        display_label,
        has_explicit_time,
        category,
        lane: lane.unwrap_or_else(|| config.default_lane.clone()),
        content,
        source_start: block.start,
        source_end: block.end,
    }
}

fn prepend_notice(content: &mut String, error: &DateFieldError) {
    if content.is_empty() {
        *content = format!("**{error}**");
    } else {
        *content = format!("**{error}**\n\n{content}");
    }
}
