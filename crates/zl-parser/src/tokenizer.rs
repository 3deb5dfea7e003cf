//! Block tokenization.
//!
//! Splits the document body into event blocks at `---` separator lines while
//! tracking absolute byte offsets into the original raw text.

use serde::Serialize;

/// One event block between separators, with its absolute source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    /// Block text with surrounding whitespace trimmed.
    pub text: String,
    /// Absolute byte offset of the first non-whitespace character.
    pub start: usize,
    /// Absolute byte offset one past the last non-whitespace character.
    pub end: usize,
}

/// Split `body` into blocks at lines consisting solely of `---`.
///
/// Whitespace-only blocks are discarded. Offsets are `body_offset` plus the
/// local index, so they address the original untouched document even after
/// the title line was stripped. The trailing segment after the last
/// separator is a block even without a trailing separator.
#[must_use]
pub fn split(body: &str, body_offset: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut block_start = 0usize;

    for (line_start, line_end, next_start) in line_spans(body) {
        if &body[line_start..line_end] == "---" {
            push_block(&mut blocks, body, block_start, line_start, body_offset);
            block_start = next_start;
        }
    }
    push_block(&mut blocks, body, block_start, body.len(), body_offset);
    blocks
}

/// Line contents without terminators, honoring CR, LF, and CRLF.
///
/// `str::lines` does not split on bare CR, so every scan that must agree
/// with the block separator logic goes through here instead.
pub(crate) fn lines(text: &str) -> Vec<&str> {
    line_spans(text)
        .into_iter()
        .map(|(start, end, _)| &text[start..end])
        .collect()
}

/// Yields `(content_start, content_end, next_line_start)` for each line,
/// honoring CR, LF, and CRLF terminators.
pub(crate) fn line_spans(body: &str) -> Vec<(usize, usize, usize)> {
    let bytes = body.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                let next = if bytes.get(i + 1) == Some(&b'\n') { i + 2 } else { i + 1 };
                spans.push((start, i, next));
                i = next;
                start = next;
            }
            b'\n' => {
                spans.push((start, i, i + 1));
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        spans.push((start, bytes.len(), bytes.len()));
    }
    spans
}

fn push_block(blocks: &mut Vec<Block>, body: &str, start: usize, end: usize, body_offset: usize) {
    let slice = &body[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = slice.len() - slice.trim_start().len();
    let trailing = slice.len() - slice.trim_end().len();
    blocks.push(Block {
        text: trimmed.to_string(),
        start: body_offset + start + leading,
        end: body_offset + end - trailing,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_separator_lines() {
        let blocks = split("first\n---\nsecond\n---\nthird", 0);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].text, "first");
        assert_eq!(blocks[1].text, "second");
        assert_eq!(blocks[2].text, "third");
    }

    #[test]
    fn trailing_segment_without_separator_is_a_block() {
        let blocks = split("only block, no separator", 0);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "only block, no separator");
    }

    #[test]
    fn discards_whitespace_only_blocks() {
        let blocks = split("a\n---\n   \n\t\n---\nb\n---\n", 0);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "a");
        assert_eq!(blocks[1].text, "b");
    }

    #[test]
    fn separator_needs_its_own_line() {
        let blocks = split("a --- b\n----\n--", 0);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "a --- b\n----\n--");
    }

    #[test]
    fn handles_crlf_separators() {
        let body = "first\r\n---\r\nsecond";
        let blocks = split(body, 0);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "first");
        assert_eq!(blocks[1].text, "second");
        assert_eq!(&body[blocks[1].start..blocks[1].end], "second");
    }

    #[test]
    fn handles_bare_cr_separators() {
        let blocks = split("first\r---\rsecond", 0);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].text, "second");
    }

    #[test]
    fn spans_address_the_original_document() {
        let body = "\nfirst block\n---\n  second\n";
        let offset = 17;
        let blocks = split(body, offset);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].start, offset + 1);
        assert_eq!(blocks[0].end, offset + 12);
        assert_eq!(
            &body[blocks[1].start - offset..blocks[1].end - offset],
            "second"
        );
    }

    #[test]
    fn spans_are_increasing_and_disjoint() {
        let blocks = split("a\n---\nbb\n---\nccc\n", 0);
        for pair in blocks.windows(2) {
            assert!(pair[0].start < pair[0].end);
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn lines_split_on_every_terminator_kind() {
        assert_eq!(lines("a\nb\r\nc\rd"), ["a", "b", "c", "d"]);
        assert_eq!(lines("trailing\n"), ["trailing"]);
        assert_eq!(lines(""), Vec::<&str>::new());
    }

    #[test]
    fn empty_body_yields_no_blocks() {
        assert!(split("", 0).is_empty());
        assert!(split("\n\n---\n\n", 0).is_empty());
    }
}
