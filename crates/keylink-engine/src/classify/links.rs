//! Predicates for existing link-like markup: wikilinks and their aliases,
//! inline code, markdown links and suggestion markers.

use super::kinds::{CodeSpan, MarkdownLink, Suggestion, WikiLink};
use super::lines::{line_bounds, rfind_bytes, starts_with_at};

/// How far to look either side of an offset for a `[[target|alias]]` frame.
pub const ALIAS_SCAN_LIMIT: usize = 500;
/// How far to look either side of an offset for `[text](url)` delimiters.
pub const MARKDOWN_LINK_SCAN_LIMIT: usize = 300;

/// True when `offset` is in the alias segment of `[[target|alias]]`.
pub fn is_inside_alias(text: &str, offset: usize) -> bool {
    let bytes = text.as_bytes();
    if offset >= bytes.len() {
        return false;
    }

    let floor = offset.saturating_sub(ALIAS_SCAN_LIMIT);
    let mut seen_pipe = false;
    let mut opened = false;
    let mut i = offset;
    while i > floor {
        i -= 1;
        match bytes[i] {
            b'\n' => return false,
            WikiLink::ALIAS => seen_pipe = true,
            b'[' if i > 0 && bytes[i - 1] == b'[' => {
                opened = true;
                break;
            }
            b']' if i > 0 && bytes[i - 1] == b']' => return false,
            _ => {}
        }
    }
    if !opened || !seen_pipe {
        return false;
    }

    closes_before_newline(bytes, offset, ALIAS_SCAN_LIMIT)
}

/// True when `offset` is inside a wikilink, inline code, or either half of a
/// markdown link.
pub fn is_inside_link_or_code(text: &str, offset: usize) -> bool {
    is_inside_link_or_code_with(text, offset, &CodeTicks::new(text))
}

/// [`is_inside_link_or_code`] with backtick positions computed up front.
pub fn is_inside_link_or_code_with(text: &str, offset: usize, ticks: &CodeTicks) -> bool {
    offset < text.len()
        && (is_inside_wikilink(text, offset)
            || ticks.is_inside(offset)
            || is_inside_markdown_link_url(text, offset)
            || is_inside_markdown_link_text(text, offset))
}

/// An unmatched `[[` earlier on the same line.
pub fn is_inside_wikilink(text: &str, offset: usize) -> bool {
    let bytes = text.as_bytes();
    if offset >= bytes.len() {
        return false;
    }
    let line = line_bounds(text, offset);
    let mut i = offset;
    while i > line.start + 1 {
        i -= 1;
        if bytes[i - 1..=i] == *WikiLink::OPEN {
            return true;
        }
        if bytes[i - 1..=i] == *WikiLink::CLOSE {
            return false;
        }
    }
    false
}

/// Odd number of backticks between the start of the document and `offset`.
///
/// Parity is global rather than per line, so fenced blocks count as well.
pub fn is_inside_code_span(text: &str, offset: usize) -> bool {
    let end = offset.min(text.len());
    let ticks = text.as_bytes()[..end]
        .iter()
        .filter(|&&b| b == CodeSpan::TICK)
        .count();
    ticks % 2 == 1
}

/// Byte offsets of every backtick in a document, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTicks(Vec<usize>);

impl CodeTicks {
    pub fn new(text: &str) -> Self {
        Self(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == CodeSpan::TICK)
                .map(|(i, _)| i)
                .collect(),
        )
    }

    /// Same answer as [`is_inside_code_span`] for the indexed text.
    pub fn is_inside(&self, offset: usize) -> bool {
        self.0.partition_point(|&tick| tick < offset) % 2 == 1
    }
}

/// Inside the `(url)` half of a markdown link.
///
/// Walks back at most [`MARKDOWN_LINK_SCAN_LIMIT`] bytes, balancing parens,
/// until an unmatched `(` is found; it must directly follow `]`.
pub fn is_inside_markdown_link_url(text: &str, offset: usize) -> bool {
    let bytes = text.as_bytes();
    if offset >= bytes.len() {
        return false;
    }
    let floor = offset.saturating_sub(MARKDOWN_LINK_SCAN_LIMIT);
    let mut depth = 0usize;
    let mut i = offset;
    while i > floor {
        i -= 1;
        match bytes[i] {
            b'\n' => return false,
            MarkdownLink::URL_CLOSE => depth += 1,
            MarkdownLink::URL_OPEN if depth > 0 => depth -= 1,
            MarkdownLink::URL_OPEN => {
                return i > 0 && bytes[i - 1] == MarkdownLink::TEXT_CLOSE;
            }
            _ => {}
        }
    }
    false
}

/// Inside the `[text]` half of a markdown link: an unmatched single `[`
/// before the offset and an unmatched `]` followed by `(` after it.
pub fn is_inside_markdown_link_text(text: &str, offset: usize) -> bool {
    let bytes = text.as_bytes();
    if offset >= bytes.len() {
        return false;
    }

    let floor = offset.saturating_sub(MARKDOWN_LINK_SCAN_LIMIT);
    let mut depth = 0usize;
    let mut i = offset;
    let mut opened = false;
    while i > floor {
        i -= 1;
        match bytes[i] {
            b'\n' => return false,
            MarkdownLink::TEXT_CLOSE => depth += 1,
            MarkdownLink::TEXT_OPEN if depth > 0 => depth -= 1,
            MarkdownLink::TEXT_OPEN => {
                let doubled = (i > 0 && bytes[i - 1] == MarkdownLink::TEXT_OPEN)
                    || bytes.get(i + 1) == Some(&MarkdownLink::TEXT_OPEN);
                if doubled {
                    return false;
                }
                opened = true;
                break;
            }
            _ => {}
        }
    }
    if !opened {
        return false;
    }

    let ceiling = (offset + MARKDOWN_LINK_SCAN_LIMIT).min(bytes.len());
    let mut depth = 0usize;
    for j in offset..ceiling {
        match bytes[j] {
            b'\n' => return false,
            MarkdownLink::TEXT_OPEN => depth += 1,
            MarkdownLink::TEXT_CLOSE if depth > 0 => depth -= 1,
            MarkdownLink::TEXT_CLOSE => {
                return bytes.get(j + 1) == Some(&MarkdownLink::URL_OPEN);
            }
            _ => {}
        }
    }
    false
}

/// Inside a suggestion marker emitted by an earlier scan, either in its
/// attributes or its label.
pub fn is_inside_suggestion(text: &str, offset: usize) -> bool {
    let bytes = text.as_bytes();
    if offset >= bytes.len() {
        return false;
    }
    let opening = Suggestion::OPEN.as_bytes();
    let line = line_bounds(text, offset);
    if (offset.saturating_sub(opening.len() - 1).max(line.start)..=offset)
        .any(|start| starts_with_at(bytes, start, opening))
    {
        return true;
    }
    let before = &bytes[line.start..offset];
    let Some(open) = rfind_bytes(before, opening) else {
        return false;
    };
    match rfind_bytes(before, Suggestion::CLOSE.as_bytes()) {
        Some(close) => close < open,
        None => true,
    }
}

fn closes_before_newline(bytes: &[u8], offset: usize, limit: usize) -> bool {
    let ceiling = (offset + limit).min(bytes.len());
    for j in offset..ceiling {
        if bytes[j] == b'\n' {
            return false;
        }
        if starts_with_at(bytes, j, WikiLink::CLOSE) {
            return true;
        }
    }
    false
}
