use crate::span::Span;

use super::lines::{line_bounds, next_line, previous_line};

/// Lines searched above the current line for a separator row.
pub const TABLE_LOOKBACK_LINES: usize = 10;
/// Lines searched below the current line for a separator row.
pub const TABLE_LOOKAHEAD_LINES: usize = 3;

/// True when `offset` is on a table row.
///
/// The current line must contain `|`, and a separator row such as
/// `|---|:--:|` must be within [`TABLE_LOOKBACK_LINES`] above or
/// [`TABLE_LOOKAHEAD_LINES`] below it.
pub fn is_inside_table(text: &str, offset: usize) -> bool {
    if offset >= text.len() {
        return false;
    }
    let current = line_bounds(text, offset);
    if !text[current.start..current.end].contains('|') {
        return false;
    }
    if is_separator_row(text, current) {
        return true;
    }

    let mut cursor = current;
    for _ in 0..TABLE_LOOKBACK_LINES {
        let Some(line) = previous_line(text, cursor) else {
            break;
        };
        if is_separator_row(text, line) {
            return true;
        }
        cursor = line;
    }

    let mut cursor = current;
    for _ in 0..TABLE_LOOKAHEAD_LINES {
        let Some(line) = next_line(text, cursor) else {
            break;
        };
        if is_separator_row(text, line) {
            return true;
        }
        cursor = line;
    }
    false
}

/// `|---|---|`, `| :-- | --: |` and similar.
fn is_separator_row(text: &str, line: Span) -> bool {
    let row = text[line.start..line.end].trim_end_matches('\r');
    if !row.contains('|') {
        return false;
    }
    let cells: String = row.chars().filter(|&c| c != '|').collect();
    cells.chars().all(|c| c == '-' || c == ':' || c.is_whitespace())
        && cells.chars().filter(|&c| c == '-').count() >= 3
}
