use crate::span::Span;

/// A reference to a single line of the text with its byte span.
#[derive(Debug, Clone, Copy)]
pub struct LineRef<'a> {
    /// Byte span of this line (includes the newline if present).
    pub span: Span,
    /// The raw line, newline included.
    pub text: &'a str,
}

impl<'a> LineRef<'a> {
    /// Line content without its `\n` / `\r\n` terminator.
    pub fn content(&self) -> &'a str {
        self.text.trim_end_matches(['\r', '\n'])
    }
}

/// Returns an iterator over lines with their byte spans.
///
/// Newlines stay attached to their line so spans tile the whole text.
pub fn lines_with_spans(text: &str) -> impl Iterator<Item = LineRef<'_>> {
    let mut offset = 0usize;
    text.split_inclusive('\n').map(move |line| {
        let start = offset;
        offset += line.len();
        LineRef {
            span: Span::new(start, offset),
            text: line,
        }
    })
}

/// Span of the line containing `offset`, excluding its newline.
///
/// Offsets past the end are clamped to the end of the text.
pub fn line_bounds(text: &str, offset: usize) -> Span {
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());
    let start = bytes[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let end = bytes[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| offset + i);
    Span::new(start, end)
}

/// The line before `line`, if any.
pub fn previous_line(text: &str, line: Span) -> Option<Span> {
    (line.start > 0).then(|| line_bounds(text, line.start - 1))
}

/// The line after `line`, if any.
pub fn next_line(text: &str, line: Span) -> Option<Span> {
    (line.end < text.len()).then(|| line_bounds(text, line.end + 1))
}

/// Byte slice helper: does `bytes[at..]` start with `pat`?
pub fn starts_with_at(bytes: &[u8], at: usize, pat: &[u8]) -> bool {
    bytes.get(at..).is_some_and(|rest| rest.starts_with(pat))
}

/// Last position of `needle` inside `hay`.
pub fn rfind_bytes(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    hay.windows(needle.len()).rposition(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_tile_the_text() {
        let lines: Vec<_> = lines_with_spans("a\nbc\r\n\nd").collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].span, Span::new(2, 6));
        assert_eq!(lines[1].content(), "bc");
        assert_eq!(lines[2].content(), "");
        assert_eq!(lines[3].span, Span::new(7, 8));
    }

    #[test]
    fn line_bounds_excludes_newline() {
        let text = "first\nsecond\nthird";
        assert_eq!(line_bounds(text, 0), Span::new(0, 5));
        assert_eq!(line_bounds(text, 8), Span::new(6, 12));
        assert_eq!(line_bounds(text, 12), Span::new(6, 12));
        assert_eq!(line_bounds(text, 99), Span::new(13, 18));
    }

    #[test]
    fn neighbouring_lines() {
        let text = "one\ntwo\nthree";
        let two = line_bounds(text, 5);
        assert_eq!(previous_line(text, two), Some(Span::new(0, 3)));
        assert_eq!(next_line(text, two), Some(Span::new(8, 13)));
        assert_eq!(previous_line(text, Span::new(0, 3)), None);
        assert_eq!(next_line(text, Span::new(8, 13)), None);
    }

    #[test]
    fn trailing_newline_has_empty_last_line() {
        let text = "row\n";
        assert_eq!(next_line(text, Span::new(0, 3)), Some(Span::new(4, 4)));
    }

    #[test]
    fn byte_search_helpers() {
        assert!(starts_with_at(b"ab[[c", 2, b"[["));
        assert!(!starts_with_at(b"ab", 5, b"[["));
        assert_eq!(rfind_bytes(b"x</span>y</span>", b"</span>"), Some(9));
        assert_eq!(rfind_bytes(b"abc", b""), None);
    }
}
