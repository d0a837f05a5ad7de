use crate::span::Span;

use super::kinds::FrontMatter;
use super::lines::lines_with_spans;

/// Locates the YAML front matter block at the very start of `text`.
///
/// The first line must be exactly `---`; the block runs through the next
/// line that is exactly `---` or `...`, including that line's newline.
/// Without a closing delimiter the whole text is body and `None` is returned.
pub fn front_matter_bounds(text: &str) -> Option<Span> {
    let mut lines = lines_with_spans(text);
    let first = lines.next()?;
    if first.content() != FrontMatter::DELIMITER || first.span.end == text.len() {
        return None;
    }
    lines
        .find(|line| matches!(line.content(), FrontMatter::DELIMITER | FrontMatter::END))
        .map(|closing| Span::new(0, closing.span.end))
}

/// Body of the front matter (between the fences), for YAML parsing.
pub fn front_matter_body(text: &str) -> Option<&str> {
    let bounds = front_matter_bounds(text)?;
    let block = &text[..bounds.end];
    let body_start = block.find('\n')? + 1;
    let closing_start = block
        .trim_end_matches(['\r', '\n'])
        .rfind('\n')
        .map_or(body_start, |i| i + 1);
    Some(&text[body_start..closing_start.max(body_start)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn closed_block_includes_trailing_newline() {
        let text = "---\nfoo: Keyword1\n---\nKeyword1 text";
        assert_eq!(front_matter_bounds(text), Some(Span::new(0, 22)));
        assert_eq!(&text[22..], "Keyword1 text");
    }

    #[test]
    fn dots_close_the_block() {
        let text = "---\ntitle: x\n...\nbody";
        assert_eq!(front_matter_bounds(text), Some(Span::new(0, 17)));
    }

    #[test]
    fn closing_line_at_end_of_text() {
        let text = "---\na: 1\n---";
        assert_eq!(front_matter_bounds(text), Some(Span::new(0, 12)));
    }

    #[rstest]
    #[case::unclosed("---\nfoo: bar\nno close")]
    #[case::not_at_start("intro\n---\nfoo: bar\n---\n")]
    #[case::indented_fence(" ---\nfoo: bar\n---\n")]
    #[case::lone_fence("---")]
    #[case::empty("")]
    fn no_front_matter(#[case] text: &str) {
        assert_eq!(front_matter_bounds(text), None);
    }

    #[test]
    fn crlf_fences_are_recognised() {
        let text = "---\r\nfoo: 1\r\n---\r\nbody";
        assert_eq!(front_matter_bounds(text), Some(Span::new(0, 18)));
    }

    #[test]
    fn body_is_yaml_between_fences() {
        let text = "---\naliases: [A, B]\ntags: x\n---\nbody";
        assert_eq!(front_matter_body(text), Some("aliases: [A, B]\ntags: x\n"));
    }

    #[test]
    fn empty_body() {
        assert_eq!(front_matter_body("---\n---\nbody"), Some(""));
    }
}
