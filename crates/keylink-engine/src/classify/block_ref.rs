use super::kinds::BlockRef;
use super::lines::line_bounds;

/// True when `offset` sits inside a block id such as `^my-block`.
///
/// Looks for the nearest `^` before `offset` on the same line; the offset is
/// inside the id when everything between that caret and the offset is a
/// block-id character.
pub fn is_inside_block_reference(text: &str, offset: usize) -> bool {
    if offset >= text.len() {
        return false;
    }
    let line = line_bounds(text, offset);
    let before = &text.as_bytes()[line.start..offset];
    let Some(caret) = before.iter().rposition(|&b| b == BlockRef::CARET) else {
        return false;
    };
    before[caret + 1..].iter().all(|&b| BlockRef::is_id_byte(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::directly_after_caret("para ^Keyword1", 6, true)]
    #[case::after_id_prefix("para ^ref-Keyword1", 10, true)]
    #[case::space_breaks_id("^ref Keyword1", 5, false)]
    #[case::no_caret("plain Keyword1", 6, false)]
    #[case::caret_on_previous_line("^ref\nKeyword1", 5, false)]
    #[case::past_end("^abc", 4, false)]
    fn block_reference_detection(#[case] text: &str, #[case] offset: usize, #[case] expected: bool) {
        assert_eq!(is_inside_block_reference(text, offset), expected);
    }
}
