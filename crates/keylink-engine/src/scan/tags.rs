/// Turns a keyword into a tag name: lowercase, whitespace runs become `-`,
/// anything other than alphanumerics, `_` and `-` is dropped.
pub fn sanitize_tag(keyword: &str) -> String {
    let mut tag = String::with_capacity(keyword.len());
    let mut pending_dash = false;
    for c in keyword.trim().chars() {
        if c.is_whitespace() {
            pending_dash = true;
            continue;
        }
        if !(c.is_alphanumeric() || c == '_' || c == '-') {
            continue;
        }
        if pending_dash && !tag.is_empty() {
            tag.push('-');
        }
        pending_dash = false;
        tag.extend(c.to_lowercase());
    }
    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Keyword1", "keyword1")]
    #[case("Machine Learning", "machine-learning")]
    #[case("  spaced   out  ", "spaced-out")]
    #[case("C++ & Rust!", "c-rust")]
    #[case("snake_case-ok", "snake_case-ok")]
    #[case("Café", "café")]
    #[case("!!!", "")]
    fn sanitizes(#[case] keyword: &str, #[case] expected: &str) {
        assert_eq!(sanitize_tag(keyword), expected);
    }
}
