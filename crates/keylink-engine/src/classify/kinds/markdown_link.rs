/// Delimiters of an inline markdown link `[text](url)`.
pub struct MarkdownLink;

impl MarkdownLink {
    pub const TEXT_OPEN: u8 = b'[';
    pub const TEXT_CLOSE: u8 = b']';
    pub const URL_OPEN: u8 = b'(';
    pub const URL_CLOSE: u8 = b')';
    pub const EXTENSION: &'static str = ".md";
}
