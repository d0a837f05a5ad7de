pub struct WikiLink;

impl WikiLink {
    pub const OPEN_TEXT: &'static str = "[[";
    pub const CLOSE_TEXT: &'static str = "]]";
    pub const OPEN: &'static [u8] = Self::OPEN_TEXT.as_bytes();
    pub const CLOSE: &'static [u8] = Self::CLOSE_TEXT.as_bytes();
    pub const ALIAS: u8 = b'|';
    /// Separator used instead of `|` when the link sits inside a table row.
    pub const TABLE_ALIAS: &'static str = "\\|";
    pub const HEADING: u8 = b'#';
}
