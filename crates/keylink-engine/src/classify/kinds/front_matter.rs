/// YAML front matter fences.
pub struct FrontMatter;

impl FrontMatter {
    pub const DELIMITER: &'static str = "---";
    /// YAML document-end marker, accepted as an alternative closing line.
    pub const END: &'static str = "...";
}
