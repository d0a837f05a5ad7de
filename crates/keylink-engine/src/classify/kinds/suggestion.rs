/// The inert suggestion marker emitted in suggest mode.
///
/// ```text
/// <span class="keylink-suggestion" data-target="Target" data-block="^id" data-relative="false">label</span>
/// ```
pub struct Suggestion;

impl Suggestion {
    pub const CLASS: &'static str = "keylink-suggestion";
    pub const OPEN: &'static str = r#"<span class="keylink-suggestion""#;
    pub const CLOSE: &'static str = "</span>";
    pub const ATTR_TARGET: &'static str = "data-target";
    pub const ATTR_BLOCK: &'static str = "data-block";
    pub const ATTR_RELATIVE: &'static str = "data-relative";
}
