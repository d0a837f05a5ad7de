/// Block reference anchor, e.g. `^intro-para` at the end of a line.
pub struct BlockRef;

impl BlockRef {
    pub const CARET: u8 = b'^';

    /// Characters allowed in a block id after the caret.
    pub fn is_id_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
    }
}
