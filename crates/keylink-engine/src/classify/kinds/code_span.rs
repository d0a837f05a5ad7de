/// Code span delimiter.
///
/// Backticks are counted globally, so a fenced block (three ticks) flips the
/// parity the same way an inline span does.
pub struct CodeSpan;

impl CodeSpan {
    /// The backtick character that delimits code spans.
    pub const TICK: u8 = b'`';
}
