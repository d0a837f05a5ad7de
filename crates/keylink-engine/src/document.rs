use relative_path::{RelativePath, RelativePathBuf};

use crate::error::EngineError;

/// An immutable snapshot of one note, as handed to a scan.
///
/// The engine never mutates the snapshot; a scan returns new text and the
/// caller decides whether to commit it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Vault-relative path of the note, e.g. `projects/Target.md`.
    pub id: RelativePathBuf,
    /// Full raw text of the note.
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<RelativePathBuf>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Create a snapshot from raw bytes, rejecting anything that isn't UTF-8.
    pub fn from_bytes(id: impl Into<RelativePathBuf>, bytes: &[u8]) -> Result<Self, EngineError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| EngineError::invalid_input(format!("document is not UTF-8: {e}")))?;
        Ok(Self::new(id, text))
    }

    pub fn id(&self) -> &RelativePath {
        &self.id
    }

    /// File name without the `.md` extension, used for self-link checks.
    pub fn basename(&self) -> &str {
        note_basename(self.id.as_str())
    }

    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.id.as_str().trim().is_empty() {
            return Err(EngineError::invalid_input("document has no identity"));
        }
        Ok(())
    }
}

/// Strips folders and a trailing `.md` from a note path or link target.
pub fn note_basename(name: &str) -> &str {
    let file = name.rsplit('/').next().unwrap_or(name);
    file.strip_suffix(".md").unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Target.md", "Target")]
    #[case("projects/deep/Target.md", "Target")]
    #[case("Target", "Target")]
    #[case("notes/Read.me", "Read.me")]
    fn basename_strips_folders_and_extension(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(note_basename(path), expected);
    }

    #[test]
    fn from_bytes_rejects_invalid_utf8() {
        let err = Document::from_bytes("bad.md", &[0x66, 0xff, 0x6f]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn from_bytes_keeps_text_verbatim() {
        let doc = Document::from_bytes("a/Note.md", "line\r\nnext".as_bytes()).unwrap();
        assert_eq!(doc.text, "line\r\nnext");
        assert_eq!(doc.basename(), "Note");
    }

    #[test]
    fn empty_identity_fails_validation() {
        let doc = Document::new("", "text");
        assert!(doc.validate().is_err());
    }
}
