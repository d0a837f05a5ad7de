use thiserror::Error;

/// Failures the engine propagates to its caller.
///
/// Malformed markup never produces an error: the classifier degrades to
/// "do not match here". Only a document snapshot that cannot be scanned at
/// all is rejected.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}
