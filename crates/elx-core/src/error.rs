use crate::types::SourceSpan;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct ElixirError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl ElixirError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(
        code: impl Into<String>,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: Some(span),
        }
    }

    /// Prefixes the message with the file the error came from, keeping code and span.
    pub fn in_file(mut self, path: impl std::fmt::Display) -> Self {
        self.message = format!("{}: {}", path, self.message);
        self
    }
}
