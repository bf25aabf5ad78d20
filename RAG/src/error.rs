//! Error types for the question-answering pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, GenieError>;

/// How a failure should be presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Pipeline errors. Every variant is terminal for the current run.
#[derive(Debug, Error)]
pub enum GenieError {
    /// The PDF decoded fine but no page produced any text
    #[error("Could not extract any text from the PDF. The file might be image-based or corrupted.")]
    NoExtractableText,

    /// The API credential is not configured
    #[error("{0} not found in .env file. Please add it.")]
    MissingCredential(String),

    /// The PDF could not be decoded
    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    /// Invalid settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding API failure or malformed embedding response
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Chat API failure or malformed chat response
    #[error("Chat completion failed: {0}")]
    Chat(String),

    /// Vector index misuse, e.g. mixed dimensions
    #[error("Vector index error: {0}")]
    Index(String),

    /// Transport-level HTTP failure
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GenieError {
    pub fn pdf(message: impl Into<String>) -> Self {
        Self::Pdf(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    pub fn chat(message: impl Into<String>) -> Self {
        Self::Chat(message.into())
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }

    pub fn severity(&self) -> Severity {
        match self {
            GenieError::NoExtractableText => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// The single display string shown to the user for this failure.
    ///
    /// The two halting conditions keep their own wording; everything else
    /// collapses into the generic "An error occurred" form.
    pub fn user_message(&self) -> String {
        match self {
            GenieError::NoExtractableText | GenieError::MissingCredential(_) => self.to_string(),
            other => format!("An error occurred: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_a_warning_with_its_own_message() {
        let err = GenieError::NoExtractableText;
        assert_eq!(err.severity(), Severity::Warning);
        assert_eq!(
            err.user_message(),
            "Could not extract any text from the PDF. The file might be image-based or corrupted."
        );
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let err = GenieError::MissingCredential("GOOGLE_API_KEY".to_string());
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(
            err.user_message(),
            "GOOGLE_API_KEY not found in .env file. Please add it."
        );
    }

    #[test]
    fn other_failures_use_the_generic_message() {
        let err = GenieError::chat("quota exceeded");
        assert_eq!(
            err.user_message(),
            "An error occurred: Chat completion failed: quota exceeded"
        );
    }
}
