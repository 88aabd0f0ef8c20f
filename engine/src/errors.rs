//! Ideation engine error types
//!
//! Default policy: collaborator failures degrade to "no data" at the call
//! site; everything else propagates to the caller as a typed failure.

use thiserror::Error;

/// Error category for structured logging and behavior mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// `ideation.toml` or env misconfigured
    ConfigError,
    /// Errors creating/connecting/writing the knowledge base
    StorageIntegrityError,
    /// A catalog holds fewer items than a draw requires
    VocabularyExhausted,
    /// Panel feedback line without the `": "` separator
    MalformedFeedback,
    /// Simulator or completion API unreachable, non-200 or wrong shape
    ExternalCollaboratorUnavailable,
    /// Failures writing exported specifications or posts
    ExportError,
    /// Unexpected logic bugs
    InternalError,
}

impl ErrorCategory {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::StorageIntegrityError => "STORAGE_INTEGRITY_ERROR",
            Self::VocabularyExhausted => "VOCABULARY_EXHAUSTED",
            Self::MalformedFeedback => "MALFORMED_FEEDBACK",
            Self::ExternalCollaboratorUnavailable => "EXTERNAL_COLLABORATOR_UNAVAILABLE",
            Self::ExportError => "EXPORT_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the ideation cycle can continue after this error
    pub fn recoverable(&self) -> bool {
        matches!(self, Self::ExternalCollaboratorUnavailable)
    }
}

/// Ideation engine error with category and context
#[derive(Debug, Error)]
pub enum IdeationError {
    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("storage integrity error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("insufficient vocabulary: {catalog} holds {available} item(s), {requested} requested")]
    InsufficientVocabulary {
        catalog: &'static str,
        requested: usize,
        available: usize,
    },

    #[error("malformed feedback (missing \": \" separator): {line}")]
    MalformedFeedback { line: String },

    #[error("{collaborator} unavailable: {message}")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("export error: {message}")]
    Export {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl IdeationError {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config { .. } => ErrorCategory::ConfigError,
            Self::Storage { .. } => ErrorCategory::StorageIntegrityError,
            Self::InsufficientVocabulary { .. } => ErrorCategory::VocabularyExhausted,
            Self::MalformedFeedback { .. } => ErrorCategory::MalformedFeedback,
            Self::CollaboratorUnavailable { .. } => ErrorCategory::ExternalCollaboratorUnavailable,
            Self::Export { .. } => ErrorCategory::ExportError,
            Self::Internal { .. } => ErrorCategory::InternalError,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error with source
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a collaborator error
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            collaborator,
            message: message.into(),
            source: None,
        }
    }

    /// Create a collaborator error with source
    pub fn collaborator_with_source(
        collaborator: &'static str,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::CollaboratorUnavailable {
            collaborator,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an export error with source
    pub fn export_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Export {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for ideation operations
pub type Result<T> = std::result::Result<T, IdeationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes() {
        let err = IdeationError::MalformedFeedback {
            line: "no separator".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::MalformedFeedback);
        assert_eq!(err.category().as_str(), "MALFORMED_FEEDBACK");

        let err = IdeationError::InsufficientVocabulary {
            catalog: "concepts",
            requested: 1,
            available: 0,
        };
        assert_eq!(err.category().as_str(), "VOCABULARY_EXHAUSTED");
        assert!(err.to_string().contains("concepts holds 0 item(s)"));
    }

    #[test]
    fn test_only_collaborator_errors_recoverable() {
        assert!(
            IdeationError::collaborator("Cartographer of Light", "timeout")
                .category()
                .recoverable()
        );
        assert!(!IdeationError::storage("boom").category().recoverable());
        assert!(!IdeationError::internal("bug").category().recoverable());
    }
}
