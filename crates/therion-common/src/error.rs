//! Unified error types for the Therion workspace.
//!
//! Every failure raised by the text core maps onto one of these variants and
//! propagates unmodified through recursive parsing and inclusion.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum TherionError {
    /// Malformed token, quoting, option, or file content.
    #[error("syntax error: {message}")]
    Syntax {
        /// Description of the malformed input, including its location when known.
        message: String,
    },

    /// A reference cannot be resolved from the given viewing context.
    #[error("invalid reference \"{reference}\": {message}")]
    InvalidReference {
        /// The reference text (or the object id when building one).
        reference: String,
        /// Why the reference could not be walked.
        message: String,
    },

    /// A precondition was violated, e.g. a required context is missing.
    #[error("unexpected state: {message}")]
    UnexpectedState {
        /// Description of the violated precondition.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An encoding name is unsupported or text cannot be re-encoded.
    #[error("encoding error: {message}")]
    Encoding {
        /// Description of the encoding failure.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl TherionError {
    /// Builds a [`TherionError::Syntax`] from any displayable message.
    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Builds a [`TherionError::Syntax`] located at a 1-based source line.
    #[must_use]
    pub fn syntax_at(line: Option<usize>, message: impl std::fmt::Display) -> Self {
        let message = match line {
            Some(n) => format!("line {n}: {message}"),
            None => message.to_string(),
        };
        Self::Syntax { message }
    }

    /// Builds a [`TherionError::InvalidReference`].
    #[must_use]
    pub fn invalid_reference(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Builds a [`TherionError::UnexpectedState`].
    #[must_use]
    pub fn unexpected_state(message: impl Into<String>) -> Self {
        Self::UnexpectedState {
            message: message.into(),
        }
    }

    /// Builds a [`TherionError::Encoding`].
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, TherionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_at_prefixes_line_number() {
        let err = TherionError::syntax_at(Some(12), "unterminated quote");
        assert_eq!(err.to_string(), "syntax error: line 12: unterminated quote");
    }

    #[test]
    fn syntax_at_without_line_keeps_message() {
        let err = TherionError::syntax_at(None, "stray ]");
        assert_eq!(err.to_string(), "syntax error: stray ]");
    }

    #[test]
    fn invalid_reference_names_the_reference() {
        let err = TherionError::invalid_reference("1@a.b", "no child survey \"a\"");
        let msg = err.to_string();
        assert!(msg.contains("1@a.b"), "got: {msg}");
        assert!(msg.contains("no child survey"), "got: {msg}");
    }
}
