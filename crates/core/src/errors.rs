//! Error types for prompt-pocket
//!
//! This module defines the single error type shared by the template engine,
//! the prompt store and the command boundary, together with the coarse
//! `ErrorKind` taxonomy that hosts use to decide how to present a failure.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for prompt-pocket operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Main error type for prompt-pocket
#[derive(Debug, Error)]
pub enum PromptError {
    /// Blob store could not be read
    #[error("Failed to read storage: {0}")]
    StorageRead(String),

    /// Persisted blob is not valid JSON
    #[error("Corrupted storage: {0}")]
    CorruptedStorage(String),

    /// Persisted blob parsed, but is not a collection
    #[error("Invalid data format: {0}")]
    InvalidDataFormat(String),

    /// Blob store could not be written
    #[error("Failed to write storage: {0}")]
    StorageWrite(String),

    /// No prompt with the given id
    #[error("Prompt with id \"{0}\" not found")]
    PromptNotFound(String),

    /// Input failed validation
    #[error("{0}")]
    Validation(String),

    /// Clipboard write/paste failed at the collaborator boundary
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Caret movement failed or is unsupported on this platform
    #[error("Cursor movement failed: {0}")]
    CursorMove(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Command not found in registry
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Invalid command arguments
    #[error("Invalid arguments for command '{command}': {reason}")]
    InvalidArgs { command: String, reason: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error (catch-all)
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of a [`PromptError`]
///
/// Hosts switch on this instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    StorageReadFailed,
    StorageWriteFailed,
    PromptNotFound,
    ValidationFailed,
    ClipboardFailed,
    CursorMoveFailed,
    Unknown,
}

impl From<String> for PromptError {
    fn from(err: String) -> Self {
        PromptError::Other(err)
    }
}

impl From<&str> for PromptError {
    fn from(err: &str) -> Self {
        PromptError::Other(err.to_string())
    }
}

impl PromptError {
    /// Shorthand for a validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        PromptError::Validation(msg.into())
    }

    /// Map this error onto the coarse taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            PromptError::StorageRead(_)
            | PromptError::CorruptedStorage(_)
            | PromptError::InvalidDataFormat(_) => ErrorKind::StorageReadFailed,
            PromptError::StorageWrite(_) => ErrorKind::StorageWriteFailed,
            PromptError::PromptNotFound(_) => ErrorKind::PromptNotFound,
            PromptError::Validation(_) | PromptError::InvalidArgs { .. } => {
                ErrorKind::ValidationFailed
            },
            PromptError::Clipboard(_) => ErrorKind::ClipboardFailed,
            PromptError::CursorMove(_) => ErrorKind::CursorMoveFailed,
            PromptError::ConfigError(_)
            | PromptError::CommandNotFound(_)
            | PromptError::SerdeError(_)
            | PromptError::IoError(_)
            | PromptError::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Get user-friendly error message for display in the host UI
    pub fn user_message(&self) -> String {
        match self {
            PromptError::StorageRead(_) => "Failed to load data. Please try again.".to_string(),
            PromptError::CorruptedStorage(_) => {
                "Stored prompts are corrupted and could not be loaded.".to_string()
            },
            PromptError::InvalidDataFormat(_) => {
                "Stored prompts have an invalid format and could not be loaded.".to_string()
            },
            PromptError::StorageWrite(_) => {
                "Failed to save data. Please check your storage.".to_string()
            },
            PromptError::PromptNotFound(_) => {
                "Prompt not found. It may have been deleted.".to_string()
            },
            PromptError::Validation(msg) => msg.clone(),
            PromptError::Clipboard(_) => {
                "Failed to access clipboard. Please check permissions.".to_string()
            },
            PromptError::CursorMove(_) => {
                "Failed to move cursor. Text was pasted successfully.".to_string()
            },
            PromptError::CommandNotFound(cmd) => format!("Command '{}' not found.", cmd),
            PromptError::InvalidArgs { command, reason } => {
                format!("Invalid arguments for '{}': {}", command, reason)
            },
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            PromptError::StorageRead(_) => "storage_read",
            PromptError::CorruptedStorage(_) => "corrupted_storage",
            PromptError::InvalidDataFormat(_) => "invalid_data_format",
            PromptError::StorageWrite(_) => "storage_write",
            PromptError::PromptNotFound(_) => "not_found",
            PromptError::Validation(_) => "validation",
            PromptError::Clipboard(_) => "clipboard",
            PromptError::CursorMove(_) => "cursor",
            PromptError::ConfigError(_) => "config",
            PromptError::CommandNotFound(_) => "command",
            PromptError::InvalidArgs { .. } => "arguments",
            PromptError::SerdeError(_) => "serialization",
            PromptError::IoError(_) => "io",
            PromptError::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PromptError::PromptNotFound("abc".to_string());
        assert_eq!(err.to_string(), "Prompt with id \"abc\" not found");
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = PromptError::validation("Title is required");
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.user_message(), "Title is required");
    }

    #[test]
    fn test_storage_read_variants_share_kind() {
        assert_eq!(
            PromptError::StorageRead("x".into()).kind(),
            ErrorKind::StorageReadFailed
        );
        assert_eq!(
            PromptError::CorruptedStorage("x".into()).kind(),
            ErrorKind::StorageReadFailed
        );
        assert_eq!(
            PromptError::InvalidDataFormat("x".into()).kind(),
            ErrorKind::StorageReadFailed
        );
    }

    #[test]
    fn test_user_messages_are_distinguishable() {
        let errors = [
            PromptError::StorageRead("x".into()),
            PromptError::CorruptedStorage("x".into()),
            PromptError::InvalidDataFormat("x".into()),
            PromptError::StorageWrite("x".into()),
            PromptError::PromptNotFound("x".into()),
            PromptError::Clipboard("x".into()),
            PromptError::CursorMove("x".into()),
        ];
        let mut messages: Vec<String> = errors.iter().map(|e| e.user_message()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn test_cursor_message_does_not_claim_paste_failed() {
        let msg = PromptError::CursorMove("unsupported".into()).user_message();
        assert!(msg.contains("pasted successfully"));
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            PromptError::CommandNotFound("test".to_string()).category(),
            "command"
        );
        assert_eq!(
            PromptError::InvalidArgs {
                command: "test".to_string(),
                reason:  "bad".to_string(),
            }
            .category(),
            "arguments"
        );
    }

    #[test]
    fn test_invalid_args_is_validation_kind() {
        let err = PromptError::InvalidArgs {
            command: "prompts.get".to_string(),
            reason:  "missing field `id`".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::PromptNotFound).unwrap();
        assert_eq!(json, "\"PROMPT_NOT_FOUND\"");
    }

    #[test]
    fn test_from_string() {
        let err: PromptError = "test error".into();
        assert_eq!(err.to_string(), "test error");
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }
}
