//! Error types for the stbs CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=store, 3=not_found, 4=validation, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

use crate::shard::ShardError;
use crate::validate::{FormatError, FIELD_NAMES};

/// Result type alias for stbs operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Store (exit 2)
    StaleLocation,

    // Not Found (exit 3)
    ShardNotFound,

    // Validation (exit 4)
    FormatError,
    InvalidField,
    InvalidArgument,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
    ParseError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::StaleLocation => "STALE_LOCATION",
            Self::ShardNotFound => "SHARD_NOT_FOUND",
            Self::FormatError => "FORMAT_ERROR",
            Self::InvalidField => "INVALID_FIELD",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::ParseError => "PARSE_ERROR",
        }
    }

    /// Category-based exit code (2-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::StaleLocation => 2,
            Self::ShardNotFound => 3,
            Self::FormatError | Self::InvalidField | Self::InvalidArgument => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::ParseError => 8,
        }
    }

    /// Whether the caller should retry with corrected input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FormatError | Self::InvalidField | Self::InvalidArgument | Self::ConfigError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in stbs operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid record: {0}")]
    Format(#[from] FormatError),

    #[error("Shard file not found: {path}")]
    ShardNotFound { path: String },

    #[error("Cannot parse shard {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Shard {path} has {len} elements, no slot {index}")]
    StaleLocation {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Unknown field: {field}")]
    UnknownField {
        field: String,
        suggestion: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ShardError> for Error {
    fn from(err: ShardError) -> Self {
        match err {
            ShardError::Io(e) => Self::Io(e),
            ShardError::Json(e) => Self::Json(e),
            ShardError::Parse { path, message } => Self::Parse { path, message },
            ShardError::FileNotFound(path) => Self::ShardNotFound { path },
            ShardError::StaleLocation { path, index, len } => {
                Self::StaleLocation { path, index, len }
            }
        }
    }
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Format(_) => ErrorCode::FormatError,
            Self::ShardNotFound { .. } => ErrorCode::ShardNotFound,
            Self::Parse { .. } => ErrorCode::ParseError,
            Self::StaleLocation { .. } => ErrorCode::StaleLocation,
            Self::UnknownField { .. } => ErrorCode::InvalidField,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Format(_) => Some(
                "Records look like: STB|TITLE|PROVIDER|YYYY-MM-DD|REVENUE|H:MM".to_string(),
            ),

            Self::ShardNotFound { .. } => Some(
                "Use `stbs status` to list the shards in the shard directory.".to_string(),
            ),

            Self::Parse { path, .. } => Some(format!(
                "'{path}' is not a JSON array of records. Restore it or move it out of the shard directory."
            )),

            Self::StaleLocation { path, .. } => Some(format!(
                "'{path}' changed since it was indexed. Re-run the command so the shard is attached again."
            )),

            Self::UnknownField { suggestion, .. } => Some(suggestion.as_ref().map_or_else(
                || format!("Valid fields: {}", FIELD_NAMES.join(", ")),
                |s| format!("Did you mean: {s}?"),
            )),

            Self::Config(msg) if msg.contains("shard size") => Some(
                "Shard size must be a positive integer (--shard-size or STBS_SHARD_SIZE)."
                    .to_string(),
            ),

            Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
