//! Error types for native methods and the serializable error descriptor

use serde::{Deserialize, Serialize};

/// Result type for marshaling and native method bodies
pub type NativeResult<T> = Result<T, NativeError>;

/// Errors a native method body can produce.
///
/// The first three variants are marshaling failures (the payload did not
/// have the shape the method expects). `Failed` is the method itself failing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NativeError {
    /// Type mismatch during conversion
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// A required positional argument or named field is absent
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// Payload structure does not fit the method's argument shape
    #[error("Malformed arguments: {0}")]
    Malformed(String),

    /// The native method failed
    #[error("{0}")]
    Failed(String),
}

impl NativeError {
    /// Native failure with a message
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        NativeError::Failed(reason.to_string())
    }

    pub(crate) fn mismatch(expected: &str, got: &str) -> Self {
        NativeError::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Whether this is a marshaling failure rather than a method failure
    pub fn is_marshal(&self) -> bool {
        !matches!(self, NativeError::Failed(_))
    }
}

impl From<String> for NativeError {
    fn from(s: String) -> Self {
        NativeError::Failed(s)
    }
}

impl From<&str> for NativeError {
    fn from(s: &str) -> Self {
        NativeError::Failed(s.to_string())
    }
}

/// Category of a reported call failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The owning runtime context is gone
    Unavailable,
    /// Arguments did not marshal into the method's types
    Marshal,
    /// The method returned an error
    Native,
    /// The method panicked
    Panic,
    /// An asynchronous method was called through the synchronous hook
    NotSynchronous,
}

impl ErrorKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Marshal => "marshal",
            ErrorKind::Native => "native",
            ErrorKind::Panic => "panic",
            ErrorKind::NotSynchronous => "not_synchronous",
        }
    }
}

/// Serializable description of a failed call.
///
/// This is what callers receive in place of a result; nothing else crosses
/// the bridge on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// Failure category
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Module name
    pub module: String,
    /// Method name, when the failure is tied to one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl std::fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}
