//! Error types for module construction, dispatch, and configuration

use std::path::PathBuf;

use tether_sdk::{ErrorDescriptor, ErrorKind, NativeError};

/// A recoverable dispatch failure.
///
/// Every variant becomes an [`ErrorDescriptor`] before leaving the adapter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    /// The owning runtime context (or the host object) is gone
    #[error("module '{module}' is unavailable: the runtime context was torn down")]
    Unavailable {
        /// Module name
        module: String,
    },

    /// Parameters did not marshal into the method's argument types
    #[error("invalid arguments for {module}.{method}: {source}")]
    Marshal {
        /// Module name
        module: String,
        /// Method name
        method: String,
        /// Underlying conversion error
        source: NativeError,
    },

    /// The native method returned an error
    #[error("Exception '{reason}' was thrown while invoking {method} on target {module} with params {params}")]
    Native {
        /// Module name
        module: String,
        /// Method name
        method: String,
        /// Error text from the method
        reason: String,
        /// Rendered parameters
        params: String,
    },

    /// The native method panicked
    #[error("native method {module}.{method} panicked: {message}")]
    Panic {
        /// Module name
        module: String,
        /// Method name
        method: String,
        /// Panic payload text
        message: String,
    },

    /// An asynchronous method was called through the synchronous hook
    #[error("{module}.{method} is a {kind} method and cannot be called synchronously")]
    NotSynchronous {
        /// Module name
        module: String,
        /// Method name
        method: String,
        /// Method kind name
        kind: &'static str,
    },
}

impl BridgeError {
    /// Failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Unavailable { .. } => ErrorKind::Unavailable,
            BridgeError::Marshal { .. } => ErrorKind::Marshal,
            BridgeError::Native { .. } => ErrorKind::Native,
            BridgeError::Panic { .. } => ErrorKind::Panic,
            BridgeError::NotSynchronous { .. } => ErrorKind::NotSynchronous,
        }
    }

    /// Serializable form handed back across the bridge
    pub fn to_descriptor(&self) -> ErrorDescriptor {
        let (module, method) = match self {
            BridgeError::Unavailable { module } => (module, None),
            BridgeError::Marshal { module, method, .. }
            | BridgeError::Native { module, method, .. }
            | BridgeError::Panic { module, method, .. }
            | BridgeError::NotSynchronous { module, method, .. } => (module, Some(method.clone())),
        };
        ErrorDescriptor {
            kind: self.kind(),
            message: self.to_string(),
            module: module.clone(),
            method,
        }
    }
}

impl From<BridgeError> for ErrorDescriptor {
    fn from(err: BridgeError) -> Self {
        err.to_descriptor()
    }
}

/// Malformed module metadata, reported when the adapter is built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Module name is empty
    #[error("module name must not be empty")]
    EmptyModuleName,

    /// A method was registered without a name
    #[error("method #{index} of module '{module}' has an empty name")]
    EmptyMethodName {
        /// Module name
        module: String,
        /// Position in the table
        index: usize,
    },

    /// Two methods share a name
    #[error("module '{module}' registers method '{name}' more than once")]
    DuplicateMethod {
        /// Module name
        module: String,
        /// Method name
        name: String,
    },
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// TOML did not parse into the config schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
