//! Method table metadata and argument access
//!
//! [`MethodDescriptor`] is what a module publishes about each method; its
//! position in the published table is the method's id. [`Args`] is the
//! read-only view a method body gets over its parameter payload.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::convert::FromPayload;
use crate::error::{NativeError, NativeResult};
use crate::value::Payload;

/// Index of a method within a module's method table
pub type MethodId = u32;

/// Opaque correlation token for an asynchronous invocation's callback.
///
/// Forwarded unchanged; never interpreted by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub i64);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a method delivers its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Returns its value directly
    Sync,
    /// Fire-and-forget; any result arrives through the callback side channel
    Async,
    /// Asynchronous, settled exactly once as resolved or rejected
    Promise,
}

impl MethodKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Sync => "sync",
            MethodKind::Async => "async",
            MethodKind::Promise => "promise",
        }
    }

    /// Whether results go through the side channel
    pub fn is_async(&self) -> bool {
        !matches!(self, MethodKind::Sync)
    }
}

/// One entry in a module's published method table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Invocation kind
    #[serde(rename = "type")]
    pub kind: MethodKind,
}

impl MethodDescriptor {
    /// Create a descriptor
    pub fn new(name: impl Into<String>, kind: MethodKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

// ============================================================================
// Args
// ============================================================================

/// Borrowed view over a method's parameter payload.
///
/// A list payload is positional, a map payload is named, and null is an
/// empty argument list. Any other shape fails every lookup as malformed.
#[derive(Clone, Copy)]
pub struct Args<'a> {
    params: &'a Payload,
}

impl<'a> Args<'a> {
    /// Wrap a parameter payload
    pub fn new(params: &'a Payload) -> Self {
        Self { params }
    }

    /// The raw parameter payload
    pub fn payload(&self) -> &'a Payload {
        self.params
    }

    /// Number of arguments (positional) or fields (named)
    pub fn len(&self) -> usize {
        match self.params {
            Payload::List(items) => items.len(),
            Payload::Map(entries) => entries.len(),
            Payload::Null => 0,
            _ => 1,
        }
    }

    /// Check if there are no arguments
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn positional(&self) -> NativeResult<&'a [Payload]> {
        match self.params {
            Payload::List(items) => Ok(items.as_slice()),
            Payload::Null => Ok(&[]),
            other => Err(NativeError::Malformed(format!(
                "expected positional arguments, got {}",
                other.type_name()
            ))),
        }
    }

    fn named(&self, name: &str) -> NativeResult<Option<&'a Payload>> {
        match self.params {
            Payload::Map(entries) => Ok(entries.get(name)),
            Payload::Null => Ok(None),
            other => Err(NativeError::Malformed(format!(
                "expected named arguments, got {}",
                other.type_name()
            ))),
        }
    }

    /// Required positional argument
    pub fn arg<T: FromPayload>(&self, index: usize) -> NativeResult<T> {
        let value = self
            .positional()?
            .get(index)
            .ok_or_else(|| NativeError::MissingArgument(format!("#{}", index)))?;
        T::from_payload(value)
    }

    /// Optional positional argument; absent and null both read as `None`
    pub fn opt_arg<T: FromPayload>(&self, index: usize) -> NativeResult<Option<T>> {
        match self.positional()?.get(index) {
            Some(value) => Option::<T>::from_payload(value),
            None => Ok(None),
        }
    }

    /// Required named field
    pub fn field<T: FromPayload>(&self, name: &str) -> NativeResult<T> {
        let value = self
            .named(name)?
            .ok_or_else(|| NativeError::MissingArgument(name.to_string()))?;
        T::from_payload(value)
    }

    /// Optional named field; absent and null both read as `None`
    pub fn opt_field<T: FromPayload>(&self, name: &str) -> NativeResult<Option<T>> {
        match self.named(name)? {
            Some(value) => Option::<T>::from_payload(value),
            None => Ok(None),
        }
    }

    /// Decode the whole parameter payload as one value
    pub fn decode<T: FromPayload>(&self) -> NativeResult<T> {
        T::from_payload(self.params)
    }
}

impl fmt::Debug for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Args").field(self.params).finish()
    }
}
