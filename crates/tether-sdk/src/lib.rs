//! Tether SDK - boundary types for native modules
//!
//! This crate provides the types shared by native module authors, module
//! adapters, and the runtime bridge that owns them, without depending on the
//! adapter machinery itself.
//!
//! # Example
//!
//! ```ignore
//! use tether_sdk::{Args, NativeResult, Payload};
//!
//! fn add(_host: &Calculator, args: &Args) -> NativeResult<i64> {
//!     Ok(args.field::<i64>("a")? + args.field::<i64>("b")?)
//! }
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod convert;
pub mod error;
pub mod handler;
pub mod types;
pub mod value;

pub use context::{Delivery, RuntimeContext};
pub use convert::{FromPayload, IntoPayload};
pub use error::{ErrorDescriptor, ErrorKind, NativeError, NativeResult};
pub use handler::{MethodCallResult, NativeModule};
pub use types::{Args, CallId, MethodDescriptor, MethodId, MethodKind};
pub use value::Payload;
