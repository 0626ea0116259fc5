//! Tether bridge - native module adapters
//!
//! Wraps a host object in a [`ModuleAdapter`]: a fixed, ordered method
//! table addressed by index, a constants snapshot, and two dispatch entry
//! points (`invoke` for side-channel results, `call_serializable_native_hook`
//! for direct ones). The adapter never owns the host object or the runtime
//! context it reports to.
//!
//! # Example
//!
//! ```ignore
//! use tether_bridge::ModuleBuilder;
//!
//! let adapter = ModuleBuilder::<Calculator>::new("calc")
//!     .sync("add", |_, args| Ok(args.field::<i64>("a")? + args.field::<i64>("b")?))
//!     .build(&calculator, &bridge)?;
//!
//! let sum = adapter.call_serializable_native_hook(0, params)?;
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod logging;
pub mod module;
pub mod queue;
pub mod responder;

pub use adapter::ModuleAdapter;
pub use config::{AdapterConfig, ConstantsPolicy, LogConfig};
pub use error::{BridgeError, BuildError, ConfigError};
pub use module::ModuleBuilder;
pub use queue::{MethodQueue, SerialQueue};
pub use responder::Responder;

pub use tether_sdk::{
    Args, CallId, Delivery, ErrorDescriptor, ErrorKind, FromPayload, IntoPayload,
    MethodCallResult, MethodDescriptor, MethodId, MethodKind, NativeError, NativeModule,
    NativeResult, Payload, RuntimeContext,
};
