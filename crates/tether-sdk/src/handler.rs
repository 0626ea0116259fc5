//! NativeModule trait: registry-facing dispatch interface
//!
//! The module registry holds modules as `Box<dyn NativeModule>` and calls
//! methods by numeric id. Everything crossing this interface is a
//! [`Payload`] or an [`ErrorDescriptor`].

use crate::error::ErrorDescriptor;
use crate::types::{CallId, MethodDescriptor, MethodId};
use crate::value::Payload;

/// Result of a synchronous call: a value or a serializable error
pub type MethodCallResult = Result<Payload, ErrorDescriptor>;

/// Object-safe interface to one native module.
pub trait NativeModule: Send + Sync {
    /// Module name used for routing
    fn name(&self) -> &str;

    /// Ordered method table; index is the method id
    fn methods(&self) -> &[MethodDescriptor];

    /// Snapshot of the module's constants (`Null` when it defines none)
    fn constants(&self) -> Payload;

    /// Invoke a method, delivering any result through the callback side
    /// channel tagged with `call_id`.
    ///
    /// # Panics
    ///
    /// Panics if `method_id` is not an index into [`NativeModule::methods`].
    fn invoke(&self, method_id: MethodId, params: Payload, call_id: Option<CallId>);

    /// Invoke a method and return its result directly.
    ///
    /// # Panics
    ///
    /// Panics if `method_id` is not an index into [`NativeModule::methods`].
    fn call_serializable_native_hook(
        &self,
        method_id: MethodId,
        params: Payload,
    ) -> MethodCallResult;
}
