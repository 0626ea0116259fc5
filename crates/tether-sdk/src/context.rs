//! RuntimeContext trait: the owning bridge, seen from a module
//!
//! The runtime bridge implements this. Adapters hold it only through a
//! `Weak` reference and re-check it before every call, so a context can be
//! torn down at any time without waiting on the modules it owns.

use crate::handler::MethodCallResult;
use crate::types::{CallId, MethodKind};

/// A result travelling back through the callback side channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Correlation id supplied to `invoke`, forwarded unchanged
    pub call_id: Option<CallId>,
    /// Module name
    pub module: String,
    /// Method name
    pub method: String,
    /// Kind of the method that produced this delivery
    pub kind: MethodKind,
    /// Value or error descriptor
    pub outcome: MethodCallResult,
}

/// Abstract bridge context for native module adapters.
///
/// Both methods may be called from whichever thread a module's method queue
/// runs on.
pub trait RuntimeContext: Send + Sync {
    /// Whether the bridge still accepts calls.
    ///
    /// A context that is alive but shutting down returns `false`; adapters
    /// treat it the same as a dropped one.
    fn is_valid(&self) -> bool {
        true
    }

    /// Hand an asynchronous result to the callback side channel
    fn deliver(&self, delivery: Delivery);
}
