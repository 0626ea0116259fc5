//! Responder: the callback handle given to asynchronous methods
//!
//! A responder settles an invocation at most once. It holds the owning
//! context weakly, so a method that keeps its responder around (for a
//! subscription, a timer, a worker) never keeps a torn-down bridge alive;
//! late results are dropped instead of delivered.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tether_sdk::{
    CallId, Delivery, ErrorDescriptor, ErrorKind, IntoPayload, MethodCallResult, MethodKind,
    RuntimeContext,
};

/// Shared settlement state. The adapter keeps one reference for the duration
/// of the call and the method gets the other through [`Responder`].
pub(crate) struct Settlement {
    call_id: Option<CallId>,
    module: Arc<str>,
    method: Arc<str>,
    kind: MethodKind,
    context: Weak<dyn RuntimeContext>,
    settled: AtomicBool,
}

impl Settlement {
    pub(crate) fn new(
        call_id: Option<CallId>,
        module: Arc<str>,
        method: Arc<str>,
        kind: MethodKind,
        context: Weak<dyn RuntimeContext>,
    ) -> Arc<Self> {
        Arc::new(Self {
            call_id,
            module,
            method,
            kind,
            context,
            settled: AtomicBool::new(false),
        })
    }

    /// Deliver `outcome` unless already settled. Returns whether this call
    /// won the race.
    pub(crate) fn settle(&self, outcome: MethodCallResult) -> bool {
        if self.settled.swap(true, Ordering::AcqRel) {
            return false;
        }

        let Some(context) = self.context.upgrade().filter(|c| c.is_valid()) else {
            tracing::debug!(
                module = %self.module,
                method = %self.method,
                call_id = ?self.call_id,
                "context gone; dropping callback"
            );
            return true;
        };

        tracing::trace!(
            module = %self.module,
            method = %self.method,
            call_id = ?self.call_id,
            ok = outcome.is_ok(),
            "delivering callback"
        );
        context.deliver(Delivery {
            call_id: self.call_id,
            module: self.module.to_string(),
            method: self.method.to_string(),
            kind: self.kind,
            outcome,
        });
        true
    }
}

impl Drop for Settlement {
    fn drop(&mut self) {
        // A promise nobody settled would leave the caller waiting forever
        if self.kind == MethodKind::Promise && !*self.settled.get_mut() {
            let descriptor = ErrorDescriptor {
                kind: ErrorKind::Native,
                message: format!(
                    "promise returned by {}.{} was dropped without being settled",
                    self.module, self.method
                ),
                module: self.module.to_string(),
                method: Some(self.method.to_string()),
            };
            self.settle(Err(descriptor));
        }
    }
}

/// Callback handle for one asynchronous invocation.
///
/// `Send`, so a method may move it to another thread and settle later.
pub struct Responder {
    settlement: Arc<Settlement>,
}

impl Responder {
    pub(crate) fn new(settlement: Arc<Settlement>) -> Self {
        Self { settlement }
    }

    /// Correlation id of the invocation
    pub fn call_id(&self) -> Option<CallId> {
        self.settlement.call_id
    }

    /// Whether the owning context can still receive a result
    pub fn is_live(&self) -> bool {
        self.settlement
            .context
            .upgrade()
            .is_some_and(|c| c.is_valid())
    }

    /// Deliver a success value
    pub fn resolve(self, value: impl IntoPayload) {
        self.settlement.settle(Ok(value.into_payload()));
    }

    /// Deliver a failure
    pub fn reject(self, reason: impl fmt::Display) {
        let settlement = &self.settlement;
        let descriptor = ErrorDescriptor {
            kind: ErrorKind::Native,
            message: reason.to_string(),
            module: settlement.module.to_string(),
            method: Some(settlement.method.to_string()),
        };
        settlement.settle(Err(descriptor));
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("module", &self.settlement.module)
            .field("method", &self.settlement.method)
            .field("call_id", &self.settlement.call_id)
            .finish()
    }
}
