//! ModuleAdapter: one native module behind the generic invocation protocol
//!
//! Both entry points funnel into [`Inner::dispatch`], which performs the
//! whole validate / liveness / marshal / call / marshal-back sequence. The
//! only difference between them is the [`Reply`] mode: `invoke` forwards the
//! outcome through the callback side channel, the synchronous hook returns it.
//!
//! The adapter owns neither the host object nor the runtime context. Both are
//! `Weak` and upgraded at the start of every call; if either is gone the call
//! is a no-op (`invoke`) or an `unavailable` error (synchronous hook).

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tether_sdk::{
    Args, CallId, Delivery, MethodCallResult, MethodDescriptor, MethodId, NativeError,
    NativeModule, NativeResult, Payload, RuntimeContext,
};

use crate::config::{AdapterConfig, ConstantsPolicy};
use crate::error::BridgeError;
use crate::module::{ConstantsFn, Invoker, Method};
use crate::queue::MethodQueue;
use crate::responder::{Responder, Settlement};

/// Where a dispatch outcome goes
#[derive(Debug, Clone, Copy)]
enum Reply {
    /// Returned to the caller
    Direct,
    /// Forwarded through `RuntimeContext::deliver`
    Callback(Option<CallId>),
}

/// State shared with queued invocations
struct Inner<H> {
    name: Arc<str>,
    methods: Vec<Method<H>>,
    host: Weak<H>,
    context: Weak<dyn RuntimeContext>,
    catch_panics: bool,
    log_params: bool,
}

/// Adapter exposing a host object of type `H` as a [`NativeModule`].
///
/// Built with [`crate::ModuleBuilder`].
pub struct ModuleAdapter<H> {
    inner: Arc<Inner<H>>,
    descriptors: Vec<MethodDescriptor>,
    constants: Option<Box<ConstantsFn<H>>>,
    policy: ConstantsPolicy,
    cached_constants: Mutex<Option<Payload>>,
    queue: MethodQueue,
}

impl<H: Send + Sync + 'static> ModuleAdapter<H> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        methods: Vec<Method<H>>,
        constants: Option<Box<ConstantsFn<H>>>,
        policy: ConstantsPolicy,
        queue: MethodQueue,
        config: &AdapterConfig,
        host: Weak<H>,
        context: Weak<dyn RuntimeContext>,
    ) -> Self {
        let descriptors = methods.iter().map(Method::descriptor).collect();
        Self {
            inner: Arc::new(Inner {
                name: Arc::from(name),
                methods,
                host,
                context,
                catch_panics: config.catch_panics,
                log_params: config.log_params,
            }),
            descriptors,
            constants,
            policy,
            cached_constants: Mutex::new(None),
            queue,
        }
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Method table, fixed at construction
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.descriptors
    }

    /// Id of the method called `name`
    pub fn method_id(&self, name: &str) -> Option<MethodId> {
        self.descriptors
            .iter()
            .position(|d| d.name == name)
            .and_then(|i| MethodId::try_from(i).ok())
    }

    /// Whether both the runtime context and the host object are still alive
    pub fn is_live(&self) -> bool {
        self.inner.live().is_some()
    }

    /// Constants snapshot; `Null` if the module defines none or the host is gone
    pub fn constants(&self) -> Payload {
        let Some(provider) = self.constants.as_ref() else {
            return Payload::Null;
        };
        let Some(host) = self.inner.host.upgrade() else {
            tracing::debug!(module = %self.inner.name, "host gone; no constants");
            return Payload::Null;
        };

        match self.policy {
            ConstantsPolicy::Recompute => provider(&*host),
            ConstantsPolicy::CacheFirst => {
                if let Some(cached) = self.cached_constants.lock().as_ref() {
                    return cached.clone();
                }
                // Provider runs unlocked; the first snapshot stored wins
                let fresh = provider(&*host);
                self.cached_constants.lock().get_or_insert(fresh).clone()
            }
        }
    }

    /// Invoke a method; its outcome is delivered through the context's
    /// callback side channel tagged with `call_id`.
    ///
    /// Runs on the module's method queue. A torn-down context makes this a
    /// silent no-op.
    ///
    /// # Panics
    ///
    /// Panics on the calling thread if `method_id` is out of range.
    pub fn invoke(&self, method_id: MethodId, params: Payload, call_id: Option<CallId>) {
        self.inner.method(method_id);

        let inner = Arc::clone(&self.inner);
        self.queue.dispatch(Box::new(move || {
            // Outcome already went through the side channel
            let _ = inner.dispatch(method_id, params, Reply::Callback(call_id));
        }));
    }

    /// Invoke a method on the calling thread and return its outcome.
    ///
    /// # Panics
    ///
    /// Panics if `method_id` is out of range.
    pub fn call_serializable_native_hook(
        &self,
        method_id: MethodId,
        params: Payload,
    ) -> MethodCallResult {
        self.inner.dispatch(method_id, params, Reply::Direct)
    }
}

impl<H: Send + Sync + 'static> Inner<H> {
    /// Bounds-checked method lookup. An invalid id is a dispatcher bug, not
    /// a runtime condition, so it panics rather than reporting.
    fn method(&self, method_id: MethodId) -> &Method<H> {
        match self.methods.get(method_id as usize) {
            Some(method) => method,
            None => {
                tracing::error!(
                    module = %self.name,
                    method_id,
                    method_count = self.methods.len(),
                    "method id out of range"
                );
                panic!(
                    "method id {} is out of range for module '{}' ({} methods)",
                    method_id,
                    self.name,
                    self.methods.len()
                );
            }
        }
    }

    fn live(&self) -> Option<(Arc<dyn RuntimeContext>, Arc<H>)> {
        let context = self.context.upgrade().filter(|c| c.is_valid())?;
        let host = self.host.upgrade()?;
        Some((context, host))
    }

    fn dispatch(&self, method_id: MethodId, params: Payload, reply: Reply) -> MethodCallResult {
        let method = self.method(method_id);
        let call_id = match reply {
            Reply::Callback(call_id) => call_id,
            Reply::Direct => None,
        };
        let span = tracing::debug_span!(
            "invoke",
            module = %self.name,
            method = %method.name,
            method_id,
            call_id = ?call_id
        );
        let _guard = span.enter();

        let Some((context, host)) = self.live() else {
            tracing::debug!(?reply, "runtime context torn down; skipping call");
            return Err(BridgeError::Unavailable {
                module: self.name.to_string(),
            }
            .to_descriptor());
        };

        let args = Args::new(&params);
        match (&method.invoker, reply) {
            (Invoker::Sync(f), reply) => {
                let outcome = self
                    .guard(method, &params, || f(&*host, &args))
                    .map_err(|err| err.to_descriptor());

                if let Reply::Callback(call_id) = reply {
                    tracing::trace!(ok = outcome.is_ok(), "delivering result");
                    context.deliver(Delivery {
                        call_id,
                        module: self.name.to_string(),
                        method: method.name.to_string(),
                        kind: method.kind,
                        outcome: outcome.clone(),
                    });
                }
                outcome
            }
            (Invoker::Async(_), Reply::Direct) => Err(BridgeError::NotSynchronous {
                module: self.name.to_string(),
                method: method.name.to_string(),
                kind: method.kind.as_str(),
            }
            .to_descriptor()),
            (Invoker::Async(f), Reply::Callback(call_id)) => {
                let settlement = Settlement::new(
                    call_id,
                    Arc::clone(&self.name),
                    Arc::clone(&method.name),
                    method.kind,
                    self.context.clone(),
                );
                let responder = Responder::new(Arc::clone(&settlement));

                if let Err(err) = self.guard(method, &params, || f(&*host, &args, responder)) {
                    settlement.settle(Err(err.to_descriptor()));
                }
                Ok(Payload::Null)
            }
        }
    }

    /// Run a method body, converting its error and (optionally) any panic
    /// into a [`BridgeError`].
    fn guard<T>(
        &self,
        method: &Method<H>,
        params: &Payload,
        call: impl FnOnce() -> NativeResult<T>,
    ) -> Result<T, BridgeError> {
        let result = if self.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(call)) {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::warn!(%message, "native method panicked");
                    return Err(BridgeError::Panic {
                        module: self.name.to_string(),
                        method: method.name.to_string(),
                        message,
                    });
                }
            }
        } else {
            call()
        };

        result.map_err(|err| self.classify(method, params, err))
    }

    fn classify(&self, method: &Method<H>, params: &Payload, err: NativeError) -> BridgeError {
        let module = self.name.to_string();
        let method = method.name.to_string();

        if err.is_marshal() {
            tracing::debug!(error = %err, "argument marshaling failed");
            return BridgeError::Marshal {
                module,
                method,
                source: err,
            };
        }

        tracing::warn!(error = %err, "native method failed");
        let params = if self.log_params {
            params.to_string()
        } else {
            "<redacted>".to_string()
        };
        BridgeError::Native {
            module,
            method,
            reason: err.to_string(),
            params,
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<H: Send + Sync + 'static> NativeModule for ModuleAdapter<H> {
    fn name(&self) -> &str {
        ModuleAdapter::name(self)
    }

    fn methods(&self) -> &[MethodDescriptor] {
        ModuleAdapter::methods(self)
    }

    fn constants(&self) -> Payload {
        ModuleAdapter::constants(self)
    }

    fn invoke(&self, method_id: MethodId, params: Payload, call_id: Option<CallId>) {
        ModuleAdapter::invoke(self, method_id, params, call_id)
    }

    fn call_serializable_native_hook(
        &self,
        method_id: MethodId,
        params: Payload,
    ) -> MethodCallResult {
        ModuleAdapter::call_serializable_native_hook(self, method_id, params)
    }
}

impl<H> fmt::Debug for ModuleAdapter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleAdapter")
            .field("name", &self.inner.name)
            .field("methods", &self.descriptors)
            .field("policy", &self.policy)
            .field("queue", &self.queue)
            .finish()
    }
}
