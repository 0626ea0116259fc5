//! Typed method-table builder
//!
//! Each registered method is erased into an index-addressed [`Invoker`]
//! closure capturing the concrete function, so dispatch is a bounds-checked
//! index plus an indirect call. Registration order is the method id.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

use tether_sdk::{
    Args, IntoPayload, MethodDescriptor, MethodKind, NativeResult, Payload, RuntimeContext,
};

use crate::adapter::ModuleAdapter;
use crate::config::{AdapterConfig, ConstantsPolicy};
use crate::error::BuildError;
use crate::queue::MethodQueue;
use crate::responder::Responder;

type SyncFn<H> = dyn Fn(&H, &Args<'_>) -> NativeResult<Payload> + Send + Sync;
type AsyncFn<H> = dyn Fn(&H, &Args<'_>, Responder) -> NativeResult<()> + Send + Sync;
pub(crate) type ConstantsFn<H> = dyn Fn(&H) -> Payload + Send + Sync;

/// Type-erased method body
pub(crate) enum Invoker<H> {
    Sync(Box<SyncFn<H>>),
    Async(Box<AsyncFn<H>>),
}

/// One row of the method table
pub(crate) struct Method<H> {
    pub(crate) name: Arc<str>,
    pub(crate) kind: MethodKind,
    pub(crate) invoker: Invoker<H>,
}

impl<H> Method<H> {
    pub(crate) fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(self.name.as_ref(), self.kind)
    }
}

/// Builds a [`ModuleAdapter`] around a host object of type `H`.
///
/// ```ignore
/// let adapter = ModuleBuilder::<Calculator>::new("calc")
///     .sync("add", |_, args| Ok(args.field::<i64>("a")? + args.field::<i64>("b")?))
///     .asynchronous("subscribe", |calc, args, responder| {
///         calc.subscribe(args.field::<String>("event")?, responder);
///         Ok(())
///     })
///     .build(&host, &bridge)?;
/// ```
pub struct ModuleBuilder<H> {
    name: String,
    methods: Vec<Method<H>>,
    constants: Option<Box<ConstantsFn<H>>>,
    policy: Option<ConstantsPolicy>,
    queue: MethodQueue,
    config: AdapterConfig,
}

impl<H: Send + Sync + 'static> ModuleBuilder<H> {
    /// Start a method table for module `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            constants: None,
            policy: None,
            queue: MethodQueue::Inline,
            config: AdapterConfig::default(),
        }
    }

    /// Append a value-returning method
    pub fn sync<R, F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        R: IntoPayload,
        F: Fn(&H, &Args<'_>) -> NativeResult<R> + Send + Sync + 'static,
    {
        let name: String = name.into();
        self.methods.push(Method {
            name: Arc::from(name),
            kind: MethodKind::Sync,
            invoker: Invoker::Sync(Box::new(move |host: &H, args: &Args<'_>| {
                f(host, args).map(IntoPayload::into_payload)
            })),
        });
        self
    }

    /// Append a fire-and-forget method answering through its [`Responder`]
    pub fn asynchronous<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&H, &Args<'_>, Responder) -> NativeResult<()> + Send + Sync + 'static,
    {
        self.push_async(name.into(), MethodKind::Async, f)
    }

    /// Append a promise method; its [`Responder`] must resolve or reject
    pub fn promise<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&H, &Args<'_>, Responder) -> NativeResult<()> + Send + Sync + 'static,
    {
        self.push_async(name.into(), MethodKind::Promise, f)
    }

    fn push_async<F>(mut self, name: String, kind: MethodKind, f: F) -> Self
    where
        F: Fn(&H, &Args<'_>, Responder) -> NativeResult<()> + Send + Sync + 'static,
    {
        debug_assert!(kind.is_async());
        self.methods.push(Method {
            name: Arc::from(name),
            kind,
            invoker: Invoker::Async(Box::new(f)),
        });
        self
    }

    /// Install the constants provider
    pub fn constants<F>(mut self, f: F) -> Self
    where
        F: Fn(&H) -> Payload + Send + Sync + 'static,
    {
        self.constants = Some(Box::new(f));
        self
    }

    /// Override the configured constants policy for this module
    pub fn constants_policy(mut self, policy: ConstantsPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Run invocations on `queue`
    pub fn queue(mut self, queue: MethodQueue) -> Self {
        self.queue = queue;
        self
    }

    /// Apply adapter configuration
    pub fn config(mut self, config: &AdapterConfig) -> Self {
        self.config = config.clone();
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.name.is_empty() {
            return Err(BuildError::EmptyModuleName);
        }

        let mut seen = HashSet::with_capacity(self.methods.len());
        for (index, method) in self.methods.iter().enumerate() {
            if method.name.is_empty() {
                return Err(BuildError::EmptyMethodName {
                    module: self.name.clone(),
                    index,
                });
            }
            if !seen.insert(method.name.as_ref()) {
                return Err(BuildError::DuplicateMethod {
                    module: self.name.clone(),
                    name: method.name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Finish the table and wrap `host`.
    ///
    /// Neither `host` nor `context` is retained strongly; the adapter holds
    /// weak references and checks both before every call.
    pub fn build<C>(self, host: &Arc<H>, context: &Arc<C>) -> Result<ModuleAdapter<H>, BuildError>
    where
        C: RuntimeContext + 'static,
    {
        self.validate()?;
        let context: Weak<C> = Arc::downgrade(context);
        let policy = self.policy.unwrap_or(self.config.constants_policy);
        Ok(ModuleAdapter::new(
            self.name,
            self.methods,
            self.constants,
            policy,
            self.queue,
            &self.config,
            Arc::downgrade(host),
            context,
        ))
    }
}

impl<H> fmt::Debug for ModuleBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleBuilder")
            .field("name", &self.name)
            .field(
                "methods",
                &self.methods.iter().map(|m| m.name.as_ref()).collect::<Vec<_>>(),
            )
            .field("queue", &self.queue)
            .finish()
    }
}
