//! Shared fixtures for tether-bridge integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tether_bridge::{
    Delivery, ModuleAdapter, ModuleBuilder, NativeError, Payload, Responder, RuntimeContext,
};

/// Runtime context that records every delivery
#[derive(Default)]
pub struct RecordingContext {
    shutting_down: AtomicBool,
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn begin_shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }
}

impl RuntimeContext for RecordingContext {
    fn is_valid(&self) -> bool {
        !self.shutting_down.load(Ordering::SeqCst)
    }

    fn deliver(&self, delivery: Delivery) {
        self.deliveries.lock().push(delivery);
    }
}

/// Host object standing in for a platform module
#[derive(Default)]
pub struct Calculator {
    pub calls: AtomicUsize,
    pub subscriptions: Mutex<Vec<String>>,
    pub parked: Mutex<Vec<Responder>>,
    pub version: Mutex<String>,
    pub constant_reads: AtomicUsize,
}

impl Calculator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            version: Mutex::new("1.0".to_string()),
            ..Self::default()
        })
    }
}

/// Method ids of [`calculator_module`]
pub const ADD: u32 = 0;
pub const SUBSCRIBE: u32 = 1;
pub const DIVIDE: u32 = 2;
pub const ECHO: u32 = 3;
pub const EXPLODE: u32 = 4;
pub const FETCH: u32 = 5;
pub const PARK: u32 = 6;
pub const FORGET: u32 = 7;

pub fn calculator_module() -> ModuleBuilder<Calculator> {
    ModuleBuilder::<Calculator>::new("calc")
        .sync("add", |calc, args| {
            calc.calls.fetch_add(1, Ordering::SeqCst);
            Ok(args.field::<i64>("a")? + args.field::<i64>("b")?)
        })
        .asynchronous("subscribe", |calc, args, responder| {
            calc.calls.fetch_add(1, Ordering::SeqCst);
            let event: String = args.field("event")?;
            calc.subscriptions.lock().push(event.clone());
            responder.resolve(format!("subscribed:{}", event));
            Ok(())
        })
        .sync("divide", |calc, args| {
            calc.calls.fetch_add(1, Ordering::SeqCst);
            let a: f64 = args.arg(0)?;
            let b: f64 = args.arg(1)?;
            if b == 0.0 {
                return Err(NativeError::failed("division by zero"));
            }
            Ok(a / b)
        })
        .sync("echo", |_, args| Ok(args.payload().clone()))
        .sync("explode", |_, _| -> Result<(), NativeError> {
            panic!("kaboom");
        })
        .promise("fetch", |_, args, responder| {
            let key: String = args.arg(0)?;
            if key == "missing" {
                responder.reject(format!("no entry for {}", key));
            } else {
                responder.resolve(Payload::map([("key", Payload::String(key))]));
            }
            Ok(())
        })
        .asynchronous("park", |calc, _, responder| {
            calc.parked.lock().push(responder);
            Ok(())
        })
        .promise("forget", |_, _, _responder| Ok(()))
        .constants(|calc| {
            calc.constant_reads.fetch_add(1, Ordering::SeqCst);
            Payload::map([
                ("version", Payload::String(calc.version.lock().clone())),
                ("precision", Payload::Int(64)),
            ])
        })
}

pub fn build_calculator() -> (ModuleAdapter<Calculator>, Arc<Calculator>, Arc<RecordingContext>) {
    let host = Calculator::new();
    let context = RecordingContext::new();
    let adapter = calculator_module().build(&host, &context).unwrap();
    (adapter, host, context)
}

pub fn named(pairs: &[(&str, Payload)]) -> Payload {
    Payload::map(pairs.iter().cloned())
}
