//! Method queues: where an `invoke` physically runs
//!
//! A module either runs calls on the caller's thread or on its own serial
//! worker. The serial worker drains a channel in FIFO order, so calls to one
//! module are never reordered.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

/// Unit of work scheduled on a queue
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Execution target for a module's invocations
#[derive(Clone, Default)]
pub enum MethodQueue {
    /// Run on the calling thread
    #[default]
    Inline,
    /// Run on a dedicated worker thread
    Serial(SerialQueue),
}

impl MethodQueue {
    /// Run `job` on this queue
    pub fn dispatch(&self, job: Job) {
        match self {
            MethodQueue::Inline => job(),
            MethodQueue::Serial(queue) => queue.dispatch(job),
        }
    }
}

impl fmt::Debug for MethodQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodQueue::Inline => write!(f, "MethodQueue::Inline"),
            MethodQueue::Serial(queue) => write!(f, "MethodQueue::Serial({:?})", queue.name()),
        }
    }
}

/// Shared worker state. Dropping the last handle closes the channel and
/// joins the worker once it has drained.
struct SerialInner {
    name: String,
    tx: Mutex<Option<Sender<Job>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable handle to a named FIFO worker thread
#[derive(Clone)]
pub struct SerialQueue {
    inner: Arc<SerialInner>,
}

impl SerialQueue {
    /// Spawn the worker thread
    pub fn new(name: impl Into<String>) -> std::io::Result<Self> {
        let name = name.into();
        let (tx, rx) = channel::unbounded::<Job>();

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || Self::run_loop(rx))?;

        Ok(Self {
            inner: Arc::new(SerialInner {
                name,
                tx: Mutex::new(Some(tx)),
                handle: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Thread name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Queue `job` behind everything already queued
    pub fn dispatch(&self, job: Job) {
        let tx = self.inner.tx.lock();
        match tx.as_ref() {
            Some(tx) => {
                if tx.send(job).is_err() {
                    tracing::warn!(queue = %self.inner.name, "worker exited; job dropped");
                }
            }
            None => tracing::warn!(queue = %self.inner.name, "queue closed; job dropped"),
        }
    }

    /// Block until every job queued before this call has run.
    ///
    /// Must not be called from the queue's own worker thread.
    pub fn drain(&self) {
        let (done_tx, done_rx) = channel::bounded::<()>(1);
        self.dispatch(Box::new(move || {
            let _ = done_tx.send(());
        }));
        let _ = done_rx.recv();
    }

    fn run_loop(rx: Receiver<Job>) {
        for job in rx.iter() {
            // A panicking job must not kill the worker
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(job)) {
                tracing::error!(
                    queue = %thread::current().name().unwrap_or("<unnamed>"),
                    message = %crate::adapter::panic_message(panic.as_ref()),
                    "job panicked on method queue"
                );
            }
        }
    }
}

impl fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialQueue")
            .field("name", &self.inner.name)
            .finish()
    }
}

impl Drop for SerialInner {
    fn drop(&mut self) {
        // Closing the sender ends run_loop after the backlog drains
        drop(self.tx.lock().take());

        if let Some(handle) = self.handle.lock().take() {
            // A job holding the last handle would otherwise join itself
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}
