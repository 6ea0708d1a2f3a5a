//! Scoped ownership of everything a speaking session holds
//!
//! Resources are pushed in acquisition order and released in reverse by a
//! single `close`. Each resource is released at most once, whether the scope
//! is closed explicitly or dropped.

use tokio::task::JoinHandle;

/// Something that must be let go of: a microphone stream, a connection,
/// a background task, a render loop
pub trait Releasable: Send {
    fn release(&mut self);

    fn label(&self) -> &str {
        "resource"
    }
}

#[derive(Default)]
pub struct ResourceScope {
    stack: Vec<Box<dyn Releasable>>,
    closed: bool,
}

impl ResourceScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a resource. A closed scope releases it at once.
    pub fn push(&mut self, mut resource: Box<dyn Releasable>) {
        if self.closed {
            log::debug!("Scope already closed, releasing {} immediately", resource.label());
            resource.release();
            return;
        }
        self.stack.push(resource);
    }

    /// Release everything in reverse acquisition order. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
        while let Some(mut resource) = self.stack.pop() {
            log::debug!("Releasing {}", resource.label());
            resource.release();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl Drop for ResourceScope {
    fn drop(&mut self) {
        self.close();
    }
}

/// Aborts a spawned task on release
pub struct TaskGuard {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl TaskGuard {
    pub fn new(name: &'static str, handle: JoinHandle<()>) -> Self {
        Self {
            name,
            handle: Some(handle),
        }
    }
}

impl Releasable for TaskGuard {
    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    fn label(&self) -> &str {
        self.name
    }
}

/// Runs a closure once on release
pub struct OnRelease {
    name: &'static str,
    action: Option<Box<dyn FnOnce() + Send>>,
}

impl OnRelease {
    pub fn new(name: &'static str, action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name,
            action: Some(Box::new(action)),
        }
    }
}

impl Releasable for OnRelease {
    fn release(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }

    fn label(&self) -> &str {
        self.name
    }
}
