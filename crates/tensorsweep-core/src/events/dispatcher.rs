//! Synchronous event fan-out. Costs nothing when no handler is registered.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::handler::SweepEventHandler;
use super::types::*;

/// Delivers each sweep event to every registered handler, in registration
/// order, on the emitting thread.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn SweepEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn SweepEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// A panicking handler is logged and skipped; the rest still see the event.
    fn emit(&self, event: &'static str, deliver: impl Fn(&dyn SweepEventHandler)) {
        for (index, handler) in self.handlers.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| deliver(handler.as_ref()))).is_err() {
                tracing::warn!(event, handler = index, "event handler panicked");
            }
        }
    }

    pub fn emit_sweep_started(&self, event: &SweepStartedEvent) {
        self.emit("sweep_started", |h| h.on_sweep_started(event));
    }

    pub fn emit_sweep_complete(&self, event: &SweepCompleteEvent) {
        self.emit("sweep_complete", |h| h.on_sweep_complete(event));
    }

    pub fn emit_fit_started(&self, event: &FitStartedEvent) {
        self.emit("fit_started", |h| h.on_fit_started(event));
    }

    pub fn emit_fit_completed(&self, event: &FitCompletedEvent) {
        self.emit("fit_completed", |h| h.on_fit_completed(event));
    }

    pub fn emit_fit_failed(&self, event: &FitFailedEvent) {
        self.emit("fit_failed", |h| h.on_fit_failed(event));
    }

    pub fn emit_fit_cached(&self, event: &FitCachedEvent) {
        self.emit("fit_cached", |h| h.on_fit_cached(event));
    }

    pub fn emit_artifact_written(&self, event: &ArtifactWrittenEvent) {
        self.emit("artifact_written", |h| h.on_artifact_written(event));
    }
}
