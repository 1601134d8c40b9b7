//! Event handler that reports sweep progress through tracing.

use std::sync::atomic::{AtomicUsize, Ordering};

use tensorsweep_core::events::types::*;
use tensorsweep_core::events::SweepEventHandler;

/// Logs one line per finished fit with a running `done/total` counter.
#[derive(Debug, Default)]
pub struct ProgressLogger {
    total: AtomicUsize,
    done: AtomicUsize,
}

impl ProgressLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&self) -> (usize, usize) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        (done, self.total.load(Ordering::Relaxed))
    }
}

impl SweepEventHandler for ProgressLogger {
    fn on_sweep_started(&self, event: &SweepStartedEvent) {
        self.total.store(event.jobs, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
    }

    fn on_fit_completed(&self, event: &FitCompletedEvent) {
        let (done, total) = self.tick();
        tracing::info!(
            progress = %format!("{done}/{total}"),
            fit = %event.label,
            relative_sse = event.relative_sse,
            iterations = event.iterations,
            converged = event.converged,
            duration_ms = event.duration_ms,
            "fit completed"
        );
    }

    fn on_fit_failed(&self, event: &FitFailedEvent) {
        let (done, total) = self.tick();
        tracing::warn!(
            progress = %format!("{done}/{total}"),
            fit = %event.label,
            error = %event.message,
            "fit failed"
        );
    }

    fn on_fit_cached(&self, event: &FitCachedEvent) {
        let (done, total) = self.tick();
        tracing::debug!(progress = %format!("{done}/{total}"), fit = %event.label, "fit cached");
    }

    fn on_artifact_written(&self, event: &ArtifactWrittenEvent) {
        tracing::info!(
            kind = event.kind,
            path = %event.path.display(),
            bytes = event.bytes,
            "artifact written"
        );
    }
}
