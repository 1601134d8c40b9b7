//! SweepEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for handling sweep lifecycle events.
///
/// Handlers only override the events they care about. Events are emitted
/// from rayon worker threads, hence `Send + Sync`.
pub trait SweepEventHandler: Send + Sync {
    // ---- Sweep Lifecycle ----
    fn on_sweep_started(&self, _event: &SweepStartedEvent) {}
    fn on_sweep_complete(&self, _event: &SweepCompleteEvent) {}

    // ---- Fits ----
    fn on_fit_started(&self, _event: &FitStartedEvent) {}
    fn on_fit_completed(&self, _event: &FitCompletedEvent) {}
    fn on_fit_failed(&self, _event: &FitFailedEvent) {}
    fn on_fit_cached(&self, _event: &FitCachedEvent) {}

    // ---- Artifacts ----
    fn on_artifact_written(&self, _event: &ArtifactWrittenEvent) {}
}
