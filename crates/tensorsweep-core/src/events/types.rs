//! Event payload types.

use std::path::PathBuf;

/// Payload for `on_sweep_started`.
#[derive(Debug, Clone)]
pub struct SweepStartedEvent {
    pub configurations: usize,
    pub jobs: usize,
    pub workers: usize,
}

/// Payload for `on_sweep_complete`.
#[derive(Debug, Clone)]
pub struct SweepCompleteEvent {
    pub succeeded: usize,
    pub failed: usize,
    pub cached: usize,
    pub duration_ms: u64,
}

/// Payload for `on_fit_started`.
#[derive(Debug, Clone)]
pub struct FitStartedEvent {
    pub job: usize,
    pub label: String,
    pub config_hash: String,
}

/// Payload for `on_fit_completed`.
#[derive(Debug, Clone)]
pub struct FitCompletedEvent {
    pub job: usize,
    pub label: String,
    pub relative_sse: f64,
    pub iterations: usize,
    pub converged: bool,
    pub duration_ms: u64,
}

/// Payload for `on_fit_failed`.
#[derive(Debug, Clone)]
pub struct FitFailedEvent {
    pub job: usize,
    pub label: String,
    pub message: String,
}

/// Payload for `on_fit_cached`.
#[derive(Debug, Clone)]
pub struct FitCachedEvent {
    pub job: usize,
    pub label: String,
}

/// Payload for `on_artifact_written`.
#[derive(Debug, Clone)]
pub struct ArtifactWrittenEvent {
    pub kind: &'static str,
    pub path: PathBuf,
    pub bytes: u64,
}
