//! Model-Fit Driver: runs the decomposition across a hyperparameter grid.
//!
//! Jobs (full fit, bootstrap refits, replicate fits per configuration) are
//! planned and seeded before any runs, executed on a bounded rayon pool,
//! then ranked once everything is collected. A failing or panicking fit is
//! recorded as a failed result; it never stops the sweep.

mod bootstrap;
mod jobs;
pub mod options;
pub mod report;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tensorsweep_core::errors::{FitError, PipelineError};
use tensorsweep_core::events::types::*;
use tensorsweep_core::events::EventDispatcher;
use tensorsweep_core::traits::{Cancellable, CancellationToken, Decomposer, Decomposition, FitCache};
use tensorsweep_core::types::{FitResult, FitTarget, FxHashMap, HyperParams, LabeledTensor};

use crate::cross_validation::cross_validate;
use crate::grid::ParameterGrid;
use crate::metrics::fit_metrics;
use crate::replicates::ReplicateSet;

use jobs::{bootstrap_seed, cache_key, plan, FitJob};
pub use options::SweepOptions;
pub use report::{rank_results, SweepReport, SweepStats};

/// How one job ended.
enum Outcome {
    Fitted(FitResult),
    Cached(FitResult),
    Skipped,
}

/// Runs a parameter grid against a tensor and its replicates.
pub struct SweepDriver {
    decomposer: Arc<dyn Decomposer>,
    options: SweepOptions,
    cache: Option<Arc<dyn FitCache>>,
    events: EventDispatcher,
    cancel: CancellationToken,
}

impl SweepDriver {
    pub fn new(decomposer: Arc<dyn Decomposer>, options: SweepOptions) -> Self {
        Self {
            decomposer,
            options,
            cache: None,
            events: EventDispatcher::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Consult and fill `cache` around every fit.
    pub fn with_cache(mut self, cache: Arc<dyn FitCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Share a cancellation token; jobs not yet started when it fires are skipped.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &SweepOptions {
        &self.options
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Fit every configuration of `grid`.
    ///
    /// Bootstrap refits and replicate cross-validation need `replicates`;
    /// without them only full-tensor fits run. Returns
    /// `PipelineError::Cancelled` when the token fired before every job ran.
    pub fn run(
        &self,
        tensor: &LabeledTensor,
        replicates: Option<&ReplicateSet>,
        grid: &ParameterGrid,
    ) -> Result<SweepReport, PipelineError> {
        let rounds = replicates.map(std::slice::from_ref).unwrap_or_default();
        self.run_rounds(tensor, replicates, rounds, grid)
    }

    /// Like [`SweepDriver::run`], cross-validating once per entry of
    /// `rounds` (one relabeled replicate set each). `replicates` feeds the
    /// bootstrap resampling.
    pub fn run_rounds(
        &self,
        tensor: &LabeledTensor,
        replicates: Option<&ReplicateSet>,
        rounds: &[ReplicateSet],
        grid: &ParameterGrid,
    ) -> Result<SweepReport, PipelineError> {
        let start = Instant::now();
        let replicates = replicates.filter(|r| !r.is_empty());

        let bootstraps = self.bootstrap_tensors(replicates)?;
        let round_labels: Vec<Vec<String>> = if self.options.cross_validate {
            rounds
                .iter()
                .map(|set| set.labels().map(String::from).collect())
                .collect()
        } else {
            Vec::new()
        };
        let replicate_jobs: usize = round_labels.iter().map(Vec::len).sum();
        let jobs = plan(grid.points(), bootstraps.len(), &round_labels);
        let workers = self.options.max_workers.max(1);

        tracing::info!(
            configurations = grid.len(),
            jobs = jobs.len(),
            workers,
            bootstraps = bootstraps.len(),
            rounds = round_labels.len(),
            replicate_fits = replicate_jobs,
            "starting sweep"
        );
        self.events.emit_sweep_started(&SweepStartedEvent {
            configurations: grid.len(),
            jobs: jobs.len(),
            workers,
        });

        let execute_all = || -> Vec<Outcome> {
            jobs.par_iter()
                .map(|job| {
                    let data = target_data(&job.target, tensor, &bootstraps, rounds);
                    self.execute(job, data)
                })
                .collect()
        };
        let outcomes = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(execute_all),
            Err(e) => {
                tracing::warn!(error = %e, "cannot build worker pool; using the global pool");
                execute_all()
            }
        };

        let skipped = outcomes.iter().filter(|o| matches!(o, Outcome::Skipped)).count();
        if skipped > 0 {
            tracing::warn!(completed = jobs.len() - skipped, total = jobs.len(), "sweep cancelled");
            return Err(PipelineError::Cancelled {
                completed: jobs.len() - skipped,
                total: jobs.len(),
            });
        }

        let mut stats = SweepStats {
            configurations: grid.len(),
            jobs: jobs.len(),
            ..Default::default()
        };
        let mut results: Vec<(&FitJob, FitResult)> = Vec::with_capacity(jobs.len());
        for (job, outcome) in jobs.iter().zip(outcomes) {
            let result = match outcome {
                Outcome::Fitted(r) => r,
                Outcome::Cached(r) => {
                    stats.cached += 1;
                    r
                }
                Outcome::Skipped => continue,
            };
            if result.is_success() {
                stats.succeeded += 1;
            } else {
                stats.failed += 1;
            }
            results.push((job, result));
        }

        let report = self.assemble_report(grid, results, rounds, stats, start);
        self.events.emit_sweep_complete(&SweepCompleteEvent {
            succeeded: report.stats.succeeded,
            failed: report.stats.failed,
            cached: report.stats.cached,
            duration_ms: report.stats.duration_ms,
        });
        let best = report.best().map(|r| r.label()).unwrap_or_default();
        tracing::info!(
            succeeded = report.stats.succeeded,
            failed = report.stats.failed,
            cached = report.stats.cached,
            duration_ms = report.stats.duration_ms,
            best = %best,
            "sweep complete"
        );
        Ok(report)
    }

    /// Resampled tensors, one per bootstrap id, shared by every configuration.
    fn bootstrap_tensors(
        &self,
        replicates: Option<&ReplicateSet>,
    ) -> Result<Vec<LabeledTensor>, PipelineError> {
        if self.options.n_bootstraps == 0 {
            return Ok(Vec::new());
        }
        let Some(set) = replicates else {
            tracing::warn!(
                n_bootstraps = self.options.n_bootstraps,
                "no replicates to resample; skipping bootstrap refits"
            );
            return Ok(Vec::new());
        };
        (0..self.options.n_bootstraps)
            .map(|id| {
                let mut rng = StdRng::seed_from_u64(bootstrap_seed(self.options.seed, id));
                set.bootstrap_resample(&mut rng).map_err(PipelineError::from)
            })
            .collect()
    }

    fn execute(&self, job: &FitJob, tensor: &LabeledTensor) -> Outcome {
        if self.cancel.is_cancelled() {
            return Outcome::Skipped;
        }
        let label = format!("{} ({})", job.params.label(), job.target);
        let key = cache_key(&job.params, tensor, &job.target);

        if let Some(cache) = &self.cache {
            match cache.get(&key) {
                Ok(Some(result)) => {
                    tracing::debug!(job = job.index, %label, "fit cache hit");
                    self.events.emit_fit_cached(&FitCachedEvent {
                        job: job.index,
                        label,
                    });
                    return Outcome::Cached(result);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(job = job.index, error = %e, "fit cache read failed"),
            }
        }

        self.events.emit_fit_started(&FitStartedEvent {
            job: job.index,
            label: label.clone(),
            config_hash: job.params.config_hash(),
        });

        let started = Instant::now();
        let fitted = catch_unwind(AssertUnwindSafe(|| -> Result<_, FitError> {
            let decomposition = self.decomposer.decompose(tensor, &job.params)?;
            check_output(&decomposition, tensor, &job.params)?;
            let metrics = fit_metrics(&decomposition, tensor.data());
            Ok((decomposition, metrics))
        }))
        .unwrap_or_else(|payload| {
            Err(FitError::Panicked {
                config: job.params.label(),
                message: panic_message(payload.as_ref()),
            })
        });
        let duration_ms = started.elapsed().as_millis() as u64;

        match fitted {
            Ok((decomposition, metrics)) => {
                self.events.emit_fit_completed(&FitCompletedEvent {
                    job: job.index,
                    label,
                    relative_sse: metrics.relative_sse,
                    iterations: metrics.iterations,
                    converged: metrics.converged,
                    duration_ms,
                });
                let result = FitResult::succeeded(
                    job.params.clone(),
                    job.target.clone(),
                    decomposition.model,
                    metrics,
                    duration_ms,
                );
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.put(&key, &result) {
                        tracing::warn!(job = job.index, error = %e, "fit cache write failed");
                    }
                }
                Outcome::Fitted(result)
            }
            Err(error) => {
                tracing::warn!(job = job.index, error = %error, "fit failed");
                self.events.emit_fit_failed(&FitFailedEvent {
                    job: job.index,
                    label,
                    message: error.to_string(),
                });
                Outcome::Fitted(FitResult::failed(
                    job.params.clone(),
                    job.target.clone(),
                    &error,
                    duration_ms,
                ))
            }
        }
    }

    fn assemble_report(
        &self,
        grid: &ParameterGrid,
        results: Vec<(&FitJob, FitResult)>,
        rounds: &[ReplicateSet],
        mut stats: SweepStats,
        start: Instant,
    ) -> SweepReport {
        let mut full: Vec<Option<FitResult>> = vec![None; grid.len()];
        let mut boots: FxHashMap<usize, Vec<FitResult>> = FxHashMap::default();
        let mut reps: FxHashMap<(usize, usize), Vec<FitResult>> = FxHashMap::default();
        let mut refits = Vec::new();

        for (job, result) in results {
            match job.target {
                FitTarget::Full => full[job.config] = Some(result),
                FitTarget::Bootstrap { .. } => {
                    boots.entry(job.config).or_default().push(result.clone());
                    refits.push(result);
                }
                FitTarget::Replicate { round, .. } => {
                    reps.entry((job.config, round)).or_default().push(result.clone());
                    refits.push(result);
                }
            }
        }

        let mut cross_validation = Vec::new();
        for (round, set) in rounds.iter().enumerate() {
            for (config, point) in grid.iter().enumerate() {
                let Some(fits) = reps.get(&(config, round)) else {
                    continue;
                };
                let labeled: Vec<(&str, &FitResult)> = fits
                    .iter()
                    .filter_map(|r| match &r.target {
                        FitTarget::Replicate { label, .. } => Some((label.as_str(), r)),
                        _ => None,
                    })
                    .collect();
                cross_validation.extend(cross_validate(point, round, &labeled, set));
            }
        }

        for config in 0..grid.len() {
            let (Some(reference), Some(boot_fits)) = (full[config].as_mut(), boots.get(&config)) else {
                continue;
            };
            let Some(model) = reference.model.as_ref() else {
                continue;
            };
            let models: Vec<_> = boot_fits.iter().filter_map(|r| r.model.as_ref()).collect();
            let n_failed = boot_fits.len() - models.len();
            reference.bootstrap = Some(bootstrap::summarize(model, &models, n_failed));
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        SweepReport {
            ranked: rank_results(full.into_iter().flatten().collect()),
            refits,
            cross_validation,
            stats,
        }
    }
}

fn target_data<'a>(
    target: &FitTarget,
    full: &'a LabeledTensor,
    bootstraps: &'a [LabeledTensor],
    rounds: &'a [ReplicateSet],
) -> &'a LabeledTensor {
    match target {
        FitTarget::Full => full,
        FitTarget::Bootstrap { id } => &bootstraps[*id],
        FitTarget::Replicate { round, label } => rounds
            .get(*round)
            .and_then(|set| set.get(label))
            .unwrap_or(full),
    }
}

/// Rejects decomposer output the metrics cannot be computed on: a winner or
/// candidate whose factors do not match the tensor, or a non-finite winner.
fn check_output(
    decomposition: &Decomposition,
    tensor: &LabeledTensor,
    params: &HyperParams,
) -> Result<(), FitError> {
    let invalid = |message: String| FitError::InvalidOutput {
        config: params.label(),
        message,
    };
    let shape = tensor.shape();
    decomposition.model.check_shape(&shape).map_err(invalid)?;
    if !decomposition.model.is_finite() {
        return Err(invalid("model has non-finite weights or factors".to_string()));
    }
    for (i, candidate) in decomposition.candidates.iter().enumerate() {
        candidate
            .check_shape(&shape)
            .map_err(|message| invalid(format!("candidate {i}: {message}")))?;
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
