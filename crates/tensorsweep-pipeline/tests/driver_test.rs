//! Sweep driver behavior with scripted decomposers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ndarray::Array2;
use tensorsweep_core::errors::{FitError, PipelineError};
use tensorsweep_core::events::types::*;
use tensorsweep_core::events::{EventDispatcher, SweepEventHandler};
use tensorsweep_core::traits::{
    Cancellable, CancellationToken, Decomposer, Decomposition, FitCache, MemoryFitCache,
};
use tensorsweep_core::types::{
    CpModel, FitStatus, FitTarget, HyperParams, LabeledTensor, TidyRecord, TidyTable,
};
use tensorsweep_pipeline::{
    ParameterGrid, ReplicateSet, SparseCp, SweepDriver, SweepOptions, TensorAssembler,
};

/// Two replicates of the 2×2 tensor diag(1, 2), every cell observed.
fn table() -> TidyTable {
    let mut records = Vec::new();
    for rep in ["r1", "r2"] {
        for (g, t, v) in [("A", "X", 1.0), ("A", "Y", 0.0), ("B", "X", 0.0), ("B", "Y", 2.0)] {
            records.push(TidyRecord {
                dims: vec![g.into(), t.into()],
                replicate: rep.into(),
                raw: v,
                normalized: None,
                covariates: Vec::new(),
            });
        }
    }
    TidyTable {
        source: "diag.csv".into(),
        dimensions: vec!["gene".into(), "taxon".into()],
        replicate_column: "rep".into(),
        value_column: "value".into(),
        covariate_columns: Vec::new(),
        records,
    }
}

fn inputs() -> (LabeledTensor, ReplicateSet) {
    let table = table();
    let assembler = TensorAssembler::default();
    let tensor = assembler.assemble(&table, &["gene", "taxon"]).unwrap();
    let replicates = ReplicateSet::build(&assembler, &table, &tensor).unwrap();
    (tensor, replicates)
}

fn base() -> HyperParams {
    HyperParams {
        rank: 1,
        lambdas: vec![0.0, 0.0],
        nonneg_modes: vec![],
        tol: 1e-6,
        n_iter_max: 100,
        n_initializations: 2,
        seed: 11,
    }
}

fn grid() -> ParameterGrid {
    ParameterGrid::product(&[1, 2, 3], &[vec![0.0, 0.0]], &base())
}

fn options(n_bootstraps: usize, cross_validate: bool, max_workers: usize) -> SweepOptions {
    SweepOptions {
        n_bootstraps,
        max_workers,
        cross_validate,
        seed: 5,
    }
}

/// Rank 2 reproduces diag(1, 2) exactly; other ranks are deliberately off.
fn scripted_model(rank: usize) -> CpModel {
    let mut a = Array2::zeros((2, rank));
    let mut b = Array2::zeros((2, rank));
    for r in 0..rank {
        a[[r % 2, r]] = 1.0;
        b[[r % 2, r]] = 1.0;
    }
    let weights = if rank == 2 { vec![1.0, 2.0] } else { vec![0.5; rank] };
    CpModel::new(weights, vec![a, b])
}

fn decomposition(model: CpModel) -> Decomposition {
    Decomposition {
        candidates: vec![model.clone()],
        model,
        loss_history: vec![1.0, 0.5],
        converged: true,
        best_init: 0,
    }
}

#[derive(Default)]
struct Scripted {
    calls: AtomicUsize,
    fail_rank: Option<usize>,
    panic_rank: Option<usize>,
    /// Returns a factor with one row too few at this rank.
    short_factor_rank: Option<usize>,
    /// Returns a `NaN` factor entry at this rank.
    nan_rank: Option<usize>,
}

impl Decomposer for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn decompose(&self, _tensor: &LabeledTensor, params: &HyperParams) -> Result<Decomposition, FitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_rank == Some(params.rank) {
            panic!("scripted panic at rank {}", params.rank);
        }
        if self.fail_rank == Some(params.rank) {
            return Err(FitError::Diverged {
                config: params.label(),
                message: "loss is not finite".into(),
            });
        }
        let mut model = scripted_model(params.rank);
        if self.short_factor_rank == Some(params.rank) {
            model.factors[0] = Array2::ones((1, params.rank));
        }
        if self.nan_rank == Some(params.rank) {
            model.factors[1][[0, 0]] = f64::NAN;
        }
        Ok(decomposition(model))
    }
}

#[derive(Default)]
struct Recorder {
    started: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    cached: AtomicUsize,
    sweeps: Mutex<Vec<(usize, usize)>>,
}

impl SweepEventHandler for Recorder {
    fn on_sweep_started(&self, event: &SweepStartedEvent) {
        self.sweeps.lock().unwrap().push((event.configurations, event.jobs));
    }
    fn on_fit_started(&self, _event: &FitStartedEvent) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
    fn on_fit_completed(&self, _event: &FitCompletedEvent) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_fit_failed(&self, _event: &FitFailedEvent) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_fit_cached(&self, _event: &FitCachedEvent) {
        self.cached.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn exact_rank_ranks_first() {
    let (tensor, _) = inputs();
    let driver = SweepDriver::new(Arc::new(Scripted::default()), options(0, false, 2));
    let report = driver.run(&tensor, None, &grid()).unwrap();

    let ranks: Vec<usize> = report.ranked.iter().map(|r| r.params.rank).collect();
    assert_eq!(ranks, vec![2, 3, 1]);
    let best = report.best().unwrap();
    assert_eq!(best.params.rank, 2);
    assert!(best.relative_sse().unwrap() < 1e-12);
    assert!(report.refits.is_empty());
    assert_eq!(report.stats.jobs, 3);
    assert_eq!(report.stats.succeeded, 3);
}

#[test]
fn failing_configuration_is_isolated() {
    let (tensor, _) = inputs();
    let decomposer = Scripted {
        fail_rank: Some(2),
        ..Default::default()
    };
    let driver = SweepDriver::new(Arc::new(decomposer), options(0, false, 3));
    let report = driver.run(&tensor, None, &grid()).unwrap();

    assert_eq!(report.ranked.len(), 3);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.succeeded, 2);
    let last = report.ranked.last().unwrap();
    assert_eq!(last.params.rank, 2);
    assert!(matches!(last.status, FitStatus::Failed { .. }));
    assert!(last.model.is_none());
    assert_eq!(report.best().unwrap().params.rank, 3);
}

#[test]
fn panicking_fit_becomes_a_failed_result() {
    let (tensor, _) = inputs();
    let decomposer = Scripted {
        panic_rank: Some(1),
        ..Default::default()
    };
    let driver = SweepDriver::new(Arc::new(decomposer), options(0, false, 2));
    let report = driver.run(&tensor, None, &grid()).unwrap();

    assert_eq!(report.stats.failed, 1);
    let failed = report.ranked.iter().find(|r| !r.is_success()).unwrap();
    assert_eq!(failed.params.rank, 1);
    match &failed.status {
        FitStatus::Failed { message, .. } => assert!(message.contains("scripted panic")),
        other => panic!("unexpected status: {other:?}"),
    }
}

#[test]
fn unusable_models_fail_only_their_configuration() {
    let (tensor, _) = inputs();
    let decomposer = Scripted {
        short_factor_rank: Some(2),
        nan_rank: Some(3),
        ..Default::default()
    };
    let driver = SweepDriver::new(Arc::new(decomposer), options(0, false, 2));
    let report = driver.run(&tensor, None, &grid()).unwrap();

    assert_eq!(report.stats.succeeded, 1);
    assert_eq!(report.stats.failed, 2);
    assert_eq!(report.best().unwrap().params.rank, 1);
    for rank in [2, 3] {
        let result = report.ranked.iter().find(|r| r.params.rank == rank).unwrap();
        assert!(result.model.is_none());
        match &result.status {
            FitStatus::Failed { message, .. } => {
                assert!(message.contains("unusable model"), "{message}");
                assert!(!message.contains("panicked"), "{message}");
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }
}

#[test]
fn bootstraps_and_replicates_add_refits() {
    let (tensor, replicates) = inputs();
    let driver = SweepDriver::new(Arc::new(Scripted::default()), options(3, true, 4));
    let report = driver.run(&tensor, Some(&replicates), &grid()).unwrap();

    // Per configuration: full + 3 bootstraps + 2 replicates.
    assert_eq!(report.stats.jobs, 3 * 6);
    assert_eq!(report.refits.len(), 3 * 5);
    let replicate_fits = report
        .refits
        .iter()
        .filter(|r| matches!(r.target, FitTarget::Replicate { .. }))
        .count();
    assert_eq!(replicate_fits, 6);

    for full in &report.ranked {
        let summary = full.bootstrap.as_ref().unwrap();
        assert_eq!(summary.n_bootstraps, 3);
        assert_eq!(summary.n_failed, 0);
        assert_eq!(summary.fms.len(), 3);
    }

    // Each of 2 modeled replicates compared against both replicates.
    assert_eq!(report.cross_validation.len(), 3 * 2 * 2);
    let row = report
        .cross_validation
        .iter()
        .find(|r| r.rank == 2 && r.modeled_replicate == "r1" && r.comparison_replicate == "r2")
        .unwrap();
    assert!((row.fms - 1.0).abs() < 1e-12);
    assert!(row.relative_sse < 1e-12);
    let mirrored = report
        .cross_validation
        .iter()
        .find(|r| r.rank == 2 && r.modeled_replicate == "r2" && r.comparison_replicate == "r1")
        .unwrap();
    assert!(mirrored.fms.is_nan());
}

#[test]
fn every_relabeling_round_is_cross_validated() {
    let (tensor, replicates) = inputs();
    let rounds = vec![replicates.clone(), replicates.clone()];
    let driver = SweepDriver::new(Arc::new(Scripted::default()), options(0, true, 3));
    let report = driver
        .run_rounds(&tensor, Some(&replicates), &rounds, &grid())
        .unwrap();

    // Per configuration: full + 2 rounds × 2 replicates.
    assert_eq!(report.stats.jobs, 3 * 5);
    let second_round = report
        .refits
        .iter()
        .filter(|r| matches!(r.target, FitTarget::Replicate { round: 1, .. }))
        .count();
    assert_eq!(second_round, 6);
    assert_eq!(report.cross_validation.len(), 2 * 3 * 2 * 2);
    for round in 0..2 {
        let rows = report
            .cross_validation
            .iter()
            .filter(|r| r.bootstrap_id == round)
            .count();
        assert_eq!(rows, 12);
    }
}

#[test]
fn bootstraps_without_replicates_are_skipped() {
    let (tensor, _) = inputs();
    let driver = SweepDriver::new(Arc::new(Scripted::default()), options(4, true, 1));
    let report = driver.run(&tensor, None, &grid()).unwrap();
    assert_eq!(report.stats.jobs, 3);
    assert!(report.ranked.iter().all(|r| r.bootstrap.is_none()));
    assert!(report.cross_validation.is_empty());
}

#[test]
fn cached_fits_are_not_recomputed() {
    let (tensor, replicates) = inputs();
    let decomposer = Arc::new(Scripted::default());
    let cache = Arc::new(MemoryFitCache::new());
    let driver = SweepDriver::new(decomposer.clone(), options(1, true, 2)).with_cache(cache.clone());

    let first = driver.run(&tensor, Some(&replicates), &grid()).unwrap();
    let calls = decomposer.calls.load(Ordering::SeqCst);
    assert_eq!(calls, first.stats.jobs);
    assert_eq!(cache.len().unwrap(), first.stats.jobs);

    let second = driver.run(&tensor, Some(&replicates), &grid()).unwrap();
    assert_eq!(decomposer.calls.load(Ordering::SeqCst), calls);
    assert_eq!(second.stats.cached, second.stats.jobs);
    assert_eq!(second.best().unwrap().params, first.best().unwrap().params);
}

#[test]
fn failed_fits_are_not_cached() {
    let (tensor, _) = inputs();
    let decomposer = Scripted {
        fail_rank: Some(3),
        ..Default::default()
    };
    let cache = Arc::new(MemoryFitCache::new());
    let driver = SweepDriver::new(Arc::new(decomposer), options(0, false, 1)).with_cache(cache.clone());
    driver.run(&tensor, None, &grid()).unwrap();
    assert_eq!(cache.len().unwrap(), 2);
}

#[test]
fn cancelled_sweep_reports_progress() {
    let (tensor, _) = inputs();
    let token = CancellationToken::new();
    token.cancel();
    let driver = SweepDriver::new(Arc::new(Scripted::default()), options(0, false, 2))
        .with_cancellation(token);
    match driver.run(&tensor, None, &grid()) {
        Err(PipelineError::Cancelled { completed, total }) => {
            assert_eq!(completed, 0);
            assert_eq!(total, 3);
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
}

#[test]
fn events_follow_every_job() {
    let (tensor, replicates) = inputs();
    let recorder = Arc::new(Recorder::default());
    let mut events = EventDispatcher::new();
    events.register(recorder.clone());
    let decomposer = Scripted {
        fail_rank: Some(1),
        ..Default::default()
    };
    let cache = Arc::new(MemoryFitCache::new());
    let driver = SweepDriver::new(Arc::new(decomposer), options(0, true, 2))
        .with_cache(cache)
        .with_events(events);

    driver.run(&tensor, Some(&replicates), &grid()).unwrap();
    // 3 configurations × (full + 2 replicates); rank 1 fails on all 3 targets.
    assert_eq!(recorder.started.load(Ordering::SeqCst), 9);
    assert_eq!(recorder.completed.load(Ordering::SeqCst), 6);
    assert_eq!(recorder.failed.load(Ordering::SeqCst), 3);

    driver.run(&tensor, Some(&replicates), &grid()).unwrap();
    assert_eq!(recorder.cached.load(Ordering::SeqCst), 6);
    assert_eq!(recorder.started.load(Ordering::SeqCst), 12);
    assert_eq!(*recorder.sweeps.lock().unwrap(), vec![(3, 9), (3, 9)]);
}

#[test]
fn sparse_cp_sweep_is_deterministic_across_worker_counts() {
    let (tensor, replicates) = inputs();
    let grid = ParameterGrid::product(&[1, 2], &[vec![0.0, 0.0], vec![0.1, 0.0]], &base());

    let serial = SweepDriver::new(Arc::new(SparseCp::new()), options(2, true, 1))
        .run(&tensor, Some(&replicates), &grid)
        .unwrap();
    let parallel = SweepDriver::new(Arc::new(SparseCp::new()), options(2, true, 4))
        .run(&tensor, Some(&replicates), &grid)
        .unwrap();

    assert_eq!(serial.ranked.len(), parallel.ranked.len());
    for (a, b) in serial.all_fits().zip(parallel.all_fits()) {
        assert_eq!(a.params, b.params);
        assert_eq!(a.target, b.target);
        assert_eq!(a.model, b.model);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.bootstrap, b.bootstrap);
    }
}
