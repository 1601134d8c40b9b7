//! Sweep output: ranked full-tensor fits, refits and cross-validation rows.

use std::cmp::Ordering;

use tensorsweep_core::types::{CvRecord, FitResult};

/// Counters for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub configurations: usize,
    pub jobs: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Jobs answered from the fit cache (also counted as succeeded).
    pub cached: usize,
    pub duration_ms: u64,
}

/// Everything a sweep produced.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// Full-tensor fits, best first.
    pub ranked: Vec<FitResult>,
    /// Bootstrap and replicate fits, in job order.
    pub refits: Vec<FitResult>,
    pub cross_validation: Vec<CvRecord>,
    pub stats: SweepStats,
}

impl SweepReport {
    /// The best successful full-tensor fit.
    pub fn best(&self) -> Option<&FitResult> {
        self.ranked.first().filter(|r| r.is_success())
    }

    /// Every fit, full-tensor fits first.
    pub fn all_fits(&self) -> impl Iterator<Item = &FitResult> {
        self.ranked.iter().chain(self.refits.iter())
    }
}

/// Order results by ascending relative SSE.
///
/// The sort is stable, so ties keep insertion order. Failed results go after
/// every successful one, in insertion order; a `NaN` error ranks after every
/// finite one whatever its sign bit.
pub fn rank_results(mut results: Vec<FitResult>) -> Vec<FitResult> {
    results.sort_by(|a, b| match (a.relative_sse(), b.relative_sse()) {
        (Some(x), Some(y)) => match (x.is_nan(), y.is_nan()) {
            (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => Ordering::Equal,
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tensorsweep_core::errors::FitError;
    use tensorsweep_core::types::{CpModel, FitMetrics, FitTarget, HyperParams};

    fn params(rank: usize) -> HyperParams {
        HyperParams {
            rank,
            lambdas: vec![0.0, 0.0],
            nonneg_modes: vec![],
            tol: 1e-6,
            n_iter_max: 10,
            n_initializations: 1,
            seed: 0,
        }
    }

    fn ok(rank: usize, relative_sse: f64) -> FitResult {
        let metrics = FitMetrics {
            relative_sse,
            loss: 0.0,
            iterations: 1,
            converged: true,
            degeneracy: 0.0,
            n_components: rank,
            core_consistency: 100.0,
            best_init: 0,
            candidate_sse: vec![relative_sse],
            candidate_fms: vec![1.0],
        };
        let model = CpModel::new(vec![1.0], vec![array![[1.0]], array![[1.0]]]);
        FitResult::succeeded(params(rank), FitTarget::Full, model, metrics, 0)
    }

    fn failed(rank: usize) -> FitResult {
        let error = FitError::EmptyTensor {
            config: params(rank).label(),
        };
        FitResult::failed(params(rank), FitTarget::Full, &error, 0)
    }

    #[test]
    fn ascending_error_then_nan_then_failures() {
        let ranked = rank_results(vec![
            failed(1),
            ok(2, 0.4),
            ok(3, f64::NAN),
            ok(4, 0.1),
            failed(5),
            ok(6, 0.4),
        ]);
        let order: Vec<usize> = ranked.iter().map(|r| r.params.rank).collect();
        assert_eq!(order, vec![4, 2, 6, 3, 1, 5]);
    }

    #[test]
    fn computed_and_negative_nan_rank_last() {
        let computed = std::hint::black_box(f64::INFINITY) - f64::INFINITY;
        let ranked = rank_results(vec![
            ok(1, 0.3),
            ok(2, computed),
            ok(3, 0.2),
            ok(4, -f64::NAN),
            ok(5, f64::INFINITY),
        ]);
        let order: Vec<usize> = ranked.iter().map(|r| r.params.rank).collect();
        assert_eq!(order, vec![3, 1, 5, 2, 4]);
        assert_eq!(ranked[0].params.rank, 3);
    }

    #[test]
    fn best_skips_an_all_failed_sweep() {
        let report = SweepReport {
            ranked: rank_results(vec![failed(1), failed(2)]),
            refits: Vec::new(),
            cross_validation: Vec::new(),
            stats: SweepStats::default(),
        };
        assert!(report.best().is_none());
        assert_eq!(report.all_fits().count(), 2);
    }
}
