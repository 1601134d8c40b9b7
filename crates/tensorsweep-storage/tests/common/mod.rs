#![allow(dead_code)]

use ndarray::array;
use tensorsweep_core::errors::FitError;
use tensorsweep_core::types::{
    Axis, BootstrapSummary, ComponentConfidence, CpModel, FitMetrics, FitResult, FitTarget,
    HyperParams, LabeledTensor,
};

pub fn params(rank: usize) -> HyperParams {
    HyperParams {
        rank,
        lambdas: vec![0.5, 0.0],
        nonneg_modes: vec![1],
        tol: 1e-6,
        n_iter_max: 200,
        n_initializations: 3,
        seed: 42,
    }
}

pub fn tensor() -> LabeledTensor {
    LabeledTensor::new(
        vec![
            Axis::new("gene", vec!["dnaK".into(), "groEL".into()]),
            Axis::new("taxon", vec!["alpha".into(), "beta".into(), "gamma".into()]),
        ],
        array![[1.0, 0.0, 2.0], [0.5, 1.5, f64::NAN]].into_dyn(),
    )
    .unwrap()
}

pub fn succeeded(target: FitTarget) -> FitResult {
    let model = CpModel::new(
        vec![2.0],
        vec![array![[0.6], [0.8]], array![[1.0], [0.0], [0.0]]],
    );
    let metrics = FitMetrics {
        relative_sse: 0.125,
        loss: 0.75,
        iterations: 17,
        converged: true,
        degeneracy: 0.0,
        n_components: 1,
        core_consistency: 98.5,
        best_init: 2,
        candidate_sse: vec![0.2, 0.15, 0.125],
        candidate_fms: vec![0.9, 0.95, 1.0],
    };
    let mut result = FitResult::succeeded(params(1), target, model, metrics, 12);
    result.bootstrap = Some(BootstrapSummary {
        n_bootstraps: 2,
        n_failed: 0,
        components: vec![ComponentConfidence {
            component: 0,
            mean_congruence: 0.97,
            std_congruence: 0.01,
        }],
        fms: vec![0.96, 0.98],
        mean_fms: 0.97,
    });
    result
}

pub fn failed() -> FitResult {
    FitResult::failed(
        params(2),
        FitTarget::Full,
        &FitError::Diverged {
            config: params(2).label(),
            message: "loss is not finite".into(),
        },
        3,
    )
}
