//! Bootstrap stability of a reference fit.

use tensorsweep_core::types::{BootstrapSummary, ComponentConfidence, CpModel};

use crate::metrics::{factor_match_score, matched_congruence};

/// Match each bootstrap model to the reference and summarize the matched
/// congruence per reference component.
pub(crate) fn summarize(reference: &CpModel, bootstraps: &[&CpModel], n_failed: usize) -> BootstrapSummary {
    let mut per_component: Vec<Vec<f64>> = vec![Vec::new(); reference.rank()];
    let mut fms = Vec::with_capacity(bootstraps.len());

    for boot in bootstraps {
        for (component, congruence) in matched_congruence(reference, boot) {
            per_component[component].push(congruence);
        }
        fms.push(factor_match_score(reference, boot));
    }

    let components = per_component
        .iter()
        .enumerate()
        .map(|(component, values)| {
            let (mean, std) = mean_std(values);
            ComponentConfidence {
                component,
                mean_congruence: mean,
                std_congruence: std,
            }
        })
        .collect();

    BootstrapSummary {
        n_bootstraps: bootstraps.len(),
        n_failed,
        components,
        mean_fms: mean_std(&fms).0,
        fms,
    }
}

/// Mean and population standard deviation; `NaN` for no values.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
