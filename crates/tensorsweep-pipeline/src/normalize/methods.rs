//! Built-in normalization routines.

use tensorsweep_core::errors::NormalizationError;
use tensorsweep_core::traits::{Covariates, Normalizer};
use tensorsweep_core::types::FxHashMap;

/// Shared input checks: non-empty, finite, not all zero.
fn check_values(name: &str, values: &[f64]) -> Result<(), NormalizationError> {
    if values.is_empty() {
        return Err(NormalizationError::EmptyInput {
            normalizer: name.to_string(),
        });
    }
    if let Some((row, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(NormalizationError::OutOfDomain {
            normalizer: name.to_string(),
            row,
            value,
            message: "value is not finite".to_string(),
        });
    }
    if values.iter().all(|&v| v == 0.0) {
        return Err(NormalizationError::AllZero {
            normalizer: name.to_string(),
        });
    }
    Ok(())
}

fn check_non_negative(name: &str, values: &[f64]) -> Result<(), NormalizationError> {
    match values.iter().enumerate().find(|(_, &v)| v < 0.0) {
        Some((row, &value)) => Err(NormalizationError::OutOfDomain {
            normalizer: name.to_string(),
            row,
            value,
            message: "negative values are not allowed".to_string(),
        }),
        None => Ok(()),
    }
}

fn group_column<'a>(
    name: &str,
    covariates: &'a Covariates,
    column: &str,
    expected: usize,
) -> Result<&'a [String], NormalizationError> {
    let groups = covariates
        .get(column)
        .ok_or_else(|| NormalizationError::MissingCovariate {
            normalizer: name.to_string(),
            covariate: column.to_string(),
        })?;
    if groups.len() != expected {
        return Err(NormalizationError::LengthMismatch {
            normalizer: name.to_string(),
            expected,
            actual: groups.len(),
        });
    }
    Ok(groups)
}

/// Passes values through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Normalizer for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn normalize(
        &self,
        values: &[f64],
        _covariates: &Covariates,
    ) -> Result<Vec<f64>, NormalizationError> {
        check_values(self.name(), values)?;
        Ok(values.to_vec())
    }
}

/// `ln(1 + x)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Log1p;

impl Normalizer for Log1p {
    fn name(&self) -> &str {
        "log1p"
    }

    fn normalize(
        &self,
        values: &[f64],
        _covariates: &Covariates,
    ) -> Result<Vec<f64>, NormalizationError> {
        check_values(self.name(), values)?;
        check_non_negative(self.name(), values)?;
        Ok(values.iter().map(|v| v.ln_1p()).collect())
    }
}

/// Scales every group to the same total: `value / group_total * scale`.
#[derive(Debug, Clone)]
pub struct TotalSum {
    pub group_by: String,
    pub scale: f64,
}

impl TotalSum {
    pub fn new(group_by: impl Into<String>, scale: f64) -> Self {
        Self {
            group_by: group_by.into(),
            scale,
        }
    }
}

impl Normalizer for TotalSum {
    fn name(&self) -> &str {
        "total_sum"
    }

    fn normalize(
        &self,
        values: &[f64],
        covariates: &Covariates,
    ) -> Result<Vec<f64>, NormalizationError> {
        check_values(self.name(), values)?;
        check_non_negative(self.name(), values)?;
        let groups = group_column(self.name(), covariates, &self.group_by, values.len())?;

        let mut totals: FxHashMap<&str, f64> = FxHashMap::default();
        for (group, &v) in groups.iter().zip(values) {
            *totals.entry(group.as_str()).or_insert(0.0) += v;
        }
        // Report the first zero group in row order so the error is stable.
        if let Some(group) = groups.iter().find(|g| totals[g.as_str()] == 0.0) {
            return Err(NormalizationError::ZeroGroup {
                normalizer: self.name().to_string(),
                group: group.clone(),
            });
        }

        Ok(groups
            .iter()
            .zip(values)
            .map(|(group, &v)| v / totals[group.as_str()] * self.scale)
            .collect())
    }
}

/// Centered log-ratio within each group:
/// `ln(x + p) − mean(ln(x_g + p))`.
#[derive(Debug, Clone)]
pub struct Clr {
    pub group_by: String,
    pub pseudocount: f64,
}

impl Clr {
    pub fn new(group_by: impl Into<String>, pseudocount: f64) -> Self {
        Self {
            group_by: group_by.into(),
            pseudocount,
        }
    }
}

impl Normalizer for Clr {
    fn name(&self) -> &str {
        "clr"
    }

    fn normalize(
        &self,
        values: &[f64],
        covariates: &Covariates,
    ) -> Result<Vec<f64>, NormalizationError> {
        check_values(self.name(), values)?;
        check_non_negative(self.name(), values)?;
        let groups = group_column(self.name(), covariates, &self.group_by, values.len())?;

        let logs: Vec<f64> = values.iter().map(|v| (v + self.pseudocount).ln()).collect();
        let mut sums: FxHashMap<&str, (f64, usize)> = FxHashMap::default();
        for (group, &l) in groups.iter().zip(&logs) {
            let entry = sums.entry(group.as_str()).or_insert((0.0, 0));
            entry.0 += l;
            entry.1 += 1;
        }

        Ok(groups
            .iter()
            .zip(&logs)
            .map(|(group, &l)| {
                let (sum, n) = sums[group.as_str()];
                l - sum / n as f64
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(labels: &[&str]) -> Covariates {
        Covariates::new().with_column("sample", labels.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn identity_rejects_all_zero() {
        let err = Identity.normalize(&[0.0, 0.0], &Covariates::new()).unwrap_err();
        assert!(matches!(err, NormalizationError::AllZero { .. }));
    }

    #[test]
    fn log1p_rejects_negative_and_reports_row() {
        let err = Log1p
            .normalize(&[1.0, -2.0, 3.0], &Covariates::new())
            .unwrap_err();
        match err {
            NormalizationError::OutOfDomain { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, -2.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn log1p_transforms() {
        let out = Log1p.normalize(&[0.0, 1.0], &Covariates::new()).unwrap();
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn non_finite_rejected() {
        let err = Identity
            .normalize(&[1.0, f64::NAN], &Covariates::new())
            .unwrap_err();
        assert!(matches!(err, NormalizationError::OutOfDomain { row: 1, .. }));
    }

    #[test]
    fn total_sum_scales_each_group() {
        let norm = TotalSum::new("sample", 100.0);
        let out = norm
            .normalize(&[1.0, 3.0, 5.0, 5.0], &samples(&["s1", "s1", "s2", "s2"]))
            .unwrap();
        assert_eq!(out, vec![25.0, 75.0, 50.0, 50.0]);
    }

    #[test]
    fn total_sum_rejects_zero_group() {
        let norm = TotalSum::new("sample", 1.0);
        let err = norm
            .normalize(&[1.0, 0.0, 0.0], &samples(&["s1", "s2", "s2"]))
            .unwrap_err();
        assert!(matches!(err, NormalizationError::ZeroGroup { ref group, .. } if group == "s2"));
    }

    #[test]
    fn grouped_normalizer_needs_its_column() {
        let err = TotalSum::new("sample", 1.0)
            .normalize(&[1.0], &Covariates::new())
            .unwrap_err();
        assert!(matches!(err, NormalizationError::MissingCovariate { .. }));
    }

    #[test]
    fn clr_centers_each_group() {
        let norm = Clr::new("sample", 1.0);
        let out = norm
            .normalize(&[0.0, 3.0, 7.0, 1.0], &samples(&["a", "a", "b", "b"]))
            .unwrap();
        assert!((out[0] + out[1]).abs() < 1e-12);
        assert!((out[2] + out[3]).abs() < 1e-12);
        assert!((out[1] - out[0] - 4f64.ln()).abs() < 1e-12);
    }
}
