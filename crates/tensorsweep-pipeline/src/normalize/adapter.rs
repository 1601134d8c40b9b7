//! Applies a `Normalizer` to a whole tidy table.

use tensorsweep_core::config::{NormalizeConfig, NormalizeMethod};
use tensorsweep_core::errors::NormalizationError;
use tensorsweep_core::traits::{Covariates, Normalizer};
use tensorsweep_core::types::TidyTable;

use super::methods::{Clr, Identity, Log1p, TotalSum};

/// Build the configured normalizer.
///
/// Grouped methods without a `group_by` column are rejected by config
/// validation; here they fall back to grouping by the first dimension.
pub fn normalizer_from_config(config: &NormalizeConfig, table: &TidyTable) -> Box<dyn Normalizer> {
    let group_by = || {
        config
            .group_by
            .clone()
            .or_else(|| table.dimensions.first().cloned())
            .unwrap_or_default()
    };
    match config.effective_method() {
        NormalizeMethod::Identity => Box::new(Identity),
        NormalizeMethod::Log1p => Box::new(Log1p),
        NormalizeMethod::TotalSum => Box::new(TotalSum::new(group_by(), config.effective_scale())),
        NormalizeMethod::Clr => Box::new(Clr::new(group_by(), config.effective_pseudocount())),
    }
}

/// Every categorical column of the table, exposed by name to the normalizer.
fn table_covariates(table: &TidyTable) -> Covariates {
    let names = table
        .dimensions
        .iter()
        .chain(std::iter::once(&table.replicate_column))
        .chain(table.covariate_columns.iter());
    names.fold(Covariates::new(), |acc, name| match table.categorical_column(name) {
        Some(values) => acc.with_column(name.clone(), values),
        None => acc,
    })
}

/// Normalize the raw value column of `table`, consuming it.
///
/// Returns the same records with `normalized` filled. The normalizer must
/// return exactly one value per record.
pub fn normalize_table(
    mut table: TidyTable,
    normalizer: &dyn Normalizer,
) -> Result<TidyTable, NormalizationError> {
    let raw = table.raw_values();
    let normalized = normalizer.normalize(&raw, &table_covariates(&table))?;
    if normalized.len() != raw.len() {
        return Err(NormalizationError::LengthMismatch {
            normalizer: normalizer.name().to_string(),
            expected: raw.len(),
            actual: normalized.len(),
        });
    }

    for (record, value) in table.records.iter_mut().zip(normalized) {
        record.normalized = Some(value);
    }

    tracing::debug!(
        normalizer = normalizer.name(),
        records = table.len(),
        "normalized value column"
    );
    Ok(table)
}
