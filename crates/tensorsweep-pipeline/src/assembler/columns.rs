//! Named access to a record's categorical fields.

use tensorsweep_core::types::{TidyRecord, TidyTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnRef {
    Dimension(usize),
    Replicate,
    Covariate(usize),
}

impl ColumnRef {
    pub(crate) fn resolve(table: &TidyTable, name: &str) -> Option<Self> {
        if let Some(i) = table.dimension_index(name) {
            return Some(Self::Dimension(i));
        }
        if name == table.replicate_column {
            return Some(Self::Replicate);
        }
        table
            .covariate_columns
            .iter()
            .position(|c| c == name)
            .map(Self::Covariate)
    }

    pub(crate) fn get<'a>(&self, record: &'a TidyRecord) -> &'a str {
        match *self {
            Self::Dimension(i) => &record.dims[i],
            Self::Replicate => &record.replicate,
            Self::Covariate(i) => &record.covariates[i],
        }
    }
}
