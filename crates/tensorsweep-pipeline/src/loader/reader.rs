//! CSV-backed tidy table reader.

use std::path::Path;

use tensorsweep_core::errors::{ParseError, PipelineError, SchemaError};
use tensorsweep_core::types::{TidyRecord, TidyTable};

use super::schema::TableSchema;

/// Reads a delimited file into a `TidyTable` under a declared schema.
#[derive(Debug, Clone)]
pub struct TidyTableLoader {
    schema: TableSchema,
}

/// Column positions resolved against the header row.
struct ColumnIndex {
    dimensions: Vec<usize>,
    replicate: usize,
    value: usize,
    covariates: Vec<usize>,
}

impl TidyTableLoader {
    pub fn new(schema: TableSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Load every row of `path`.
    ///
    /// Fails with `SchemaError` when a declared column is absent or the table
    /// has no rows, and with `ParseError` (path, line, column) on a
    /// malformed row or a value that is not a number.
    pub fn load(&self, path: &Path) -> Result<TidyTable, PipelineError> {
        self.schema.validate()?;
        let path_str = path.display().to_string();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.schema.delimiter as u8)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| ParseError::Io {
                path: path_str.clone(),
                message: e.to_string(),
            })?;

        let headers = reader
            .headers()
            .map_err(|e| ParseError::MalformedRow {
                path: path_str.clone(),
                line: 1,
                message: format!("cannot read header row: {e}"),
            })?
            .clone();

        let index = self.resolve_columns(&headers, &path_str)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| ParseError::MalformedRow {
                path: path_str.clone(),
                line: e.position().map(|p| p.line()).unwrap_or(0),
                message: e.to_string(),
            })?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            let field = |i: usize| row.get(i).unwrap_or("");
            let raw_text = field(index.value);
            let raw = raw_text
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber {
                    path: path_str.clone(),
                    line,
                    column: self.schema.value.clone(),
                    value: raw_text.to_string(),
                })?;

            records.push(TidyRecord {
                dims: index.dimensions.iter().map(|&i| field(i).to_string()).collect(),
                replicate: field(index.replicate).to_string(),
                raw,
                normalized: None,
                covariates: index.covariates.iter().map(|&i| field(i).to_string()).collect(),
            });
        }

        if records.is_empty() {
            return Err(SchemaError::EmptyTable { path: path_str }.into());
        }

        tracing::info!(
            path = %path.display(),
            rows = records.len(),
            dimensions = ?self.schema.dimensions,
            "loaded tidy table"
        );

        Ok(TidyTable {
            source: path.to_path_buf(),
            dimensions: self.schema.dimensions.clone(),
            replicate_column: self.schema.replicate.clone(),
            value_column: self.schema.value.clone(),
            covariate_columns: self.schema.covariates.clone(),
            records,
        })
    }

    fn resolve_columns(
        &self,
        headers: &csv::StringRecord,
        path: &str,
    ) -> Result<ColumnIndex, SchemaError> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| SchemaError::MissingColumn {
                    path: path.to_string(),
                    column: column.to_string(),
                    available: headers.iter().collect::<Vec<_>>().join(", "),
                })
        };

        Ok(ColumnIndex {
            dimensions: self
                .schema
                .dimensions
                .iter()
                .map(|d| find(d))
                .collect::<Result<_, _>>()?,
            replicate: find(&self.schema.replicate)?,
            value: find(&self.schema.value)?,
            covariates: self
                .schema
                .covariates
                .iter()
                .map(|c| find(c))
                .collect::<Result<_, _>>()?,
        })
    }
}
