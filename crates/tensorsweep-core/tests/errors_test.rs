//! Error code and stage reporting.

use tensorsweep_core::errors::*;

#[test]
fn schema_error_names_column_and_path() {
    let err = SchemaError::MissingColumn {
        path: "data.csv".into(),
        column: "taxon".into(),
        available: "gene, sample".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("taxon"));
    assert!(msg.contains("data.csv"));
    assert_eq!(err.error_code(), "SCHEMA_ERROR");
}

#[test]
fn parse_error_reports_line_and_column() {
    let err = ParseError::InvalidNumber {
        path: "data.csv".into(),
        line: 12,
        column: "transcript_count".into(),
        value: "abc".into(),
    };
    let msg = err.report_string();
    assert!(msg.starts_with("[PARSE_ERROR]"));
    assert!(msg.contains("12"));
    assert!(msg.contains("transcript_count"));
}

#[test]
fn missing_axis_has_dedicated_code() {
    let err = AssemblyError::MissingAxis {
        coordinate: "(gene=A, taxon=Y)".into(),
    };
    assert_eq!(err.error_code(), "MISSING_AXIS");
    assert_eq!(
        AssemblyError::EmptyInput.error_code(),
        "ASSEMBLY_ERROR"
    );
}

#[test]
fn pipeline_error_reports_stage() {
    let schema: PipelineError = SchemaError::NoDimensions.into();
    assert_eq!(schema.stage(), Stage::Load);
    assert!(schema.is_fatal_input());

    let fit: PipelineError = FitError::Diverged {
        config: "rank=2 lambdas=[0,0]".into(),
        message: "loss is NaN".into(),
    }
    .into();
    assert_eq!(fit.stage(), Stage::Fit);
    assert!(!fit.is_fatal_input());
    assert!(fit.to_string().contains("rank=2"));

    let write: PipelineError = WriteError::Io {
        path: "out/model.json".into(),
        message: "disk full".into(),
    }
    .into();
    assert_eq!(write.stage(), Stage::Archive);
    assert_eq!(write.error_code(), "WRITE_ERROR");

    let cancelled = PipelineError::Cancelled {
        completed: 3,
        total: 9,
    };
    assert_eq!(cancelled.error_code(), "CANCELLED");
}

#[test]
fn fit_error_exposes_config() {
    let err = FitError::Panicked {
        config: "rank=4 lambdas=[1,0,0]".into(),
        message: "index out of bounds".into(),
    };
    assert_eq!(err.config(), "rank=4 lambdas=[1,0,0]");
}
