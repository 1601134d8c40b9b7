//! Fit and cross-validation tables.

mod common;

use tensorsweep_core::types::{CvRecord, FitTarget};
use tensorsweep_storage::{write_cv_table, write_fit_table, FitRow};

use common::{failed, succeeded};

#[test]
fn fit_table_has_one_row_per_fit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitting_data.csv");
    let results = vec![
        succeeded(FitTarget::Full),
        succeeded(FitTarget::Replicate {
            round: 1,
            label: "r1".into(),
        }),
        failed(),
    ];
    write_fit_table(&path, &results).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<FitRow> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].target, "full");
    assert_eq!(rows[0].status, "succeeded");
    assert_eq!(rows[0].lambdas, "[0.5,0]");
    assert_eq!(rows[0].relative_sse, Some(0.125));
    assert_eq!(rows[0].bootstrap_mean_fms, Some(0.97));
    assert_eq!(rows[0].bootstrap_id, None);
    assert_eq!(rows[0].core_consistency, Some(98.5));
    assert_eq!(rows[0].candidate_sse.as_deref(), Some("[0.2,0.15,0.125]"));
    assert_eq!(rows[0].candidate_fms.as_deref(), Some("[0.9,0.95,1]"));
    assert_eq!(rows[0].finished_at, results[0].finished_at.to_rfc3339());
    assert_eq!(rows[1].target, "round1:replicater1");
    assert_eq!(rows[1].bootstrap_id, Some(1));
    assert_eq!(rows[1].replicate.as_deref(), Some("r1"));

    assert_eq!(rows[2].relative_sse, None);
    assert_eq!(rows[2].iterations, None);
    assert_eq!(rows[2].candidate_sse, None);
    assert!(rows[2].error.as_deref().unwrap().contains("not finite"));
    assert_eq!(rows[2], FitRow::from(&results[2]));
}

#[test]
fn cv_table_keeps_nan_comparisons() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cv_data.csv");
    let record = |modeled: &str, comparison: &str, fms: f64| CvRecord {
        bootstrap_id: 3,
        config_hash: "abc".into(),
        rank: 2,
        lambdas: "[1,0,0]".into(),
        modeled_replicate: modeled.into(),
        comparison_replicate: comparison.into(),
        n_components: 2,
        mode0_factor_sparsity: 0.25,
        relative_sse: 0.3,
        fms,
    };
    let records = vec![
        record("r1", "r1", f64::NAN),
        record("r1", "r2", 0.8),
        record("r2", "r1", f64::NAN),
    ];
    write_cv_table(&path, &records).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<CvRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].fms.is_nan());
    assert_eq!(rows[1].fms, 0.8);
    assert_eq!(rows[1].comparison_replicate, "r2");
    assert_eq!(rows[1].bootstrap_id, 3);
}

#[test]
fn empty_tables_still_have_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cv_data.csv");
    write_cv_table(&path, &[]).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("bootstrap_id,config_hash,rank,lambdas,modeled_replicate"));
    assert_eq!(content.lines().count(), 1);
}
