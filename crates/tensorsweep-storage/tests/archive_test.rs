//! Archive writing, atomicity and round-trip.

mod common;

use tensorsweep_core::constants::{ARCHIVE_FORMAT_VERSION, TOOL_NAME};
use tensorsweep_core::errors::WriteError;
use tensorsweep_core::types::FitTarget;
use tensorsweep_storage::{load_archive, write_archive, Archive, Provenance};

use common::{succeeded, tensor};

fn archive() -> Archive {
    let provenance = Provenance::for_tensor(&tensor(), Some("data/counts.csv".as_ref()));
    Archive::new(succeeded(FitTarget::Full), provenance)
}

#[test]
fn archive_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/model.json");
    let original = archive();

    let bytes = write_archive(&path, &original).unwrap();
    assert_eq!(bytes, std::fs::metadata(&path).unwrap().len());

    let loaded = load_archive(&path).unwrap();
    assert_eq!(loaded, original);
    assert_eq!(loaded.format_version, ARCHIVE_FORMAT_VERSION);
    assert_eq!(loaded.provenance.tool, TOOL_NAME);
    assert_eq!(loaded.provenance.shape, vec![2, 3]);
    assert_eq!(loaded.provenance.axes[1].labels, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn nan_metrics_survive_the_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let mut original = archive();
    if let Some(metrics) = original.result.metrics.as_mut() {
        metrics.relative_sse = f64::NAN;
        metrics.candidate_fms[0] = f64::NAN;
    }

    write_archive(&path, &original).unwrap();
    let loaded = load_archive(&path).unwrap();
    let metrics = loaded.result.metrics.unwrap();
    assert!(metrics.relative_sse.is_nan());
    assert!(metrics.candidate_fms[0].is_nan());
    assert_eq!(metrics.candidate_fms[1], 0.95);
}

#[test]
fn rewriting_replaces_the_previous_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    write_archive(&path, &archive()).unwrap();

    let mut second = archive();
    second.result.duration_ms = 999;
    write_archive(&path, &second).unwrap();

    assert_eq!(load_archive(&path).unwrap().result.duration_ms, 999);
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "temporary files must not remain");
}

#[test]
fn failed_write_exposes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();

    let target = blocker.join("model.json");
    assert!(write_archive(&target, &archive()).is_err());
    assert!(!target.exists());
}

#[test]
fn other_format_versions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let mut json: serde_json::Value = serde_json::to_value(archive()).unwrap();
    json["format_version"] = serde_json::json!(ARCHIVE_FORMAT_VERSION + 1);
    std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    match load_archive(&path) {
        Err(WriteError::UnsupportedVersion { found, expected, .. }) => {
            assert_eq!(found, ARCHIVE_FORMAT_VERSION + 1);
            assert_eq!(expected, ARCHIVE_FORMAT_VERSION);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn missing_archive_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_archive(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, WriteError::Read { .. }));
}
