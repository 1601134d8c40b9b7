//! Configuration-driven runs from a file on disk through the sweep.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use tensorsweep_core::config::SweepConfig;
use tensorsweep_core::errors::{ConfigError, PipelineError};
use tensorsweep_pipeline::{Pipeline, SparseCp, SweepDriver, SweepOptions};

/// gene × taxon × sample counts for two replicates.
fn write_input(dir: &TempDir) -> std::path::PathBuf {
    let mut csv = String::from("gene,taxon,sample,rep,count\n");
    for (g, gene) in ["dnaK", "groEL", "rpoB"].iter().enumerate() {
        for (t, taxon) in ["alpha", "beta"].iter().enumerate() {
            for (s, sample) in ["s1", "s2", "s3", "s4"].iter().enumerate() {
                for (r, rep) in ["r1", "r2"].iter().enumerate() {
                    let count = (g + 1) * (t + 1) * (s + 2) + r;
                    csv.push_str(&format!("{gene},{taxon},{sample},{rep},{count}\n"));
                }
            }
        }
    }
    let path = dir.path().join("counts.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn config(input: &std::path::Path, extra: &str) -> SweepConfig {
    let toml = format!(
        r#"
[input]
path = "{}"
dimensions = ["gene", "taxon", "sample"]
replicate = "rep"
value = "count"

[normalize]
method = "log1p"

[grid]
ranks = [1, 2]
lambdas = [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]

[params]
nonneg_modes = [1, 2]
n_iter_max = 60
n_initializations = 2

[sweep]
seed = 3
n_bootstraps = 2
max_workers = 2
cross_validate = true
{extra}
"#,
        input.display()
    );
    let config = SweepConfig::from_toml(&toml).unwrap();
    SweepConfig::validate(&config).unwrap();
    config
}

#[test]
fn assemble_builds_tensor_and_replicates() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let pipeline = Pipeline::new(config(&input, ""));

    let assembled = pipeline.assemble().unwrap();
    assert!(assembled.table.is_normalized());
    assert_eq!(assembled.tensor.shape(), vec![3, 2, 4]);
    assert_eq!(assembled.tensor.missing_count(), 0);
    assert_eq!(assembled.replicates.len(), 2);
    assert_eq!(assembled.replicates.labels().collect::<Vec<_>>(), vec!["r1", "r2"]);
    for (_, tensor) in assembled.replicates.iter() {
        assert_eq!(tensor.axes(), assembled.tensor.axes());
    }
}

#[test]
fn full_sweep_ranks_every_configuration() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let pipeline = Pipeline::new(config(&input, ""));
    let assembled = pipeline.assemble().unwrap();

    let driver = SweepDriver::new(
        Arc::new(SparseCp::new()),
        SweepOptions::from_config(pipeline.config()),
    );
    let report = pipeline.sweep(&assembled, &driver).unwrap();

    assert_eq!(report.stats.configurations, 4);
    assert_eq!(report.ranked.len(), 4);
    assert_eq!(report.stats.failed, 0);
    let errors: Vec<f64> = report.ranked.iter().filter_map(|r| r.relative_sse()).collect();
    assert!(errors.windows(2).all(|w| w[0] <= w[1]), "{errors:?}");
    assert!(report.ranked.iter().all(|r| r.bootstrap.is_some()));
    // 4 configurations × 2 modeled replicates × 2 comparisons.
    assert_eq!(report.cross_validation.len(), 16);
}

#[test]
fn shuffled_replicates_keep_the_pooled_tensor() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let plain = Pipeline::new(config(&input, "")).assemble().unwrap();
    let shuffled = Pipeline::new(config(&input, "shuffle_replicates_by = \"sample\""))
        .assemble()
        .unwrap();

    assert_eq!(plain.tensor.axes(), shuffled.tensor.axes());
    assert!(plain.tensor.bit_eq(&shuffled.tensor));
    assert_eq!(shuffled.replicates.len(), 2);
    assert_eq!(plain.table, shuffled.table);
    assert_eq!(plain.rounds.len(), 1);
    assert_eq!(shuffled.rounds.len(), 1);
}

#[test]
fn each_cv_round_gets_its_own_relabeling() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let extra = "shuffle_replicates_by = \"sample\"\ncv_rounds = 3";
    let pipeline = Pipeline::new(config(&input, extra));
    let assembled = pipeline.assemble().unwrap();
    assert_eq!(assembled.rounds.len(), 3);
    for round in &assembled.rounds {
        assert_eq!(round.len(), 2);
    }

    let driver = SweepDriver::new(
        Arc::new(SparseCp::new()),
        SweepOptions::from_config(pipeline.config()),
    );
    let report = pipeline.sweep(&assembled, &driver).unwrap();
    // 4 configurations × 3 rounds × 2 modeled replicates × 2 comparisons.
    assert_eq!(report.cross_validation.len(), 48);
    let ids: std::collections::BTreeSet<usize> =
        report.cross_validation.iter().map(|r| r.bootstrap_id).collect();
    assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn missing_input_path_is_a_config_error() {
    let pipeline = Pipeline::new(SweepConfig::default());
    match pipeline.assemble() {
        Err(PipelineError::Config(ConfigError::MissingField { .. })) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}
