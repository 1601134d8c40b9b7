//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use tensorsweep_core::config::{CliOverrides, SweepConfig};
use tensorsweep_core::constants::{CV_TABLE_FILE, FIT_TABLE_FILE};
use tensorsweep_core::errors::PipelineError;
use tensorsweep_core::events::types::ArtifactWrittenEvent;
use tensorsweep_core::events::EventDispatcher;
use tensorsweep_core::types::FitResult;
use tensorsweep_pipeline::{Pipeline, SparseCp, SweepDriver, SweepOptions, SweepReport};
use tensorsweep_storage::archive::write_atomic;
use tensorsweep_storage::{
    write_archive, write_cv_table, write_fit_table, Archive, Provenance, SqliteFitCache,
};

use crate::events::ProgressLogger;

fn load_config(explicit: Option<&Path>, overrides: &CliOverrides) -> anyhow::Result<SweepConfig> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config = SweepConfig::load(&cwd, explicit, Some(overrides)).map_err(PipelineError::from)?;
    Ok(config)
}

pub fn show_config(explicit: Option<&Path>, overrides: &CliOverrides) -> anyhow::Result<()> {
    let config = load_config(explicit, overrides)?;
    print!("{}", config.to_toml().map_err(PipelineError::from)?);
    Ok(())
}

pub fn assemble(
    explicit: Option<&Path>,
    overrides: &CliOverrides,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(explicit, overrides)?;
    let input = Pipeline::new(config).assemble()?;
    let tensor = &input.tensor;

    println!("Tensor shape: {:?}", tensor.shape());
    for axis in tensor.axes() {
        let preview: Vec<&str> = axis.labels.iter().take(5).map(String::as_str).collect();
        let more = if axis.len() > preview.len() { ", ..." } else { "" };
        println!("  {:<12} {:>5} labels  [{}{more}]", axis.name, axis.len(), preview.join(", "));
    }
    println!(
        "Observed: {}  Missing: {}  Replicates: {}",
        tensor.observed_count(),
        tensor.missing_count(),
        input.replicates.len()
    );

    if let Some(path) = out {
        let json = serde_json::to_vec_pretty(tensor).context("cannot serialize tensor")?;
        let bytes = write_atomic(path, &json).map_err(PipelineError::from)?;
        println!("Wrote {} ({bytes} bytes)", path.display());
    }
    Ok(())
}

pub fn sweep(explicit: Option<&Path>, overrides: &CliOverrides) -> anyhow::Result<()> {
    let config = load_config(explicit, overrides)?;
    let pipeline = Pipeline::new(config.clone());
    let input = pipeline.assemble()?;

    let mut events = EventDispatcher::new();
    events.register(Arc::new(ProgressLogger::new()));
    let mut driver = SweepDriver::new(Arc::new(SparseCp::new()), SweepOptions::from_config(&config))
        .with_events(events);
    if let Some(cache_path) = config.output.cache_path() {
        let cache = SqliteFitCache::open(&cache_path).map_err(PipelineError::from)?;
        driver = driver.with_cache(Arc::new(cache));
    }

    let report = pipeline.sweep(&input, &driver)?;
    let out_dir = config.output.effective_dir();

    let fit_table = out_dir.join(FIT_TABLE_FILE);
    let bytes = write_fit_table(&fit_table, report.all_fits()).map_err(PipelineError::from)?;
    announce(driver.events(), "fit_table", &fit_table, bytes);

    if !report.cross_validation.is_empty() {
        let cv_table = out_dir.join(CV_TABLE_FILE);
        let bytes = write_cv_table(&cv_table, &report.cross_validation).map_err(PipelineError::from)?;
        announce(driver.events(), "cv_table", &cv_table, bytes);
    }

    print_ranking(&report);

    let Some(best) = report.best() else {
        bail!("no configuration fit successfully; see {}", fit_table.display());
    };
    let archive_path = config.output.archive_path();
    let provenance = Provenance::for_tensor(&input.tensor, config.input.path.as_deref());
    let bytes = write_archive(&archive_path, &Archive::new(best.clone(), provenance))
        .map_err(PipelineError::from)?;
    announce(driver.events(), "archive", &archive_path, bytes);
    println!("Best: {}  ->  {}", best.label(), archive_path.display());
    Ok(())
}

fn announce(events: &EventDispatcher, kind: &'static str, path: &Path, bytes: u64) {
    events.emit_artifact_written(&ArtifactWrittenEvent {
        kind,
        path: path.to_path_buf(),
        bytes,
    });
}

fn print_ranking(report: &SweepReport) {
    println!(
        "{:>4}  {:>4}  {:<18} {:>12} {:>6} {:>10}",
        "#", "rank", "lambdas", "rel. SSE", "iters", "boot FMS"
    );
    for (i, result) in report.ranked.iter().enumerate() {
        println!("{:>4}  {}", i + 1, ranking_row(result));
    }
    let stats = &report.stats;
    println!(
        "{} fits: {} succeeded ({} cached), {} failed in {} ms",
        stats.jobs, stats.succeeded, stats.cached, stats.failed, stats.duration_ms
    );
}

fn ranking_row(result: &FitResult) -> String {
    let lambdas = result.params.lambdas_label();
    match result.metrics.as_ref() {
        Some(m) => {
            let fms = result
                .bootstrap
                .as_ref()
                .map(|b| format!("{:.3}", b.mean_fms))
                .unwrap_or_else(|| "-".to_string());
            format!(
                "{:>4}  {:<18} {:>12.6} {:>6} {:>10}",
                result.params.rank, lambdas, m.relative_sse, m.iterations, fms
            )
        }
        None => format!("{:>4}  {:<18} {:>12}", result.params.rank, lambdas, "failed"),
    }
}
