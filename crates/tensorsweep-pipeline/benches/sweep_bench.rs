//! Sweep benchmarks
//!
//! Benchmarks assembly, a single sparse CP fit, and a small parallel sweep.

use std::path::PathBuf;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tensorsweep_core::types::{HyperParams, TidyRecord, TidyTable};
use tensorsweep_core::traits::Decomposer;
use tensorsweep_pipeline::{
    AssemblyOptions, ParameterGrid, ReplicateSet, SparseCp, SweepDriver, SweepOptions,
    TensorAssembler,
};

fn synthetic_table(genes: usize, taxa: usize, samples: usize) -> TidyTable {
    let mut records = Vec::new();
    for g in 0..genes {
        for t in 0..taxa {
            for s in 0..samples {
                for rep in 0..2 {
                    let value = ((g + 1) * (t + 2) + s * 3 + rep) as f64 % 17.0;
                    records.push(TidyRecord {
                        dims: vec![format!("g{g:03}"), format!("t{t:03}"), format!("s{s:03}")],
                        replicate: format!("rep{rep}"),
                        raw: value,
                        normalized: None,
                        covariates: Vec::new(),
                    });
                }
            }
        }
    }
    TidyTable {
        source: PathBuf::from("bench.csv"),
        dimensions: vec!["gene".into(), "taxon".into(), "sample".into()],
        replicate_column: "replicate".into(),
        value_column: "value".into(),
        covariate_columns: Vec::new(),
        records,
    }
}

fn params(rank: usize) -> HyperParams {
    HyperParams {
        rank,
        lambdas: vec![0.1, 0.0, 0.0],
        nonneg_modes: vec![1, 2],
        tol: 1e-6,
        n_iter_max: 50,
        n_initializations: 2,
        seed: 1,
    }
}

fn bench_assemble(c: &mut Criterion) {
    let table = synthetic_table(20, 10, 6);
    let assembler = TensorAssembler::new(AssemblyOptions::default());

    c.bench_function("assemble_20x10x6", |b| {
        b.iter(|| assembler.assemble(&table, &["gene", "taxon", "sample"]).unwrap())
    });
}

fn bench_fit(c: &mut Criterion) {
    let table = synthetic_table(20, 10, 6);
    let tensor = TensorAssembler::new(AssemblyOptions::default())
        .assemble(&table, &["gene", "taxon", "sample"])
        .unwrap();

    let mut group = c.benchmark_group("sparse_cp");
    for rank in [1, 3, 5] {
        let p = params(rank);
        group.bench_with_input(BenchmarkId::from_parameter(rank), &p, |b, p| {
            b.iter(|| SparseCp::new().decompose(&tensor, p).unwrap())
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let table = synthetic_table(12, 8, 4);
    let assembler = TensorAssembler::new(AssemblyOptions::default());
    let tensor = assembler.assemble(&table, &["gene", "taxon", "sample"]).unwrap();
    let replicates = ReplicateSet::build(&assembler, &table, &tensor).unwrap();
    let grid = ParameterGrid::product(&[1, 2, 3], &[vec![0.0; 3], vec![0.5, 0.0, 0.0]], &params(1));
    let options = SweepOptions {
        n_bootstraps: 2,
        max_workers: 4,
        cross_validate: true,
        seed: 1,
    };
    let driver = SweepDriver::new(Arc::new(SparseCp::new()), options);

    c.bench_function("sweep_6_configs", |b| {
        b.iter(|| driver.run(&tensor, Some(&replicates), &grid).unwrap())
    });
}

criterion_group!(benches, bench_assemble, bench_fit, bench_sweep);
criterion_main!(benches);
