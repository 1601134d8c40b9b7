//! tensorsweep CLI: tidy table → tensor → sparse CP sweep → archive.

mod commands;
mod events;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tensorsweep_core::config::CliOverrides;
use tensorsweep_core::errors::{PipelineError, SweepErrorCode};

#[derive(Parser)]
#[command(name = "tensorsweep")]
#[command(about = "Sparse tensor decomposition sweeps over tidy tables")]
#[command(version)]
struct Cli {
    /// Config file (default: ./tensorsweep.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tensorsweep_pipeline=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, normalize and assemble the input; print a summary
    Assemble {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Write the assembled tensor as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the full sweep and archive the best fit
    Sweep {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Print the resolved configuration as TOML
    ShowConfig {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

#[derive(Args, Debug, Default)]
struct OverrideArgs {
    /// Input table (overrides input.path)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Master seed
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Bootstrap refits per configuration
    #[arg(long)]
    bootstraps: Option<usize>,

    /// Output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Do not read or write the fit cache
    #[arg(long)]
    no_cache: bool,
}

impl From<OverrideArgs> for CliOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            input_path: args.input,
            seed: args.seed,
            max_workers: args.workers,
            n_bootstraps: args.bootstraps,
            output_dir: args.out_dir,
            no_cache: args.no_cache,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tensorsweep_core::tracing::init_tracing_with(cli.log_level.as_deref());

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Assemble { overrides, out } => {
            commands::assemble(config, &overrides.into(), out.as_deref())
        }
        Commands::Sweep { overrides } => commands::sweep(config, &overrides.into()),
        Commands::ShowConfig { overrides } => commands::show_config(config, &overrides.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PipelineError>() {
                Some(pe) => eprintln!("Error [{}] in {} stage: {e:#}", pe.error_code(), pe.stage()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
