//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - builds the immutable `RunConfig`
//! - runs the pipeline and prints the summary

use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, RunArgs, StatsArgs};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cdmgeo` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` values feed clap's `env` fallbacks, so load it before parsing.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Stats(args) => handle_stats(args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_pipeline(&config)?;

    if !args.quiet {
        println!("{}", crate::report::format_run_summary(&run.stats, &config));
    }
    Ok(())
}

fn handle_stats(args: StatsArgs) -> Result<(), AppError> {
    let records = crate::io::read_artifact(&args.artifact)?;
    let stats = crate::report::ArtifactStats::from_records(&records);
    println!("{}", crate::report::format_artifact_stats(&stats));
    Ok(())
}

/// Build the run configuration, rejecting combinations that would clobber an input.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let config = RunConfig {
        cdm_path: args.cdm.clone(),
        gp_path: args.gp.clone(),
        output_path: args.output.clone(),
        export_csv: args.export_csv.clone(),
        presence: args.presence,
        selection: args.selection,
        parallel: !args.sequential,
        record_budget: args.record_budget_ms.map(Duration::from_millis),
        pretty: args.pretty,
    };

    let outputs = std::iter::once(&config.output_path).chain(config.export_csv.as_ref());
    for out in outputs {
        if out == &config.cdm_path || out == &config.gp_path {
            return Err(AppError::config(format!(
                "Output path '{}' would overwrite an input catalog.",
                out.display()
            )));
        }
    }
    if config.export_csv.as_ref() == Some(&config.output_path) {
        return Err(AppError::config("CSV export path must differ from the JSON artifact path."));
    }

    Ok(config)
}

/// Rewrite argv so `cdmgeo` defaults to `cdmgeo run`.
///
/// Rules:
/// - `cdmgeo`                       -> `cdmgeo run`
/// - `cdmgeo --pretty ...`          -> `cdmgeo run --pretty ...`
/// - `cdmgeo --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "stats");
    if is_subcommand {
        return argv;
    }

    // A leading global flag may precede the subcommand (`cdmgeo -v stats`).
    let is_global_flag = matches!(arg1.as_str(), "-v" | "--verbose");
    if is_global_flag {
        let tail = rewrite_args(std::iter::once(argv[0].clone()).chain(argv[2..].iter().cloned()).collect());
        return std::iter::once(tail[0].clone())
            .chain(std::iter::once(arg1))
            .chain(tail[1..].iter().cloned())
            .collect();
    }

    // Any other flag is a `run` flag.
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}
