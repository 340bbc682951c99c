//! Command-line parsing for the conjunction geolocation batch job.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline. Every input/output location has a fixed default, so a bare
//! `cdmgeo` runs the whole batch with no flags at all.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_CDM_PATH, DEFAULT_GP_PATH, DEFAULT_OUTPUT_PATH, PresenceRule, SelectionPolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cdmgeo",
    version,
    about = "Geolocate predicted satellite conjunctions at time of closest approach"
)]
pub struct Cli {
    /// Log per-event decisions (debug level).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match conjunctions to element sets, propagate to TCA, and write the artifact.
    Run(RunArgs),
    /// Summarize an existing output artifact (record count, altitude range, PC weights).
    Stats(StatsArgs),
}

/// Options for a pipeline run.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Conjunction catalog (Space-Track `cdm_public` JSON).
    #[arg(long, env = "CDMGEO_CDM_PATH", default_value = DEFAULT_CDM_PATH)]
    pub cdm: PathBuf,

    /// Element catalog (Space-Track `gp` JSON with TLE lines).
    #[arg(long, env = "CDMGEO_GP_PATH", default_value = DEFAULT_GP_PATH)]
    pub gp: PathBuf,

    /// Output artifact; overwritten on every run.
    #[arg(short, long, env = "CDMGEO_OUTPUT_PATH", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Also export the output records as CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// When PC / MIN_RNG count as present (`truthy` treats 0 and "" as missing).
    #[arg(long, value_enum, default_value_t = PresenceRule::Truthy)]
    pub presence: PresenceRule,

    /// Which participant's position to use when both propagate cleanly.
    #[arg(long, value_enum, default_value_t = SelectionPolicy::LastValidWins)]
    pub selection: SelectionPolicy,

    /// Resolve records on a single thread.
    #[arg(long)]
    pub sequential: bool,

    /// Warn about records whose resolution takes longer than this (milliseconds).
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub record_budget_ms: Option<u64>,

    /// Pretty-print the JSON artifact.
    #[arg(long)]
    pub pretty: bool,

    /// Do not print the run summary.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Options for summarizing an artifact.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Artifact produced by `cdmgeo run`.
    #[arg(long, env = "CDMGEO_OUTPUT_PATH", default_value = DEFAULT_OUTPUT_PATH)]
    pub artifact: PathBuf,
}
