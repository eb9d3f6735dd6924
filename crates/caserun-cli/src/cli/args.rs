use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "caserun",
    version,
    about = "Sequential case replay — apply each case's inputs to a target model, run it once, record every outcome"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay the configured cases against a target
    Run(RunArgs),
    /// Write a commented sample config
    Init(InitArgs),
    /// List recent recorded runs
    Runs(RunsArgs),
    /// Dump the recorded cases of one run
    Show(ShowArgs),
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    /// Human-readable dump (stdout unless --out names a file)
    Dump,
    /// One JSON case per line (--out required)
    Jsonl,
    /// SQLite run database (--db)
    Sqlite,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = "cases.yaml")]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t = RecordKind::Dump)]
    pub record: RecordKind,

    /// Output file for the dump/jsonl recorders
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, default_value = ".caserun/runs.db", env = "CASERUN_DB")]
    pub db: PathBuf,

    /// Per-case wall-clock timeout for the command target, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Target command after `--`; the builtin echo model when omitted
    #[arg(last = true)]
    pub command: Vec<String>,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "cases.yaml")]
    pub config: PathBuf,
}

#[derive(Parser, Clone)]
pub struct RunsArgs {
    #[arg(long, default_value = ".caserun/runs.db", env = "CASERUN_DB")]
    pub db: PathBuf,

    /// How many runs to list, most recent first
    #[arg(long, default_value_t = 10)]
    pub last: u32,
}

#[derive(Parser, Clone)]
pub struct ShowArgs {
    #[arg(long, default_value = ".caserun/runs.db", env = "CASERUN_DB")]
    pub db: PathBuf,

    /// Run row id as printed by `caserun runs`
    #[arg(long)]
    pub run: i64,
}
