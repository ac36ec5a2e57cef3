//! CLI argument definitions for `lead-intake`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use intake_model::{Actor, BulkAction, LeadId, SourceKey};

#[derive(Parser)]
#[command(
    name = "lead-intake",
    version,
    about = "Reconcile lead sheets into the canonical lead store",
    long_about = "Scan registered source tabs, flag invalid and duplicate rows,\n\
                  import ready rows as canonical leads and apply bulk actions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Source registry manifest (default: $LEAD_INTAKE_REGISTRY, then builtin).
    #[arg(long = "registry", value_name = "PATH", global = true)]
    pub registry: Option<PathBuf>,

    /// Directory holding `<workbook>/<tab>.csv` source files.
    #[arg(
        long = "workbook-dir",
        value_name = "DIR",
        default_value = "workbooks",
        global = true
    )]
    pub workbook_dir: PathBuf,

    /// Lead store JSON file.
    #[arg(
        long = "store",
        value_name = "PATH",
        default_value = "leads.json",
        global = true
    )]
    pub store: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include lead contents (names, phone numbers) in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered sources and their column mappings.
    Sources,

    /// Scan sources and report ready, invalid and duplicate rows.
    Scan(ScanArgs),

    /// Import ready rows of one source as canonical leads.
    Import(ImportArgs),

    /// Apply one action to several existing leads.
    #[command(subcommand)]
    Bulk(BulkCommand),
}

#[derive(Args)]
pub struct ScanArgs {
    /// Source keys to scan (default: every registered source).
    #[arg(value_name = "KEY", value_parser = parse_source_key)]
    pub keys: Vec<SourceKey>,

    /// Print results as JSON.
    #[arg(long = "json")]
    pub json: bool,

    /// List every scanned row, not only the per-source counts.
    #[arg(long = "show-rows")]
    pub show_rows: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(value_name = "KEY", value_parser = parse_source_key)]
    pub key: SourceKey,

    /// Name recorded as the importer on leads and source rows.
    #[arg(long = "actor", value_name = "NAME", value_parser = parse_actor)]
    pub actor: Actor,

    /// Import only these row numbers.
    #[arg(long = "row", value_name = "N")]
    pub rows: Vec<u64>,

    /// Report what would be imported without writing anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum BulkCommand {
    /// Assign a new owner.
    ReassignOwner {
        #[arg(long = "owner")]
        owner: String,
        #[command(flatten)]
        targets: LeadTargets,
    },
    /// Move leads to another pipeline stage.
    MoveStage {
        #[arg(long = "stage")]
        stage: String,
        #[command(flatten)]
        targets: LeadTargets,
    },
    /// Schedule the next follow-up action.
    Schedule {
        #[arg(long = "action")]
        action: String,
        /// Due date as YYYY-MM-DD.
        #[arg(long = "date", default_value = "")]
        date: String,
        #[command(flatten)]
        targets: LeadTargets,
    },
}

impl BulkCommand {
    /// Splits the subcommand into the action and its target ids.
    pub fn into_request(self) -> (BulkAction, Vec<LeadId>) {
        match self {
            Self::ReassignOwner { owner, targets } => {
                (BulkAction::ReassignOwner { owner }, targets.ids)
            }
            Self::MoveStage { stage, targets } => (BulkAction::MoveStage { stage }, targets.ids),
            Self::Schedule {
                action,
                date,
                targets,
            } => (BulkAction::ScheduleNextAction { action, date }, targets.ids),
        }
    }
}

#[derive(Args)]
pub struct LeadTargets {
    /// Lead ids to update.
    #[arg(long = "id", value_name = "LEAD_ID", required = true, value_parser = parse_lead_id)]
    pub ids: Vec<LeadId>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_source_key(value: &str) -> Result<SourceKey, String> {
    SourceKey::new(value).map_err(|e| e.to_string())
}

fn parse_actor(value: &str) -> Result<Actor, String> {
    Actor::new(value).map_err(|e| e.to_string())
}

fn parse_lead_id(value: &str) -> Result<LeadId, String> {
    LeadId::new(value).map_err(|e| e.to_string())
}
