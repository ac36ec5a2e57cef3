use anyhow::{Context, Result};

use intake_cli::pipeline::{ImportRequest, Pipeline, PipelineConfig, bulk_failed, scans_failed};

use crate::cli::{BulkCommand, ImportArgs, ScanArgs};
use crate::summary::{print_bulk, print_import, print_scan, print_sources};

/// Exit status of a finished command: `true` when something failed.
pub type Failed = bool;

pub fn run_sources(config: &PipelineConfig) -> Result<Failed> {
    let pipeline = Pipeline::open(config)?;
    print_sources(&pipeline.registry);
    Ok(false)
}

pub fn run_scan(config: &PipelineConfig, args: &ScanArgs) -> Result<Failed> {
    let pipeline = Pipeline::open(config)?;
    let results = pipeline.scan(&args.keys)?;
    if args.json {
        let json = serde_json::to_string_pretty(&results).context("serialize scan results")?;
        println!("{json}");
    } else {
        print_scan(&results, args.show_rows);
    }
    Ok(scans_failed(&results))
}

pub fn run_import(config: &PipelineConfig, args: &ImportArgs) -> Result<Failed> {
    let pipeline = Pipeline::open(config)?;
    let report = pipeline.import(&ImportRequest {
        source_key: args.key.clone(),
        actor: args.actor.clone(),
        rows: args.rows.clone(),
        dry_run: args.dry_run,
    })?;
    print_import(&report);
    Ok(report.has_failures())
}

pub fn run_bulk(config: &PipelineConfig, command: BulkCommand) -> Result<Failed> {
    let pipeline = Pipeline::open(config)?;
    let (action, ids) = command.into_request();
    let outcomes = pipeline.bulk(&action, &ids)?;
    print_bulk(action.name(), &outcomes);
    Ok(bulk_failed(&outcomes))
}
