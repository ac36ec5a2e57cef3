use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use intake_model::{
    BulkOutcome, CandidateRecord, CandidateStatus, DuplicateRef, ImportError, ScanResult,
};
use intake_registry::SourceRegistry;
use intake_cli::pipeline::ImportReport;

pub fn print_sources(registry: &SourceRegistry) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Name"),
        header_cell("Location"),
        header_cell("Columns"),
        header_cell("Required"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for source in registry.iter() {
        let required: Vec<&str> = source.required_headers().collect();
        table.add_row(vec![
            key_cell(source.key.as_str()),
            Cell::new(&source.display_name),
            Cell::new(source.location.to_string()),
            Cell::new(source.columns.len()),
            Cell::new(required.join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn print_scan(results: &[ScanResult], show_rows: bool) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Ready"),
        header_cell("Invalid"),
        header_cell("Duplicate"),
        header_cell("Imported"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for result in results {
        let status = match &result.error {
            Some(error) => Cell::new(error.to_string()).fg(Color::Red),
            None => Cell::new("ok").fg(Color::Green),
        };
        table.add_row(vec![
            key_cell(result.source_key.as_str()),
            count_cell(result.stats.ready, Color::Green),
            count_cell(result.stats.invalid, Color::Red),
            count_cell(result.stats.duplicate, Color::Yellow),
            dim_cell(result.stats.already_imported),
            status,
        ]);
    }
    println!("{table}");

    if show_rows {
        for result in results.iter().filter(|r| !r.rows.is_empty()) {
            println!();
            println!("{}:", result.source_key);
            println!("{}", rows_table(&result.rows));
        }
    }
}

fn rows_table(rows: &[CandidateRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Status"),
        header_cell("Company"),
        header_cell("Number"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for candidate in rows {
        table.add_row(vec![
            Cell::new(candidate.row_number),
            status_cell(candidate.status()),
            Cell::new(candidate.field("companyName").unwrap_or("-")),
            Cell::new(candidate.field("number").unwrap_or("-")),
            Cell::new(candidate_detail(candidate)),
        ]);
    }
    table
}

fn candidate_detail(candidate: &CandidateRecord) -> String {
    match candidate.status() {
        CandidateStatus::Invalid => candidate.errors.join("; "),
        CandidateStatus::Duplicate => match &candidate.duplicate_of {
            Some(DuplicateRef::Lead { lead_id }) => format!("matches lead {lead_id}"),
            Some(DuplicateRef::Candidate { row_number, .. }) => format!("matches row {row_number}"),
            None => String::new(),
        },
        CandidateStatus::Ready => String::new(),
    }
}

pub fn print_import(report: &ImportReport) {
    if report.dry_run {
        println!(
            "Dry run: {} row(s) of {} would be imported",
            report.selected.len(),
            report.scan.source_key
        );
        if !report.selected.is_empty() {
            println!("{}", rows_table(&report.selected));
        }
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Row"),
            header_cell("Result"),
            header_cell("Lead"),
            header_cell("Detail"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 0, CellAlignment::Right);
        for outcome in &report.outcomes {
            let (result, lead, detail) = match &outcome.result {
                Ok(lead) => (
                    Cell::new("imported").fg(Color::Green),
                    lead.lead_id.to_string(),
                    String::new(),
                ),
                Err(error) => match error.created_lead() {
                    Some(lead) => (
                        Cell::new("partial").fg(Color::Yellow),
                        lead.lead_id.to_string(),
                        error.to_string(),
                    ),
                    None => (
                        Cell::new("failed").fg(Color::Red),
                        "-".to_string(),
                        error.to_string(),
                    ),
                },
            };
            table.add_row(vec![
                Cell::new(outcome.row_number),
                result,
                Cell::new(lead),
                Cell::new(detail),
            ]);
        }
        println!("{table}");
        println!(
            "Imported {} of {} row(s) from {}",
            report.imported(),
            report.outcomes.len(),
            report.scan.source_key
        );
        let needs_rescan = report
            .outcomes
            .iter()
            .any(|outcome| outcome.result.as_ref().is_err_and(ImportError::requires_rescan));
        if needs_rescan {
            eprintln!(
                "Some rows changed or were only partly imported; rescan {} before importing again",
                report.scan.source_key
            );
        }
    }
    if !report.unmatched_rows.is_empty() {
        let rows: Vec<String> = report.unmatched_rows.iter().map(u64::to_string).collect();
        eprintln!(
            "Rows not found or already imported: {}",
            rows.join(", ")
        );
    }
}

pub fn print_bulk(action: &str, outcomes: &[BulkOutcome]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Lead"), header_cell("Result")]);
    apply_table_style(&mut table);
    for outcome in outcomes {
        let result = match &outcome.result {
            Ok(_) => Cell::new("updated").fg(Color::Green),
            Err(error) => Cell::new(error.to_string()).fg(Color::Red),
        };
        table.add_row(vec![Cell::new(outcome.lead_id.as_str()), result]);
    }
    println!("{table}");
    let updated = outcomes.iter().filter(|o| o.is_success()).count();
    println!("{action}: {updated} of {} lead(s) updated", outcomes.len());
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn key_cell(key: &str) -> Cell {
    Cell::new(key)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn status_cell(status: CandidateStatus) -> Cell {
    let color = match status {
        CandidateStatus::Ready => Color::Green,
        CandidateStatus::Invalid => Color::Red,
        CandidateStatus::Duplicate => Color::Yellow,
    };
    Cell::new(status.as_str()).fg(color)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
