use anyhow::Result;
use colored::Colorize;
use ocitag_core::{ListingFailure, REPORT_COLUMNS, ReportRow, RunReport, RunSummary};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

#[derive(Serialize)]
struct JsonReport<'a> {
    rows: Vec<ReportRow<'a>>,
    listing_failures: &'a [ListingFailure],
    summary: RunSummary,
}

pub fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Table => print_table(report),
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn print_table(report: &RunReport) {
    if report.is_empty() {
        println!("No DB systems found.");
    } else {
        println!("{}", render_table(report));
    }

    let summary = report.summary();
    if summary.updated > 0 {
        print_success(&summary_line(&summary));
    } else {
        println!("{} {}", "•".yellow(), summary_line(&summary));
    }
    for failure in report.listing_failures() {
        println!(
            "{} Could not list DB systems in {}: {}",
            "✗".red(),
            failure.compartment_name.cyan(),
            failure.message
        );
    }
}

pub fn render_table(report: &RunReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(REPORT_COLUMNS);
    for row in report.rows() {
        builder.push_record(row.cells());
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn render_json(report: &RunReport) -> Result<String> {
    let json = JsonReport {
        rows: report.rows(),
        listing_failures: report.listing_failures(),
        summary: report.summary(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

fn summary_line(summary: &RunSummary) -> String {
    format!(
        "Updated {}, skipped {} across {} compartments",
        summary.updated, summary.skipped, summary.compartments
    )
}
