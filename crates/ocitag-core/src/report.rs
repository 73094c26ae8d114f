use serde::Serialize;

use crate::reconcile::Outcome;

/// Column headers of the report table.
pub const REPORT_COLUMNS: [&str; 4] = [
    "Compartment Name",
    "DB System ID",
    "DB Status",
    "Operation Status",
];

/// A compartment whose DB systems could not be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingFailure {
    pub compartment_name: String,
    pub message: String,
}

/// Everything a tagging run produced, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    outcomes: Vec<Outcome>,
    listing_failures: Vec<ListingFailure>,
    compartments_scanned: usize,
}

/// One rendered report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow<'a> {
    pub compartment_name: &'a str,
    pub db_system: &'a str,
    pub db_status: &'a str,
    pub operation_status: &'a str,
}

impl ReportRow<'_> {
    pub fn cells(&self) -> [&str; 4] {
        [
            self.compartment_name,
            self.db_system,
            self.db_status,
            self.operation_status,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub compartments: usize,
    pub updated: usize,
    pub skipped: usize,
    pub listing_failures: usize,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn record_listing_failure(&mut self, compartment_name: &str, message: impl Into<String>) {
        self.listing_failures.push(ListingFailure {
            compartment_name: compartment_name.to_string(),
            message: message.into(),
        });
    }

    pub fn mark_compartment_scanned(&mut self) {
        self.compartments_scanned += 1;
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn listing_failures(&self) -> &[ListingFailure] {
        &self.listing_failures
    }

    pub fn updated(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.disposition.is_updated())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.disposition.is_updated())
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Rows in report order: updated systems first, then skipped ones.
    pub fn rows(&self) -> Vec<ReportRow<'_>> {
        self.updated()
            .chain(self.skipped())
            .map(|o| ReportRow {
                compartment_name: &o.compartment_name,
                db_system: &o.resource_label,
                db_status: o.lifecycle_state.as_str(),
                operation_status: o.detail().unwrap_or("None"),
            })
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        let updated = self.updated().count();
        RunSummary {
            compartments: self.compartments_scanned,
            updated,
            skipped: self.outcomes.len() - updated,
            listing_failures: self.listing_failures.len(),
        }
    }
}
