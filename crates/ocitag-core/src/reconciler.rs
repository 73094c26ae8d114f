//! The tagging run: compartments in order, DB systems in order, one outcome
//! per DB system.

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::model::{Compartment, DbSystem, TagTarget};
use crate::reconcile::{Decision, Disposition, Outcome, UpdateRequest, classify};
use crate::report::RunReport;
use crate::traits::DynCloudApi;

/// Result of reconciling one DB system: the outcome, plus the request that
/// was sent when an update was attempted.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub outcome: Outcome,
    pub request: Option<UpdateRequest>,
}

pub struct Reconciler {
    api: DynCloudApi,
    target: TagTarget,
}

impl Reconciler {
    pub fn new(api: DynCloudApi, target: TagTarget) -> Self {
        Self { api, target }
    }

    pub fn target(&self) -> &TagTarget {
        &self.target
    }

    /// Subtree compartments first, then the root tenancy compartment, which
    /// the subtree listing never includes.
    pub async fn compartments(&self, tenancy_id: &str) -> Result<Vec<Compartment>> {
        let mut compartments = self.api.list_compartments(tenancy_id).await?;
        compartments.push(self.api.get_compartment(tenancy_id).await?);
        Ok(compartments)
    }

    /// Reconciles every MySQL DB system in the tenancy.
    ///
    /// # Errors
    ///
    /// Failing to list the compartments is fatal, as is any non-service error
    /// while listing DB systems. A service error for one compartment is
    /// recorded in the report and the run continues.
    pub async fn run(&self, tenancy_id: &str) -> Result<RunReport> {
        let compartments = self.compartments(tenancy_id).await?;
        info!(
            count = compartments.len(),
            tag = %self.target,
            "reconciling DB system tags"
        );

        let mut report = RunReport::new();
        for compartment in &compartments {
            self.run_compartment(compartment, &mut report).await?;
        }

        let summary = report.summary();
        info!(
            updated = summary.updated,
            skipped = summary.skipped,
            listing_failures = summary.listing_failures,
            "tagging run finished"
        );
        Ok(report)
    }

    async fn run_compartment(&self, compartment: &Compartment, report: &mut RunReport) -> Result<()> {
        report.mark_compartment_scanned();

        let db_systems = match self.api.list_db_systems(&compartment.id).await {
            Ok(db_systems) => db_systems,
            Err(e) if e.is_service_error() => {
                error!(
                    compartment = %compartment.name,
                    error = %e,
                    "Error retrieving MySQL DB systems for compartment"
                );
                report.record_listing_failure(&compartment.name, e.to_string());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        info!(
            compartment = %compartment.name,
            count = db_systems.len(),
            "listed DB systems"
        );

        for db_system in &db_systems {
            let reconciled = self.reconcile(&compartment.name, db_system).await;
            report.record(reconciled.outcome);
        }
        Ok(())
    }

    /// Classifies one DB system and applies the update when one is needed.
    ///
    /// Never fails: a rejected update becomes `SkippedUpdateFailed`.
    pub async fn reconcile(&self, compartment_name: &str, db_system: &DbSystem) -> Reconciled {
        match classify(db_system, &self.target) {
            Decision::Skip(disposition) => {
                debug!(
                    db_system = %db_system.display_name,
                    state = %db_system.lifecycle_state,
                    ?disposition,
                    "skipping DB system"
                );
                Reconciled {
                    outcome: Outcome::new(compartment_name, db_system, disposition),
                    request: None,
                }
            }
            Decision::Update(request) => {
                let disposition = match self.api.update_defined_tags(&request).await {
                    Ok(()) => {
                        debug!(db_system = %db_system.display_name, "tag updated");
                        Disposition::Updated
                    }
                    Err(e) => {
                        warn!(
                            db_system = %db_system.display_name,
                            error = %e,
                            category = %e.category(),
                            "tag update failed"
                        );
                        Disposition::SkippedUpdateFailed
                    }
                };
                Reconciled {
                    outcome: Outcome::new(compartment_name, db_system, disposition),
                    request: Some(request),
                }
            }
        }
    }
}
