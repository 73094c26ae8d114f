use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use ocitag_core::{
    Compartment, CompartmentLister, DbSystem, DbSystemLister, DbSystemUpdater, Disposition,
    Reconciler, TagTarget, TaggerError, UpdateRequest,
};

const TENANCY: &str = "ocid1.tenancy.oc1..root";

/// In-memory tenancy. Successful updates are applied to the stored systems so
/// a second run sees the new tags.
#[derive(Default)]
struct FakeCloud {
    compartments: Vec<Compartment>,
    systems: Mutex<BTreeMap<String, Vec<DbSystem>>>,
    failing_compartments: HashSet<String>,
    broken_transport: HashSet<String>,
    rejected_updates: HashSet<String>,
    updates: Mutex<Vec<UpdateRequest>>,
}

impl FakeCloud {
    fn with_compartment(mut self, id: &str, name: &str, systems: Vec<DbSystem>) -> Self {
        self.compartments.push(Compartment::new(id, name));
        self.systems.lock().unwrap().insert(id.to_string(), systems);
        self
    }

    fn with_root_systems(self, systems: Vec<DbSystem>) -> Self {
        self.systems.lock().unwrap().insert(TENANCY.to_string(), systems);
        self
    }

    fn failing(mut self, compartment_id: &str) -> Self {
        self.failing_compartments.insert(compartment_id.to_string());
        self
    }

    fn rejecting(mut self, db_system_id: &str) -> Self {
        self.rejected_updates.insert(db_system_id.to_string());
        self
    }

    fn sent_updates(&self) -> Vec<UpdateRequest> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompartmentLister for FakeCloud {
    async fn list_compartments(&self, tenancy_id: &str) -> Result<Vec<Compartment>, TaggerError> {
        assert_eq!(tenancy_id, TENANCY);
        Ok(self.compartments.clone())
    }

    async fn get_compartment(&self, compartment_id: &str) -> Result<Compartment, TaggerError> {
        assert_eq!(compartment_id, TENANCY);
        Ok(Compartment::new(TENANCY, "root-tenancy"))
    }
}

#[async_trait]
impl DbSystemLister for FakeCloud {
    async fn list_db_systems(&self, compartment_id: &str) -> Result<Vec<DbSystem>, TaggerError> {
        if self.failing_compartments.contains(compartment_id) {
            return Err(TaggerError::service(
                404,
                "NotAuthorizedOrNotFound",
                "Authorization failed or requested resource not found.",
            ));
        }
        if self.broken_transport.contains(compartment_id) {
            return Err(TaggerError::transport("connection reset by peer"));
        }
        Ok(self
            .systems
            .lock()
            .unwrap()
            .get(compartment_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl DbSystemUpdater for FakeCloud {
    async fn update_defined_tags(&self, request: &UpdateRequest) -> Result<(), TaggerError> {
        self.updates.lock().unwrap().push(request.clone());
        if self.rejected_updates.contains(&request.db_system_id) {
            return Err(TaggerError::service(409, "Conflict", "DB system is busy"));
        }
        for systems in self.systems.lock().unwrap().values_mut() {
            for system in systems.iter_mut() {
                if system.id == request.db_system_id {
                    system.defined_tags = request.defined_tags.clone();
                }
            }
        }
        Ok(())
    }
}

fn target() -> TagTarget {
    TagTarget::new("ops", "owner").unwrap()
}

fn reconciler(cloud: &Arc<FakeCloud>) -> Reconciler {
    Reconciler::new(cloud.clone(), target())
}

#[tokio::test]
async fn scenario_a_active_untagged_is_updated() {
    let cloud = Arc::new(FakeCloud::default().with_compartment(
        "c1",
        "prod",
        vec![DbSystem::new("ocid1.x", "orders", "ACTIVE")],
    ));

    let report = reconciler(&cloud).run(TENANCY).await.unwrap();

    let updates = cloud.sent_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].db_system_id, "ocid1.x");
    assert_eq!(
        serde_json::to_value(&updates[0].defined_tags).unwrap(),
        json!({ "ops": { "owner": "ocid1.x" } })
    );
    assert_eq!(report.outcomes().len(), 1);
    assert_eq!(report.outcomes()[0].disposition, Disposition::Updated);
}

#[tokio::test]
async fn scenario_b_already_tagged_is_skipped() {
    let cloud = Arc::new(FakeCloud::default().with_compartment(
        "c1",
        "prod",
        vec![DbSystem::new("ocid1.x", "orders", "ACTIVE").with_defined_tag("ops", "owner", "ocid1.x")],
    ));

    let report = reconciler(&cloud).run(TENANCY).await.unwrap();

    assert!(cloud.sent_updates().is_empty());
    assert_eq!(
        report.outcomes()[0].disposition,
        Disposition::SkippedAlreadyTagged
    );
}

#[tokio::test]
async fn scenario_c_inactive_is_never_updated() {
    let cloud = Arc::new(FakeCloud::default().with_compartment(
        "c1",
        "prod",
        vec![
            DbSystem::new("ocid1.y", "stopped", "STOPPED"),
            DbSystem::new("ocid1.z", "failed", "FAILED").with_defined_tag("ops", "owner", "wrong"),
        ],
    ));

    let report = reconciler(&cloud).run(TENANCY).await.unwrap();

    assert!(cloud.sent_updates().is_empty());
    let dispositions: Vec<Disposition> =
        report.outcomes().iter().map(|o| o.disposition).collect();
    assert_eq!(
        dispositions,
        [Disposition::SkippedIneligible, Disposition::SkippedIneligible]
    );
}

#[tokio::test]
async fn scenario_d_listing_failure_skips_only_that_compartment() {
    let cloud = Arc::new(
        FakeCloud::default()
            .with_compartment("c1", "broken", vec![DbSystem::new("ocid1.a", "a", "ACTIVE")])
            .with_compartment("c2", "healthy", vec![DbSystem::new("ocid1.b", "b", "ACTIVE")])
            .failing("c1"),
    );

    let report = reconciler(&cloud).run(TENANCY).await.unwrap();

    assert_eq!(report.outcomes().len(), 1);
    assert_eq!(report.outcomes()[0].compartment_name, "healthy");
    assert_eq!(report.listing_failures().len(), 1);
    assert_eq!(report.listing_failures()[0].compartment_name, "broken");
    assert!(
        report.listing_failures()[0]
            .message
            .contains("NotAuthorizedOrNotFound")
    );
    // c1, c2 and the root
    assert_eq!(report.summary().compartments, 3);
}

#[tokio::test]
async fn transport_failure_while_listing_aborts_the_run() {
    let mut cloud = FakeCloud::default()
        .with_compartment("c1", "a", vec![])
        .with_compartment("c2", "b", vec![DbSystem::new("ocid1.b", "b", "ACTIVE")]);
    cloud.broken_transport.insert("c1".to_string());
    let cloud = Arc::new(cloud);

    let result = reconciler(&cloud).run(TENANCY).await;

    assert!(matches!(result, Err(TaggerError::Transport { .. })));
    assert!(cloud.sent_updates().is_empty());
}

#[tokio::test]
async fn rejected_update_is_recorded_not_raised() {
    let cloud = Arc::new(
        FakeCloud::default()
            .with_compartment(
                "c1",
                "prod",
                vec![
                    DbSystem::new("ocid1.busy", "busy", "ACTIVE"),
                    DbSystem::new("ocid1.ok", "ok", "ACTIVE"),
                ],
            )
            .rejecting("ocid1.busy"),
    );

    let report = reconciler(&cloud).run(TENANCY).await.unwrap();

    assert_eq!(cloud.sent_updates().len(), 2);
    assert_eq!(
        report.outcomes()[0].disposition,
        Disposition::SkippedUpdateFailed
    );
    assert_eq!(report.outcomes()[0].detail(), Some("Failed to update tag"));
    assert_eq!(report.outcomes()[1].disposition, Disposition::Updated);
}

#[tokio::test]
async fn every_system_gets_exactly_one_outcome_and_root_is_scanned_last() {
    let cloud = Arc::new(
        FakeCloud::default()
            .with_compartment(
                "c1",
                "dev",
                vec![
                    DbSystem::new("ocid1.1", "one", "ACTIVE"),
                    DbSystem::new("ocid1.2", "two", "CREATING"),
                ],
            )
            .with_compartment(
                "c2",
                "prod",
                vec![DbSystem::new("ocid1.3", "three", "ACTIVE").with_defined_tag("ops", "owner", "ocid1.3")],
            )
            .with_root_systems(vec![DbSystem::new("ocid1.4", "four", "ACTIVE")]),
    );

    let report = reconciler(&cloud).run(TENANCY).await.unwrap();

    let seen: Vec<(&str, &str)> = report
        .outcomes()
        .iter()
        .map(|o| (o.compartment_name.as_str(), o.resource_label.as_str()))
        .collect();
    assert_eq!(
        seen,
        [
            ("dev", "one"),
            ("dev", "two"),
            ("prod", "three"),
            ("root-tenancy", "four"),
        ]
    );

    let rows: Vec<&str> = report.rows().iter().map(|r| r.db_system).collect();
    assert_eq!(rows, ["one", "four", "two", "three"]);
}

#[tokio::test]
async fn second_run_after_successful_updates_sends_nothing() {
    let cloud = Arc::new(
        FakeCloud::default()
            .with_compartment(
                "c1",
                "prod",
                vec![
                    DbSystem::new("ocid1.1", "one", "ACTIVE").with_defined_tag("ops", "team", "dba"),
                    DbSystem::new("ocid1.2", "two", "ACTIVE").with_defined_tag("ops", "owner", "stale"),
                    DbSystem::new("ocid1.3", "three", "INACTIVE"),
                ],
            )
            .with_root_systems(vec![DbSystem::new("ocid1.4", "four", "ACTIVE")]),
    );

    let first = reconciler(&cloud).run(TENANCY).await.unwrap();
    assert_eq!(first.summary().updated, 3);
    let sent_first = cloud.sent_updates().len();
    assert_eq!(sent_first, 3);

    let second = reconciler(&cloud).run(TENANCY).await.unwrap();
    assert_eq!(cloud.sent_updates().len(), sent_first);
    assert_eq!(second.summary().updated, 0);
    assert_eq!(second.summary().skipped, 4);

    let systems = cloud.systems.lock().unwrap();
    let one = &systems["c1"][0];
    assert_eq!(one.defined_tag("ops", "team"), Some(&json!("dba")));
    assert_eq!(one.defined_tag("ops", "owner"), Some(&json!("ocid1.1")));
}

#[tokio::test]
async fn reconcile_returns_the_request_it_sent() {
    let cloud = Arc::new(FakeCloud::default());
    let reconciler = reconciler(&cloud);

    let system = DbSystem::new("ocid1.x", "x", "ACTIVE");
    let reconciled = reconciler.reconcile("prod", &system).await;
    assert_eq!(reconciled.outcome.disposition, Disposition::Updated);
    assert_eq!(reconciled.request, cloud.sent_updates().first().cloned());

    let stopped = DbSystem::new("ocid1.y", "y", "STOPPED");
    let reconciled = reconciler.reconcile("prod", &stopped).await;
    assert!(reconciled.request.is_none());
    assert_eq!(cloud.sent_updates().len(), 1);
}
