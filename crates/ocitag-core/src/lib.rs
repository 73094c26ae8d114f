//! Reconciles a self-referential defined tag across the MySQL DB systems of
//! an OCI tenancy.
//!
//! Every ACTIVE DB system ends up with `namespace.tag_name` set to its own
//! OCID; every other system is reported but left alone.

pub mod error;
pub mod model;
pub mod reconcile;
pub mod reconciler;
pub mod report;
pub mod traits;

pub use error::{ErrorCategory, Result, TaggerError};
pub use model::{Compartment, DbSystem, DefinedTags, LifecycleState, TagTarget};
pub use reconcile::{Decision, Disposition, Outcome, UpdateRequest, classify};
pub use reconciler::{Reconciled, Reconciler};
pub use report::{ListingFailure, REPORT_COLUMNS, ReportRow, RunReport, RunSummary};
pub use traits::{CloudApi, CompartmentLister, DbSystemLister, DbSystemUpdater, DynCloudApi};
