//! Collaborator traits for the cloud calls the reconciler depends on.
//!
//! The REST client in `ocitag-cli` implements all three; tests use an
//! in-memory fake.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaggerError;
use crate::model::{Compartment, DbSystem};
use crate::reconcile::UpdateRequest;

/// Lists the compartments of a tenancy.
#[async_trait]
pub trait CompartmentLister: Send + Sync {
    /// Lists every compartment in the subtree below `tenancy_id`.
    ///
    /// The root compartment (the tenancy itself) is not part of the result.
    async fn list_compartments(&self, tenancy_id: &str) -> Result<Vec<Compartment>, TaggerError>;

    /// Fetches a single compartment; used to get the root tenancy compartment.
    async fn get_compartment(&self, compartment_id: &str) -> Result<Compartment, TaggerError>;
}

/// Lists MySQL DB systems.
#[async_trait]
pub trait DbSystemLister: Send + Sync {
    /// Returns all DB systems in a compartment, following pagination.
    ///
    /// # Errors
    ///
    /// Returns `TaggerError::Service` when the service rejects the call; the
    /// reconciler skips that compartment and moves on.
    async fn list_db_systems(&self, compartment_id: &str) -> Result<Vec<DbSystem>, TaggerError>;
}

/// Writes defined tags back to a DB system.
#[async_trait]
pub trait DbSystemUpdater: Send + Sync {
    /// `Ok` means the service accepted the update.
    async fn update_defined_tags(&self, request: &UpdateRequest) -> Result<(), TaggerError>;
}

/// Everything a tagging run needs from the cloud.
pub trait CloudApi: CompartmentLister + DbSystemLister + DbSystemUpdater {}

impl<T> CloudApi for T where T: CompartmentLister + DbSystemLister + DbSystemUpdater {}

/// Type alias for a shareable cloud API handle.
pub type DynCloudApi = Arc<dyn CloudApi>;
