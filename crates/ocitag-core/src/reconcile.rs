//! Per-system tag classification.
//!
//! `classify` is pure: it looks at one DB system and the wanted tag and says
//! whether the system must be updated, and if not, why it is skipped. The
//! `Reconciler` is the only caller that turns a `Decision::Update` into a
//! network call.

use serde::Serialize;
use serde_json::Value;

use crate::model::{DbSystem, DefinedTags, LifecycleState, TagTarget};

/// Final state of one DB system after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Updated,
    SkippedAlreadyTagged,
    SkippedIneligible,
    SkippedUpdateFailed,
}

impl Disposition {
    pub fn detail(&self) -> Option<&'static str> {
        Some(match self {
            Self::Updated => "Tag updated successfully",
            Self::SkippedAlreadyTagged => "Tag already exists",
            Self::SkippedIneligible => {
                "Tag update skipped as the DB system is not in an ACTIVE state."
            }
            Self::SkippedUpdateFailed => "Failed to update tag",
        })
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated)
    }
}

/// The defined tags to write back to one DB system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateRequest {
    pub db_system_id: String,
    pub defined_tags: DefinedTags,
}

impl UpdateRequest {
    /// Sets `namespace.tag_name = id` on top of the system's current tags.
    ///
    /// The whole defined-tag map is sent because the update call replaces it;
    /// sibling keys in the namespace and other namespaces are carried over.
    pub fn self_tag(db_system: &DbSystem, target: &TagTarget) -> Self {
        let mut defined_tags = db_system.defined_tags.clone();
        defined_tags
            .entry(target.namespace().to_string())
            .or_default()
            .insert(
                target.tag_name().to_string(),
                Value::String(db_system.id.clone()),
            );
        Self {
            db_system_id: db_system.id.clone(),
            defined_tags,
        }
    }
}

/// What to do with one DB system.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Skip(Disposition),
    Update(UpdateRequest),
}

pub fn classify(db_system: &DbSystem, target: &TagTarget) -> Decision {
    let tagged = db_system.is_self_tagged(target);

    if !db_system.lifecycle_state.is_active() {
        // inactive systems are never mutated, whatever their current tag says
        return if tagged {
            Decision::Skip(Disposition::SkippedAlreadyTagged)
        } else {
            Decision::Skip(Disposition::SkippedIneligible)
        };
    }

    if tagged {
        Decision::Skip(Disposition::SkippedAlreadyTagged)
    } else {
        Decision::Update(UpdateRequest::self_tag(db_system, target))
    }
}

/// One report line: the result of reconciling one DB system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub compartment_name: String,
    pub resource_label: String,
    pub lifecycle_state: LifecycleState,
    pub disposition: Disposition,
}

impl Outcome {
    pub fn new(compartment_name: &str, db_system: &DbSystem, disposition: Disposition) -> Self {
        Self {
            compartment_name: compartment_name.to_string(),
            resource_label: db_system.display_name.clone(),
            lifecycle_state: db_system.lifecycle_state.clone(),
            disposition,
        }
    }

    pub fn detail(&self) -> Option<&'static str> {
        self.disposition.detail()
    }
}
