//! Resource types as returned by the OCI Identity and MySQL services.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, TaggerError};

/// Defined tags: namespace -> (tag key -> tag value).
///
/// Values are kept as raw JSON so tags we don't manage survive a round trip
/// untouched; the managed tag is always a string.
pub type DefinedTags = BTreeMap<String, BTreeMap<String, Value>>;

/// Lifecycle state of a DB system. Only `ACTIVE` changes reconciliation
/// behavior; unknown states are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifecycleState {
    Creating,
    Active,
    Inactive,
    Updating,
    Deleting,
    Deleted,
    Failed,
    Other(String),
}

impl LifecycleState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "CREATING",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::Deleted => "DELETED",
            Self::Failed => "FAILED",
            Self::Other(s) => s,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<String> for LifecycleState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CREATING" => Self::Creating,
            "ACTIVE" => Self::Active,
            "INACTIVE" => Self::Inactive,
            "UPDATING" => Self::Updating,
            "DELETING" => Self::Deleting,
            "DELETED" => Self::Deleted,
            "FAILED" => Self::Failed,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for LifecycleState {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<LifecycleState> for String {
    fn from(value: LifecycleState) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A MySQL DB system summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSystem {
    pub id: String,
    pub display_name: String,
    pub lifecycle_state: LifecycleState,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub defined_tags: DefinedTags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compartment_id: Option<String>,
}

impl DbSystem {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        lifecycle_state: impl Into<LifecycleState>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            lifecycle_state: lifecycle_state.into(),
            defined_tags: DefinedTags::new(),
            compartment_id: None,
        }
    }

    pub fn with_defined_tag(
        mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.defined_tags
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    pub fn defined_tag(&self, namespace: &str, key: &str) -> Option<&Value> {
        self.defined_tags.get(namespace)?.get(key)
    }

    /// True when `namespace.key` holds exactly this system's own id.
    pub fn is_self_tagged(&self, target: &TagTarget) -> bool {
        self.defined_tag(target.namespace(), target.tag_name())
            .and_then(Value::as_str)
            == Some(self.id.as_str())
    }
}

/// A compartment in the tenancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compartment {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<LifecycleState>,
}

impl Compartment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lifecycle_state: None,
        }
    }
}

/// The `(namespace, tag name)` pair to enforce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTarget {
    namespace: String,
    tag_name: String,
}

impl TagTarget {
    /// Both parts are trimmed and must be non-empty.
    pub fn new(namespace: impl Into<String>, tag_name: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into().trim().to_string();
        let tag_name = tag_name.into().trim().to_string();
        if namespace.is_empty() {
            return Err(TaggerError::invalid_target("namespace must not be empty"));
        }
        if tag_name.is_empty() {
            return Err(TaggerError::invalid_target("tag name must not be empty"));
        }
        Ok(Self {
            namespace,
            tag_name,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }
}

impl fmt::Display for TagTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.tag_name)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<DefinedTags, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DefinedTags>::deserialize(deserializer)?.unwrap_or_default())
}
