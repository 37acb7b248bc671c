//! Entity snapshots carried by create and update events.
//!
//! Foreign keys use `0` for "not set", as the domain store does. Field names
//! on the wire follow the domain layer's JSON: tagged columns are snake case,
//! untagged foreign keys keep their Go names (`SupportGroupId`, ...), and the
//! audit columns sit at the top level of each entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit columns shared by every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub created_by: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_by: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Metadata {
    pub fn created_by(user_id: i64) -> Self {
        Self {
            created_by: user_id,
            created_at: Some(Utc::now()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportGroup {
    pub id: i64,
    #[serde(default)]
    pub ccrn: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    #[serde(default)]
    pub ccrn: String,
    /// Owning support group.
    #[serde(default, rename = "SupportGroupId", alias = "support_group_id")]
    pub support_group_id: i64,
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: i64,
    #[serde(default)]
    pub ccrn: String,
    #[serde(default, rename = "type")]
    pub component_type: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVersion {
    pub id: i64,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "ComponentId", alias = "component_id")]
    pub component_id: i64,
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub id: i64,
    #[serde(default)]
    pub ccrn: String,
    #[serde(default)]
    pub count: i16,
    #[serde(default, rename = "ComponentVersionId", alias = "component_version_id")]
    pub component_version_id: i64,
    #[serde(default, rename = "ServiceId", alias = "service_id")]
    pub service_id: i64,
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMatch {
    pub id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub issue_id: i64,
    #[serde(default)]
    pub component_instance_id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default, alias = "uniqueUserId", alias = "sapId")]
    pub unique_user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_domain_layer_json() {
        let instance: ComponentInstance = serde_json::from_str(
            r#"{
                "id": 10,
                "ccrn": "ci-10",
                "count": 2,
                "ComponentVersionId": 7,
                "ServiceId": 5,
                "created_by": 1,
                "created_at": "0001-01-01T00:00:00Z",
                "deleted_at": "0001-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(instance.component_version_id, 7);
        assert_eq!(instance.service_id, 5);
        assert_eq!(instance.metadata.created_by, 1);
    }

    #[test]
    fn test_missing_foreign_keys_default_to_unset() {
        let service: Service = serde_json::from_str(r#"{"id": 5, "name": "svc"}"#).unwrap();
        assert_eq!(service.support_group_id, 0);
        assert_eq!(service.metadata, Metadata::default());
    }
}
