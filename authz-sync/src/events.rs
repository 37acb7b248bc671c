//! The domain events the synchronizer consumes.
//!
//! Create and update events carry the full new entity; delete events carry
//! only the id. Event names are the domain layer's names and double as NATS
//! subjects, and payload fields keep the domain layer's JSON keys
//! (`{"Service": {..}}`, `{"ServiceID": 5}`).

use events_bus::event_set;
use serde::{Deserialize, Serialize};

use crate::entity::{
    Component, ComponentInstance, ComponentVersion, IssueMatch, Service, SupportGroup, User,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportGroupCreated {
    #[serde(rename = "SupportGroup")]
    pub support_group: SupportGroup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportGroupUpdated {
    #[serde(rename = "SupportGroup")]
    pub support_group: SupportGroup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportGroupDeleted {
    #[serde(rename = "SupportGroupID")]
    pub support_group_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCreated {
    #[serde(rename = "Service")]
    pub service: Service,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceUpdated {
    #[serde(rename = "Service")]
    pub service: Service,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDeleted {
    #[serde(rename = "ServiceID")]
    pub service_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCreated {
    #[serde(rename = "Component")]
    pub component: Component,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentUpdated {
    #[serde(rename = "Component")]
    pub component: Component,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDeleted {
    #[serde(rename = "ComponentID")]
    pub component_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentVersionCreated {
    #[serde(rename = "ComponentVersion")]
    pub component_version: ComponentVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentVersionUpdated {
    #[serde(rename = "ComponentVersion")]
    pub component_version: ComponentVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentVersionDeleted {
    #[serde(rename = "ComponentVersionID")]
    pub component_version_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstanceCreated {
    #[serde(rename = "ComponentInstance")]
    pub component_instance: ComponentInstance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstanceUpdated {
    #[serde(rename = "ComponentInstance")]
    pub component_instance: ComponentInstance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstanceDeleted {
    #[serde(rename = "ComponentInstanceID")]
    pub component_instance_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueMatchCreated {
    #[serde(rename = "IssueMatch")]
    pub issue_match: IssueMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueMatchUpdated {
    #[serde(rename = "IssueMatch")]
    pub issue_match: IssueMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueMatchDeleted {
    #[serde(rename = "IssueMatchID")]
    pub issue_match_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreated {
    #[serde(rename = "User")]
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdated {
    #[serde(rename = "User")]
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDeleted {
    #[serde(rename = "UserID")]
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAddedToSupportGroup {
    #[serde(rename = "SupportGroupID")]
    pub support_group_id: i64,
    #[serde(rename = "UserID")]
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRemovedFromSupportGroup {
    #[serde(rename = "SupportGroupID")]
    pub support_group_id: i64,
    #[serde(rename = "UserID")]
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAddedToSupportGroup {
    #[serde(rename = "SupportGroupID")]
    pub support_group_id: i64,
    #[serde(rename = "ServiceID")]
    pub service_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRemovedFromSupportGroup {
    #[serde(rename = "SupportGroupID")]
    pub support_group_id: i64,
    #[serde(rename = "ServiceID")]
    pub service_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerAddedToService {
    #[serde(rename = "ServiceID")]
    pub service_id: i64,
    #[serde(rename = "OwnerID")]
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRemovedFromService {
    #[serde(rename = "ServiceID")]
    pub service_id: i64,
    #[serde(rename = "OwnerID")]
    pub owner_id: i64,
}

event_set! {
    /// Every domain event that affects the authorization graph.
    pub enum DomainEvent {
        SupportGroupCreated(SupportGroupCreated) => "CreateSupportGroup",
        SupportGroupUpdated(SupportGroupUpdated) => "UpdateSupportGroup",
        SupportGroupDeleted(SupportGroupDeleted) => "DeleteSupportGroup",
        ServiceCreated(ServiceCreated) => "CreateService",
        ServiceUpdated(ServiceUpdated) => "UpdateService",
        ServiceDeleted(ServiceDeleted) => "DeleteService",
        ComponentCreated(ComponentCreated) => "CreateComponent",
        ComponentUpdated(ComponentUpdated) => "UpdateComponent",
        ComponentDeleted(ComponentDeleted) => "DeleteComponent",
        ComponentVersionCreated(ComponentVersionCreated) => "CreateComponentVersion",
        ComponentVersionUpdated(ComponentVersionUpdated) => "UpdateComponentVersion",
        ComponentVersionDeleted(ComponentVersionDeleted) => "DeleteComponentVersion",
        ComponentInstanceCreated(ComponentInstanceCreated) => "CreateComponentInstance",
        ComponentInstanceUpdated(ComponentInstanceUpdated) => "UpdateComponentInstance",
        ComponentInstanceDeleted(ComponentInstanceDeleted) => "DeleteComponentInstance",
        IssueMatchCreated(IssueMatchCreated) => "CreateIssueMatch",
        IssueMatchUpdated(IssueMatchUpdated) => "UpdateIssueMatch",
        IssueMatchDeleted(IssueMatchDeleted) => "DeleteIssueMatch",
        UserCreated(UserCreated) => "CreateUser",
        UserUpdated(UserUpdated) => "UpdateUser",
        UserDeleted(UserDeleted) => "DeleteUser",
        UserAddedToSupportGroup(UserAddedToSupportGroup) => "AddUserToSupportGroup",
        UserRemovedFromSupportGroup(UserRemovedFromSupportGroup) => "RemoveUserFromSupportGroup",
        ServiceAddedToSupportGroup(ServiceAddedToSupportGroup) => "AddServiceToSupportGroup",
        ServiceRemovedFromSupportGroup(ServiceRemovedFromSupportGroup) =>
            "RemoveServiceFromSupportGroup",
        OwnerAddedToService(OwnerAddedToService) => "AddOwnerToService",
        OwnerRemovedFromService(OwnerRemovedFromService) => "RemoveOwnerFromService",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Metadata;
    use events_bus::{Event, EventVariant};

    fn decode<V: EventVariant<DomainEvent>>(body: &[u8]) -> Result<V, serde_json::Error> {
        V::from_payload(body)
    }

    #[test]
    fn test_event_names_follow_domain_vocabulary() {
        let event: DomainEvent = ComponentInstanceDeleted {
            component_instance_id: 10,
        }
        .into();
        assert_eq!(event.name().as_str(), "DeleteComponentInstance");
        assert_eq!(<ServiceCreated as EventVariant<DomainEvent>>::NAME.as_str(), "CreateService");
        assert_eq!(
            <OwnerAddedToService as EventVariant<DomainEvent>>::NAME.as_str(),
            "AddOwnerToService"
        );
    }

    #[test]
    fn test_wire_payload_is_the_inner_event() {
        let event: DomainEvent = ServiceCreated {
            service: Service {
                id: 5,
                ccrn: "svc".into(),
                support_group_id: 3,
                metadata: Metadata::default(),
            },
        }
        .into();

        let payload = event.to_payload().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value["Service"]["id"], 5);
        assert_eq!(value["Service"]["SupportGroupId"], 3);
        assert_eq!(value["Service"]["created_by"], 0);
    }

    #[test]
    fn test_decodes_domain_layer_bodies() {
        let created: ServiceCreated = decode(
            br#"{"Service": {"id": 5, "name": "svc", "SupportGroupId": 3, "created_by": 1}}"#,
        )
        .unwrap();
        assert_eq!(created.service.id, 5);
        assert_eq!(created.service.support_group_id, 3);
        assert_eq!(created.service.metadata.created_by, 1);

        let deleted: ServiceDeleted = decode(br#"{"ServiceID": 5}"#).unwrap();
        assert_eq!(deleted, ServiceDeleted { service_id: 5 });

        let member: UserAddedToSupportGroup =
            decode(br#"{"SupportGroupID": 3, "UserID": 9}"#).unwrap();
        assert_eq!(
            member,
            UserAddedToSupportGroup {
                support_group_id: 3,
                user_id: 9
            }
        );
    }

    #[test]
    fn test_snake_case_ids_are_rejected() {
        let decoded = decode::<SupportGroupDeleted>(br#"{"support_group_id": 3}"#);
        assert!(decoded.is_err());
    }
}
