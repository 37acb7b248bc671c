//! Handlers for the many-to-many links between users, support groups and
//! services. Each event adds or removes exactly one tuple.

use async_trait::async_trait;
use auth_zanzibar::{relations, types, RelationInput};
use events_bus::EventHandler;

use super::{add_tuples, name_of, remove_tuple, AuthzHandle};
use crate::events::{
    OwnerAddedToService, OwnerRemovedFromService, ServiceAddedToSupportGroup,
    ServiceRemovedFromSupportGroup, UserAddedToSupportGroup, UserRemovedFromSupportGroup,
};

fn group_member(user_id: i64, support_group_id: i64) -> RelationInput {
    RelationInput::new(
        types::USER,
        user_id,
        relations::MEMBER,
        types::SUPPORT_GROUP,
        support_group_id,
    )
}

fn group_service(support_group_id: i64, service_id: i64) -> RelationInput {
    RelationInput::new(
        types::SUPPORT_GROUP,
        support_group_id,
        relations::SUPPORT_GROUP,
        types::SERVICE,
        service_id,
    )
}

fn service_owner(owner_id: i64, service_id: i64) -> RelationInput {
    RelationInput::new(types::USER, owner_id, relations::OWNER, types::SERVICE, service_id)
}

/// Handles every membership event against one store handle.
#[derive(Clone)]
pub struct MembershipAuthz {
    authz: AuthzHandle,
}

impl MembershipAuthz {
    pub fn new(authz: AuthzHandle) -> Self {
        Self { authz }
    }
}

#[async_trait]
impl EventHandler<UserAddedToSupportGroup> for MembershipAuthz {
    async fn handle(&self, event: &UserAddedToSupportGroup) {
        let tuple = group_member(event.user_id, event.support_group_id);
        add_tuples(self.authz.as_ref(), name_of::<UserAddedToSupportGroup>(), &[tuple]).await;
    }
}

#[async_trait]
impl EventHandler<UserRemovedFromSupportGroup> for MembershipAuthz {
    async fn handle(&self, event: &UserRemovedFromSupportGroup) {
        let tuple = group_member(event.user_id, event.support_group_id);
        remove_tuple(self.authz.as_ref(), name_of::<UserRemovedFromSupportGroup>(), &tuple).await;
    }
}

#[async_trait]
impl EventHandler<ServiceAddedToSupportGroup> for MembershipAuthz {
    async fn handle(&self, event: &ServiceAddedToSupportGroup) {
        let tuple = group_service(event.support_group_id, event.service_id);
        add_tuples(self.authz.as_ref(), name_of::<ServiceAddedToSupportGroup>(), &[tuple]).await;
    }
}

#[async_trait]
impl EventHandler<ServiceRemovedFromSupportGroup> for MembershipAuthz {
    async fn handle(&self, event: &ServiceRemovedFromSupportGroup) {
        let tuple = group_service(event.support_group_id, event.service_id);
        remove_tuple(
            self.authz.as_ref(),
            name_of::<ServiceRemovedFromSupportGroup>(),
            &tuple,
        )
        .await;
    }
}

#[async_trait]
impl EventHandler<OwnerAddedToService> for MembershipAuthz {
    async fn handle(&self, event: &OwnerAddedToService) {
        let tuple = service_owner(event.owner_id, event.service_id);
        add_tuples(self.authz.as_ref(), name_of::<OwnerAddedToService>(), &[tuple]).await;
    }
}

#[async_trait]
impl EventHandler<OwnerRemovedFromService> for MembershipAuthz {
    async fn handle(&self, event: &OwnerRemovedFromService) {
        let tuple = service_owner(event.owner_id, event.service_id);
        remove_tuple(self.authz.as_ref(), name_of::<OwnerRemovedFromService>(), &tuple).await;
    }
}
