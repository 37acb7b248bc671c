use async_trait::async_trait;
use auth_zanzibar::types;
use events_bus::EventHandler;
use tracing::debug;

use super::{add_tuples, creator_role, name_of, sweep_entity, AuthzHandle};
use crate::events::{SupportGroupCreated, SupportGroupDeleted, SupportGroupUpdated};

pub struct OnCreateAuthz {
    authz: AuthzHandle,
}

impl OnCreateAuthz {
    pub fn new(authz: AuthzHandle) -> Self {
        Self { authz }
    }
}

#[async_trait]
impl EventHandler<SupportGroupCreated> for OnCreateAuthz {
    async fn handle(&self, event: &SupportGroupCreated) {
        let group = &event.support_group;
        let tuples = [creator_role(group.metadata.created_by, types::SUPPORT_GROUP, group.id)];
        add_tuples(self.authz.as_ref(), name_of::<SupportGroupCreated>(), &tuples).await;
    }
}

/// Support groups have no parent, so an update changes no relation.
pub struct OnUpdateAuthz;

#[async_trait]
impl EventHandler<SupportGroupUpdated> for OnUpdateAuthz {
    async fn handle(&self, event: &SupportGroupUpdated) {
        debug!(
            event = %name_of::<SupportGroupUpdated>(),
            support_group = event.support_group.id,
            "no relations to update"
        );
    }
}

pub struct OnDeleteAuthz {
    authz: AuthzHandle,
}

impl OnDeleteAuthz {
    pub fn new(authz: AuthzHandle) -> Self {
        Self { authz }
    }
}

#[async_trait]
impl EventHandler<SupportGroupDeleted> for OnDeleteAuthz {
    async fn handle(&self, event: &SupportGroupDeleted) {
        sweep_entity(
            self.authz.as_ref(),
            name_of::<SupportGroupDeleted>(),
            types::SUPPORT_GROUP,
            event.support_group_id,
        )
        .await;
    }
}
