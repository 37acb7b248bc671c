use async_trait::async_trait;
use auth_zanzibar::types;
use events_bus::EventHandler;
use tracing::debug;

use super::{add_tuples, creator_role, name_of, sweep_entity, AuthzHandle};
use crate::events::{ComponentCreated, ComponentDeleted, ComponentUpdated};

pub struct OnCreateAuthz {
    authz: AuthzHandle,
}

impl OnCreateAuthz {
    pub fn new(authz: AuthzHandle) -> Self {
        Self { authz }
    }
}

#[async_trait]
impl EventHandler<ComponentCreated> for OnCreateAuthz {
    async fn handle(&self, event: &ComponentCreated) {
        let component = &event.component;
        let tuples = [creator_role(component.metadata.created_by, types::COMPONENT, component.id)];
        add_tuples(self.authz.as_ref(), name_of::<ComponentCreated>(), &tuples).await;
    }
}

/// Components have no parent; nothing to move.
pub struct OnUpdateAuthz;

#[async_trait]
impl EventHandler<ComponentUpdated> for OnUpdateAuthz {
    async fn handle(&self, event: &ComponentUpdated) {
        debug!(
            event = %name_of::<ComponentUpdated>(),
            component = event.component.id,
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
impl EventHandler<ComponentDeleted> for OnDeleteAuthz {
    async fn handle(&self, event: &ComponentDeleted) {
        sweep_entity(
            self.authz.as_ref(),
            name_of::<ComponentDeleted>(),
            types::COMPONENT,
            event.component_id,
        )
        .await;
    }
}
