//! A component instance hangs off two parents: the service it runs in and
//! the component version it deploys. Both links are replaced on update.

use async_trait::async_trait;
use auth_zanzibar::{relations, types, RelationInput};
use events_bus::EventHandler;
use tracing::debug;

use super::{add_tuples, creator_role, is_set, name_of, replace_tuple, sweep_entity, AuthzHandle};
use crate::entity::ComponentInstance;
use crate::events::{ComponentInstanceCreated, ComponentInstanceDeleted, ComponentInstanceUpdated};

/// `service:<s> related_service component_instance:<id>`
fn related_service(instance: &ComponentInstance) -> RelationInput {
    RelationInput::new(
        types::SERVICE,
        instance.service_id,
        relations::RELATED_SERVICE,
        types::COMPONENT_INSTANCE,
        instance.id,
    )
}

/// `component_instance:<id> role component_version:<v>`
fn deployed_version(instance: &ComponentInstance) -> RelationInput {
    RelationInput::new(
        types::COMPONENT_INSTANCE,
        instance.id,
        relations::ROLE,
        types::COMPONENT_VERSION,
        instance.component_version_id,
    )
}

pub struct OnCreateAuthz {
    authz: AuthzHandle,
}

impl OnCreateAuthz {
    pub fn new(authz: AuthzHandle) -> Self {
        Self { authz }
    }
}

#[async_trait]
impl EventHandler<ComponentInstanceCreated> for OnCreateAuthz {
    async fn handle(&self, event: &ComponentInstanceCreated) {
        let instance = &event.component_instance;
        let mut tuples = vec![creator_role(
            instance.metadata.created_by,
            types::COMPONENT_INSTANCE,
            instance.id,
        )];
        if is_set(instance.service_id) {
            tuples.push(related_service(instance));
        }
        if is_set(instance.component_version_id) {
            tuples.push(deployed_version(instance));
        }
        add_tuples(self.authz.as_ref(), name_of::<ComponentInstanceCreated>(), &tuples).await;
    }
}

pub struct OnUpdateAuthz {
    authz: AuthzHandle,
}

impl OnUpdateAuthz {
    pub fn new(authz: AuthzHandle) -> Self {
        Self { authz }
    }
}

#[async_trait]
impl EventHandler<ComponentInstanceUpdated> for OnUpdateAuthz {
    async fn handle(&self, event: &ComponentInstanceUpdated) {
        let instance = &event.component_instance;
        let name = name_of::<ComponentInstanceUpdated>();

        if is_set(instance.service_id) {
            let stale = RelationInput::filter()
                .with_user_type(types::SERVICE)
                .with_relation(relations::RELATED_SERVICE)
                .with_object(types::COMPONENT_INSTANCE, instance.id);
            replace_tuple(self.authz.as_ref(), name, stale, related_service(instance)).await;
        } else {
            debug!(
                event = %name,
                component_instance = instance.id,
                "no service set; keeping service relation"
            );
        }

        if is_set(instance.component_version_id) {
            let stale = RelationInput::filter()
                .with_user(types::COMPONENT_INSTANCE, instance.id)
                .with_relation(relations::ROLE)
                .with_object_type(types::COMPONENT_VERSION);
            replace_tuple(self.authz.as_ref(), name, stale, deployed_version(instance)).await;
        } else {
            debug!(
                event = %name,
                component_instance = instance.id,
                "no version set; keeping version relation"
            );
        }
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
impl EventHandler<ComponentInstanceDeleted> for OnDeleteAuthz {
    async fn handle(&self, event: &ComponentInstanceDeleted) {
        sweep_entity(
            self.authz.as_ref(),
            name_of::<ComponentInstanceDeleted>(),
            types::COMPONENT_INSTANCE,
            event.component_instance_id,
        )
        .await;
    }
}
