use async_trait::async_trait;
use auth_zanzibar::{relations, types, RelationInput};
use events_bus::EventHandler;
use tracing::debug;

use super::{add_tuples, creator_role, is_set, name_of, replace_tuple, sweep_entity, AuthzHandle};
use crate::entity::ComponentVersion;
use crate::events::{ComponentVersionCreated, ComponentVersionDeleted, ComponentVersionUpdated};

/// `component_version:<id> component_version component:<c>`
fn parent_component(version: &ComponentVersion) -> RelationInput {
    RelationInput::new(
        types::COMPONENT_VERSION,
        version.id,
        relations::COMPONENT_VERSION,
        types::COMPONENT,
        version.component_id,
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
impl EventHandler<ComponentVersionCreated> for OnCreateAuthz {
    async fn handle(&self, event: &ComponentVersionCreated) {
        let version = &event.component_version;
        let mut tuples = vec![creator_role(
            version.metadata.created_by,
            types::COMPONENT_VERSION,
            version.id,
        )];
        if is_set(version.component_id) {
            tuples.push(parent_component(version));
        }
        add_tuples(self.authz.as_ref(), name_of::<ComponentVersionCreated>(), &tuples).await;
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
impl EventHandler<ComponentVersionUpdated> for OnUpdateAuthz {
    async fn handle(&self, event: &ComponentVersionUpdated) {
        let version = &event.component_version;
        if !is_set(version.component_id) {
            debug!(
                event = %name_of::<ComponentVersionUpdated>(),
                component_version = version.id,
                "no component set; nothing to update"
            );
            return;
        }

        let stale = RelationInput::filter()
            .with_user(types::COMPONENT_VERSION, version.id)
            .with_relation(relations::COMPONENT_VERSION)
            .with_object_type(types::COMPONENT);
        replace_tuple(
            self.authz.as_ref(),
            name_of::<ComponentVersionUpdated>(),
            stale,
            parent_component(version),
        )
        .await;
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
impl EventHandler<ComponentVersionDeleted> for OnDeleteAuthz {
    async fn handle(&self, event: &ComponentVersionDeleted) {
        sweep_entity(
            self.authz.as_ref(),
            name_of::<ComponentVersionDeleted>(),
            types::COMPONENT_VERSION,
            event.component_version_id,
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Metadata;
    use crate::handlers::test_support::store;
    use auth_zanzibar::Authorization;

    fn version(id: i64, component_id: i64) -> ComponentVersion {
        ComponentVersion {
            id,
            version: "1.0.0".into(),
            component_id,
            metadata: Metadata::created_by(2),
        }
    }

    #[tokio::test]
    async fn test_update_moves_version_to_new_component() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz.clone())
            .handle(&ComponentVersionCreated {
                component_version: version(7, 1),
            })
            .await;
        OnUpdateAuthz::new(authz)
            .handle(&ComponentVersionUpdated {
                component_version: version(7, 2),
            })
            .await;

        assert_eq!(
            store.snapshot(),
            vec![
                RelationInput::new(
                    types::COMPONENT_VERSION,
                    7,
                    relations::COMPONENT_VERSION,
                    types::COMPONENT,
                    2,
                ),
                RelationInput::new(types::ROLE, 2, relations::ROLE, types::COMPONENT_VERSION, 7),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_sweeps_both_directions() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz.clone())
            .handle(&ComponentVersionCreated {
                component_version: version(7, 1),
            })
            .await;
        OnCreateAuthz::new(authz.clone())
            .handle(&ComponentVersionCreated {
                component_version: version(8, 1),
            })
            .await;
        let instance =
            RelationInput::new(
                types::COMPONENT_INSTANCE,
                10,
                relations::ROLE,
                types::COMPONENT_VERSION,
                7,
            );
        store.add_relation(&instance).await.unwrap();

        OnDeleteAuthz::new(authz)
            .handle(&ComponentVersionDeleted {
                component_version_id: 7,
            })
            .await;

        assert_eq!(
            store.snapshot(),
            vec![
                RelationInput::new(
                    types::COMPONENT_VERSION,
                    8,
                    relations::COMPONENT_VERSION,
                    types::COMPONENT,
                    1,
                ),
                RelationInput::new(types::ROLE, 2, relations::ROLE, types::COMPONENT_VERSION, 8),
            ]
        );
    }
}
