use async_trait::async_trait;
use auth_zanzibar::{relations, types, RelationInput};
use events_bus::EventHandler;
use tracing::debug;

use super::{add_tuples, creator_role, is_set, name_of, replace_tuple, sweep_entity, AuthzHandle};
use crate::entity::Service;
use crate::events::{ServiceCreated, ServiceDeleted, ServiceUpdated};

/// `support_group:<sg> owning_support_group service:<id>`
///
/// Kept apart from the `support_group` links that membership events manage,
/// so moving the owner never drops those.
fn owning_group(service: &Service) -> RelationInput {
    RelationInput::new(
        types::SUPPORT_GROUP,
        service.support_group_id,
        relations::OWNING_SUPPORT_GROUP,
        types::SERVICE,
        service.id,
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
impl EventHandler<ServiceCreated> for OnCreateAuthz {
    async fn handle(&self, event: &ServiceCreated) {
        let service = &event.service;
        let mut tuples =
            vec![creator_role(service.metadata.created_by, types::SERVICE, service.id)];
        if is_set(service.support_group_id) {
            tuples.push(owning_group(service));
        }
        add_tuples(self.authz.as_ref(), name_of::<ServiceCreated>(), &tuples).await;
    }
}

/// Moves the service to its new owning support group.
pub struct OnUpdateAuthz {
    authz: AuthzHandle,
}

impl OnUpdateAuthz {
    pub fn new(authz: AuthzHandle) -> Self {
        Self { authz }
    }
}

#[async_trait]
impl EventHandler<ServiceUpdated> for OnUpdateAuthz {
    async fn handle(&self, event: &ServiceUpdated) {
        let service = &event.service;
        if !is_set(service.support_group_id) {
            debug!(
                event = %name_of::<ServiceUpdated>(),
                service = service.id,
                "no support group set; nothing to update"
            );
            return;
        }

        let stale = RelationInput::filter()
            .with_user_type(types::SUPPORT_GROUP)
            .with_relation(relations::OWNING_SUPPORT_GROUP)
            .with_object(types::SERVICE, service.id);
        replace_tuple(
            self.authz.as_ref(),
            name_of::<ServiceUpdated>(),
            stale,
            owning_group(service),
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
impl EventHandler<ServiceDeleted> for OnDeleteAuthz {
    async fn handle(&self, event: &ServiceDeleted) {
        sweep_entity(
            self.authz.as_ref(),
            name_of::<ServiceDeleted>(),
            types::SERVICE,
            event.service_id,
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Metadata;
    use crate::events::{OwnerAddedToService, ServiceAddedToSupportGroup};
    use crate::handlers::membership::MembershipAuthz;
    use crate::handlers::test_support::store;
    use auth_zanzibar::Authorization;

    fn service(id: i64, support_group_id: i64) -> Service {
        Service {
            id,
            ccrn: format!("svc-{id}"),
            support_group_id,
            metadata: Metadata::created_by(1),
        }
    }

    #[tokio::test]
    async fn test_create_links_creator_and_group() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz)
            .handle(&ServiceCreated {
                service: service(5, 3),
            })
            .await;

        assert_eq!(
            store.snapshot(),
            vec![
                RelationInput::new(types::ROLE, 1, relations::ROLE, types::SERVICE, 5),
                RelationInput::new(
                    types::SUPPORT_GROUP,
                    3,
                    relations::OWNING_SUPPORT_GROUP,
                    types::SERVICE,
                    5,
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_without_group_only_links_creator() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz)
            .handle(&ServiceCreated {
                service: service(5, 0),
            })
            .await;
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_moves_service_between_groups() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz.clone())
            .handle(&ServiceCreated {
                service: service(5, 3),
            })
            .await;
        OnUpdateAuthz::new(authz)
            .handle(&ServiceUpdated {
                service: service(5, 4),
            })
            .await;

        assert_eq!(
            store.snapshot(),
            vec![
                RelationInput::new(types::ROLE, 1, relations::ROLE, types::SERVICE, 5),
                RelationInput::new(
                    types::SUPPORT_GROUP,
                    4,
                    relations::OWNING_SUPPORT_GROUP,
                    types::SERVICE,
                    5,
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_without_group_changes_nothing() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz.clone())
            .handle(&ServiceCreated {
                service: service(5, 3),
            })
            .await;
        let before = store.snapshot();
        OnUpdateAuthz::new(authz)
            .handle(&ServiceUpdated {
                service: service(5, 0),
            })
            .await;
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_update_keeps_membership_links() {
        let (store, authz) = store();
        let membership = MembershipAuthz::new(authz.clone());
        OnCreateAuthz::new(authz.clone())
            .handle(&ServiceCreated {
                service: service(5, 3),
            })
            .await;
        membership
            .handle(&ServiceAddedToSupportGroup {
                support_group_id: 3,
                service_id: 5,
            })
            .await;
        membership
            .handle(&ServiceAddedToSupportGroup {
                support_group_id: 8,
                service_id: 5,
            })
            .await;

        OnUpdateAuthz::new(authz)
            .handle(&ServiceUpdated {
                service: service(5, 4),
            })
            .await;

        let groups = store
            .list_relations(
                &RelationInput::filter()
                    .with_user_type(types::SUPPORT_GROUP)
                    .with_object(types::SERVICE, 5),
            )
            .await
            .unwrap();
        assert_eq!(
            groups,
            vec![
                RelationInput::new(
                    types::SUPPORT_GROUP,
                    3,
                    relations::SUPPORT_GROUP,
                    types::SERVICE,
                    5,
                ),
                RelationInput::new(
                    types::SUPPORT_GROUP,
                    4,
                    relations::OWNING_SUPPORT_GROUP,
                    types::SERVICE,
                    5,
                ),
                RelationInput::new(
                    types::SUPPORT_GROUP,
                    8,
                    relations::SUPPORT_GROUP,
                    types::SERVICE,
                    5,
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_sweeps_groups_owners_and_instances() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz.clone())
            .handle(&ServiceCreated {
                service: service(5, 3),
            })
            .await;
        let membership = MembershipAuthz::new(authz.clone());
        membership
            .handle(&ServiceAddedToSupportGroup {
                support_group_id: 8,
                service_id: 5,
            })
            .await;
        membership
            .handle(&OwnerAddedToService {
                service_id: 5,
                owner_id: 9,
            })
            .await;
        let instance =
            RelationInput::new(
                types::SERVICE,
                5,
                relations::RELATED_SERVICE,
                types::COMPONENT_INSTANCE,
                10,
            );
        store.add_relation(&instance).await.unwrap();
        assert_eq!(store.len(), 5);

        OnDeleteAuthz::new(authz).handle(&ServiceDeleted { service_id: 5 }).await;
        assert!(store.is_empty());
    }
}
