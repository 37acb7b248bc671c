use async_trait::async_trait;
use auth_zanzibar::types;
use events_bus::EventHandler;
use tracing::debug;

use super::{add_tuples, creator_role, name_of, sweep_entity, AuthzHandle};
use crate::events::{UserCreated, UserDeleted, UserUpdated};

pub struct OnCreateAuthz {
    authz: AuthzHandle,
}

impl OnCreateAuthz {
    pub fn new(authz: AuthzHandle) -> Self {
        Self { authz }
    }
}

#[async_trait]
impl EventHandler<UserCreated> for OnCreateAuthz {
    async fn handle(&self, event: &UserCreated) {
        let user = &event.user;
        let tuples = [creator_role(user.metadata.created_by, types::USER, user.id)];
        add_tuples(self.authz.as_ref(), name_of::<UserCreated>(), &tuples).await;
    }
}

pub struct OnUpdateAuthz;

#[async_trait]
impl EventHandler<UserUpdated> for OnUpdateAuthz {
    async fn handle(&self, event: &UserUpdated) {
        debug!(
            event = %name_of::<UserUpdated>(),
            user_id = event.user.id,
            "no relations to update"
        );
    }
}

/// Removes the user's memberships and ownerships along with its own tuples.
pub struct OnDeleteAuthz {
    authz: AuthzHandle,
}

impl OnDeleteAuthz {
    pub fn new(authz: AuthzHandle) -> Self {
        Self { authz }
    }
}

#[async_trait]
impl EventHandler<UserDeleted> for OnDeleteAuthz {
    async fn handle(&self, event: &UserDeleted) {
        sweep_entity(
            self.authz.as_ref(),
            name_of::<UserDeleted>(),
            types::USER,
            event.user_id,
        )
        .await;
    }
}
