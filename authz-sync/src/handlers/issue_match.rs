use async_trait::async_trait;
use auth_zanzibar::{relations, types, RelationInput};
use events_bus::EventHandler;
use tracing::debug;

use super::{add_tuples, creator_role, is_set, name_of, replace_tuple, sweep_entity, AuthzHandle};
use crate::entity::IssueMatch;
use crate::events::{IssueMatchCreated, IssueMatchDeleted, IssueMatchUpdated};

/// `component_instance:<ci> component_instance issue_match:<id>`
fn matched_instance(issue_match: &IssueMatch) -> RelationInput {
    RelationInput::new(
        types::COMPONENT_INSTANCE,
        issue_match.component_instance_id,
        relations::COMPONENT_INSTANCE,
        types::ISSUE_MATCH,
        issue_match.id,
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
impl EventHandler<IssueMatchCreated> for OnCreateAuthz {
    async fn handle(&self, event: &IssueMatchCreated) {
        let issue_match = &event.issue_match;
        let mut tuples = vec![creator_role(
            issue_match.metadata.created_by,
            types::ISSUE_MATCH,
            issue_match.id,
        )];
        if is_set(issue_match.component_instance_id) {
            tuples.push(matched_instance(issue_match));
        }
        add_tuples(self.authz.as_ref(), name_of::<IssueMatchCreated>(), &tuples).await;
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
impl EventHandler<IssueMatchUpdated> for OnUpdateAuthz {
    async fn handle(&self, event: &IssueMatchUpdated) {
        let issue_match = &event.issue_match;
        if !is_set(issue_match.component_instance_id) {
            debug!(
                event = %name_of::<IssueMatchUpdated>(),
                issue_match = issue_match.id,
                "no component instance set; nothing to update"
            );
            return;
        }

        let stale = RelationInput::filter()
            .with_user_type(types::COMPONENT_INSTANCE)
            .with_relation(relations::COMPONENT_INSTANCE)
            .with_object(types::ISSUE_MATCH, issue_match.id);
        replace_tuple(
            self.authz.as_ref(),
            name_of::<IssueMatchUpdated>(),
            stale,
            matched_instance(issue_match),
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
impl EventHandler<IssueMatchDeleted> for OnDeleteAuthz {
    async fn handle(&self, event: &IssueMatchDeleted) {
        sweep_entity(
            self.authz.as_ref(),
            name_of::<IssueMatchDeleted>(),
            types::ISSUE_MATCH,
            event.issue_match_id,
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Metadata;
    use crate::handlers::test_support::store;

    fn issue_match(id: i64, component_instance_id: i64) -> IssueMatch {
        IssueMatch {
            id,
            status: "new".into(),
            issue_id: 1,
            component_instance_id,
            user_id: 4,
            metadata: Metadata::created_by(4),
        }
    }

    fn instance_link(component_instance_id: i64, id: i64) -> RelationInput {
        RelationInput::new(
            types::COMPONENT_INSTANCE,
            component_instance_id,
            relations::COMPONENT_INSTANCE,
            types::ISSUE_MATCH,
            id,
        )
    }

    #[tokio::test]
    async fn test_update_moves_match_to_new_instance() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz.clone())
            .handle(&IssueMatchCreated {
                issue_match: issue_match(20, 10),
            })
            .await;
        OnUpdateAuthz::new(authz)
            .handle(&IssueMatchUpdated {
                issue_match: issue_match(20, 11),
            })
            .await;

        assert_eq!(
            store.snapshot(),
            vec![
                instance_link(11, 20),
                RelationInput::new(types::ROLE, 4, relations::ROLE, types::ISSUE_MATCH, 20),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_without_instance_changes_nothing() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz.clone())
            .handle(&IssueMatchCreated {
                issue_match: issue_match(20, 10),
            })
            .await;
        let before = store.snapshot();
        OnUpdateAuthz::new(authz)
            .handle(&IssueMatchUpdated {
                issue_match: issue_match(20, 0),
            })
            .await;
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_delete_sweeps_the_match() {
        let (store, authz) = store();
        OnCreateAuthz::new(authz.clone())
            .handle(&IssueMatchCreated {
                issue_match: issue_match(20, 10),
            })
            .await;
        OnCreateAuthz::new(authz.clone())
            .handle(&IssueMatchCreated {
                issue_match: issue_match(21, 10),
            })
            .await;

        OnDeleteAuthz::new(authz).handle(&IssueMatchDeleted { issue_match_id: 20 }).await;

        assert_eq!(
            store.snapshot(),
            vec![
                instance_link(10, 21),
                RelationInput::new(types::ROLE, 4, relations::ROLE, types::ISSUE_MATCH, 21),
            ]
        );
    }
}
