//! Synchronizer handlers.
//!
//! One module per entity kind, each with `OnCreateAuthz`, `OnUpdateAuthz` and
//! `OnDeleteAuthz`, plus the membership handlers. Every handler owns its error
//! reporting: a failed store call is logged and the event is considered
//! handled, since the domain write it mirrors has already committed.

use std::sync::Arc;

use auth_zanzibar::{relations, types, Authorization, RelationInput};
use events_bus::{EventName, EventVariant};
use tracing::{debug, error, info};

use crate::events::DomainEvent;

pub mod component;
pub mod component_instance;
pub mod component_version;
pub mod issue_match;
pub mod membership;
pub mod service;
pub mod support_group;
pub mod user;

/// Shared authorization handle injected into every handler.
pub type AuthzHandle = Arc<dyn Authorization>;

/// Name of the event `V` as used in log fields.
pub(crate) fn name_of<V: EventVariant<DomainEvent>>() -> EventName {
    V::NAME
}

/// Whether a foreign key points at an entity.
pub(crate) fn is_set(id: i64) -> bool {
    id > 0
}

/// Ownership tuple `role:<created_by> role <object_type>:<id>`.
pub(crate) fn creator_role(created_by: i64, object_type: &str, id: i64) -> RelationInput {
    RelationInput::new(types::ROLE, created_by, relations::ROLE, object_type, id)
}

/// Write `tuples` in one bulk call.
pub(crate) async fn add_tuples(
    authz: &dyn Authorization,
    event: EventName,
    tuples: &[RelationInput],
) {
    if tuples.is_empty() {
        debug!(event = %event, "no relations to add");
        return;
    }

    match authz.add_relation_bulk(tuples).await {
        Ok(()) => {
            for tuple in tuples {
                info!(
                    event = %event,
                    user = %tuple.user(),
                    relation = %tuple.relation,
                    object = %tuple.object(),
                    "added relation"
                );
            }
        }
        Err(e) => {
            for tuple in tuples {
                error!(
                    event = %event,
                    user = %tuple.user(),
                    relation = %tuple.relation,
                    object = %tuple.object(),
                    error = %e,
                    "failed to add relation"
                );
            }
        }
    }
}

/// Remove the single tuple `tuple`.
pub(crate) async fn remove_tuple(
    authz: &dyn Authorization,
    event: EventName,
    tuple: &RelationInput,
) {
    match authz.remove_relation(tuple).await {
        Ok(()) => info!(
            event = %event,
            user = %tuple.user(),
            relation = %tuple.relation,
            object = %tuple.object(),
            "removed relation"
        ),
        Err(e) => error!(
            event = %event,
            user = %tuple.user(),
            relation = %tuple.relation,
            object = %tuple.object(),
            error = %e,
            "failed to remove relation"
        ),
    }
}

/// Replace every tuple matching `remove` with `add`.
pub(crate) async fn replace_tuple(
    authz: &dyn Authorization,
    event: EventName,
    remove: RelationInput,
    add: RelationInput,
) {
    match authz.update_relation(&remove, &add).await {
        Ok(()) => info!(
            event = %event,
            user = %add.user(),
            relation = %add.relation,
            object = %add.object(),
            "updated relation"
        ),
        Err(e) => error!(
            event = %event,
            user = %add.user(),
            relation = %add.relation,
            object = %add.object(),
            filter = %remove,
            error = %e,
            "failed to update relation"
        ),
    }
}

/// Remove every tuple naming `object_type:id` as object or as subject.
pub(crate) async fn sweep_entity(
    authz: &dyn Authorization,
    event: EventName,
    object_type: &str,
    id: i64,
) {
    if !is_set(id) {
        debug!(event = %event, object_type, "delete event without an id; nothing to remove");
        return;
    }

    let filters = [
        RelationInput::filter().with_object(object_type, id),
        RelationInput::filter().with_user(object_type, id),
    ];
    let entity = format!("{object_type}:{id}");
    match authz.remove_relation_bulk(&filters).await {
        Ok(()) => info!(event = %event, object = %entity, "removed all relations"),
        Err(e) => error!(
            event = %event,
            user = %entity,
            object = %entity,
            error = %e,
            "failed to remove relations"
        ),
    }
}
