use events_bus::{EventRegistry, Result};
use tracing::info;

use crate::events::*;
use crate::handlers::{
    component, component_instance as instance, component_version as version, issue_match,
    membership::MembershipAuthz, service, support_group, user, AuthzHandle,
};

/// Register every synchronizer handler on `bus`, each exactly once.
///
/// # Errors
///
/// Fails when the bus refuses a registration, e.g. because it is already
/// running or a broker subscription cannot be opened.
pub async fn register_authz_handlers<B>(bus: &mut B, authz: AuthzHandle) -> Result<()>
where
    B: EventRegistry<DomainEvent>,
{
    bus.register_handler::<SupportGroupCreated, _>(support_group::OnCreateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<SupportGroupUpdated, _>(support_group::OnUpdateAuthz)
        .await?;
    bus.register_handler::<SupportGroupDeleted, _>(support_group::OnDeleteAuthz::new(authz.clone()))
        .await?;

    bus.register_handler::<ServiceCreated, _>(service::OnCreateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<ServiceUpdated, _>(service::OnUpdateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<ServiceDeleted, _>(service::OnDeleteAuthz::new(authz.clone()))
        .await?;

    bus.register_handler::<ComponentCreated, _>(component::OnCreateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<ComponentUpdated, _>(component::OnUpdateAuthz)
        .await?;
    bus.register_handler::<ComponentDeleted, _>(component::OnDeleteAuthz::new(authz.clone()))
        .await?;

    bus.register_handler::<ComponentVersionCreated, _>(version::OnCreateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<ComponentVersionUpdated, _>(version::OnUpdateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<ComponentVersionDeleted, _>(version::OnDeleteAuthz::new(authz.clone()))
        .await?;

    bus.register_handler::<ComponentInstanceCreated, _>(instance::OnCreateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<ComponentInstanceUpdated, _>(instance::OnUpdateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<ComponentInstanceDeleted, _>(instance::OnDeleteAuthz::new(authz.clone()))
        .await?;

    bus.register_handler::<IssueMatchCreated, _>(issue_match::OnCreateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<IssueMatchUpdated, _>(issue_match::OnUpdateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<IssueMatchDeleted, _>(issue_match::OnDeleteAuthz::new(authz.clone()))
        .await?;

    bus.register_handler::<UserCreated, _>(user::OnCreateAuthz::new(authz.clone()))
        .await?;
    bus.register_handler::<UserUpdated, _>(user::OnUpdateAuthz)
        .await?;
    bus.register_handler::<UserDeleted, _>(user::OnDeleteAuthz::new(authz.clone()))
        .await?;

    let membership = MembershipAuthz::new(authz);
    bus.register_handler::<UserAddedToSupportGroup, _>(membership.clone())
        .await?;
    bus.register_handler::<UserRemovedFromSupportGroup, _>(membership.clone())
        .await?;
    bus.register_handler::<ServiceAddedToSupportGroup, _>(membership.clone())
        .await?;
    bus.register_handler::<ServiceRemovedFromSupportGroup, _>(membership.clone())
        .await?;
    bus.register_handler::<OwnerAddedToService, _>(membership.clone())
        .await?;
    bus.register_handler::<OwnerRemovedFromService, _>(membership)
        .await?;

    info!(handlers = 27, "registered authorization handlers");
    Ok(())
}
