use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    config::AuthzConfig,
    error::Result,
    models::{AccessibleResource, RelationInput},
    noop::NoAuthz,
    openfga::OpenFgaAuthz,
};

/// A relationship-based authorization store.
///
/// Implementations are shared process-wide behind an `Arc` and must tolerate
/// concurrent use.
#[async_trait]
pub trait Authorization: Send + Sync {
    /// Whether the subject holds `relation` on the object, directly or through
    /// the model. An error means the backend could not answer; denial is `Ok(false)`.
    async fn check_permission(&self, r: &RelationInput) -> Result<bool>;

    /// Write one tuple. Writing an existing tuple is a no-op.
    async fn add_relation(&self, r: &RelationInput) -> Result<()>;

    /// Write several tuples in as few backend calls as allowed.
    async fn add_relation_bulk(&self, relations: &[RelationInput]) -> Result<()>;

    /// Delete one tuple, or every tuple matching `r` when it has empty fields.
    /// Deleting a missing tuple is a no-op.
    async fn remove_relation(&self, r: &RelationInput) -> Result<()>;

    /// Delete every tuple matching any of `filters`.
    async fn remove_relation_bulk(&self, filters: &[RelationInput]) -> Result<()>;

    /// Delete every tuple in the store.
    async fn remove_all_relations(&self) -> Result<()>;

    /// Every tuple matching `filter`.
    async fn list_relations(&self, filter: &RelationInput) -> Result<Vec<RelationInput>>;

    /// Objects of `r.object_type` on which `r.user_type:r.user_id` holds `r.relation`.
    async fn list_accessible_resources(&self, r: &RelationInput) -> Result<Vec<AccessibleResource>>;

    /// Remove every tuple matching `remove`, then write `add`.
    ///
    /// Two separate calls: a failure in between leaves the old tuples gone and
    /// the new one missing.
    async fn update_relation(&self, remove: &RelationInput, add: &RelationInput) -> Result<()> {
        if let Err(e) = self.remove_relation_bulk(std::slice::from_ref(remove)).await {
            error!(
                event = "HandleUpdateAuthzRelation",
                step = "remove",
                filter = %remove,
                error = %e,
                "failed to remove stale relations"
            );
            return Err(e);
        }

        if let Err(e) = self.add_relation(add).await {
            error!(
                event = "HandleUpdateAuthzRelation",
                step = "add",
                tuple = %add,
                error = %e,
                "failed to add updated relation"
            );
            return Err(e);
        }

        info!(
            event = "HandleUpdateAuthzRelation",
            filter = %remove,
            tuple = %add,
            "updated relation"
        );
        Ok(())
    }
}

/// Build the store selected by `config`: the OpenFGA client when enabled and
/// an endpoint is configured, the permissive no-op store otherwise.
///
/// # Errors
///
/// Fails when the live client cannot reach the backend or prepare its store
/// and model.
pub async fn new_authorization_handler(config: &AuthzConfig) -> Result<Arc<dyn Authorization>> {
    if config.enabled && !config.api_url.is_empty() {
        let authz = OpenFgaAuthz::connect(config).await?;
        info!(api_url = %config.api_url, "initialized authorization with OpenFGA");
        return Ok(Arc::new(authz));
    }

    info!("authorization enforcement disabled; using no-op store");
    Ok(Arc::new(NoAuthz::new()))
}
