use async_trait::async_trait;

use crate::{
    authorization::Authorization,
    error::Result,
    models::{AccessibleResource, RelationInput},
};

/// Store used when authorization enforcement is disabled.
///
/// Every check is allowed and every mutation succeeds without effect, so the
/// synchronizer can stay wired regardless of deployment mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuthz;

impl NoAuthz {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authorization for NoAuthz {
    async fn check_permission(&self, _r: &RelationInput) -> Result<bool> {
        Ok(true)
    }

    async fn add_relation(&self, _r: &RelationInput) -> Result<()> {
        Ok(())
    }

    async fn add_relation_bulk(&self, _relations: &[RelationInput]) -> Result<()> {
        Ok(())
    }

    async fn remove_relation(&self, _r: &RelationInput) -> Result<()> {
        Ok(())
    }

    async fn remove_relation_bulk(&self, _filters: &[RelationInput]) -> Result<()> {
        Ok(())
    }

    async fn remove_all_relations(&self) -> Result<()> {
        Ok(())
    }

    async fn list_relations(&self, _filter: &RelationInput) -> Result<Vec<RelationInput>> {
        Ok(Vec::new())
    }

    async fn list_accessible_resources(
        &self,
        _r: &RelationInput,
    ) -> Result<Vec<AccessibleResource>> {
        Ok(Vec::new())
    }

    async fn update_relation(&self, _remove: &RelationInput, _add: &RelationInput) -> Result<()> {
        Ok(())
    }
}
