use async_trait::async_trait;
use dashmap::DashSet;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::{
    authorization::Authorization,
    error::{AuthzError, Result},
    models::{AccessibleResource, ObjectRef, RelationInput},
};

const MAX_CHECK_DEPTH: u32 = 10;

/// In-memory tuple store for tests and local development.
///
/// Checks resolve direct tuples and userset subjects (`support_group:3#member`).
/// Model rewrites such as computed or tuple-to-userset relations are not
/// evaluated.
#[derive(Clone, Default)]
pub struct InMemoryAuthz {
    tuples: Arc<DashSet<RelationInput>>,
}

impl InMemoryAuthz {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Every stored tuple, sorted.
    pub fn snapshot(&self) -> Vec<RelationInput> {
        let sorted: BTreeSet<RelationInput> = self.tuples.iter().map(|t| t.key().clone()).collect();
        sorted.into_iter().collect()
    }

    fn matching(&self, filter: &RelationInput) -> Vec<RelationInput> {
        self.tuples
            .iter()
            .filter(|t| filter.matches(t.key()))
            .map(|t| t.key().clone())
            .collect()
    }

    fn check_recursive(
        &self,
        subject: &ObjectRef,
        relation: &str,
        object: &ObjectRef,
        visited: &mut HashSet<String>,
        depth: u32,
    ) -> bool {
        if depth > MAX_CHECK_DEPTH {
            return false;
        }
        if !visited.insert(format!("{subject} {relation} {object}")) {
            return false;
        }

        let direct = RelationInput::new(
            &subject.kind,
            subject_id(subject),
            relation,
            &object.kind,
            &object.id,
        );
        if self.tuples.contains(&direct) {
            debug!(tuple = %direct, "direct relation found");
            return true;
        }

        let usersets: Vec<ObjectRef> = self
            .tuples
            .iter()
            .filter(|t| {
                t.relation == relation && t.object_type == object.kind && t.object_id == object.id
            })
            .map(|t| t.user())
            .filter(|user| user.relation.is_some())
            .collect();

        usersets.into_iter().any(|userset| {
            let userset_relation = userset.relation.clone().unwrap_or_default();
            let userset_object = ObjectRef {
                relation: None,
                ..userset
            };
            self.check_recursive(subject, &userset_relation, &userset_object, visited, depth + 1)
        })
    }
}

fn subject_id(subject: &ObjectRef) -> String {
    match &subject.relation {
        Some(relation) => format!("{}#{}", subject.id, relation),
        None => subject.id.clone(),
    }
}

fn require_complete(r: &RelationInput) -> Result<()> {
    if r.is_complete() {
        Ok(())
    } else {
        Err(AuthzError::IncompleteTuple(r.to_string()))
    }
}

#[async_trait]
impl Authorization for InMemoryAuthz {
    async fn check_permission(&self, r: &RelationInput) -> Result<bool> {
        require_complete(r)?;
        let mut visited = HashSet::new();
        Ok(self.check_recursive(&r.user(), &r.relation, &r.object(), &mut visited, 0))
    }

    async fn add_relation(&self, r: &RelationInput) -> Result<()> {
        require_complete(r)?;
        self.tuples.insert(r.clone());
        Ok(())
    }

    async fn add_relation_bulk(&self, relations: &[RelationInput]) -> Result<()> {
        for r in relations {
            require_complete(r)?;
        }
        for r in relations {
            self.tuples.insert(r.clone());
        }
        Ok(())
    }

    async fn remove_relation(&self, r: &RelationInput) -> Result<()> {
        if r.is_complete() {
            self.tuples.remove(r);
            return Ok(());
        }
        self.remove_relation_bulk(std::slice::from_ref(r)).await
    }

    async fn remove_relation_bulk(&self, filters: &[RelationInput]) -> Result<()> {
        if filters.iter().any(|f| *f == RelationInput::filter()) {
            return Err(AuthzError::InvalidFilter(
                "an empty filter matches every tuple; use remove_all_relations".to_string(),
            ));
        }
        for filter in filters {
            for tuple in self.matching(filter) {
                self.tuples.remove(&tuple);
            }
        }
        Ok(())
    }

    async fn remove_all_relations(&self) -> Result<()> {
        self.tuples.clear();
        Ok(())
    }

    async fn list_relations(&self, filter: &RelationInput) -> Result<Vec<RelationInput>> {
        let mut found = self.matching(filter);
        found.sort();
        Ok(found)
    }

    async fn list_accessible_resources(
        &self,
        r: &RelationInput,
    ) -> Result<Vec<AccessibleResource>> {
        if r.user_type.is_empty()
            || r.user_id.is_empty()
            || r.relation.is_empty()
            || r.object_type.is_empty()
        {
            return Err(AuthzError::InvalidFilter(format!(
                "listing resources needs a user, relation and object type: {r}"
            )));
        }

        let candidates: BTreeSet<String> = self
            .tuples
            .iter()
            .filter(|t| t.object_type == r.object_type)
            .map(|t| t.object().id)
            .collect();

        let subject = r.user();
        Ok(candidates
            .into_iter()
            .filter(|id| {
                let object = ObjectRef::from_parts(&r.object_type, id);
                let mut visited = HashSet::new();
                self.check_recursive(&subject, &r.relation, &object, &mut visited, 0)
            })
            .map(|object_id| AccessibleResource {
                object_type: r.object_type.clone(),
                object_id,
            })
            .collect())
    }
}
