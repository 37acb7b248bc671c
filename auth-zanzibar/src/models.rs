use serde::{Deserialize, Serialize};
use std::fmt;

/// Object and subject types known to the authorization model.
pub mod types {
    pub const USER: &str = "user";
    pub const ROLE: &str = "role";
    pub const SUPPORT_GROUP: &str = "support_group";
    pub const SERVICE: &str = "service";
    pub const COMPONENT: &str = "component";
    pub const COMPONENT_VERSION: &str = "component_version";
    pub const COMPONENT_INSTANCE: &str = "component_instance";
    pub const ISSUE_MATCH: &str = "issue_match";
}

/// Relation names known to the authorization model.
pub mod relations {
    pub const CAN_VIEW: &str = "can_view";
    pub const ROLE: &str = "role";
    pub const MEMBER: &str = "member";
    pub const OWNER: &str = "owner";
    pub const ADMIN: &str = "admin";
    pub const SUPPORT_GROUP: &str = "support_group";
    /// The one group named on the service record itself.
    pub const OWNING_SUPPORT_GROUP: &str = "owning_support_group";
    pub const RELATED_SERVICE: &str = "related_service";
    pub const COMPONENT_VERSION: &str = "component_version";
    pub const COMPONENT_INSTANCE: &str = "component_instance";
}

/// A relationship tuple: `user_type:user_id` has `relation` on `object_type:object_id`.
///
/// Used as a filter, every empty field matches any value. Used for a write,
/// every field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationInput {
    pub user_type: String,
    pub user_id: String,
    pub relation: String,
    pub object_type: String,
    pub object_id: String,
}

impl RelationInput {
    pub fn new(
        user_type: &str,
        user_id: impl ToString,
        relation: &str,
        object_type: &str,
        object_id: impl ToString,
    ) -> Self {
        Self {
            user_type: user_type.to_string(),
            user_id: user_id.to_string(),
            relation: relation.to_string(),
            object_type: object_type.to_string(),
            object_id: object_id.to_string(),
        }
    }

    /// An empty filter, matching every tuple.
    pub fn filter() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_type: &str, user_id: impl ToString) -> Self {
        self.user_type = user_type.to_string();
        self.user_id = user_id.to_string();
        self
    }

    pub fn with_user_type(mut self, user_type: &str) -> Self {
        self.user_type = user_type.to_string();
        self
    }

    pub fn with_relation(mut self, relation: &str) -> Self {
        self.relation = relation.to_string();
        self
    }

    pub fn with_object(mut self, object_type: &str, object_id: impl ToString) -> Self {
        self.object_type = object_type.to_string();
        self.object_id = object_id.to_string();
        self
    }

    pub fn with_object_type(mut self, object_type: &str) -> Self {
        self.object_type = object_type.to_string();
        self
    }

    /// Every field set; required for writes.
    pub fn is_complete(&self) -> bool {
        !self.user_type.is_empty()
            && !self.user_id.is_empty()
            && !self.relation.is_empty()
            && !self.object_type.is_empty()
            && !self.object_id.is_empty()
    }

    /// Whether `candidate` satisfies this filter.
    ///
    /// Identifiers are compared as parsed references, so a subject `service:5`
    /// never matches an object filter for `component:5`, and a userset subject
    /// `support_group:3#member` matches a filter on `support_group` / `3`.
    pub fn matches(&self, candidate: &RelationInput) -> bool {
        let user = ObjectRef::from_parts(&candidate.user_type, &candidate.user_id);
        let object = ObjectRef::from_parts(&candidate.object_type, &candidate.object_id);

        field_matches(&self.user_type, &user.kind)
            && field_matches(&self.user_id, &user.id)
            && field_matches(&self.relation, &candidate.relation)
            && field_matches(&self.object_type, &object.kind)
            && field_matches(&self.object_id, &object.id)
    }

    pub fn user(&self) -> ObjectRef {
        ObjectRef::from_parts(&self.user_type, &self.user_id)
    }

    pub fn object(&self) -> ObjectRef {
        ObjectRef::from_parts(&self.object_type, &self.object_id)
    }

    pub fn to_tuple_key(&self) -> TupleKey {
        TupleKey {
            user: format!("{}:{}", self.user_type, self.user_id),
            relation: self.relation.clone(),
            object: format!("{}:{}", self.object_type, self.object_id),
        }
    }
}

fn field_matches(filter: &str, value: &str) -> bool {
    filter.is_empty() || filter == value
}

impl fmt::Display for RelationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} {}:{}",
            self.user_type, self.user_id, self.relation, self.object_type, self.object_id
        )
    }
}

/// A parsed `type:id` or userset `type:id#relation` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub kind: String,
    pub id: String,
    pub relation: Option<String>,
}

impl ObjectRef {
    /// Parse a backend identifier. Returns `None` when there is no `:`.
    pub fn parse(value: &str) -> Option<Self> {
        let (kind, rest) = value.split_once(':')?;
        Some(Self::from_parts(kind, rest))
    }

    /// Build from a type and an id that may carry a `#relation` suffix.
    pub fn from_parts(kind: &str, id: &str) -> Self {
        match id.split_once('#') {
            Some((id, relation)) => Self {
                kind: kind.to_string(),
                id: id.to_string(),
                relation: Some(relation.to_string()),
            },
            None => Self {
                kind: kind.to_string(),
                id: id.to_string(),
                relation: None,
            },
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relation {
            Some(relation) => write!(f, "{}:{}#{}", self.kind, self.id, relation),
            None => write!(f, "{}:{}", self.kind, self.id),
        }
    }
}

/// A tuple in the backend's wire form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleKey {
    pub user: String,
    pub relation: String,
    pub object: String,
}

impl TupleKey {
    /// Split the composite identifiers back into a [`RelationInput`].
    ///
    /// Returns `None` if either side is not a `type:id` identifier.
    pub fn to_relation_input(&self) -> Option<RelationInput> {
        let (user_type, user_id) = self.user.split_once(':')?;
        let (object_type, object_id) = self.object.split_once(':')?;
        Some(RelationInput {
            user_type: user_type.to_string(),
            user_id: user_id.to_string(),
            relation: self.relation.clone(),
            object_type: object_type.to_string(),
            object_id: object_id.to_string(),
        })
    }
}

/// An object a subject can reach through some relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessibleResource {
    pub object_type: String,
    pub object_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple() -> RelationInput {
        RelationInput::new(types::ROLE, 1, relations::ROLE, types::COMPONENT_INSTANCE, 10)
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(RelationInput::filter().matches(&tuple()));
    }

    #[test]
    fn test_partial_filter() {
        let filter = RelationInput::filter()
            .with_object_type(types::COMPONENT_INSTANCE)
            .with_relation(relations::ROLE);
        assert!(filter.matches(&tuple()));

        let filter = filter.with_object(types::COMPONENT_INSTANCE, 11);
        assert!(!filter.matches(&tuple()));
    }

    #[test]
    fn test_same_id_different_type_does_not_match() {
        let candidate = RelationInput::new(
            types::SERVICE,
            5,
            relations::RELATED_SERVICE,
            types::COMPONENT_INSTANCE,
            10,
        );
        let filter = RelationInput::filter().with_object(types::SERVICE, 5);
        assert!(!filter.matches(&candidate));

        let filter = RelationInput::filter().with_user(types::COMPONENT, 5);
        assert!(!filter.matches(&candidate));
        let filter = RelationInput::filter().with_user(types::SERVICE, 5);
        assert!(filter.matches(&candidate));
    }

    #[test]
    fn test_userset_subject_matches_its_object() {
        let candidate = RelationInput::new(
            types::SUPPORT_GROUP,
            "3#member",
            relations::OWNER,
            types::SERVICE,
            1,
        );
        assert!(RelationInput::filter().with_user(types::SUPPORT_GROUP, 3).matches(&candidate));
        assert_eq!(candidate.user().relation.as_deref(), Some("member"));
    }

    #[test]
    fn test_completeness() {
        assert!(tuple().is_complete());
        assert!(!RelationInput::filter().with_object(types::SERVICE, 1).is_complete());
    }

    #[test]
    fn test_tuple_key_conversion() {
        let key = tuple().to_tuple_key();
        assert_eq!(key.user, "role:1");
        assert_eq!(key.object, "component_instance:10");
        assert_eq!(key.to_relation_input(), Some(tuple()));

        let broken = TupleKey {
            user: "role".into(),
            relation: "role".into(),
            object: "service:1".into(),
        };
        assert_eq!(broken.to_relation_input(), None);
    }

    #[test]
    fn test_object_ref_parse() {
        assert_eq!(
            ObjectRef::parse("support_group:3#member"),
            Some(ObjectRef {
                kind: "support_group".into(),
                id: "3".into(),
                relation: Some("member".into()),
            })
        );
        assert_eq!(ObjectRef::parse("user:abc:def").map(|r| r.id), Some("abc:def".into()));
        assert_eq!(ObjectRef::parse("nocolon"), None);
    }
}
