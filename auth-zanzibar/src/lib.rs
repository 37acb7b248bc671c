//! Relationship-based authorization for heureka.
//!
//! The [`Authorization`] trait is the single seam between the tuple
//! synchronizer and the store that holds relationship tuples. Three stores
//! implement it:
//!
//! - [`OpenFgaAuthz`]: the OpenFGA HTTP API
//! - [`InMemoryAuthz`]: a process-local store for tests and development
//! - [`NoAuthz`]: allows every check and ignores every write
//!
//! # Core Concepts
//!
//! - **Tuple**: `user_type:user_id` has `relation` on `object_type:object_id`
//! - **Filter**: a [`RelationInput`] with empty fields, matching any value there
//! - **Userset**: a subject such as `support_group:3#member`, standing for every
//!   member of that group
//!
//! # Example
//!
//! ```rust
//! use auth_zanzibar::{relations, types, Authorization, InMemoryAuthz, RelationInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let authz = InMemoryAuthz::new();
//!
//!     let tuple =
//!         RelationInput::new(types::USER, "alice", relations::MEMBER, types::SUPPORT_GROUP, 3);
//!     authz.add_relation(&tuple).await?;
//!
//!     assert!(authz.check_permission(&tuple).await?);
//!     Ok(())
//! }
//! ```

pub mod authorization;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod noop;
pub mod openfga;

pub use authorization::{new_authorization_handler, Authorization};
pub use config::AuthzConfig;
pub use error::{AuthzError, Result};
pub use memory::InMemoryAuthz;
pub use models::{relations, types, AccessibleResource, ObjectRef, RelationInput, TupleKey};
pub use noop::NoAuthz;
pub use openfga::OpenFgaAuthz;
