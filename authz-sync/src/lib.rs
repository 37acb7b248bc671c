//! Authorization synchronizer.
//!
//! Mirrors domain writes into the relationship graph. Every entity kind has
//! three handlers (`OnCreateAuthz`, `OnUpdateAuthz`, `OnDeleteAuthz`) that turn
//! a [`DomainEvent`] into tuple writes and deletes:
//!
//! - create writes the creator's `role` tuple and links the entity to its
//!   parents
//! - update replaces a parent link through a wildcard filter, so the previous
//!   value is never needed
//! - delete removes every tuple naming the entity, as object and as subject
//!
//! Synchronization is best-effort. Failures are logged and never reach the
//! publisher; there is no retry.

pub mod entity;
pub mod events;
pub mod handlers;
pub mod runtime;
pub mod wiring;

pub use events::DomainEvent;
pub use handlers::AuthzHandle;
pub use runtime::SyncRuntime;
pub use wiring::register_authz_handlers;
