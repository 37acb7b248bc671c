//! Domain event bus.
//!
//! Domain code publishes events; handlers registered per event variant react
//! to them asynchronously. Two transports implement the same
//! [`EventRegistry`] contract:
//!
//! - [`LocalEventBus`]: a bounded in-process channel drained by one worker
//!   task. Events are handled in publish order; a full channel makes the
//!   publisher wait. Nothing survives a crash.
//! - [`NatsEventBus`]: one NATS queue-group subscription per event name, so
//!   each event is handled by exactly one replica. At-most-once.
//!
//! Publishing is fire-and-forget on both: failures surface only in the logs.
//!
//! # Example
//!
//! ```rust
//! use events_bus::{event_set, EventRegistry, HandlerFn, LocalEventBus, ShutdownToken};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct ServiceCreated { pub id: i64 }
//!
//! event_set! {
//!     pub enum AppEvent {
//!         ServiceCreated(ServiceCreated) => "CreateService",
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), events_bus::EventBusError> {
//! let mut bus = LocalEventBus::<AppEvent>::new();
//! bus.register_handler::<ServiceCreated, _>(HandlerFn(|event: ServiceCreated| async move {
//!     tracing::info!(service = event.id, "service created");
//! }))
//! .await?;
//!
//! let (token, watcher) = ShutdownToken::new();
//! bus.run(watcher).await?;
//! bus.push_event(ServiceCreated { id: 5 }.into()).await;
//!
//! token.cancel();
//! bus.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event;
pub mod handlers;
pub mod local;
pub mod nats;
pub mod registry;
pub mod shutdown;

pub use error::*;
pub use event::*;
pub use handlers::{EventHandler, HandlerFn};
pub use local::*;
pub use nats::*;
pub use registry::*;
pub use shutdown::*;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
