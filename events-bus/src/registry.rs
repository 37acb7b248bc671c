use async_trait::async_trait;

use crate::{
    error::Result,
    event::{Event, EventVariant},
    handlers::EventHandler,
    shutdown::ShutdownWatcher,
};

/// The contract shared by every transport.
///
/// Handlers are written against this trait only; which transport backs it is
/// decided where the process is wired together.
#[async_trait]
pub trait EventRegistry<E: Event>: Send + Sync {
    /// Register `handler` for variant `V`.
    ///
    /// Callers register each handler exactly once; duplicates are not
    /// detected and would run twice.
    ///
    /// # Errors
    ///
    /// Fails when the transport can no longer accept registrations or the
    /// subscription cannot be opened.
    async fn register_handler<V, H>(&mut self, handler: H) -> Result<()>
    where
        V: EventVariant<E>,
        H: EventHandler<V>;

    /// Publish an event. Fire-and-forget: failures are logged, never returned.
    async fn push_event(&self, event: E);

    /// Start delivering events until `shutdown` fires or [`shutdown`](Self::shutdown) is called.
    ///
    /// # Errors
    ///
    /// Fails when the bus is already running.
    async fn run(&mut self, shutdown: ShutdownWatcher) -> Result<()>;

    /// Stop delivery and release transport resources. In-flight and queued
    /// events are not drained.
    ///
    /// # Errors
    ///
    /// Fails when the transport reports an error while closing.
    async fn shutdown(&mut self) -> Result<()>;
}
