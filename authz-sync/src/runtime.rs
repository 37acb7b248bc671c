use events_bus::{EventRegistry, Result, ShutdownWatcher};
use tracing::info;

use crate::events::DomainEvent;
use crate::handlers::AuthzHandle;
use crate::wiring::register_authz_handlers;

/// A running synchronizer: a bus with every handler registered, bound to one
/// authorization store.
///
/// The domain layer publishes through [`push_event`](Self::push_event); the
/// handle is closed explicitly with [`close`](Self::close).
pub struct SyncRuntime<B> {
    bus: B,
    authz: AuthzHandle,
}

impl<B> SyncRuntime<B>
where
    B: EventRegistry<DomainEvent>,
{
    /// Register the handlers on `bus` and start it.
    ///
    /// # Errors
    ///
    /// Fails when a handler cannot be registered or the bus cannot start.
    pub async fn open(mut bus: B, authz: AuthzHandle, shutdown: ShutdownWatcher) -> Result<Self> {
        register_authz_handlers(&mut bus, authz.clone()).await?;
        bus.run(shutdown).await?;
        info!("authorization synchronizer running");
        Ok(Self { bus, authz })
    }

    pub async fn push_event(&self, event: impl Into<DomainEvent> + Send) {
        self.bus.push_event(event.into()).await;
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn authz(&self) -> &AuthzHandle {
        &self.authz
    }

    /// Stop the bus. Queued and in-flight events are dropped.
    ///
    /// # Errors
    ///
    /// Fails when the transport reports an error while closing.
    pub async fn close(mut self) -> Result<()> {
        self.bus.shutdown().await?;
        info!("authorization synchronizer stopped");
        Ok(())
    }
}
