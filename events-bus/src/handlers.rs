use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{error, warn};

use crate::event::{Event, EventName, EventVariant};

/// Handles one event variant.
///
/// Handlers own their error reporting: the bus never sees a failure and
/// never retries.
#[async_trait]
pub trait EventHandler<V>: Send + Sync + 'static {
    async fn handle(&self, event: &V);
}

/// Adapts an async closure into an [`EventHandler`].
///
/// The closure receives its own copy of the payload.
pub struct HandlerFn<F>(pub F);

#[async_trait]
impl<V, F, Fut> EventHandler<V> for HandlerFn<F>
where
    V: Clone + Send + Sync + 'static,
    F: Fn(V) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, event: &V) {
        (self.0)(event.clone()).await;
    }
}

/// Type-erased handler as stored in a handler table.
#[async_trait]
pub(crate) trait DispatchHandler<E: Event>: Send + Sync {
    /// Deliver an in-process event.
    async fn dispatch(&self, event: &E);

    /// Decode a wire payload into the handler's variant and deliver it.
    async fn dispatch_payload(&self, payload: &[u8]);
}

pub(crate) struct TypedHandler<V, H> {
    handler: H,
    _variant: PhantomData<fn() -> V>,
}

impl<V, H> TypedHandler<V, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _variant: PhantomData,
        }
    }
}

#[async_trait]
impl<E, V, H> DispatchHandler<E> for TypedHandler<V, H>
where
    E: Event,
    V: EventVariant<E>,
    H: EventHandler<V>,
{
    async fn dispatch(&self, event: &E) {
        match V::from_event(event) {
            Some(payload) => self.handler.handle(payload).await,
            None => {
                // Only reachable through a hand-written EventVariant whose NAME
                // disagrees with the variant it extracts.
                error!(
                    expected = %V::NAME,
                    received = %event.name(),
                    "internal error: handler received an event of the wrong variant"
                );
            }
        }
    }

    async fn dispatch_payload(&self, payload: &[u8]) {
        match V::from_payload(payload) {
            Ok(event) => self.handler.handle(&event).await,
            Err(e) => {
                warn!(
                    subject = %V::NAME,
                    error = %e,
                    bytes = payload.len(),
                    "dropping event that could not be decoded"
                );
            }
        }
    }
}

pub(crate) type SharedHandler<E> = Arc<dyn DispatchHandler<E>>;

/// Event name to handlers, in registration order.
pub(crate) struct HandlerTable<E: Event> {
    handlers: HashMap<EventName, Vec<SharedHandler<E>>>,
}

impl<E: Event> HandlerTable<E> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Append a handler; no deduplication is performed.
    pub(crate) fn register<V, H>(&mut self, handler: H)
    where
        V: EventVariant<E>,
        H: EventHandler<V>,
    {
        let handler: SharedHandler<E> = Arc::new(TypedHandler::<V, H>::new(handler));
        self.handlers.entry(V::NAME).or_default().push(handler);
    }

    pub(crate) fn handlers_for(&self, name: EventName) -> &[SharedHandler<E>] {
        self.handlers.get(&name).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}
