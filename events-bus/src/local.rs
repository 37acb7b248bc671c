//! In-process event bus.
//!
//! A bounded channel feeds one worker task. The worker runs every handler of
//! an event to completion, in registration order, before taking the next
//! event, so a slow handler delays everything queued behind it. Queued events
//! live only in memory and are discarded on shutdown or crash.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    error::{EventBusError, Result},
    event::{Event, EventVariant},
    handlers::{EventHandler, HandlerTable},
    registry::EventRegistry,
    shutdown::{ShutdownToken, ShutdownWatcher},
};

/// Events buffered before `push_event` starts waiting on the consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

pub struct LocalEventBus<E: Event> {
    handlers: Arc<HandlerTable<E>>,
    sender: mpsc::Sender<E>,
    receiver: Option<mpsc::Receiver<E>>,
    stop: Option<ShutdownToken>,
    worker: Option<JoinHandle<()>>,
    capacity: usize,
}

/// Cloneable publishing handle onto a [`LocalEventBus`].
pub struct LocalPublisher<E: Event> {
    sender: mpsc::Sender<E>,
}

impl<E: Event> Clone for LocalPublisher<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E: Event> LocalPublisher<E> {
    /// Enqueue `event`, waiting while the channel is full.
    pub async fn push_event(&self, event: E) {
        send(&self.sender, event).await;
    }
}

impl<E: Event> LocalEventBus<E> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            handlers: Arc::new(HandlerTable::new()),
            sender,
            receiver: Some(receiver),
            stop: None,
            worker: None,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn publisher(&self) -> LocalPublisher<E> {
        LocalPublisher {
            sender: self.sender.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    async fn process(
        handlers: Arc<HandlerTable<E>>,
        mut receiver: mpsc::Receiver<E>,
        mut shutdown: ShutdownWatcher,
        mut stop: ShutdownWatcher,
    ) {
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    debug!("local event bus cancelled");
                    break;
                }
                () = stop.cancelled() => {
                    debug!("local event bus stopped");
                    break;
                }
                next = receiver.recv() => match next {
                    Some(event) => Self::dispatch(&handlers, &event).await,
                    None => break,
                },
            }
        }
        // Anything still buffered in `receiver` is dropped here.
    }

    async fn dispatch(handlers: &HandlerTable<E>, event: &E) {
        let registered = handlers.handlers_for(event.name());
        if registered.is_empty() {
            debug!(event = %event.name(), "no handlers registered");
            return;
        }
        for handler in registered {
            handler.dispatch(event).await;
        }
    }
}

impl<E: Event> Default for LocalEventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

async fn send<E: Event>(sender: &mpsc::Sender<E>, event: E) {
    if let Err(mpsc::error::SendError(event)) = sender.send(event).await {
        warn!(event = %event.name(), "local event bus is closed; dropping event");
    }
}

#[async_trait]
impl<E: Event> EventRegistry<E> for LocalEventBus<E> {
    async fn register_handler<V, H>(&mut self, handler: H) -> Result<()>
    where
        V: EventVariant<E>,
        H: EventHandler<V>,
    {
        if self.receiver.is_none() {
            return Err(EventBusError::RegistryFrozen);
        }
        let table = Arc::get_mut(&mut self.handlers).ok_or(EventBusError::RegistryFrozen)?;
        table.register::<V, H>(handler);
        debug!(event = %V::NAME, "registered local event handler");
        Ok(())
    }

    async fn push_event(&self, event: E) {
        send(&self.sender, event).await;
    }

    async fn run(&mut self, shutdown: ShutdownWatcher) -> Result<()> {
        let receiver = self.receiver.take().ok_or(EventBusError::AlreadyRunning)?;
        let (stop, stop_watcher) = ShutdownToken::new();
        let handlers = Arc::clone(&self.handlers);

        info!(
            handlers = handlers.len(),
            capacity = self.capacity,
            "starting local event bus"
        );
        self.worker = Some(tokio::spawn(Self::process(
            handlers,
            receiver,
            shutdown,
            stop_watcher,
        )));
        self.stop = Some(stop);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        // Freeze registration even if the bus never ran.
        self.receiver = None;

        if let Some(stop) = self.stop.take() {
            stop.cancel();
        }
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                error!(error = %e, "local event bus worker terminated abnormally");
            }
        }
        info!("local event bus shut down");
        Ok(())
    }
}
