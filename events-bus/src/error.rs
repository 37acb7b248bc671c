use thiserror::Error;

use crate::event::EventName;

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Event broker connection failed: {0}")]
    BrokerConnection(String),

    #[error("Event subscription failed for {subject}: {message}")]
    Subscription { subject: EventName, message: String },

    #[error("Event publishing failed: {0}")]
    Publish(String),

    #[error("Handler table is frozen once the bus is running")]
    RegistryFrozen,

    #[error("Event bus is already running")]
    AlreadyRunning,

    #[error("Event bus is not running")]
    NotRunning,
}

pub type Result<T> = std::result::Result<T, EventBusError>;
