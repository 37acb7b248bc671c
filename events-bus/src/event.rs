//! Event contracts shared by every transport.
//!
//! An event set is a closed enum; each variant wraps a payload struct that
//! implements [`EventVariant`]. The variant's [`EventName`] is both the
//! handler-table key and, on the distributed bus, the NATS subject. Payloads
//! travel as the JSON encoding of the payload struct itself.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// Stable identifier of an event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventName(&'static str);

impl EventName {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// A closed set of domain events.
pub trait Event: Send + Sync + 'static {
    /// Name of the variant carried by this value.
    fn name(&self) -> EventName;

    /// JSON encoding of the inner payload, as sent over the wire.
    ///
    /// # Errors
    ///
    /// Returns the serializer error when the payload cannot be encoded.
    fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error>;
}

/// One variant of an event set, statically bound to its name.
pub trait EventVariant<E: Event>: Serialize + DeserializeOwned + Send + Sync + 'static {
    const NAME: EventName;

    /// Borrow the payload if `event` carries this variant.
    fn from_event(event: &E) -> Option<&Self>;

    /// Decode a payload received from the wire.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error for malformed or mismatched JSON.
    fn from_payload(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

/// Declare a closed event set.
///
/// Generates the enum, its [`Event`] impl, an [`EventVariant`] impl for every
/// payload type and `From<Payload>` conversions into the enum. Payload types
/// must implement `Debug`, `Clone`, `Serialize` and `Deserialize`.
///
/// # Example
///
/// ```rust
/// use events_bus::{event_set, Event, EventVariant};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct UserCreated { pub id: i64 }
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct UserDeleted { pub id: i64 }
///
/// event_set! {
///     pub enum UserEvent {
///         Created(UserCreated) => "CreateUser",
///         Deleted(UserDeleted) => "DeleteUser",
///     }
/// }
///
/// let event: UserEvent = UserCreated { id: 1 }.into();
/// assert_eq!(event.name(), <UserCreated as EventVariant<UserEvent>>::NAME);
/// ```
#[macro_export]
macro_rules! event_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $enum:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident($payload:ty) => $name:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis enum $enum {
            $(
                $(#[$vmeta])*
                $variant($payload),
            )+
        }

        impl $crate::Event for $enum {
            fn name(&self) -> $crate::EventName {
                match self {
                    $( Self::$variant(_) => <$payload as $crate::EventVariant<$enum>>::NAME, )+
                }
            }

            fn to_payload(
                &self,
            ) -> ::std::result::Result<::std::vec::Vec<u8>, $crate::__private::serde_json::Error> {
                match self {
                    $( Self::$variant(inner) => $crate::__private::serde_json::to_vec(inner), )+
                }
            }
        }

        $(
            impl $crate::EventVariant<$enum> for $payload {
                const NAME: $crate::EventName = $crate::EventName::new($name);

                #[allow(unreachable_patterns)]
                fn from_event(event: &$enum) -> ::std::option::Option<&Self> {
                    match event {
                        $enum::$variant(inner) => ::std::option::Option::Some(inner),
                        _ => ::std::option::Option::None,
                    }
                }
            }

            impl ::std::convert::From<$payload> for $enum {
                fn from(payload: $payload) -> Self {
                    $enum::$variant(payload)
                }
            }
        )+
    };
}
