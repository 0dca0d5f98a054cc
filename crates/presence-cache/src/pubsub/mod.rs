//! Redis Pub/Sub module.
//!
//! Provides the subscription to signaling participant events.

mod channels;
mod subscriber;

pub use channels::{SignalingKeys, DEFAULT_NAMESPACE};
pub use subscriber::{
    Backoff, Broker, EventSource, FixedBackoff, MessageStream, ReceivedMessage, RedisBroker,
    SourceState, SubscriberError, SubscriberResult,
};
