//! # presence-cache
//!
//! Redis side of the presence bridge.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Participant Lookup**: Participant → user id through the signaling hash
//! - **Event Source**: Pattern subscription to participant events that
//!   resubscribes forever after failures
//!
//! ## Example
//!
//! ```ignore
//! use presence_cache::{EventSource, FixedBackoff, RedisBroker, SignalingKeys};
//!
//! let keys = SignalingKeys::new("k3k-signaling");
//! let broker = RedisBroker::open("redis://127.0.0.1:6379")?;
//! let source = EventSource::new(broker, FixedBackoff::from_millis(1000), keys.event_pattern());
//! let (mut rx, _handle) = source.spawn(1024);
//!
//! while let Some(message) = rx.recv().await {
//!     println!("{}: {}", message.channel, message.payload);
//! }
//! ```

pub mod participants;
pub mod pool;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export participant lookup
pub use participants::RedisParticipantLookup;

// Re-export pubsub types
pub use pubsub::{
    Backoff, Broker, EventSource, FixedBackoff, MessageStream, ReceivedMessage, RedisBroker,
    SignalingKeys, SourceState, SubscriberError, SubscriberResult, DEFAULT_NAMESPACE,
};
