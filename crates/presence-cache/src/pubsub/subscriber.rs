//! Redis Pub/Sub subscriber.
//!
//! The [`EventSource`] keeps a pattern subscription to the participant event
//! channels alive for the lifetime of the process. It alternates between two
//! states:
//!
//! ```text
//! Listening --(subscribe failed / stream closed)--> Backoff --(delay)--> Listening
//! ```
//!
//! There is no terminal state. The loop only returns once nobody consumes the
//! messages anymore, which happens at shutdown.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use redis::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use presence_core::DomainError;

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

impl From<SubscriberError> for DomainError {
    fn from(err: SubscriberError) -> Self {
        DomainError::SubscriptionError(err.to_string())
    }
}

/// Received message from Pub/Sub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Channel the message was published on
    pub channel: String,
    /// Raw payload
    pub payload: String,
}

impl ReceivedMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

/// Messages of one live subscription; ends when the subscription is lost
pub type MessageStream = BoxStream<'static, ReceivedMessage>;

// ============================================================================
// Broker
// ============================================================================

/// Pub/sub broker able to open pattern subscriptions
#[async_trait]
pub trait Broker: Send + Sync {
    /// Open a fresh subscription to every channel matching `pattern`
    async fn psubscribe(&self, pattern: &str) -> SubscriberResult<MessageStream>;
}

/// Redis broker; every subscription gets its own connection
#[derive(Debug, Clone)]
pub struct RedisBroker {
    client: Client,
}

impl RedisBroker {
    /// Create a broker for the given Redis URL (does not connect yet)
    pub fn open(url: &str) -> SubscriberResult<Self> {
        Ok(Self {
            client: Client::open(url)?,
        })
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn psubscribe(&self, pattern: &str) -> SubscriberResult<MessageStream> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.psubscribe(pattern).await?;

        let stream = pubsub.into_on_message().map(|msg| {
            let channel = msg.get_channel_name().to_string();
            // Undecodable payloads are passed on empty and rejected by the decoder
            let payload: String = msg.get_payload().unwrap_or_default();
            ReceivedMessage { channel, payload }
        });

        Ok(stream.boxed())
    }
}

// ============================================================================
// Backoff
// ============================================================================

/// Delay policy between two subscription attempts
#[async_trait]
pub trait Backoff: Send + Sync {
    /// Wait before resubscribing; `attempt` counts failures since the last
    /// successful subscription, starting at 1
    async fn wait(&self, attempt: u32);
}

/// Same delay before every attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::from_millis(1000)
    }
}

#[async_trait]
impl Backoff for FixedBackoff {
    async fn wait(&self, _attempt: u32) {
        tokio::time::sleep(self.delay).await;
    }
}

// ============================================================================
// EventSource
// ============================================================================

/// State of the subscription loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Subscribing or forwarding messages
    Listening,
    /// Waiting before the next subscription attempt
    Backoff,
}

/// Restartable pattern subscription forwarding raw messages to a channel
pub struct EventSource<B, P = FixedBackoff> {
    broker: B,
    backoff: P,
    pattern: String,
}

impl<B, P> EventSource<B, P>
where
    B: Broker + 'static,
    P: Backoff + 'static,
{
    pub fn new(broker: B, backoff: P, pattern: impl Into<String>) -> Self {
        Self {
            broker,
            backoff,
            pattern: pattern.into(),
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Start the loop in the background
    ///
    /// Returns the receiving end of a channel holding at most `buffer`
    /// undelivered messages, and the loop's task handle.
    pub fn spawn(self, buffer: usize) -> (mpsc::Receiver<ReceivedMessage>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let handle = tokio::spawn(self.run(tx));
        (rx, handle)
    }

    /// Run the subscription loop until `tx` has no receiver
    pub async fn run(self, tx: mpsc::Sender<ReceivedMessage>) {
        let mut state = SourceState::Listening;
        let mut attempt: u32 = 0;

        loop {
            if tx.is_closed() {
                break;
            }

            state = match state {
                SourceState::Listening => match self.broker.psubscribe(&self.pattern).await {
                    Ok(stream) => {
                        attempt = 0;
                        tracing::info!(pattern = %self.pattern, "Subscribed to participant events");

                        if !Self::forward(stream, &tx).await {
                            break;
                        }
                        tracing::warn!(pattern = %self.pattern, "Pub/Sub stream ended");
                        SourceState::Backoff
                    }
                    Err(e) => {
                        let err = DomainError::from(e);
                        tracing::error!(
                            pattern = %self.pattern,
                            code = err.code(),
                            error = %err,
                            "Subscription failed"
                        );
                        SourceState::Backoff
                    }
                },
                SourceState::Backoff => {
                    attempt = attempt.saturating_add(1);
                    tracing::debug!(attempt, "Resubscribing after backoff");
                    self.backoff.wait(attempt).await;
                    SourceState::Listening
                }
            };
        }

        tracing::info!(pattern = %self.pattern, "Event source shutting down");
    }

    /// Forward messages until the stream ends; `false` once the receiver is gone
    async fn forward(mut stream: MessageStream, tx: &mpsc::Sender<ReceivedMessage>) -> bool {
        while let Some(message) = stream.next().await {
            tracing::trace!(channel = %message.channel, "Received Pub/Sub message");
            if tx.send(message).await.is_err() {
                return false;
            }
        }
        true
    }
}
