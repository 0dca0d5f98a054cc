//! Presence pipeline
//!
//! Processes broker messages one at a time: decode, resolve the participant,
//! find the PBX subscriber, send the presence. A failure at any stage drops
//! that message only; it is logged with everything known about the event and
//! the loop moves on. Nothing is retried.

use tokio::sync::mpsc;

use presence_cache::ReceivedMessage;
use presence_core::{
    DomainError, DomainEvent, DomainResult, EventDecoder, PresenceCommand, SubscriberRecord,
};

use super::context::ServiceContext;
use super::dispatcher::PresenceDispatcher;
use super::identity::IdentityResolver;

/// Result of a fully processed message
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub event: DomainEvent,
    pub record: SubscriberRecord,
    pub command: PresenceCommand,
}

/// What is known about a message so far, for logging
#[derive(Debug, Default)]
struct MessageContext {
    room: Option<String>,
    participant: Option<String>,
    user_id: Option<String>,
    email: Option<String>,
    pbx_domain: Option<String>,
}

/// Event pipeline from broker messages to PBX presence
#[derive(Debug, Clone)]
pub struct PresencePipeline {
    ctx: ServiceContext,
}

impl PresencePipeline {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Process one raw payload, logging any failure
    pub async fn handle_payload(&self, payload: &str) -> DomainResult<PipelineOutcome> {
        let mut cx = MessageContext::default();
        let result = self.process(payload, &mut cx).await;
        if let Err(e) = &result {
            log_failure(e, &cx, payload);
        }
        result
    }

    async fn process(&self, payload: &str, cx: &mut MessageContext) -> DomainResult<PipelineOutcome> {
        let room_event = EventDecoder::decode(payload)?;
        cx.room = Some(room_event.room.clone());
        cx.participant = Some(room_event.participant_id.clone());

        let event = IdentityResolver::new(&self.ctx).resolve(&room_event).await?;
        cx.user_id = Some(event.user_id.clone());
        cx.email = Some(event.email.clone());

        let dispatcher = PresenceDispatcher::new(&self.ctx);
        let pbx_domain = dispatcher.system_domain()?;
        cx.pbx_domain = Some(pbx_domain.clone());

        let record = self.ctx.directory().find_by_email(&pbx_domain, &event.email)?;
        tracing::info!(
            kind = %event.kind,
            room = %event.room,
            user_id = %event.user_id,
            email = %event.email,
            guid = %record.guid,
            h323 = %record.telephony_id,
            pbx_domain = %pbx_domain,
            "User found in PBX"
        );

        let command = dispatcher.dispatch(&event, &record).await?;
        Ok(PipelineOutcome {
            event,
            record,
            command,
        })
    }

    /// Process messages until the source closes
    pub async fn run(self, mut rx: mpsc::Receiver<ReceivedMessage>) {
        while let Some(message) = rx.recv().await {
            tracing::debug!(
                channel = %message.channel,
                payload = %message.payload,
                "Message from broker"
            );
            // Failures are logged by handle_payload
            let _ = self.handle_payload(&message.payload).await;
        }
        tracing::info!("Event source closed, pipeline stopping");
    }
}

fn log_failure(err: &DomainError, cx: &MessageContext, payload: &str) {
    let room = cx.room.as_deref().unwrap_or_default();
    let participant = cx.participant.as_deref().unwrap_or_default();
    let user_id = cx.user_id.as_deref().unwrap_or_default();
    let email = cx.email.as_deref().unwrap_or_default();
    let pbx_domain = cx.pbx_domain.as_deref().unwrap_or_default();

    if err.is_miss() {
        tracing::warn!(
            stage = %err.stage(),
            code = err.code(),
            room,
            participant,
            user_id,
            email,
            pbx_domain,
            error = %err,
            "Dropping event"
        );
    } else {
        tracing::error!(
            stage = %err.stage(),
            code = err.code(),
            room,
            participant,
            user_id,
            email,
            pbx_domain,
            payload,
            error = %err,
            "Dropping event"
        );
    }
}
