//! Message loop: handshake, then listen and answer host messages
//!
//! Connecting → Authenticating → DiscoveringHub → Subscribing → Listening ⇄ Dispatching
//!
//! Frames without the message envelope are reported and skipped; messages
//! from anyone but the host are dropped silently. Faults inside a dispatch
//! cycle are reported and the loop carries on; only session-level errors
//! (closed socket, timeout, cancellation) leave `listen`.

use crate::auth::AuthPolicy;
use crate::events::EventSink;
use crate::session::Session;
use crate::transport::{Connector, FrameTransport};
use gamesbot_core::{BotConfig, HubId, InboundMessage, Result, SendAck};
use gamesbot_engine::{GameHandler, Outcome};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Connecting,
    Authenticating,
    DiscoveringHub,
    Subscribing,
    Listening,
    Dispatching,
}

pub struct Bot<T: FrameTransport> {
    session: Session<T>,
    handler: GameHandler,
    host_nick: String,
    hub_urls: Vec<String>,
    auth: AuthPolicy,
    events: Arc<dyn EventSink>,
    state: LoopState,
}

impl<T: FrameTransport> Bot<T> {
    pub fn new(
        session: Session<T>,
        handler: GameHandler,
        config: &BotConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            session,
            handler,
            host_nick: config.host_nick.clone(),
            hub_urls: config.hub_urls.clone(),
            auth: AuthPolicy::new(config.session.strict_auth),
            events,
            state: LoopState::Connecting,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Hub resolved during the handshake.
    pub fn hub(&self) -> Option<&HubId> {
        self.session.hub()
    }

    /// Give the handler (and its index) back for the next connection.
    pub fn into_handler(self) -> GameHandler {
        self.handler
    }

    fn set_state(&mut self, state: LoopState) {
        debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Authenticate, discover the hub, subscribe to its messages.
    pub async fn start(&mut self, credentials: Value) -> Result<HubId> {
        self.set_state(LoopState::Authenticating);
        self.session.authenticate(credentials, self.auth).await?;

        self.set_state(LoopState::DiscoveringHub);
        let hub = self.session.discover_hub().await?;

        self.set_state(LoopState::Subscribing);
        self.session.subscribe(&hub).await?;

        self.set_state(LoopState::Listening);
        Ok(hub)
    }

    /// Process inbound frames until the session fails.
    pub async fn listen(&mut self) -> Result<()> {
        loop {
            let frame = self.session.next_frame().await?;
            self.process_frame(&frame).await?;
        }
    }

    /// Handle one inbound frame. Errors returned here end the session.
    pub async fn process_frame(&mut self, frame: &str) -> Result<()> {
        let msg = match InboundMessage::from_frame(frame) {
            Some(msg) => msg,
            None => {
                self.events.report(frame);
                return Ok(());
            }
        };
        if msg.sender_nick() != self.host_nick {
            return Ok(());
        }

        self.set_state(LoopState::Dispatching);
        let result = self.dispatch(&msg).await;
        self.set_state(LoopState::Listening);

        match result {
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                self.events
                    .report(&format!("Failed to handle {:?}: {}", msg.text, e));
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    async fn dispatch(&mut self, msg: &InboundMessage) -> Result<()> {
        let outcome = self.handler.handle(&msg.text)?;
        match &outcome {
            Outcome::Unresolved { letters } => {
                self.events
                    .report(&format!("Unknown anagram {}: {}", letters, msg.text));
            }
            Outcome::Learned {
                word, signature, ..
            } => info!("Learned {} under {}", word, signature),
            Outcome::Answer { .. } | Outcome::Ignored => {}
        }
        for text in outcome.outbound() {
            self.post(&text).await?;
        }
        Ok(())
    }

    /// Post one chat message; a bad acknowledgement is reported, not retried.
    pub async fn post(&mut self, text: &str) -> Result<()> {
        self.events.report(&format!("Sending msg: {}", text));
        match self.session.send_chat(text, &self.hub_urls).await? {
            SendAck::Sent => {}
            SendAck::NotSent(value) => {
                self.events
                    .report(&format!("Failed to send message (sent = {})", value));
            }
            SendAck::Malformed(reason) => {
                self.events
                    .report(&format!("Error sending message. ({})", reason));
            }
        }
        Ok(())
    }

    pub async fn close(&mut self) -> Result<()> {
        self.session.close().await
    }
}

/// Connect, handshake, and listen; with `reconnect` enabled, start over after
/// a timeout or dropped connection. The handler (and its index) carries over
/// between connections.
pub async fn run<C: Connector>(
    connector: &C,
    config: &BotConfig,
    mut handler: GameHandler,
    events: Arc<dyn EventSink>,
    cancel: CancellationToken,
) -> Result<GameHandler> {
    loop {
        info!("Connecting to {}", config.ws_url());
        let result = match connector.connect().await {
            Ok(transport) => {
                let session = Session::new(transport, config.session.clone())
                    .with_cancel(cancel.clone());
                let mut bot = Bot::new(session, handler, config, events.clone());
                let result = match bot.start(config.credentials.clone()).await {
                    Ok(_) => bot.listen().await,
                    Err(e) => Err(e),
                };
                let _ = bot.close().await;
                handler = bot.into_handler();
                result
            }
            Err(e) => Err(e),
        };

        let err = match result {
            Ok(()) => return Ok(handler),
            Err(e) => e,
        };
        if !(config.session.reconnect && err.is_reconnectable()) {
            return Err(err);
        }

        let delay = config.session.reconnect_delay;
        warn!("Session ended ({}); reconnecting in {}s", err, delay.as_secs());
        events.report(&format!("Session ended: {}", err));
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => return Ok(handler),
        }
    }
}
