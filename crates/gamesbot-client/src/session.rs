//! Hub session: handshake plus lock-step request/reply over one socket
//!
//! Every request is tagged with a fresh `callback_id` and followed by exactly
//! one wait for its reply. With the default `ArrivalOrder` correlation the
//! next frame on the wire *is* the reply; nothing else may be in flight.
//! `ById` correlation waits for the frame echoing the id instead and parks
//! anything else for the listen loop.

use crate::auth::AuthPolicy;
use crate::transport::FrameTransport;
use gamesbot_core::{
    parse_hub_listing, reply_callback_id, AuthOutcome, CorrelationMode, Error, HubId, Request,
    Result, SendAck, SessionOptions,
};
use serde_json::Value;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct Session<T: FrameTransport> {
    transport: T,
    options: SessionOptions,
    next_callback_id: u64,
    hub: Option<HubId>,
    /// Frames that arrived while waiting for a correlated reply.
    parked: VecDeque<String>,
    cancel: CancellationToken,
}

impl<T: FrameTransport> Session<T> {
    pub fn new(transport: T, options: SessionOptions) -> Self {
        Self {
            transport,
            options,
            next_callback_id: 1,
            hub: None,
            parked: VecDeque::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Abort any pending wait when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn hub(&self) -> Option<&HubId> {
        self.hub.as_ref()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_callback_id;
        self.next_callback_id += 1;
        id
    }

    async fn send_request(&mut self, request: &Request) -> Result<()> {
        let frame = request.to_frame()?;
        debug!("-> {}", frame);
        self.transport.send_frame(frame).await
    }

    /// Wait for the next frame off the wire, honouring the read timeout and
    /// cancellation.
    async fn recv(&mut self) -> Result<String> {
        let cancel = self.cancel.clone();
        let timeout = self.options.read_timeout;
        let transport = &mut self.transport;
        let recv = async move {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, transport.recv_frame()).await {
                    Ok(frame) => frame,
                    Err(_) => Err(Error::ReadTimeout(limit)),
                },
                None => transport.recv_frame().await,
            }
        };
        let frame = tokio::select! {
            frame = recv => frame?,
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        };
        let frame =
            frame.ok_or_else(|| Error::ConnectionClosed("hub closed the connection".into()))?;
        debug!("<- {}", frame);
        Ok(frame)
    }

    /// Send `request` with a fresh correlation id and wait for its reply.
    pub async fn request(&mut self, request: Request) -> Result<String> {
        let id = self.next_id();
        let request = request.with_callback_id(id);
        self.send_request(&request).await?;

        match self.options.correlation {
            CorrelationMode::ArrivalOrder => self.recv().await,
            CorrelationMode::ById => loop {
                let frame = self.recv().await?;
                if reply_callback_id(&frame) == Some(id) {
                    return Ok(frame);
                }
                debug!("parking frame while waiting for reply {}", id);
                self.parked.push_back(frame);
            },
        }
    }

    /// `POST /sessions/authorize`, checked against `policy`.
    pub async fn authenticate(
        &mut self,
        credentials: Value,
        policy: AuthPolicy,
    ) -> Result<AuthOutcome> {
        let reply = self.request(Request::authorize(credentials)).await?;
        let outcome = AuthOutcome::parse(&reply);
        policy.verify(&outcome)?;
        Ok(outcome)
    }

    /// `GET /hubs`; remembers and returns the first hub.
    pub async fn discover_hub(&mut self) -> Result<HubId> {
        let reply = self.request(Request::list_hubs()).await?;
        let hub = parse_hub_listing(&reply)?;
        info!("Using hub {}", hub);
        self.hub = Some(hub.clone());
        Ok(hub)
    }

    /// Register for hub message events. No reply is awaited.
    pub async fn subscribe(&mut self, hub: &HubId) -> Result<()> {
        self.send_request(&Request::listen_hub_messages(hub)).await?;
        info!("Listening for messages on hub {}", hub);
        Ok(())
    }

    /// Post a chat message and decode the acknowledgement.
    pub async fn send_chat(&mut self, text: &str, hub_urls: &[String]) -> Result<SendAck> {
        let reply = self.request(Request::chat_message(text, hub_urls)).await?;
        Ok(SendAck::parse(&reply))
    }

    /// Next inbound frame for the listen loop: parked frames first, then the wire.
    pub async fn next_frame(&mut self) -> Result<String> {
        match self.parked.pop_front() {
            Some(frame) => Ok(frame),
            None => self.recv().await,
        }
    }

    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }
}
