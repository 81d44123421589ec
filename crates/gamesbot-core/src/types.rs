//! Core types for Gamesbot

use serde::Deserialize;
use std::sync::Arc;

/// Hub identifier - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct HubId(Arc<str>);

impl HubId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HubId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HubId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Who posted a hub message.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Sender {
    pub nick: String,
}

/// A chat message pushed by the hub.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InboundMessage {
    pub text: String,
    pub from: Sender,
}

#[derive(Deserialize)]
struct Envelope {
    data: InboundMessage,
}

impl InboundMessage {
    /// Decode a hub message event. `None` when the frame lacks the
    /// `data.text` / `data.from.nick` envelope.
    pub fn from_frame(frame: &str) -> Option<Self> {
        serde_json::from_str::<Envelope>(frame)
            .ok()
            .map(|envelope| envelope.data)
    }

    pub fn sender_nick(&self) -> &str {
        &self.from.nick
    }
}
