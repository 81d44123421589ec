//! Hub wire protocol: one JSON object per WebSocket frame
//!
//! Client → Hub (request):
//!   { "method": "POST", "path": "/sessions/authorize", "callback_id": 1, "data": { ... } }
//!   { "method": "GET", "path": "/hubs", "callback_id": 2 }
//!   { "method": "POST", "path": "/hubs/{hub}/listeners/hub_message" }
//!   { "method": "POST", "path": "/hubs/chat_message", "callback_id": 3,
//!     "data": { "text": "42", "hub_urls": ["..."] } }
//!
//! Hub → Client (reply or pushed event):
//!   { "data": [ { "id": "hub-1", ... } ] }            hub listing
//!   { "sent": 1 }                                     chat post acknowledgement
//!   { "data": { "text": "...", "from": { "nick": "..." } } }   hub message event

use crate::error::{Error, Result};
use crate::types::HubId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Client → Hub
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// A tagged request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            callback_id: None,
            data: None,
        }
    }

    pub fn with_callback_id(mut self, id: u64) -> Self {
        self.callback_id = Some(id);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// `POST /sessions/authorize` carrying the credential payload verbatim.
    pub fn authorize(credentials: Value) -> Self {
        Self::new(Method::Post, "/sessions/authorize").with_data(credentials)
    }

    /// `GET /hubs`.
    pub fn list_hubs() -> Self {
        Self::new(Method::Get, "/hubs")
    }

    /// `POST /hubs/{hub}/listeners/hub_message`.
    pub fn listen_hub_messages(hub: &HubId) -> Self {
        Self::new(Method::Post, format!("/hubs/{}/listeners/hub_message", hub))
    }

    /// `POST /hubs/chat_message`.
    pub fn chat_message(text: &str, hub_urls: &[String]) -> Self {
        Self::new(Method::Post, "/hubs/chat_message").with_data(serde_json::json!({
            "text": text,
            "hub_urls": hub_urls,
        }))
    }

    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ---------------------------------------------------------------------------
// Hub → Client: replies
// ---------------------------------------------------------------------------

/// The `callback_id` echoed by a reply, if the hub included one.
pub fn reply_callback_id(frame: &str) -> Option<u64> {
    let v: Value = serde_json::from_str(frame).ok()?;
    v.get("callback_id").and_then(|id| id.as_u64())
}

/// Extract the first hub id from a `GET /hubs` reply.
pub fn parse_hub_listing(frame: &str) -> Result<HubId> {
    let v: Value = serde_json::from_str(frame)
        .map_err(|e| Error::protocol(format!("hub listing is not JSON: {}", e)))?;
    let hubs = v
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| Error::protocol("hub listing has no data array"))?;
    let first = hubs
        .first()
        .ok_or_else(|| Error::protocol("hub listing is empty"))?;
    match first.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Ok(HubId::new(s.as_str())),
        Some(Value::Number(n)) => Ok(HubId::new(n.to_string())),
        _ => Err(Error::protocol("first hub has no usable id")),
    }
}

/// Outcome of a chat post acknowledgement.
#[derive(Debug, Clone, PartialEq)]
pub enum SendAck {
    /// `{"sent": 1}`
    Sent,
    /// Decoded, but `sent` was something other than 1.
    NotSent(Value),
    /// Not JSON, not an object, or no `sent` field.
    Malformed(String),
}

impl SendAck {
    pub fn parse(frame: &str) -> Self {
        let v: Value = match serde_json::from_str(frame) {
            Ok(v) => v,
            Err(e) => return Self::Malformed(e.to_string()),
        };
        match v.get("sent") {
            Some(sent) if sent.as_f64() == Some(1.0) || sent.as_bool() == Some(true) => Self::Sent,
            Some(sent) => Self::NotSent(sent.clone()),
            None => Self::Malformed("missing field `sent`".to_string()),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// What the hub said about an authorize request.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Accepted,
    Rejected(String),
    /// The reply carried neither an error nor a recognisable success shape.
    Unrecognized,
}

impl AuthOutcome {
    pub fn parse(frame: &str) -> Self {
        let v: Value = match serde_json::from_str(frame) {
            Ok(v) => v,
            Err(_) => return Self::Unrecognized,
        };
        if let Some(reason) = error_text(&v).or_else(|| v.get("data").and_then(error_text)) {
            return Self::Rejected(reason);
        }
        match v.get("status").and_then(|s| s.as_u64()) {
            Some(code) if code >= 400 => return Self::Rejected(format!("status {}", code)),
            Some(_) => return Self::Accepted,
            None => {}
        }
        if v.get("data").map_or(false, |d| !d.is_null()) {
            Self::Accepted
        } else {
            Self::Unrecognized
        }
    }
}

fn error_text(v: &Value) -> Option<String> {
    match v.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => Some(
            o.get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
                .unwrap_or_else(|| Value::Object(o.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}
