//! Tests for gamesbot-core: wire protocol, inbound envelope, config loading, errors

use gamesbot_core::config::{FileConfig, DEFAULT_HOST_NICK};
use gamesbot_core::*;
use serde_json::{json, Value};
use std::time::Duration;

// ===========================================================================
// Requests
// ===========================================================================

#[test]
fn authorize_request_shape() {
    let req = Request::authorize(json!({"user": "bot", "password": "pw"})).with_callback_id(1);
    let v: Value = serde_json::from_str(&req.to_frame().unwrap()).unwrap();
    assert_eq!(
        v,
        json!({
            "method": "POST",
            "path": "/sessions/authorize",
            "callback_id": 1,
            "data": {"user": "bot", "password": "pw"}
        })
    );
}

#[test]
fn list_hubs_request_has_no_data() {
    let req = Request::list_hubs().with_callback_id(2);
    let v: Value = serde_json::from_str(&req.to_frame().unwrap()).unwrap();
    assert_eq!(v, json!({"method": "GET", "path": "/hubs", "callback_id": 2}));
}

#[test]
fn listener_request_has_no_callback_id() {
    let req = Request::listen_hub_messages(&HubId::new("abc"));
    let v: Value = serde_json::from_str(&req.to_frame().unwrap()).unwrap();
    assert_eq!(
        v,
        json!({"method": "POST", "path": "/hubs/abc/listeners/hub_message"})
    );
}

#[test]
fn chat_message_request_shape() {
    let hubs = vec!["adcs://hub.example:411".to_string()];
    let req = Request::chat_message("42", &hubs).with_callback_id(7);
    let v: Value = serde_json::from_str(&req.to_frame().unwrap()).unwrap();
    assert_eq!(v["path"], "/hubs/chat_message");
    assert_eq!(v["callback_id"], 7);
    assert_eq!(v["data"]["text"], "42");
    assert_eq!(v["data"]["hub_urls"], json!(["adcs://hub.example:411"]));
}

// ===========================================================================
// Replies
// ===========================================================================

#[test]
fn hub_listing_takes_first_id() {
    let hub = parse_hub_listing(r#"{"data": [{"id": "h1"}, {"id": "h2"}]}"#).unwrap();
    assert_eq!(hub.as_str(), "h1");
}

#[test]
fn hub_listing_numeric_id() {
    let hub = parse_hub_listing(r#"{"data": [{"id": 17}]}"#).unwrap();
    assert_eq!(hub.as_str(), "17");
}

#[test]
fn hub_listing_empty_or_malformed_is_protocol_error() {
    for frame in [
        r#"{"data": []}"#,
        r#"{"data": {}}"#,
        r#"{"data": [{"name": "x"}]}"#,
        r#"{}"#,
        "not json",
    ] {
        match parse_hub_listing(frame) {
            Err(Error::Protocol(_)) => {}
            other => panic!("expected protocol error for {}, got {:?}", frame, other),
        }
    }
}

#[test]
fn send_ack_variants() {
    assert_eq!(SendAck::parse(r#"{"sent": 1}"#), SendAck::Sent);
    assert!(SendAck::parse(r#"{"sent": true}"#).is_sent());
    assert_eq!(SendAck::parse(r#"{"sent": 0}"#), SendAck::NotSent(json!(0)));
    assert!(matches!(SendAck::parse(r#"{"ok": 1}"#), SendAck::Malformed(_)));
    assert!(matches!(SendAck::parse(r#"[1]"#), SendAck::Malformed(_)));
    assert!(matches!(SendAck::parse("garbage"), SendAck::Malformed(_)));
}

#[test]
fn auth_outcome_variants() {
    assert_eq!(AuthOutcome::parse(r#"{"data": {"session": "x"}}"#), AuthOutcome::Accepted);
    assert_eq!(
        AuthOutcome::parse(r#"{"error": "invalid password"}"#),
        AuthOutcome::Rejected("invalid password".into())
    );
    assert_eq!(
        AuthOutcome::parse(r#"{"data": {"error": {"message": "expired"}}}"#),
        AuthOutcome::Rejected("expired".into())
    );
    assert_eq!(
        AuthOutcome::parse(r#"{"status": 401}"#),
        AuthOutcome::Rejected("status 401".into())
    );
    assert_eq!(AuthOutcome::parse(r#"{}"#), AuthOutcome::Unrecognized);
    assert_eq!(AuthOutcome::parse(""), AuthOutcome::Unrecognized);
}

#[test]
fn reply_callback_id_extraction() {
    assert_eq!(reply_callback_id(r#"{"callback_id": 4, "sent": 1}"#), Some(4));
    assert_eq!(reply_callback_id(r#"{"sent": 1}"#), None);
    assert_eq!(reply_callback_id("nope"), None);
}

// ===========================================================================
// Inbound messages
// ===========================================================================

#[test]
fn inbound_message_decodes_envelope() {
    let frame = json!({
        "data": {
            "text": "Question 1 of 10. Mathematics: What is 1 + 1 =",
            "from": {"nick": DEFAULT_HOST_NICK, "id": 99},
            "extra": true
        }
    })
    .to_string();
    let msg = InboundMessage::from_frame(&frame).unwrap();
    assert_eq!(msg.sender_nick(), DEFAULT_HOST_NICK);
    assert!(msg.text.starts_with("Question 1"));
}

#[test]
fn inbound_message_missing_fields() {
    assert!(InboundMessage::from_frame(r#"{"sent": 1}"#).is_none());
    assert!(InboundMessage::from_frame(r#"{"data": {"from": {"nick": "a"}}}"#).is_none());
    assert!(InboundMessage::from_frame(r#"{"data": {"text": "hi"}}"#).is_none());
    assert!(InboundMessage::from_frame("{").is_none());
}

// ===========================================================================
// Config
// ===========================================================================

#[test]
fn config_load_full_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "creds": {"username": "bot", "password": "pw"},
            "hub_urls": ["adc://hub:411"],
            "own_nick": "quizzer",
            "host_nick": "Host",
            "words_file": "data/words.json",
            "session": {"read_timeout_secs": 30, "correlate_by_id": true, "strict_auth": true, "reconnect": true}
        }"#,
    )
    .unwrap();

    let file = FileConfig::load(&path).unwrap();
    let config = BotConfig::from_file(file, "127.0.0.1:5000", "token", dir.path()).unwrap();
    assert_eq!(config.own_nick, "quizzer");
    assert_eq!(config.host_nick, "Host");
    assert_eq!(config.hub_urls, vec!["adc://hub:411".to_string()]);
    assert_eq!(config.words_path, dir.path().join("data/words.json"));
    assert_eq!(config.session.correlation, CorrelationMode::ById);
    assert_eq!(config.session.read_timeout, Some(Duration::from_secs(30)));
    assert!(config.session.strict_auth);
    assert!(config.session.reconnect);
}

#[test]
fn config_defaults_match_reference_behavior() {
    let file: FileConfig =
        serde_json::from_str(r#"{"creds": null, "hub_urls": [], "own_nick": "me"}"#).unwrap();
    let opts = SessionOptions::from(&file.session);
    assert_eq!(opts, SessionOptions::default());
    assert_eq!(opts.correlation, CorrelationMode::ArrivalOrder);
    assert!(opts.read_timeout.is_none());
    assert!(!opts.strict_auth);
}

#[test]
fn config_missing_file_is_config_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = FileConfig::load(&dir.path().join("config.json")).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
}

#[test]
fn config_invalid_json_is_config_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"creds": {}, "own_nick": 5}"#).unwrap();
    let err = FileConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
    assert!(err.to_string().contains("invalid config"));
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_classification() {
    assert!(Error::ConnectionClosed("eof".into()).is_fatal());
    assert!(Error::ReadTimeout(Duration::from_secs(30)).is_reconnectable());
    assert!(!Error::DivisionByZero { lhs: 4 }.is_fatal());
    assert!(!Error::protocol("bad").is_fatal());
    assert!(!Error::knowledge_index("/w.json", "disk full").is_fatal());
    assert!(!Error::auth_failed("nope").is_reconnectable());
    assert!(Error::ConnectionFailed("refused".into()).is_fatal());
    assert!(!Error::ConnectionFailed("refused".into()).is_reconnectable());
}

#[test]
fn error_display() {
    assert_eq!(
        Error::DivisionByZero { lhs: 8 }.to_string(),
        "division by zero: 8 / 0"
    );
    assert_eq!(
        Error::auth_failed("bad token").to_string(),
        "authentication failed: bad token"
    );
}
