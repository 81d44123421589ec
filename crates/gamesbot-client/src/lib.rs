//! Gamesbot Client - hub session, message loop, and diagnostic events

pub mod auth;
pub mod bot;
pub mod events;
pub mod session;
pub mod transport;

pub use auth::AuthPolicy;
pub use bot::{run, Bot, LoopState};
pub use events::{EventSink, HttpEventSink, LogSink};
pub use session::Session;
pub use transport::{Connector, FrameTransport, WsConnector, WsTransport};
