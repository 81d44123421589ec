//! Frame transport: the socket under a session
//!
//! The session only needs "send one text frame" and "receive the next text
//! frame". The WebSocket implementation is what the binary uses; tests
//! plug in scripted transports.

use futures::{SinkExt, StreamExt};
use gamesbot_core::{Error, Result};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMsg, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info};

#[async_trait::async_trait]
pub trait FrameTransport: Send {
    async fn send_frame(&mut self, frame: String) -> Result<()>;

    /// Next text frame. `Ok(None)` once the peer has closed the connection.
    async fn recv_frame(&mut self) -> Result<Option<String>>;

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Opens a fresh transport; called once per (re)connection.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    type Transport: FrameTransport;

    async fn connect(&self) -> Result<Self::Transport>;
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::ConnectionFailed(format!("{}: {}", url, e)))?;
        info!("Connected to {}", url);
        Ok(Self { stream })
    }
}

#[async_trait::async_trait]
impl FrameTransport for WsTransport {
    async fn send_frame(&mut self, frame: String) -> Result<()> {
        self.stream
            .send(WsMsg::Text(frame))
            .await
            .map_err(|e| Error::ConnectionClosed(e.to_string()))
    }

    async fn recv_frame(&mut self) -> Result<Option<String>> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMsg::Text(text))) => return Ok(Some(text)),
                Some(Ok(WsMsg::Binary(bytes))) => {
                    return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Some(Ok(WsMsg::Close(frame))) => {
                    debug!("close frame: {:?}", frame);
                    return Ok(None);
                }
                Some(Ok(_)) => continue, // tungstenite answers pings itself
                Some(Err(e)) => return Err(Error::ConnectionClosed(e.to_string())),
                None => return Ok(None),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        let _ = self.stream.send(WsMsg::Close(None)).await;
        Ok(())
    }
}

/// Connects to a fixed `ws://` URL.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self) -> Result<WsTransport> {
        WsTransport::connect(&self.url).await
    }
}
