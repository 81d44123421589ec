//! Error types for Gamesbot

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    ConfigError(String),

    #[error("knowledge index error: {path} - {message}")]
    KnowledgeIndex { path: String, message: String },

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    #[error("authentication failed: {reason}")]
    AuthFailed { reason: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("division by zero: {lhs} / 0")]
    DivisionByZero { lhs: i64 },

    #[error("arithmetic overflow: {lhs} {op} {rhs}")]
    ArithmeticOverflow { lhs: i64, op: char, rhs: i64 },

    #[error("no frame received within {0:?}")]
    ReadTimeout(std::time::Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn auth_failed(reason: impl Into<String>) -> Self {
        Self::AuthFailed {
            reason: reason.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub fn knowledge_index(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        Self::KnowledgeIndex {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Errors that end the session rather than a single dispatch cycle.
    /// A failed index flush is not one of them; the next learned word
    /// rewrites the whole file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_)
                | Self::ConnectionFailed(_)
                | Self::ConnectionClosed(_)
                | Self::AuthFailed { .. }
                | Self::ReadTimeout(_)
                | Self::Cancelled
        )
    }

    /// Errors after which a fresh connection and handshake may succeed.
    /// A connection that cannot be opened at all is not retried.
    pub fn is_reconnectable(&self) -> bool {
        matches!(self, Self::ReadTimeout(_) | Self::ConnectionClosed(_))
    }
}
