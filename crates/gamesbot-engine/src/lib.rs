//! Gamesbot Engine: question recognition, solving, and the learned word index
//!
//! Pure of any I/O except the knowledge index file. The client crate feeds
//! host messages in and posts the resulting texts.

pub mod dispatch;
pub mod handler;
pub mod index;
pub mod solver;

pub use dispatch::{Dispatcher, Recognized, RecognizerKind};
pub use handler::{GameHandler, Outcome, LEARNT_ACK};
pub use index::{signature, KnowledgeIndex};
pub use solver::{normalize_letters, resolve_anagram, solve, Operator};
