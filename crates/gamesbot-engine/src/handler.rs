//! Game handler: turns one host message into the texts to post back
//!
//! Owns the dispatcher and the knowledge index. Learning is flushed to disk
//! before the outcome is returned, so anything the caller sends afterwards
//! reflects persisted state.

use crate::dispatch::{Dispatcher, Recognized, RecognizerKind};
use crate::index::KnowledgeIndex;
use crate::solver::{resolve_anagram, solve};
use gamesbot_core::Result;
use tracing::debug;

pub const LEARNT_ACK: &str = "New word learnt.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a known question or reveal format.
    Ignored,
    /// Answers to post, one chat message each.
    Answer {
        kind: RecognizerKind,
        texts: Vec<String>,
    },
    /// Anagram whose signature is not in the index yet.
    Unresolved { letters: String },
    /// A revealed word was added to the index.
    Learned {
        word: String,
        signature: String,
        ack: Option<String>,
    },
}

impl Outcome {
    /// Chat messages to post for this outcome, in order.
    pub fn outbound(&self) -> Vec<String> {
        match self {
            Self::Answer { texts, .. } => texts.clone(),
            Self::Learned { ack: Some(ack), .. } => vec![ack.clone()],
            _ => Vec::new(),
        }
    }
}

pub struct GameHandler {
    dispatcher: Dispatcher,
    index: KnowledgeIndex,
    own_nick: String,
}

impl GameHandler {
    pub fn new(index: KnowledgeIndex, own_nick: impl Into<String>) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new()?,
            index,
            own_nick: own_nick.into(),
        })
    }

    pub fn index(&self) -> &KnowledgeIndex {
        &self.index
    }

    pub fn own_nick(&self) -> &str {
        &self.own_nick
    }

    /// Classify `text` and run the matching solver.
    pub fn handle(&mut self, text: &str) -> Result<Outcome> {
        let recognized = match self.dispatcher.recognize(text)? {
            Some(r) => r,
            None => return Ok(Outcome::Ignored),
        };
        debug!("recognized {}", recognized.kind());

        match recognized {
            Recognized::Numbers { lhs, op, rhs } => {
                let answer = solve(lhs, op, rhs)?;
                Ok(Outcome::Answer {
                    kind: RecognizerKind::Numbers,
                    texts: vec![answer.to_string()],
                })
            }
            Recognized::Anagram { letters } => match resolve_anagram(&self.index, &letters) {
                Some(words) => Ok(Outcome::Answer {
                    kind: RecognizerKind::Anagrams,
                    texts: words.to_vec(),
                }),
                None => Ok(Outcome::Unresolved { letters }),
            },
            Recognized::NoOne { word } => {
                let signature = self.index.learn(word.as_str())?;
                Ok(Outcome::Learned {
                    word,
                    signature,
                    ack: Some(LEARNT_ACK.to_string()),
                })
            }
            Recognized::OtherUser { nick, word } => {
                let signature = self.index.learn(word.as_str())?;
                let ack = if nick == self.own_nick {
                    None
                } else {
                    Some(format!("{} Thanks {}", LEARNT_ACK, nick))
                };
                Ok(Outcome::Learned {
                    word,
                    signature,
                    ack,
                })
            }
        }
    }
}
