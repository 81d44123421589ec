//! Pattern dispatcher: ordered recognizers over host messages
//!
//! Recognizers are tried in a fixed order, anchored at the start of the
//! message; the first match wins. Each one yields a typed capture record so
//! handlers never touch capture groups by name.

use crate::solver::{normalize_letters, Operator};
use gamesbot_core::{Error, Result};
use regex::{Captures, Regex};
use std::fmt;

const NUMBERS: &str = r"Question [0-9]{1,2} of [0-9]{2}. Mathematics: What is (?P<num1>[0-9]{1,4}) (?P<op>[-+/x]{1}) (?P<num2>[0-9]{1,4}) =";
const ANAGRAMS: &str = r"Question [0-9]{1,2} of [0-9]{2}. The word is: (?P<anagram>[A-Z]{1}( [A-Z]){0,10}) ?";
const NO_ONE: &str = r"No one got that. The correct answer is '(?P<new_word>[A-Z]{1,10})'";
const OTHER_USER: &str = r"(?P<nick>[a-zA-Z0-9 !@#$%^&*)(]{2,50}) got the correct answer '(?P<new_word>[A-Z]{1,10})' in [0-9]{1,3} seconds";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecognizerKind {
    Numbers,
    Anagrams,
    NoOne,
    OtherUser,
}

impl RecognizerKind {
    /// Dispatch order.
    pub const ALL: [Self; 4] = [Self::Numbers, Self::Anagrams, Self::NoOne, Self::OtherUser];

    pub fn name(self) -> &'static str {
        match self {
            Self::Numbers => "numbers",
            Self::Anagrams => "anagrams",
            Self::NoOne => "no_one",
            Self::OtherUser => "other_user",
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Self::Numbers => NUMBERS,
            Self::Anagrams => ANAGRAMS,
            Self::NoOne => NO_ONE,
            Self::OtherUser => OTHER_USER,
        }
    }
}

impl fmt::Display for RecognizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recognized host message with its captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognized {
    Numbers { lhs: i64, op: Operator, rhs: i64 },
    /// Scrambled letters with the separating spaces removed.
    Anagram { letters: String },
    NoOne { word: String },
    OtherUser { nick: String, word: String },
}

impl Recognized {
    pub fn kind(&self) -> RecognizerKind {
        match self {
            Self::Numbers { .. } => RecognizerKind::Numbers,
            Self::Anagram { .. } => RecognizerKind::Anagrams,
            Self::NoOne { .. } => RecognizerKind::NoOne,
            Self::OtherUser { .. } => RecognizerKind::OtherUser,
        }
    }
}

pub struct Dispatcher {
    recognizers: Vec<(RecognizerKind, Regex)>,
}

impl Dispatcher {
    pub fn new() -> Result<Self> {
        let recognizers = RecognizerKind::ALL
            .iter()
            .map(|&kind| {
                Regex::new(&format!("^{}", kind.pattern()))
                    .map(|re| (kind, re))
                    .map_err(|e| Error::Internal(format!("pattern {}: {}", kind, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { recognizers })
    }

    /// First recognizer matching `text`, or `None` if the message is not a
    /// known format.
    pub fn recognize(&self, text: &str) -> Result<Option<Recognized>> {
        for (kind, re) in &self.recognizers {
            if let Some(caps) = re.captures(text) {
                return extract(*kind, &caps).map(Some);
            }
        }
        Ok(None)
    }
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> Result<&'t str> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Internal(format!("missing capture group {}", name)))
}

fn number(caps: &Captures<'_>, name: &str) -> Result<i64> {
    group(caps, name)?
        .parse()
        .map_err(|e| Error::Internal(format!("capture {}: {}", name, e)))
}

fn extract(kind: RecognizerKind, caps: &Captures<'_>) -> Result<Recognized> {
    Ok(match kind {
        RecognizerKind::Numbers => Recognized::Numbers {
            lhs: number(caps, "num1")?,
            op: group(caps, "op")?.parse()?,
            rhs: number(caps, "num2")?,
        },
        RecognizerKind::Anagrams => Recognized::Anagram {
            letters: normalize_letters(group(caps, "anagram")?),
        },
        RecognizerKind::NoOne => Recognized::NoOne {
            word: group(caps, "new_word")?.to_string(),
        },
        RecognizerKind::OtherUser => Recognized::OtherUser {
            nick: group(caps, "nick")?.to_string(),
            word: group(caps, "new_word")?.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new().unwrap()
    }

    #[test]
    fn numbers_question() {
        let r = dispatcher()
            .recognize("Question 3 of 20. Mathematics: What is 14 + 28 =")
            .unwrap();
        assert_eq!(
            r,
            Some(Recognized::Numbers { lhs: 14, op: Operator::Add, rhs: 28 })
        );
    }

    #[test]
    fn anagram_question_joins_letters() {
        let r = dispatcher()
            .recognize("Question 12 of 20. The word is: T E N A L P ")
            .unwrap();
        assert_eq!(r, Some(Recognized::Anagram { letters: "TENALP".into() }));
    }

    #[test]
    fn anagram_letter_limit() {
        // Eleven letters captured at most; extra letters are left unmatched.
        let r = dispatcher()
            .recognize("Question 1 of 10. The word is: A B C D E F G H I J K L")
            .unwrap();
        assert_eq!(r, Some(Recognized::Anagram { letters: "ABCDEFGHIJK".into() }));
    }

    #[test]
    fn no_one_reveal() {
        let r = dispatcher()
            .recognize("No one got that. The correct answer is 'PLANET'")
            .unwrap();
        assert_eq!(r, Some(Recognized::NoOne { word: "PLANET".into() }));
    }

    #[test]
    fn other_user_reveal() {
        let r = dispatcher()
            .recognize("Big Al! got the correct answer 'STONE' in 12 seconds")
            .unwrap();
        assert_eq!(
            r,
            Some(Recognized::OtherUser { nick: "Big Al!".into(), word: "STONE".into() })
        );
    }

    #[test]
    fn anchored_at_start() {
        let d = dispatcher();
        assert_eq!(
            d.recognize("Hint: Question 3 of 20. Mathematics: What is 1 + 2 =").unwrap(),
            None
        );
        assert_eq!(
            d.recognize(">> No one got that. The correct answer is 'CAT'").unwrap(),
            None
        );
    }

    #[test]
    fn unknown_text_is_ignored() {
        assert_eq!(dispatcher().recognize("Welcome to the quiz!").unwrap(), None);
    }
}
