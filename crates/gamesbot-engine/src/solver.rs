//! Solvers: integer arithmetic and anagram lookup

use crate::index::{signature, KnowledgeIndex};
use gamesbot_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => 'x',
            Self::Divide => '/',
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Self::Add),
            "-" => Ok(Self::Subtract),
            "x" | "X" | "*" | "\u{00d7}" => Ok(Self::Multiply),
            "/" => Ok(Self::Divide),
            other => Err(Error::Internal(format!("unknown operator: {:?}", other))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Evaluate `lhs op rhs`. Division truncates toward zero.
pub fn solve(lhs: i64, op: Operator, rhs: i64) -> Result<i64> {
    let result = match op {
        Operator::Add => lhs.checked_add(rhs),
        Operator::Subtract => lhs.checked_sub(rhs),
        Operator::Multiply => lhs.checked_mul(rhs),
        Operator::Divide => {
            if rhs == 0 {
                return Err(Error::DivisionByZero { lhs });
            }
            lhs.checked_div(rhs)
        }
    };
    result.ok_or(Error::ArithmeticOverflow {
        lhs,
        op: op.symbol(),
        rhs,
    })
}

/// Drop separators and uppercase: `"t a c"` → `"TAC"`.
pub fn normalize_letters(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Every known word sharing the scrambled letters' signature.
pub fn resolve_anagram<'a>(index: &'a KnowledgeIndex, scrambled: &str) -> Option<&'a [String]> {
    index.lookup(&signature(&normalize_letters(scrambled)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_arithmetic() {
        assert_eq!(solve(7, Operator::Add, 5).unwrap(), 12);
        assert_eq!(solve(9, Operator::Subtract, 4).unwrap(), 5);
        assert_eq!(solve(6, Operator::Multiply, 7).unwrap(), 42);
        assert_eq!(solve(8, Operator::Divide, 2).unwrap(), 4);
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(solve(7, Operator::Divide, 2).unwrap(), 3);
        assert_eq!(solve(-7, Operator::Divide, 2).unwrap(), -3);
        assert_eq!(solve(7, Operator::Divide, -2).unwrap(), -3);
    }

    #[test]
    fn division_by_zero_faults() {
        assert!(matches!(
            solve(5, Operator::Divide, 0),
            Err(Error::DivisionByZero { lhs: 5 })
        ));
    }

    #[test]
    fn overflow_faults() {
        assert!(matches!(
            solve(i64::MAX, Operator::Add, 1),
            Err(Error::ArithmeticOverflow { .. })
        ));
        assert!(solve(i64::MIN, Operator::Divide, -1).is_err());
    }

    #[test]
    fn operator_symbols() {
        assert_eq!("x".parse::<Operator>().unwrap(), Operator::Multiply);
        assert_eq!("-".parse::<Operator>().unwrap(), Operator::Subtract);
        assert!("%".parse::<Operator>().is_err());
        assert_eq!(Operator::Divide.to_string(), "/");
    }

    #[test]
    fn normalize_strips_spaces() {
        assert_eq!(normalize_letters("T E N A L P"), "TENALP");
        assert_eq!(normalize_letters("a b"), "AB");
    }
}
