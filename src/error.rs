//! The error taxonomy a proof check can fail with.
//!
//! `ParseError` and `InvalidProof` are kept as distinct observable outcomes
//! (the CLI maps them to different exit codes); `Internal` should never be
//! produced by a well-formed run and indicates a bug in this crate rather
//! than in the formula or proof being checked.

use std::fmt;

use crate::constraint::Constraint;

#[derive(Debug, Clone)]
pub enum CheckerError {
    /// Malformed formula or proof syntax, an unknown rule id, an RPN stack
    /// underflow/imbalance, or a wrong token count. `line`/`column` are
    /// 1-based and point at the offending token.
    Parse {
        message: String,
        line: usize,
        column: usize,
    },
    /// Rule `e`: the derived constraint did not match the one claimed.
    EqualityCheckFailed {
        expected: Box<Constraint>,
        got: Box<Constraint>,
    },
    /// Rule `c`: the antecedent was not a contradiction.
    ContradictionCheckFailed,
    /// An antecedent id referenced a constraint that doesn't exist yet.
    UnknownAntecedent { id: u64 },
    /// The proof ran to completion without ever succeeding at a goal rule
    /// (`e` or `c`).
    MissingGoal,
    /// A rule produced a number of constraints different from what it
    /// declared — an assertion violation in the interpreter, not a property
    /// of the input.
    Internal(String),
}

impl CheckerError {
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        CheckerError::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// True for the error kinds grouped under `InvalidProof`
    /// (`EqualityCheckFailed`, `ContradictionCheckFailed`, and the
    /// `ReferenceError` subclass `UnknownAntecedent`).
    pub fn is_invalid_proof(&self) -> bool {
        matches!(
            self,
            CheckerError::EqualityCheckFailed { .. }
                | CheckerError::ContradictionCheckFailed
                | CheckerError::UnknownAntecedent { .. }
                | CheckerError::MissingGoal
        )
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, CheckerError::Parse { .. })
    }
}

impl fmt::Display for CheckerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckerError::Parse {
                message,
                line,
                column,
            } => write!(f, "parse error at line {line}, column {column}: {message}"),
            CheckerError::EqualityCheckFailed { expected, got } => write!(
                f,
                "equality check failed: expected {expected}, got {got}"
            ),
            CheckerError::ContradictionCheckFailed => {
                write!(f, "contradiction check failed: antecedent is satisfiable")
            }
            CheckerError::UnknownAntecedent { id } => {
                write!(f, "antecedent {id} has not been derived yet")
            }
            CheckerError::MissingGoal => {
                write!(f, "proof completed without reaching any goal rule")
            }
            CheckerError::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for CheckerError {}
