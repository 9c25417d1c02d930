//! Diagnostics produced by the lexer, parser and decoder
//!
//! Nothing in the pipeline raises: every failure becomes one of these values and is
//! accumulated next to whatever partial result could still be built.

use crate::vcl::ast::Range;
use serde::Serialize;
use thiserror::Error;

/// Lexical and syntax errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntaxError {
    #[error("{location}: invalid character {found:?}")]
    InvalidCharacter { found: String, location: Range },

    #[error("{location}: unterminated string literal")]
    UnterminatedString { location: Range },

    #[error("{location}: unterminated block comment")]
    UnterminatedComment { location: Range },

    #[error("{location}: expected {expected}, found {found:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: Range,
    },

    #[error("{location}: expected {expected}, found end of input")]
    UnexpectedEnd { expected: String, location: Range },
}

impl SyntaxError {
    pub fn location(&self) -> &Range {
        match self {
            SyntaxError::InvalidCharacter { location, .. }
            | SyntaxError::UnterminatedString { location }
            | SyntaxError::UnterminatedComment { location }
            | SyntaxError::UnexpectedToken { location, .. }
            | SyntaxError::UnexpectedEnd { location, .. } => location,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            SyntaxError::InvalidCharacter { .. }
                | SyntaxError::UnterminatedString { .. }
                | SyntaxError::UnterminatedComment { .. }
        )
    }
}

/// Errors found while populating a record from a program
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeError {
    /// A value could not be converted into the field's type
    #[error("{location}: cannot decode {found:?} into `{field}`, expected {expected}")]
    Coercion {
        field: String,
        expected: String,
        found: String,
        location: Range,
    },

    /// A second block for a field that holds at most one
    #[error("{location}: duplicate `{block}` block, only the first one is kept")]
    DuplicateBlock { block: String, location: Range },

    /// The record's field declarations cannot be decoded into
    #[error("invalid field `{field}` on `{target}`: {reason}")]
    TargetShape {
        target: String,
        field: String,
        reason: String,
    },
}

impl DecodeError {
    pub fn location(&self) -> Option<&Range> {
        match self {
            DecodeError::Coercion { location, .. } | DecodeError::DuplicateBlock { location, .. } => {
                Some(location)
            }
            DecodeError::TargetShape { .. } => None,
        }
    }
}

/// Failure of the whole source-to-record pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{}", summarize("syntax", .0))]
    Syntax(Vec<SyntaxError>),

    #[error("{}", summarize("decode", .0))]
    Decode(Vec<DecodeError>),
}

fn summarize<E: std::fmt::Display>(stage: &str, errors: &[E]) -> String {
    match errors {
        [] => format!("{} failed", stage),
        [only] => format!("{} error: {}", stage, only),
        [first, rest @ ..] => format!("{} error: {} (and {} more)", stage, first, rest.len()),
    }
}

/// Format source code context around an error location
///
/// Shows 2 lines before the error, the error line with >> marker, and 2 lines after.
pub fn format_source_context(source: &str, range: &Range) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = range.start.line;

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();

    for (line_num, line) in lines.iter().enumerate().take(end_line).skip(start_line) {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, line));
    }

    context
}
