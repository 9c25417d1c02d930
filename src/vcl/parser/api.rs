//! Public API for the parser.

use chumsky::{Parser, Stream};
use serde::Serialize;
use std::ops::Range as ByteRange;
use std::sync::Arc;

use crate::vcl::ast::Program;
use crate::vcl::error::SyntaxError;
use crate::vcl::lexer::{tokenize_with_spans, TokenSpan};
use crate::vcl::parser::combinators::{statement, ParseContext};

/// A possibly partial program plus every lexical and syntax error found on the way
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parsed {
    pub program: Program,
    pub errors: Vec<SyntaxError>,
}

impl Parsed {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Keep the program only if nothing went wrong
    pub fn into_result(self) -> Result<Program, Vec<SyntaxError>> {
        if self.errors.is_empty() {
            Ok(self.program)
        } else {
            Err(self.errors)
        }
    }
}

/// Main parser function: lex and parse `source` into a [`Program`]
pub fn parse_program(source: &str) -> Parsed {
    let (tokens, mut lex_errors) = tokenize_with_spans(source);
    let mut parsed = parse_tokens(&tokens, source);
    lex_errors.append(&mut parsed.errors);
    parsed.errors = lex_errors;
    parsed
}

/// Parse an already lexed token stream
///
/// Top-level statements are parsed one at a time. The first statement that fails stops
/// parsing: its error is recorded and every statement completed before it is kept.
/// Each statement reads the token slice lazily, so tokens are visited only as far as the
/// statement needs them.
pub fn parse_tokens(tokens: &[TokenSpan], source: &str) -> Parsed {
    let ctx = Arc::new(ParseContext::new(source));
    let parser = statement(ctx.clone())
        .map_with_span(|statement, consumed: ByteRange<usize>| (statement, consumed));

    let mut statements = Vec::new();
    let mut errors = Vec::new();
    let mut cursor = 0;

    while cursor < tokens.len() {
        let remaining = &tokens[cursor..];
        let stream = Stream::from_iter(
            remaining.len()..remaining.len() + 1,
            remaining
                .iter()
                .cloned()
                .enumerate()
                .map(|(index, token)| (token, index..index + 1)),
        );
        match parser.parse(stream) {
            Ok((statement, consumed)) => {
                statements.push(statement);
                cursor += consumed.end.max(1);
            }
            Err(failures) => {
                for failure in &failures {
                    let error = ctx.syntax_error(failure);
                    tracing::debug!(%error, "parse aborted");
                    errors.push(error);
                }
                break;
            }
        }
    }

    Parsed {
        program: Program {
            statements,
            location: ctx.whole(),
        },
        errors,
    }
}
