//! Implementation of the VCL lexer
//!
//! Tokenization itself is handled entirely by logos. This module adds byte spans,
//! turns logos failures and unterminated strings into [`SyntaxError`]s and provides
//! the collecting convenience used by the parser.

use crate::vcl::ast::SourceLocation;
use crate::vcl::error::SyntaxError;
use crate::vcl::lexer::tokens::Token;
use logos::Logos;
use std::ops::Range;

/// Type alias for token with span
pub type TokenSpan = (Token, Range<usize>);

/// Lazy token stream over a source string
///
/// Each item is either a significant token with its byte span or a lexical error.
/// Errors do not end the stream; lexing resumes right after the offending input.
pub struct VclLexer<'source> {
    inner: logos::Lexer<'source, Token>,
    locations: SourceLocation,
}

impl<'source> VclLexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            locations: SourceLocation::new(source),
        }
    }
}

impl Iterator for VclLexer<'_> {
    type Item = Result<TokenSpan, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let location = self.locations.byte_range_to_ast_range(&span);

        Some(match result {
            Ok(Token::UnterminatedString) => Err(SyntaxError::UnterminatedString { location }),
            Ok(Token::UnterminatedComment) => Err(SyntaxError::UnterminatedComment { location }),
            Ok(token) => Ok((token, span)),
            Err(()) => Err(SyntaxError::InvalidCharacter {
                found: self.inner.slice().to_string(),
                location,
            }),
        })
    }
}

/// Convenience function to tokenize a string into tokens with spans plus lexical errors
pub fn tokenize_with_spans(source: &str) -> (Vec<TokenSpan>, Vec<SyntaxError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for item in VclLexer::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(error) => {
                tracing::debug!(%error, "lexical error");
                errors.push(error);
            }
        }
    }

    (tokens, errors)
}

/// Convenience function to tokenize a string, dropping spans and errors
pub fn tokenize(source: &str) -> Vec<Token> {
    VclLexer::new(source)
        .filter_map(|result| result.ok())
        .map(|(token, _)| token)
        .collect()
}
