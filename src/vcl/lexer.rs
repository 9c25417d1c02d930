//! Lexer module for VCL source
//!
//! Source text is turned into a flat stream of significant tokens, each paired with its
//! byte span. Line and column positions are recovered from those spans on demand through
//! [SourceLocation](crate::vcl::ast::SourceLocation), which keeps the token stream small.

pub mod lexer_impl;
pub mod tokens;

pub use lexer_impl::{tokenize, tokenize_with_spans, TokenSpan, VclLexer};
pub use tokens::Token;
