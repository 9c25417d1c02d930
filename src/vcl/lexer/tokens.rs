//! Token definitions for VCL source
//!
//! Tokens are defined with the logos derive macro. Whitespace and the three comment forms
//! (`#`, `//` and `/* */`) are skipped by the lexer itself, so the parser only ever sees
//! significant tokens.
use crate::vcl::ast::Operator;
use logos::{FilterResult, Logos};
use serde::Serialize;
use std::fmt;

#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("=")]
    Assign,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("~")]
    Tilde,
    #[token("!~")]
    BangTilde,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,

    // A leading '.' marks implicit members such as `.host`
    #[regex(r"[A-Za-z_.][A-Za-z0-9_.\-]*")]
    Ident,

    #[regex(r#""[^"\n]*""#)]
    String,

    // Reported as a lexical error, never handed to the parser
    #[regex(r#""[^"\n]*"#)]
    UnterminatedString,

    // Closed comments are skipped by the callback; an unclosed one runs to end of input
    #[token("/*", block_comment)]
    UnterminatedComment,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"[0-9]+(\.[0-9]+)?(ms|s|m|h|d|w|y)")]
    Duration,
}

fn block_comment(lex: &mut logos::Lexer<Token>) -> FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Emit(())
        }
    }
}

impl Token {
    /// Tokens that can stand alone as an expression operand
    pub fn is_operand(&self) -> bool {
        matches!(
            self,
            Token::Ident | Token::String | Token::Number | Token::Duration
        )
    }

    /// Tokens that can name a block instance
    pub fn is_label(&self) -> bool {
        matches!(self, Token::Ident | Token::String)
    }

    pub fn prefix_operator(self) -> Option<Operator> {
        match self {
            Token::Bang => Some(Operator::Not),
            Token::Minus => Some(Operator::Subtract),
            _ => None,
        }
    }

    pub fn binary_operator(self) -> Option<Operator> {
        let op = match self {
            Token::Plus => Operator::Add,
            Token::Minus => Operator::Subtract,
            Token::Star => Operator::Multiply,
            Token::Slash => Operator::Divide,
            Token::EqualEqual => Operator::Equal,
            Token::BangEqual => Operator::NotEqual,
            Token::Tilde => Operator::Match,
            Token::BangTilde => Operator::NotMatch,
            Token::AndAnd => Operator::And,
            Token::OrOr => Operator::Or,
            Token::Less => Operator::Less,
            Token::Greater => Operator::Greater,
            Token::LessEqual => Operator::LessEqual,
            Token::GreaterEqual => Operator::GreaterEqual,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::OpenBrace => "'{'",
            Token::CloseBrace => "'}'",
            Token::OpenParen => "'('",
            Token::CloseParen => "')'",
            Token::Semicolon => "';'",
            Token::Comma => "','",
            Token::Assign => "'='",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::EqualEqual => "'=='",
            Token::BangEqual => "'!='",
            Token::Tilde => "'~'",
            Token::BangTilde => "'!~'",
            Token::AndAnd => "'&&'",
            Token::OrOr => "'||'",
            Token::Bang => "'!'",
            Token::Less => "'<'",
            Token::Greater => "'>'",
            Token::LessEqual => "'<='",
            Token::GreaterEqual => "'>='",
            Token::Ident => "identifier",
            Token::String => "string",
            Token::UnterminatedString => "unterminated string",
            Token::UnterminatedComment => "unterminated comment",
            Token::Number => "number",
            Token::Duration => "duration",
        };
        f.write_str(text)
    }
}
