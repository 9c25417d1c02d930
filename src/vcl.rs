//! Main module for vcl library functionality

pub mod ast;
pub mod decoder;
pub mod error;
pub mod formats;
pub mod lexer;
pub mod parser;
pub mod schema;
