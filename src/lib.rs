//! # vcl
//!
//! A front-end and generic decoder for a block-structured, Varnish-style configuration
//! language.
//!
//! Source text flows through three stages:
//!
//! 1. [lexer](vcl::lexer) - logos based tokenization with byte and line positions
//! 2. [parser](vcl::parser) - chumsky combinators producing a [Program](vcl::ast::Program)
//!    of attributes, blocks and flat statements
//! 3. [decoder](vcl::decoder) - maps a program onto caller-defined records, driven by the
//!    field declarations of each [Record](vcl::decoder::Record)
//!
//! Errors never abort the pipeline: parsing yields a partial program plus syntax errors
//! and decoding accumulates every problem it finds while populating as much of the target
//! as it can.

pub mod vcl;

pub use vcl::ast::{Attribute, AttributeValue, Block, Body, Expression, Program, Statement};
pub use vcl::decoder::{
    decode, decode_body, get_field_tags, infer_body_schema, BlockSlot, FieldTag, FieldTags, Fields,
    FromValue, Record,
};
pub use vcl::error::{DecodeError, Error, SyntaxError};
pub use vcl::parser::{parse_program, Parsed};

/// Parse `source` and decode it into a fresh `T`.
///
/// Any syntax error fails the whole call before decoding starts. Decode errors are
/// returned together, after the best-effort decode has finished.
pub fn from_str<T: Record>(source: &str) -> Result<T, Error> {
    let program = parse_program(source).into_result().map_err(Error::Syntax)?;
    let mut target = T::default();
    let errors = decode(&program, &mut target);
    if errors.is_empty() {
        Ok(target)
    } else {
        Err(Error::Decode(errors))
    }
}
