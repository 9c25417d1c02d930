//! Parser module for VCL source
//!
//! Grammar (informal):
//!
//! ```text
//! Program       := Statement*
//! Statement     := Attribute | Block | FlatStatement | Directive
//! Attribute     := Identifier "=" (Expression | Body) ";"?
//! Block         := Identifier Label* Body ";"?
//! Body          := "{" Statement* "}"
//! FlatStatement := Expression ";"
//! Directive     := Identifier Expression ";"
//! Label         := Identifier | StringLiteral
//! Expression    := Prefix? Operand (BinaryOperator Prefix? Operand)*
//! Operand       := StringLiteral | Number | Duration | Identifier
//! ```
//!
//! A body is not classified as structured or flat here. Attributes, blocks and bare
//! expressions all land in the same ordered statement list and the decoder interprets
//! them against the target record.

pub mod api;
pub(crate) mod combinators;

pub use api::{parse_program, parse_tokens, Parsed};
