//! AST definitions for VCL programs
//!
//! - `range` - Position and Range types plus byte offset conversion
//! - `node` - Program, statement and expression node types

pub mod node;
pub mod range;

pub use node::{
    AstNode, Attribute, AttributeValue, Block, Body, Directive, Expression, ExpressionKind,
    ExpressionStatement, Label, Operator, Program, Statement,
};
pub use range::{Position, Range, SourceLocation};
