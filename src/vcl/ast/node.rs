//! AST node type definitions
//!
//! A [`Program`] is an ordered list of [`Statement`]s. Blocks nest the same statement
//! grammar, so the tree is unbounded in depth. All nodes are built once by the parser
//! and are read-only afterwards.

use super::range::Range;
use serde::Serialize;
use std::fmt;

/// Common interface for all AST nodes
pub trait AstNode {
    fn node_type(&self) -> &'static str;
    fn display_label(&self) -> String;
    fn location(&self) -> &Range;
}

/// Root of a parsed source file
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub location: Range,
}

/// A brace-delimited list of statements
///
/// Whether a body is structured (attributes and blocks) or flat (bare expressions) is
/// not decided here: both shapes share one statement list and the decoder reads it
/// according to the target field.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Body {
    pub statements: Vec<Statement>,
    pub location: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    /// `name = value;`
    Attribute(Attribute),
    /// `type label... { ... }`
    Block(Block),
    /// `keyword value;`, e.g. `vcl 4.1;`
    Directive(Directive),
    /// A bare `expression;` inside a flat body
    Expression(ExpressionStatement),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
    pub location: Range,
}

/// Right hand side of an attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    Expression(Expression),
    /// `.probe = { ... };`
    Body(Body),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// The type keyword (`acl`, `backend`, `sub`, ...)
    pub kind: String,
    pub labels: Vec<Label>,
    pub body: Body,
    pub location: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Label {
    /// Label text, with quotes removed for string labels
    pub value: String,
    pub quoted: bool,
    pub location: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub keyword: String,
    pub value: Expression,
    pub location: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionStatement {
    pub value: Expression,
    pub location: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    /// Verbatim source text of the whole expression
    pub text: String,
    pub location: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpressionKind {
    /// Unquoted content of a string literal
    String { value: String },
    Number { value: String },
    /// A number with a time unit suffix, e.g. `5s`
    Duration { value: String },
    Identifier { name: String },
    Unary {
        op: Operator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Match,
    NotMatch,
    And,
    Or,
    Not,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Match => "~",
            Operator::NotMatch => "!~",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Not => "!",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Expression {
    /// Literal rendering used for flat lists and string fields.
    ///
    /// A lone string literal renders as its unquoted content. Every other shape renders as
    /// its verbatim source text, so `"34.100.0.0"/23` keeps its quotes.
    pub fn render(&self) -> String {
        match &self.kind {
            ExpressionKind::String { value } => value.clone(),
            _ => self.text.clone(),
        }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self.kind, ExpressionKind::String { .. })
    }
}

impl AttributeValue {
    pub fn location(&self) -> &Range {
        match self {
            AttributeValue::Expression(expression) => &expression.location,
            AttributeValue::Body(body) => &body.location,
        }
    }
}

impl Block {
    pub fn label_values(&self) -> Vec<&str> {
        self.labels.iter().map(|label| label.value.as_str()).collect()
    }
}

impl AstNode for Statement {
    fn node_type(&self) -> &'static str {
        match self {
            Statement::Attribute(_) => "Attribute",
            Statement::Block(_) => "Block",
            Statement::Directive(_) => "Directive",
            Statement::Expression(_) => "Expression",
        }
    }

    fn display_label(&self) -> String {
        match self {
            Statement::Attribute(attribute) => match &attribute.value {
                AttributeValue::Expression(value) => format!("{} = {}", attribute.name, value.text),
                AttributeValue::Body(_) => format!("{} = {{..}}", attribute.name),
            },
            Statement::Block(block) => {
                let mut label = block.kind.clone();
                for l in &block.labels {
                    label.push(' ');
                    if l.quoted {
                        label.push_str(&format!("{:?}", l.value));
                    } else {
                        label.push_str(&l.value);
                    }
                }
                label
            }
            Statement::Directive(directive) => {
                format!("{} {}", directive.keyword, directive.value.text)
            }
            Statement::Expression(statement) => statement.value.text.clone(),
        }
    }

    fn location(&self) -> &Range {
        match self {
            Statement::Attribute(attribute) => &attribute.location,
            Statement::Block(block) => &block.location,
            Statement::Directive(directive) => &directive.location,
            Statement::Expression(statement) => &statement.location,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.node_type(), self.display_label())
    }
}
