//! Parser combinator functions for building the VCL parser.
//!
//! The grammar is small enough that every rule is a function returning a chumsky parser
//! over `(Token, byte span)` pairs. Source text is shared through an [`Arc<ParseContext>`]
//! so node constructors can slice verbatim text and compute line/column ranges.

use chumsky::prelude::*;
use chumsky::Error as _;
use std::ops::Range as ByteRange;
use std::sync::Arc;

use crate::vcl::ast::{
    Attribute, AttributeValue, Block, Body, Directive, Expression, ExpressionKind,
    ExpressionStatement, Label, Operator, Range, SourceLocation, Statement,
};
use crate::vcl::error::SyntaxError;
use crate::vcl::lexer::{Token, TokenSpan};

/// Type alias for parser error
pub(crate) type ParserError = Simple<TokenSpan>;

/// Source text plus the line index needed to turn byte spans into [`Range`]s
pub(crate) struct ParseContext {
    source: String,
    locations: SourceLocation,
}

impl ParseContext {
    pub(crate) fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            locations: SourceLocation::new(source),
        }
    }

    pub(crate) fn text(&self, span: &ByteRange<usize>) -> String {
        self.source.get(span.clone()).unwrap_or_default().to_string()
    }

    pub(crate) fn range(&self, span: ByteRange<usize>) -> Range {
        self.locations.byte_range_to_ast_range(&span)
    }

    pub(crate) fn whole(&self) -> Range {
        self.range(0..self.source.len())
    }

    fn literal(&self, token: Token, span: ByteRange<usize>) -> Expression {
        let text = self.text(&span);
        let kind = match token {
            Token::String => ExpressionKind::String {
                value: unquote(&text).to_string(),
            },
            Token::Number => ExpressionKind::Number {
                value: text.clone(),
            },
            Token::Duration => ExpressionKind::Duration {
                value: text.clone(),
            },
            _ => ExpressionKind::Identifier { name: text.clone() },
        };
        Expression {
            kind,
            text,
            location: self.range(span),
        }
    }

    fn unary(&self, op: Operator, op_span: ByteRange<usize>, operand: Expression) -> Expression {
        let span = op_span.start..operand.location.span.end;
        Expression {
            text: self.text(&span),
            location: self.range(span),
            kind: ExpressionKind::Unary {
                op,
                operand: Box::new(operand),
            },
        }
    }

    fn binary(&self, left: Expression, op: Operator, right: Expression) -> Expression {
        let span = left.location.span.start..right.location.span.end;
        Expression {
            text: self.text(&span),
            location: self.range(span),
            kind: ExpressionKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
        }
    }

    /// Convert a chumsky error into a positioned [`SyntaxError`]
    pub(crate) fn syntax_error(&self, error: &ParserError) -> SyntaxError {
        let expected = describe_expected(error);
        match error.found() {
            Some((_, span)) => SyntaxError::UnexpectedToken {
                expected,
                found: self.text(span),
                location: self.range(span.clone()),
            },
            None => {
                let end = self.source.len();
                SyntaxError::UnexpectedEnd {
                    expected,
                    location: self.range(end..end),
                }
            }
        }
    }
}

fn describe_expected(error: &ParserError) -> String {
    if let Some(label) = error.label() {
        return label.to_string();
    }

    let mut expected: Vec<String> = error
        .expected()
        .map(|item| match item {
            Some((token, _)) => token.to_string(),
            None => "end of input".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    if expected.is_empty() {
        "a statement".to_string()
    } else {
        expected.join(" or ")
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

/// Helper: match a specific token type, yielding its byte span
pub(crate) fn token(
    expected: Token,
) -> impl Parser<TokenSpan, ByteRange<usize>, Error = ParserError> + Clone {
    filter(move |(found, _): &TokenSpan| *found == expected).map(|(_, span): TokenSpan| span)
}

/// Match any token `select` maps to an operator
fn operator(
    select: fn(Token) -> Option<Operator>,
) -> impl Parser<TokenSpan, (Operator, ByteRange<usize>), Error = ParserError> + Clone {
    filter_map(move |span, (token, range): TokenSpan| match select(token) {
        Some(op) => Ok((op, range)),
        None => Err(ParserError::expected_input_found(
            span,
            std::iter::empty(),
            Some((token, range)),
        )),
    })
}

fn identifier(
    ctx: Arc<ParseContext>,
) -> impl Parser<TokenSpan, (String, ByteRange<usize>), Error = ParserError> + Clone {
    token(Token::Ident)
        .map(move |span| (ctx.text(&span), span))
        .labelled("identifier")
}

fn label(ctx: Arc<ParseContext>) -> impl Parser<TokenSpan, Label, Error = ParserError> + Clone {
    filter(|(token, _): &TokenSpan| token.is_label())
        .map(move |(token, span): TokenSpan| {
            let text = ctx.text(&span);
            let quoted = token == Token::String;
            let value = if quoted {
                unquote(&text).to_string()
            } else {
                text
            };
            Label {
                value,
                quoted,
                location: ctx.range(span),
            }
        })
        .labelled("label")
}

fn operand(ctx: Arc<ParseContext>) -> impl Parser<TokenSpan, Expression, Error = ParserError> + Clone {
    filter(|(token, _): &TokenSpan| token.is_operand())
        .map(move |(token, span): TokenSpan| ctx.literal(token, span))
        .labelled("expression")
}

/// Parse an expression: optionally prefixed operands joined by binary operators
///
/// Operators associate to the left and share one precedence level. The tree only has to
/// support scalar coercion and verbatim rendering, not evaluation.
pub(crate) fn expression(
    ctx: Arc<ParseContext>,
) -> impl Parser<TokenSpan, Expression, Error = ParserError> + Clone {
    let prefix_ctx = ctx.clone();
    let term = operator(Token::prefix_operator)
        .or_not()
        .then(operand(ctx.clone()))
        .map(move |(prefix, value)| match prefix {
            Some((op, span)) => prefix_ctx.unary(op, span, value),
            None => value,
        });

    term.clone()
        .then(operator(Token::binary_operator).then(term).repeated())
        .foldl(move |left, ((op, _), right)| ctx.binary(left, op, right))
}

/// Parse one statement, recursing into brace-delimited bodies
///
/// Alternatives are tried in order: attribute, block, flat expression, directive. The
/// flat form comes before the directive so that `a - 1;` stays a single expression.
pub(crate) fn statement(
    ctx: Arc<ParseContext>,
) -> impl Parser<TokenSpan, Statement, Error = ParserError> + Clone {
    recursive(move |statement| {
        let semicolon = token(Token::Semicolon).labelled("';'");

        let body_ctx = ctx.clone();
        let body = token(Token::OpenBrace)
            .then(statement.repeated())
            .then(token(Token::CloseBrace).labelled("'}'"))
            .map(move |((open, statements), close)| Body {
                statements,
                location: body_ctx.range(open.start..close.end),
            });

        let attribute_ctx = ctx.clone();
        let attribute = identifier(ctx.clone())
            .then_ignore(token(Token::Assign))
            .then(
                body.clone()
                    .map(AttributeValue::Body)
                    .or(expression(ctx.clone()).map(AttributeValue::Expression)),
            )
            .then(semicolon.clone().or_not())
            .map(move |(((name, start), value), end)| {
                let end = end.map_or(value.location().span.end, |span| span.end);
                Statement::Attribute(Attribute {
                    name,
                    value,
                    location: attribute_ctx.range(start.start..end),
                })
            });

        let block_ctx = ctx.clone();
        let block = identifier(ctx.clone())
            .then(label(ctx.clone()).repeated())
            .then(body)
            .then(semicolon.clone().or_not())
            .map(move |((((kind, start), labels), body), end)| {
                let end = end.map_or(body.location.span.end, |span| span.end);
                Statement::Block(Block {
                    kind,
                    labels,
                    body,
                    location: block_ctx.range(start.start..end),
                })
            });

        let flat_ctx = ctx.clone();
        let flat = expression(ctx.clone())
            .then(semicolon.clone())
            .map(move |(value, end)| {
                let location = flat_ctx.range(value.location.span.start..end.end);
                Statement::Expression(ExpressionStatement { value, location })
            });

        let directive_ctx = ctx.clone();
        let directive = identifier(ctx.clone())
            .then(expression(ctx.clone()))
            .then(semicolon)
            .map(move |(((keyword, start), value), end)| {
                Statement::Directive(Directive {
                    keyword,
                    value,
                    location: directive_ctx.range(start.start..end.end),
                })
            });

        choice((attribute, block, flat, directive))
    })
}
