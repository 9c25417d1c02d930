//! Scalar coercion from expressions and labels

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::vcl::ast::{Expression, ExpressionKind, Label, Operator};

static DURATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)(ms|s|m|h|d|w|y)?$").unwrap());

/// A field type an attribute value or a label can be decoded into
///
/// Numbers accept a numeric literal, a negated one, or a quoted string holding one.
pub trait FromValue: Sized + 'static {
    /// Short description used in coercion errors
    fn expected() -> &'static str;

    fn from_text(text: &str) -> Option<Self>;

    fn from_expression(expression: &Expression) -> Option<Self> {
        match &expression.kind {
            ExpressionKind::String { value } | ExpressionKind::Number { value } => {
                Self::from_text(value)
            }
            ExpressionKind::Unary {
                op: Operator::Subtract,
                operand,
            } => match &operand.kind {
                ExpressionKind::Number { value } => Self::from_text(&format!("-{}", value)),
                _ => None,
            },
            _ => None,
        }
    }

    fn from_label(label: &Label) -> Option<Self> {
        Self::from_text(&label.value)
    }
}

impl FromValue for String {
    fn expected() -> &'static str {
        "string"
    }

    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn from_expression(expression: &Expression) -> Option<Self> {
        Some(expression.render())
    }
}

impl FromValue for bool {
    fn expected() -> &'static str {
        "boolean"
    }

    fn from_text(text: &str) -> Option<Self> {
        match text {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn from_expression(expression: &Expression) -> Option<Self> {
        match &expression.kind {
            ExpressionKind::Identifier { name } => Self::from_text(name),
            ExpressionKind::String { value } => Self::from_text(value),
            _ => None,
        }
    }
}

macro_rules! impl_from_value_parse {
    ($expected:literal => $($ty:ty),+) => {
        $(
            impl FromValue for $ty {
                fn expected() -> &'static str {
                    $expected
                }

                fn from_text(text: &str) -> Option<Self> {
                    text.parse().ok()
                }
            }
        )+
    };
}

impl_from_value_parse!("integer" => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_from_value_parse!("number" => f32, f64);

impl FromValue for Duration {
    fn expected() -> &'static str {
        "duration"
    }

    /// A bare number counts as seconds
    fn from_text(text: &str) -> Option<Self> {
        let captures = DURATION_REGEX.captures(text)?;
        let amount: f64 = captures.get(1)?.as_str().parse().ok()?;
        let unit = match captures.get(2).map(|unit| unit.as_str()) {
            Some("ms") => return Duration::try_from_secs_f64(amount / 1_000.0).ok(),
            None | Some("s") => 1.0,
            Some("m") => 60.0,
            Some("h") => 3_600.0,
            Some("d") => 86_400.0,
            Some("w") => 604_800.0,
            Some("y") => 31_536_000.0,
            Some(_) => return None,
        };
        Duration::try_from_secs_f64(amount * unit).ok()
    }

    fn from_expression(expression: &Expression) -> Option<Self> {
        match &expression.kind {
            ExpressionKind::Duration { value }
            | ExpressionKind::Number { value }
            | ExpressionKind::String { value } => Self::from_text(value),
            _ => None,
        }
    }
}

impl<V: FromValue> FromValue for Option<V> {
    fn expected() -> &'static str {
        V::expected()
    }

    fn from_text(text: &str) -> Option<Self> {
        V::from_text(text).map(Some)
    }

    fn from_expression(expression: &Expression) -> Option<Self> {
        V::from_expression(expression).map(Some)
    }

    fn from_label(label: &Label) -> Option<Self> {
        V::from_label(label).map(Some)
    }
}
