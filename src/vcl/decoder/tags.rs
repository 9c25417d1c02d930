//! Field tag syntax: `name[,modifier...]`

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An empty name is allowed; such a field never matches a statement.
static FIELD_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\.?[A-Za-z_][A-Za-z0-9_.\-]*)?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Bound positionally from the enclosing block's labels
    Label,
    /// Bound to a nested block or an `= { ... }` body
    Block,
    /// Collects bare statements of the body as strings
    Flat,
    /// Accepted for compatibility, has no effect
    Nested,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Label => "label",
            Modifier::Block => "block",
            Modifier::Flat => "flat",
            Modifier::Nested => "nested",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modifier {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(Modifier::Label),
            "block" => Ok(Modifier::Block),
            "flat" => Ok(Modifier::Flat),
            "nested" => Ok(Modifier::Nested),
            other => Err(TagError::UnknownModifier(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("invalid field name {0:?}")]
    InvalidName(String),
    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),
}

/// Parsed field metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldTag {
    pub name: String,
    pub modifiers: BTreeSet<Modifier>,
}

impl FieldTag {
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut parts = tag.split(',').map(str::trim);
        let name = parts.next().unwrap_or_default();
        if !FIELD_NAME_REGEX.is_match(name) {
            return Err(TagError::InvalidName(name.to_string()));
        }

        let modifiers = parts
            .filter(|part| !part.is_empty())
            .map(Modifier::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(FieldTag {
            name: name.to_string(),
            modifiers,
        })
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_label(&self) -> bool {
        self.has(Modifier::Label)
    }

    pub fn is_block(&self) -> bool {
        self.has(Modifier::Block)
    }

    pub fn is_flat(&self) -> bool {
        self.has(Modifier::Flat)
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for modifier in &self.modifiers {
            write!(f, ",{}", modifier)?;
        }
        Ok(())
    }
}
