//! Descriptive body shapes and schema matching
//!
//! A [`BodySchema`] states what a body may contain without referring to any concrete
//! document. The decoder infers one per record type; [`Body::content`] matches a parsed
//! body against it.

use indexmap::IndexMap;
use serde::Serialize;

use crate::vcl::ast::{
    Attribute, AttributeValue, Block, Body, Directive, Expression, Program, Range, Statement,
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BodySchema {
    pub attributes: Vec<AttributeSchema>,
    pub blocks: Vec<BlockHeaderSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSchema {
    pub name: String,
    /// Reserved. Inference always sets `false` and nothing enforces it.
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeaderSchema {
    /// Block type keyword this header matches
    pub kind: String,
    /// Expected labels, in positional order
    pub label_names: Vec<String>,
    pub body: BodySchema,
    /// Whether the bound field is a sequence
    pub repeats: bool,
}

impl BodySchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    pub fn block(&self, kind: &str) -> Option<&BlockHeaderSchema> {
        self.blocks.iter().find(|block| block.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.blocks.is_empty()
    }
}

/// The parts of a body a schema asked for
///
/// `attributes` holds every `name = value;` statement and directive whose name the schema
/// lists as an attribute, plus `name = { ... };` statements whose name it lists as a block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BodyContent<'a> {
    pub attributes: IndexMap<String, NamedValue<'a>>,
    pub blocks: Vec<&'a Block>,
}

/// A statement that assigns a value to a name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NamedValue<'a> {
    Attribute(&'a Attribute),
    Directive(&'a Directive),
}

impl<'a> NamedValue<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            NamedValue::Attribute(attribute) => &attribute.name,
            NamedValue::Directive(directive) => &directive.keyword,
        }
    }

    pub fn location(&self) -> &'a Range {
        match *self {
            NamedValue::Attribute(attribute) => &attribute.location,
            NamedValue::Directive(directive) => &directive.location,
        }
    }

    /// The assigned expression, or `None` for a body
    pub fn expression(&self) -> Option<&'a Expression> {
        match *self {
            NamedValue::Attribute(attribute) => match &attribute.value {
                AttributeValue::Expression(expression) => Some(expression),
                AttributeValue::Body(_) => None,
            },
            NamedValue::Directive(directive) => Some(&directive.value),
        }
    }

    pub fn body(&self) -> Option<&'a Body> {
        match *self {
            NamedValue::Attribute(attribute) => match &attribute.value {
                AttributeValue::Body(body) => Some(body),
                AttributeValue::Expression(_) => None,
            },
            NamedValue::Directive(_) => None,
        }
    }
}

impl<'a> BodyContent<'a> {
    fn collect(statements: &'a [Statement], schema: &BodySchema) -> Self {
        let mut content = BodyContent::default();
        for statement in statements {
            let named = match statement {
                Statement::Attribute(attribute) => NamedValue::Attribute(attribute),
                Statement::Directive(directive) => NamedValue::Directive(directive),
                Statement::Block(block) => {
                    if schema.block(&block.kind).is_some() {
                        content.blocks.push(block);
                    }
                    continue;
                }
                Statement::Expression(_) => continue,
            };
            let wanted = match named.body() {
                Some(_) => schema.block(named.name()).is_some(),
                None => schema.attribute(named.name()).is_some(),
            };
            if !wanted {
                continue;
            }
            if content.attributes.contains_key(named.name()) {
                tracing::debug!(name = %named.name(), "attribute repeated, keeping the last one");
            }
            content.attributes.insert(named.name().to_string(), named);
        }
        content
    }

    /// Matched blocks grouped by type, each group in source order
    pub fn blocks_by_type(&self) -> IndexMap<&'a str, Vec<&'a Block>> {
        let mut groups: IndexMap<&'a str, Vec<&'a Block>> = IndexMap::new();
        for block in &self.blocks {
            groups.entry(block.kind.as_str()).or_default().push(block);
        }
        groups
    }
}

impl Body {
    pub fn content(&self, schema: &BodySchema) -> BodyContent<'_> {
        BodyContent::collect(&self.statements, schema)
    }
}

impl Program {
    pub fn content(&self, schema: &BodySchema) -> BodyContent<'_> {
        BodyContent::collect(&self.statements, schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcl::parser::parse_program;

    fn schema() -> BodySchema {
        BodySchema {
            attributes: vec![AttributeSchema {
                name: "api".to_string(),
                required: false,
            }],
            blocks: vec![
                BlockHeaderSchema {
                    kind: "acl".to_string(),
                    label_names: vec!["name".to_string()],
                    body: BodySchema::default(),
                    repeats: true,
                },
                BlockHeaderSchema {
                    kind: "sub".to_string(),
                    label_names: vec!["name".to_string()],
                    body: BodySchema::default(),
                    repeats: true,
                },
            ],
        }
    }

    #[test]
    fn test_content_drops_unknown_names() {
        let parsed = parse_program(
            "api = \"x\";\nother = 1;\nacl a { }\nbackend b { }\nsub s { }\nacl c { }",
        );
        let content = parsed.program.content(&schema());

        assert_eq!(content.attributes.len(), 1);
        assert!(content.attributes.contains_key("api"));
        let kinds: Vec<&str> = content.blocks.iter().map(|b| b.kind.as_str()).collect();
        assert_eq!(kinds, vec!["acl", "sub", "acl"]);
    }

    #[test]
    fn test_blocks_by_type_keeps_source_order() {
        let parsed = parse_program("acl a { }\nsub s { }\nacl c { }");
        let content = parsed.program.content(&schema());
        let groups = content.blocks_by_type();

        let keys: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["acl", "sub"]);
        let acls: Vec<&str> = groups["acl"]
            .iter()
            .map(|block| block.labels[0].value.as_str())
            .collect();
        assert_eq!(acls, vec!["a", "c"]);
    }

    #[test]
    fn test_content_keeps_body_attributes_and_directives() {
        let schema = BodySchema {
            attributes: vec![
                AttributeSchema {
                    name: "vcl".to_string(),
                    required: false,
                },
                AttributeSchema {
                    name: ".ip".to_string(),
                    required: false,
                },
            ],
            blocks: vec![BlockHeaderSchema {
                kind: ".probe".to_string(),
                label_names: Vec::new(),
                body: BodySchema::default(),
                repeats: false,
            }],
        };
        let parsed = parse_program(
            "vcl 4.1;\n.ip = \"10.0.0.1\";\n.probe = { x = 10; };\n.other = { y = 1; };",
        );
        let content = parsed.program.content(&schema);

        let names: Vec<&str> = content.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["vcl", ".ip", ".probe"]);
        assert!(matches!(content.attributes["vcl"], NamedValue::Directive(_)));
        assert_eq!(
            content.attributes["vcl"].expression().map(|e| e.render()),
            Some("4.1".to_string())
        );
        let probe = content.attributes[".probe"];
        assert!(probe.expression().is_none());
        assert_eq!(probe.body().map(|body| body.statements.len()), Some(1));
        assert_eq!(probe.location().start.line, 2);
        assert!(content.blocks.is_empty());
    }

    #[test]
    fn test_body_attribute_needs_a_block_schema() {
        let schema = BodySchema {
            attributes: vec![AttributeSchema {
                name: ".probe".to_string(),
                required: false,
            }],
            blocks: Vec::new(),
        };
        let parsed = parse_program(".probe = { x = 10; };\n.probe = 3;");
        let content = parsed.program.content(&schema);

        assert_eq!(content.attributes.len(), 1);
        let probe = content.attributes[".probe"];
        assert_eq!(probe.expression().map(|e| e.render()), Some("3".to_string()));
    }

    #[test]
    fn test_lookups() {
        let schema = schema();
        assert!(schema.attribute("api").is_some());
        assert!(schema.attribute("acl").is_none());
        assert!(schema.block("sub").is_some_and(|header| header.repeats));
        assert!(!schema.is_empty());
        assert!(BodySchema::default().is_empty());
    }
}
