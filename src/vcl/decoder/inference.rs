//! Schema inference from record declarations

use serde::Serialize;
use std::any::TypeId;

use crate::vcl::decoder::fields::{Binding, Fields, Record};
use crate::vcl::decoder::tags::FieldTag;
use crate::vcl::schema::{AttributeSchema, BodySchema};

/// The three disjoint field groups of a record, each in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FieldTags {
    /// Plain and flat fields
    pub attributes: Vec<FieldTag>,
    pub labels: Vec<FieldTag>,
    pub blocks: Vec<FieldTag>,
}

pub fn get_field_tags<T: Record>() -> FieldTags {
    let fields = Fields::<T>::collect();
    let mut tags = FieldTags::default();
    for field in fields.entries {
        if field.tag.name.is_empty() {
            continue;
        }
        if field.tag.is_label() {
            tags.labels.push(field.tag);
        } else if field.tag.is_block() {
            tags.blocks.push(field.tag);
        } else {
            tags.attributes.push(field.tag);
        }
    }
    tags
}

/// Describe the body shape `T` expects, recursing into its block fields
pub fn infer_body_schema<T: Record>() -> BodySchema {
    infer_schema::<T>(&mut Vec::new())
}

/// `stack` holds the records currently being inferred. A record that nests itself gets
/// an empty schema at the point of recursion.
pub(crate) fn infer_schema<R: Record>(stack: &mut Vec<TypeId>) -> BodySchema {
    let id = TypeId::of::<R>();
    if stack.contains(&id) {
        tracing::debug!(
            record = std::any::type_name::<R>(),
            "recursive record, nested schema left empty"
        );
        return BodySchema::default();
    }
    stack.push(id);

    let fields = Fields::<R>::collect();
    let mut schema = BodySchema::default();
    for field in &fields.entries {
        if field.tag.name.is_empty() || field.tag.is_label() {
            continue;
        }
        match &field.binding {
            Binding::Block(binding) => schema.blocks.push(binding.header(&field.tag.name, stack)),
            Binding::Value(_) | Binding::List(_) => schema.attributes.push(AttributeSchema {
                name: field.tag.name.clone(),
                required: false,
            }),
        }
    }

    stack.pop();
    schema
}

/// Label field names, in the positional order labels bind to them
pub(crate) fn label_names<R: Record>() -> Vec<String> {
    Fields::<R>::collect()
        .labels()
        .map(|(tag, _)| tag.name.clone())
        .collect()
}
