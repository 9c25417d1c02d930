//! Record field declarations
//!
//! A record lists its fields once, in declaration order, through the [`Fields`] builder.
//! Each entry pairs a parsed [`FieldTag`] with a typed accessor. The decoder and schema
//! inference only ever see these entries, never the record's layout.

use std::any::TypeId;
use std::collections::HashSet;

use crate::vcl::ast::{Body, Expression, Label};
use crate::vcl::decoder::decode::{decode_record, validate_record, DecodeState};
use crate::vcl::decoder::inference::{infer_schema, label_names};
use crate::vcl::decoder::tags::FieldTag;
use crate::vcl::decoder::value::FromValue;
use crate::vcl::error::DecodeError;
use crate::vcl::schema::BlockHeaderSchema;

/// A type the decoder can populate
///
/// ```ignore
/// #[derive(Default)]
/// struct Backend {
///     name: String,
///     ip: String,
///     probe: Option<Probe>,
/// }
///
/// impl Record for Backend {
///     fn describe(fields: &mut Fields<Self>) {
///         fields
///             .value("name,label", |b| &mut b.name)
///             .value(".ip", |b| &mut b.ip)
///             .block(".probe,block", |b| &mut b.probe);
///     }
/// }
/// ```
pub trait Record: Default + 'static {
    fn describe(fields: &mut Fields<Self>);
}

/// Storage for nested records bound with [`Fields::block`]
///
/// A scalar slot takes at most one block per decode. The first block decoded replaces any
/// value the slot held before; a second one is reported as a duplicate.
pub trait BlockSlot: 'static {
    type Item: Record;

    /// Sequences take any number of blocks, scalar slots at most one
    const REPEATS: bool;

    fn insert(&mut self, item: Self::Item);
}

impl<R: Record> BlockSlot for Option<R> {
    type Item = R;
    const REPEATS: bool = false;

    fn insert(&mut self, item: R) {
        *self = Some(item);
    }
}

impl<R: Record> BlockSlot for Vec<R> {
    type Item = R;
    const REPEATS: bool = true;

    fn insert(&mut self, item: R) {
        self.push(item);
    }
}

/// A declaration the builder could not accept
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShapeProblem {
    pub(crate) field: String,
    pub(crate) reason: String,
}

pub(crate) struct Field<T> {
    pub(crate) tag: FieldTag,
    pub(crate) binding: Binding<T>,
}

pub(crate) enum Binding<T> {
    Value(Box<dyn SetValue<T>>),
    List(fn(&mut T) -> &mut Vec<String>),
    Block(Box<dyn BlockBinding<T>>),
}

pub(crate) trait SetValue<T> {
    fn expected(&self) -> &'static str;
    fn set_expression(&self, target: &mut T, expression: &Expression) -> bool;
    fn set_label(&self, target: &mut T, label: &Label) -> bool;
}

struct ValueField<T, V> {
    access: fn(&mut T) -> &mut V,
}

impl<T, V: FromValue> SetValue<T> for ValueField<T, V> {
    fn expected(&self) -> &'static str {
        V::expected()
    }

    fn set_expression(&self, target: &mut T, expression: &Expression) -> bool {
        match V::from_expression(expression) {
            Some(value) => {
                *(self.access)(target) = value;
                true
            }
            None => false,
        }
    }

    fn set_label(&self, target: &mut T, label: &Label) -> bool {
        match V::from_label(label) {
            Some(value) => {
                *(self.access)(target) = value;
                true
            }
            None => false,
        }
    }
}

pub(crate) trait BlockBinding<T> {
    fn repeats(&self) -> bool;
    fn header(&self, kind: &str, stack: &mut Vec<TypeId>) -> BlockHeaderSchema;
    fn validate(&self, visited: &mut HashSet<TypeId>, errors: &mut Vec<DecodeError>);

    /// Decode one block or `= { ... }` body into a fresh item of the slot
    fn decode(&self, target: &mut T, labels: &[Label], body: &Body, state: &mut DecodeState);
}

struct BlockField<T, S> {
    access: fn(&mut T) -> &mut S,
}

impl<T, S: BlockSlot> BlockBinding<T> for BlockField<T, S> {
    fn repeats(&self) -> bool {
        S::REPEATS
    }

    fn header(&self, kind: &str, stack: &mut Vec<TypeId>) -> BlockHeaderSchema {
        BlockHeaderSchema {
            kind: kind.to_string(),
            label_names: label_names::<S::Item>(),
            body: infer_schema::<S::Item>(stack),
            repeats: S::REPEATS,
        }
    }

    fn validate(&self, visited: &mut HashSet<TypeId>, errors: &mut Vec<DecodeError>) {
        validate_record::<S::Item>(visited, errors);
    }

    fn decode(&self, target: &mut T, labels: &[Label], body: &Body, state: &mut DecodeState) {
        let mut item = S::Item::default();
        decode_record(&mut item, labels, &body.statements, state);
        (self.access)(target).insert(item);
    }
}

/// Field declarations of one record type
pub struct Fields<T> {
    pub(crate) entries: Vec<Field<T>>,
    pub(crate) problems: Vec<ShapeProblem>,
}

impl<T: Record> Fields<T> {
    pub(crate) fn collect() -> Self {
        let mut fields = Fields {
            entries: Vec::new(),
            problems: Vec::new(),
        };
        T::describe(&mut fields);
        fields
    }

    /// Bind a scalar attribute, or a block label when tagged `label`
    pub fn value<V: FromValue>(&mut self, tag: &str, access: fn(&mut T) -> &mut V) -> &mut Self {
        self.push(tag, Binding::Value(Box::new(ValueField { access })))
    }

    /// Bind the bare statements of the body, tagged `flat`
    pub fn list(&mut self, tag: &str, access: fn(&mut T) -> &mut Vec<String>) -> &mut Self {
        self.push(tag, Binding::List(access))
    }

    /// Bind nested blocks, tagged `block`
    pub fn block<S: BlockSlot>(&mut self, tag: &str, access: fn(&mut T) -> &mut S) -> &mut Self {
        self.push(tag, Binding::Block(Box::new(BlockField { access })))
    }

    fn push(&mut self, raw: &str, binding: Binding<T>) -> &mut Self {
        let tag = match FieldTag::parse(raw) {
            Ok(tag) => tag,
            Err(error) => {
                self.problems.push(ShapeProblem {
                    field: raw.to_string(),
                    reason: error.to_string(),
                });
                return self;
            }
        };

        let mismatch = match &binding {
            Binding::Value(_) if tag.is_block() || tag.is_flat() => {
                Some("a scalar field cannot be tagged `block` or `flat`")
            }
            Binding::List(_) if !tag.is_flat() => Some("a string list needs the `flat` modifier"),
            Binding::List(_) if tag.is_label() || tag.is_block() => {
                Some("a flat field cannot be tagged `label` or `block`")
            }
            Binding::Block(_) if !tag.is_block() => Some("a nested record needs the `block` modifier"),
            Binding::Block(_) if tag.is_label() || tag.is_flat() => {
                Some("a block field cannot be tagged `label` or `flat`")
            }
            _ => None,
        };

        match mismatch {
            Some(reason) => self.problems.push(ShapeProblem {
                field: tag.name,
                reason: reason.to_string(),
            }),
            None => self.entries.push(Field { tag, binding }),
        }
        self
    }

    pub(crate) fn labels(
        &self,
    ) -> impl Iterator<Item = (&FieldTag, &(dyn SetValue<T> + 'static))> + '_ {
        self.entries
            .iter()
            .filter(|field| field.tag.is_label())
            .filter_map(|field| match &field.binding {
                Binding::Value(setter) => Some((&field.tag, &**setter)),
                _ => None,
            })
    }

    /// A scalar or block field addressed by attribute name
    pub(crate) fn attribute(&self, name: &str) -> Option<&Field<T>> {
        self.entries.iter().find(|field| {
            !field.tag.is_label()
                && !field.tag.is_flat()
                && !field.tag.name.is_empty()
                && field.tag.name == name
        })
    }

    /// A block field addressed by block type
    pub(crate) fn block_binding(
        &self,
        kind: &str,
    ) -> Option<(&FieldTag, &(dyn BlockBinding<T> + 'static))> {
        self.entries.iter().find_map(|field| match &field.binding {
            Binding::Block(binding) if !kind.is_empty() && field.tag.name == kind => {
                Some((&field.tag, &**binding))
            }
            _ => None,
        })
    }

    pub(crate) fn flat(&self) -> Option<fn(&mut T) -> &mut Vec<String>> {
        self.entries.iter().find_map(|field| match &field.binding {
            Binding::List(access) => Some(*access),
            _ => None,
        })
    }
}
