//! Populating records from parsed statements

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::vcl::ast::{AttributeValue, Body, Expression, Label, Program, Range, Statement};
use crate::vcl::decoder::fields::{Binding, BlockBinding, Fields, Record, SetValue};
use crate::vcl::decoder::tags::FieldTag;
use crate::vcl::error::DecodeError;

/// Per-decode scratch space: accumulated errors and the field declarations of every
/// record type met so far
#[derive(Default)]
pub(crate) struct DecodeState {
    pub(crate) errors: Vec<DecodeError>,
    cache: HashMap<TypeId, Rc<dyn Any>>,
}

impl DecodeState {
    fn fields<R: Record>(&mut self) -> Rc<Fields<R>> {
        let cached = self
            .cache
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Rc::new(Fields::<R>::collect()) as Rc<dyn Any>)
            .clone();
        cached
            .downcast::<Fields<R>>()
            .unwrap_or_else(|_| Rc::new(Fields::<R>::collect()))
    }
}

/// Decode a whole program into `target`
///
/// Returns every error found. When the record's own declarations are invalid the target
/// is left untouched and only those errors are returned.
pub fn decode<T: Record>(program: &Program, target: &mut T) -> Vec<DecodeError> {
    decode_statements(&program.statements, target)
}

/// Decode one body into `target`, as if it were a program
pub fn decode_body<T: Record>(body: &Body, target: &mut T) -> Vec<DecodeError> {
    decode_statements(&body.statements, target)
}

fn decode_statements<T: Record>(statements: &[Statement], target: &mut T) -> Vec<DecodeError> {
    let mut shape_errors = Vec::new();
    validate_record::<T>(&mut HashSet::new(), &mut shape_errors);
    if !shape_errors.is_empty() {
        for error in &shape_errors {
            tracing::debug!(%error, "target rejected");
        }
        return shape_errors;
    }

    let mut state = DecodeState::default();
    decode_record(target, &[], statements, &mut state);
    for error in &state.errors {
        tracing::debug!(%error, "decode error");
    }
    state.errors
}

/// Check the declarations of `R` and every record reachable through its block fields
pub(crate) fn validate_record<R: Record>(
    visited: &mut HashSet<TypeId>,
    errors: &mut Vec<DecodeError>,
) {
    if !visited.insert(TypeId::of::<R>()) {
        return;
    }

    let target = record_name::<R>();
    let fields = Fields::<R>::collect();
    let shape_error = |field: &str, reason: &str| DecodeError::TargetShape {
        target: target.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    };

    for problem in &fields.problems {
        errors.push(shape_error(&problem.field, &problem.reason));
    }

    let mut names = HashSet::new();
    let mut flat_seen = false;
    for field in &fields.entries {
        let name = field.tag.name.as_str();
        if !field.tag.is_label() && !name.is_empty() && !names.insert(name) {
            errors.push(shape_error(name, "declared more than once"));
        }
        if field.tag.is_flat() {
            if flat_seen {
                errors.push(shape_error(name, "a record can hold only one flat field"));
            }
            flat_seen = true;
        }
    }

    for field in &fields.entries {
        if let Binding::Block(binding) = &field.binding {
            binding.validate(visited, errors);
        }
    }
}

fn record_name<R>() -> &'static str {
    let full = std::any::type_name::<R>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// The right hand side of an attribute or directive
enum Assigned<'a> {
    Expression(&'a Expression),
    Body(&'a Body),
}

/// Bind `labels` positionally, then apply `statements` in source order
pub(crate) fn decode_record<R: Record>(
    target: &mut R,
    labels: &[Label],
    statements: &[Statement],
    state: &mut DecodeState,
) {
    let fields = state.fields::<R>();

    let mut label_fields = fields.labels();
    for label in labels {
        let Some((tag, setter)) = label_fields.next() else {
            tracing::debug!(label = %label.value, "extra label ignored");
            continue;
        };
        if !setter.set_label(target, label) {
            state.errors.push(DecodeError::Coercion {
                field: tag.name.clone(),
                expected: setter.expected().to_string(),
                found: label.value.clone(),
                location: label.location.clone(),
            });
        }
    }

    // Scalar block fields filled by this decode
    let mut filled = HashSet::new();

    for statement in statements {
        match statement {
            Statement::Attribute(attribute) => {
                let value = match &attribute.value {
                    AttributeValue::Expression(expression) => Assigned::Expression(expression),
                    AttributeValue::Body(body) => Assigned::Body(body),
                };
                decode_assignment(
                    &fields,
                    target,
                    &attribute.name,
                    value,
                    &attribute.location,
                    &mut filled,
                    state,
                );
            }
            Statement::Directive(directive) => decode_assignment(
                &fields,
                target,
                &directive.keyword,
                Assigned::Expression(&directive.value),
                &directive.location,
                &mut filled,
                state,
            ),
            Statement::Block(block) => match fields.block_binding(&block.kind) {
                Some((tag, binding)) => {
                    if claim_slot(binding, tag, &block.kind, &block.location, &mut filled, state) {
                        binding.decode(target, &block.labels, &block.body, state);
                    }
                }
                None => tracing::debug!(kind = %block.kind, "no field for block, skipped"),
            },
            Statement::Expression(flat) => match fields.flat() {
                Some(access) => access(target).push(flat.value.render()),
                None => tracing::debug!(text = %flat.value.text, "no flat field, statement skipped"),
            },
        }
    }
}

/// Record that a block is about to fill `tag`'s field; false if a scalar field already
/// took one in this decode
fn claim_slot<'f, R>(
    binding: &dyn BlockBinding<R>,
    tag: &'f FieldTag,
    kind: &str,
    location: &Range,
    filled: &mut HashSet<&'f str>,
    state: &mut DecodeState,
) -> bool {
    if binding.repeats() || filled.insert(tag.name.as_str()) {
        return true;
    }
    state.errors.push(DecodeError::DuplicateBlock {
        block: kind.to_string(),
        location: location.clone(),
    });
    false
}

fn decode_assignment<'f, R: Record>(
    fields: &'f Fields<R>,
    target: &mut R,
    name: &str,
    value: Assigned<'_>,
    location: &Range,
    filled: &mut HashSet<&'f str>,
    state: &mut DecodeState,
) {
    let Some(field) = fields.attribute(name) else {
        tracing::debug!(name, "no field for attribute, skipped");
        return;
    };

    match (&field.binding, value) {
        (Binding::Value(setter), Assigned::Expression(expression)) => {
            set_expression(name, &**setter, target, expression, state);
        }
        (Binding::Block(binding), Assigned::Body(body)) => {
            if claim_slot(&**binding, &field.tag, name, location, filled, state) {
                binding.decode(target, &[], body, state);
            }
        }
        (Binding::Value(setter), Assigned::Body(_)) => state.errors.push(DecodeError::Coercion {
            field: name.to_string(),
            expected: setter.expected().to_string(),
            found: "{..}".to_string(),
            location: location.clone(),
        }),
        (Binding::Block(_), Assigned::Expression(expression)) => {
            state.errors.push(DecodeError::Coercion {
                field: name.to_string(),
                expected: "a `{ ... }` body".to_string(),
                found: expression.text.clone(),
                location: expression.location.clone(),
            })
        }
        (Binding::List(_), _) => {
            tracing::debug!(name, "flat field addressed by name, skipped");
        }
    }
}

fn set_expression<R>(
    name: &str,
    setter: &dyn SetValue<R>,
    target: &mut R,
    expression: &Expression,
    state: &mut DecodeState,
) {
    if !setter.set_expression(target, expression) {
        state.errors.push(DecodeError::Coercion {
            field: name.to_string(),
            expected: setter.expected().to_string(),
            found: expression.text.clone(),
            location: expression.location.clone(),
        });
    }
}
