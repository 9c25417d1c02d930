//! Schema-driven decoding of programs into caller-defined records
//!
//! Records declare their fields through [`Record::describe`]. From those declarations
//! the decoder infers a [`BodySchema`](crate::vcl::schema::BodySchema) and populates the
//! record from a parsed [`Program`](crate::vcl::ast::Program):
//!
//! - plain fields take attribute values, coerced through [`FromValue`]
//! - `label` fields take the enclosing block's labels, by position
//! - `block` fields take nested blocks or `name = { ... }` bodies
//! - the `flat` field collects bare statements, rendered as strings
//!
//! Names with no matching field are skipped.

pub mod decode;
pub mod fields;
pub mod inference;
pub mod tags;
pub mod value;

pub use decode::{decode, decode_body};
pub use fields::{BlockSlot, Fields, Record};
pub use inference::{get_field_tags, infer_body_schema, FieldTags};
pub use tags::{FieldTag, Modifier, TagError};
pub use value::FromValue;
