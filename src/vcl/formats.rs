//! Output formats for parsed programs
//!
//! Treeviz is a human readable outline. JSON and YAML go through serde, since every AST
//! node derives `Serialize`.

pub mod treeviz;

pub use treeviz::to_treeviz_str;

use crate::vcl::ast::Program;

pub fn to_json_str(program: &Program) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(program)
}

pub fn to_yaml_str(program: &Program) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(program)
}
