//! Treeviz formatter for AST nodes

use crate::vcl::ast::{AstNode, AttributeValue, Program, Statement};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(program: &Program) -> String {
    let mut result = String::new();
    append_statements(&mut result, &program.statements, "");
    result
}

fn append_statement(result: &mut String, statement: &Statement, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    let display_label = truncate(&statement.display_label(), 40);

    result.push_str(&format!(
        "{}{} {}: {}\n",
        prefix,
        connector,
        statement.node_type(),
        display_label
    ));

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });

    match statement {
        Statement::Block(block) => append_statements(result, &block.body.statements, &new_prefix),
        Statement::Attribute(attribute) => {
            if let AttributeValue::Body(body) = &attribute.value {
                append_statements(result, &body.statements, &new_prefix);
            }
        }
        Statement::Directive(_) | Statement::Expression(_) => {}
    }
}

fn append_statements(result: &mut String, statements: &[Statement], prefix: &str) {
    for (i, statement) in statements.iter().enumerate() {
        let is_last = i + 1 == statements.len();
        append_statement(result, statement, prefix, is_last);
    }
}
