//! Command-line interface for vcl
//! This binary inspects VCL files: their token stream, their syntax tree and their diagnostics.
//!
//! Usage:
//!   vcl tokens `<path>`                                   - Print the token stream
//!   vcl ast `<path>` [--format `<treeviz|json|yaml>`]     - Print the parsed program
//!   vcl check `<path>`                                    - Report syntax errors
//!
//! Log output goes to stderr and is filtered through the `VCL_LOG` environment variable.

use clap::{Arg, ArgMatches, Command};
use tracing_subscriber::EnvFilter;
use vcl::vcl::ast::SourceLocation;
use vcl::vcl::error::format_source_context;
use vcl::vcl::formats::{to_json_str, to_treeviz_str, to_yaml_str};
use vcl::vcl::lexer::VclLexer;
use vcl::vcl::parser::parse_program;

fn main() {
    init_logging();

    let path_arg = || {
        Arg::new("path")
            .help("Path to the VCL file")
            .required(true)
            .index(1)
    };

    let matches = Command::new("vcl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting VCL files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("ast")
                .about("Print the parsed program")
                .arg(path_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["treeviz", "json", "yaml"])
                        .default_value("treeviz"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Report lexical and syntax errors")
                .arg(path_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("tokens", sub_matches)) => handle_tokens_command(&read_source(sub_matches)),
        Some(("ast", sub_matches)) => {
            let format = sub_matches
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or("treeviz");
            handle_ast_command(&read_source(sub_matches), format);
        }
        Some(("check", sub_matches)) => handle_check_command(&read_source(sub_matches)),
        _ => unreachable!(),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("VCL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(matches: &ArgMatches) -> String {
    let Some(path) = matches.get_one::<String>("path") else {
        eprintln!("Error: missing path");
        std::process::exit(2);
    };
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    })
}

/// Handle the tokens command
fn handle_tokens_command(source: &str) {
    let locations = SourceLocation::new(source);
    for item in VclLexer::new(source) {
        match item {
            Ok((token, span)) => {
                let position = locations.byte_to_position(span.start);
                let text = source.get(span).unwrap_or_default();
                println!("{:<8} {:<16} {}", position.to_string(), token.to_string(), text);
            }
            Err(error) => println!("error    {}", error),
        }
    }
}

/// Handle the ast command
fn handle_ast_command(source: &str, format: &str) {
    let parsed = parse_program(source);
    for error in &parsed.errors {
        eprintln!("{}", error);
    }

    let output = match format {
        "json" => to_json_str(&parsed.program).map_err(|e| e.to_string()),
        "yaml" => to_yaml_str(&parsed.program).map_err(|e| e.to_string()),
        _ => Ok(to_treeviz_str(&parsed.program)),
    };
    match output {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle the check command
fn handle_check_command(source: &str) {
    let parsed = parse_program(source);
    if parsed.is_ok() {
        println!("ok: {} statements", parsed.program.statements.len());
        return;
    }

    for error in &parsed.errors {
        eprintln!("error: {}", error);
        eprint!("{}", format_source_context(source, error.location()));
    }
    std::process::exit(1);
}
