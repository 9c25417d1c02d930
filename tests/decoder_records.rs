//! Decoding programs into caller-defined records

use rstest::rstest;
use vcl::vcl::error::DecodeError;
use vcl::{decode, decode_body, from_str, get_field_tags, infer_body_schema, parse_program};
use vcl::{Error, Fields, Record, Statement};

#[derive(Debug, Default, Clone, PartialEq)]
struct Acl {
    kind: String,
    name: String,
    endpoints: Vec<String>,
}

impl Record for Acl {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .value("type,label", |a| &mut a.kind)
            .value("name,label", |a| &mut a.name)
            .list("endpoints,flat", |a| &mut a.endpoints);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Sub {
    kind: String,
    endpoints: Vec<String>,
}

impl Record for Sub {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .value("type,label", |s| &mut s.kind)
            .list("endpoints,flat", |s| &mut s.endpoints);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Root {
    acls: Vec<Acl>,
    subs: Vec<Sub>,
}

impl Record for Root {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .block("acl,block", |r| &mut r.acls)
            .block("sub,block", |r| &mut r.subs);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct SubObj {
    kind: String,
    name: String,
    host: String,
    ip: String,
}

impl Record for SubObj {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .value("type,label", |s| &mut s.kind)
            .value("name,label", |s| &mut s.name)
            .value(".host", |s| &mut s.host)
            .value(".ip", |s| &mut s.ip);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct RootSub {
    subs: Vec<SubObj>,
}

impl Record for RootSub {
    fn describe(fields: &mut Fields<Self>) {
        fields.block("sub,block", |r| &mut r.subs);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Probe {
    x: i64,
}

impl Record for Probe {
    fn describe(fields: &mut Fields<Self>) {
        fields.value("x", |p| &mut p.x);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Backend {
    kind: String,
    ip: String,
    probe: Option<Probe>,
}

impl Record for Backend {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .value("type,label", |b| &mut b.kind)
            .value(".ip", |b| &mut b.ip)
            .block(".probe,block", |b| &mut b.probe);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Backends {
    backends: Vec<Backend>,
}

impl Record for Backends {
    fn describe(fields: &mut Fields<Self>) {
        fields.block("backend,block", |r| &mut r.backends);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Settings {
    x: i64,
    api: String,
}

impl Record for Settings {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .value("x", |s| &mut s.x)
            .value("api", |s| &mut s.api);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Single {
    backend: Option<Backend>,
}

impl Record for Single {
    fn describe(fields: &mut Fields<Self>) {
        fields.block("backend,block", |r| &mut r.backend);
    }
}

fn decoded<T: Record>(source: &str) -> (T, Vec<DecodeError>) {
    let parsed = parse_program(source);
    assert!(parsed.is_ok(), "unexpected syntax errors: {:?}", parsed.errors);
    let mut target = T::default();
    let errors = decode(&parsed.program, &mut target);
    (target, errors)
}

fn acl(kind: &str, endpoints: &[&str]) -> Acl {
    Acl {
        kind: kind.to_string(),
        name: String::new(),
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
    }
}

#[rstest]
#[case::x_integer("x = 1", Settings { x: 1, api: String::new() })]
#[case::api_string("api = \"localhost\"", Settings { x: 0, api: "localhost".to_string() })]
#[case::both("x = 7;\napi = \"remote\";", Settings { x: 7, api: "remote".to_string() })]
fn test_attributes(#[case] source: &str, #[case] expected: Settings) {
    let (settings, errors) = decoded::<Settings>(source);
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(settings, expected);
}

#[rstest]
#[case::single_block(
    "acl local {\n\t\"local\";\n\t\"localhost\";\n}",
    vec![acl("local", &["local", "localhost"])],
)]
#[case::two_blocks_of_one_type(
    "acl local {\n\t\"local\";\n\t\"localhost\";\n}\n\nacl remote {\n\t\"remote\";\n}\n",
    vec![acl("local", &["local", "localhost"]), acl("remote", &["remote"])],
)]
fn test_acl_blocks(#[case] source: &str, #[case] expected: Vec<Acl>) {
    let (root, errors) = decoded::<Root>(source);
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(root.acls, expected);
    assert!(root.subs.is_empty());
}

#[test]
fn test_mixed_block_types_keep_cidr_verbatim() {
    let (root, errors) = decoded::<Root>(
        "acl local {\n\t\"local\";\n\t\"localhost\";\n}\n\nsub pipe_something {\n\t\"inside_sub\";\n\t\"34.100.0.0\"/23;\n}\n",
    );
    assert!(errors.is_empty());
    assert_eq!(root.acls, vec![acl("local", &["local", "localhost"])]);
    assert_eq!(
        root.subs,
        vec![Sub {
            kind: "pipe_something".to_string(),
            endpoints: vec!["inside_sub".to_string(), "\"34.100.0.0\"/23".to_string()],
        }]
    );
}

#[rstest]
#[case::one_label("sub pipe_something {\n\t.host = \"host\";\n\t.ip = \"ip\";\n}\n", "")]
#[case::two_labels(
    "sub pipe_something pipe_keke {\n\t.host = \"host\";\n\t.ip = \"ip\";\n}\n",
    "pipe_keke"
)]
#[case::quoted_second_label(
    "sub pipe_something \"pipe_keke\" {\n\t.host = \"host\";\n\t.ip = \"ip\";\n}\n",
    "pipe_keke"
)]
fn test_sub_blocks_with_labels(#[case] source: &str, #[case] name: &str) {
    let (root, errors) = decoded::<RootSub>(source);
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(
        root.subs,
        vec![SubObj {
            kind: "pipe_something".to_string(),
            name: name.to_string(),
            host: "host".to_string(),
            ip: "ip".to_string(),
        }]
    );
}

#[test]
fn test_nested_block_via_assignment() {
    let (root, errors) = decoded::<Backends>(
        "backend remote {\n\t.ip = \"localhost\";\n\t.probe = {\n\t\tx = 10;\n\t};\n}",
    );
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(
        root.backends,
        vec![Backend {
            kind: "remote".to_string(),
            ip: "localhost".to_string(),
            probe: Some(Probe { x: 10 }),
        }]
    );
}

#[test]
fn test_unknown_names_are_ignored() {
    let (settings, errors) = decoded::<Settings>(
        "api = \"a\";\nport = 80;\nbackend b { .ip = \"x\"; }\n\"stray\";\nvcl 4.1;",
    );
    assert!(errors.is_empty());
    assert_eq!(settings.api, "a");
    assert_eq!(settings.x, 0);
}

#[test]
fn test_second_scalar_block_is_an_arity_error() {
    let (single, errors) = decoded::<Single>(
        "backend first { .ip = \"1.1.1.1\"; }\nbackend second { .ip = \"2.2.2.2\"; }",
    );
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        DecodeError::DuplicateBlock { block, location } => {
            assert_eq!(block, "backend");
            assert_eq!(location.start.line, 1);
        }
        other => panic!("expected duplicate block, got {:?}", other),
    }
    let backend = single.backend.unwrap();
    assert_eq!(backend.kind, "first");
    assert_eq!(backend.ip, "1.1.1.1");
}

#[test]
fn test_coercion_error_keeps_decoding() {
    let (settings, errors) = decoded::<Settings>("x = \"many\";\napi = \"still set\";");
    assert_eq!(settings.api, "still set");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        DecodeError::Coercion {
            field,
            expected,
            found,
            location,
        } => {
            assert_eq!(field, "x");
            assert_eq!(expected, "integer");
            assert_eq!(found, "\"many\"");
            assert_eq!(location.span, 4..10);
        }
        other => panic!("expected coercion error, got {:?}", other),
    }
}

#[derive(Debug, Default, PartialEq)]
struct Misdeclared {
    name: String,
    items: Vec<String>,
}

impl Record for Misdeclared {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .value("name,flat", |r| &mut r.name)
            .list("items", |r| &mut r.items);
    }
}

#[test]
fn test_invalid_record_is_rejected_before_mutation() {
    let (target, errors) = decoded::<Misdeclared>("name = \"x\";\n\"item\";");
    assert_eq!(target, Misdeclared::default());
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|error| matches!(error, DecodeError::TargetShape { .. })));
}

#[test]
fn test_decode_body_of_a_single_block() {
    let parsed = parse_program("sub pipe_something pipe_keke { .host = \"h\"; }");
    let Some(Statement::Block(block)) = parsed.program.statements.first() else {
        panic!("expected a block");
    };
    let mut sub = SubObj::default();
    let errors = decode_body(&block.body, &mut sub);
    assert!(errors.is_empty());
    assert_eq!(sub.host, "h");
    assert_eq!(sub.kind, "");
}

#[test]
fn test_schema_inference() {
    let schema = infer_body_schema::<Backends>();
    assert!(schema.attributes.is_empty());
    assert_eq!(schema.blocks.len(), 1);

    let backend = &schema.blocks[0];
    assert_eq!(backend.kind, "backend");
    assert_eq!(backend.label_names, vec!["type"]);
    assert!(backend.repeats);
    assert_eq!(backend.body.attributes.len(), 1);
    assert_eq!(backend.body.blocks.len(), 1);
    assert!(!backend.body.blocks[0].repeats);
    assert_eq!(backend.body.blocks[0].body.attributes[0].name, "x");
}

#[test]
fn test_field_tags() {
    let tags = get_field_tags::<SubObj>();
    assert_eq!(tags.labels.len(), 2);
    assert_eq!(tags.attributes.len(), 2);
    assert!(tags.blocks.is_empty());
    assert_eq!(tags.labels[1].name, "name");
}

#[test]
fn test_schema_matches_program_content() {
    let parsed = parse_program("acl a { }\nbackend b { }\nsub s { }\nacl c { }");
    let content = parsed.program.content(&infer_body_schema::<Root>());
    let groups = content.blocks_by_type();
    assert_eq!(groups["acl"].len(), 2);
    assert_eq!(groups["sub"].len(), 1);
    assert!(!groups.contains_key("backend"));
}

#[test]
fn test_from_str() {
    let settings: Settings = from_str("x = 3; api = \"a\";").unwrap();
    assert_eq!(settings.x, 3);

    assert!(matches!(from_str::<Settings>("x = ;"), Err(Error::Syntax(_))));
    match from_str::<Settings>("x = \"nope\";") {
        Err(Error::Decode(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected decode failure, got {:?}", other),
    }
}

#[test]
fn test_decoding_twice_is_idempotent() {
    let parsed = parse_program("acl local { \"a\"; \"b\"; }\nsub s { \"x\"/8; }");
    let mut first = Root::default();
    let mut second = Root::default();
    assert!(decode(&parsed.program, &mut first).is_empty());
    assert!(decode(&parsed.program, &mut second).is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_header_comment_before_program() {
    let source = "/* generated\n * do not edit */\nacl local { \"localhost\"; }\n/**/ sub s { \"x\"; }";
    let parsed = parse_program(source);
    assert!(parsed.is_ok(), "unexpected errors: {:?}", parsed.errors);

    let mut root = Root::default();
    assert!(decode(&parsed.program, &mut root).is_empty());
    assert_eq!(root.acls, vec![acl("local", &["localhost"])]);
    assert_eq!(root.subs.len(), 1);
    assert_eq!(root.subs[0].endpoints, vec!["x"]);
}

#[test]
fn test_negated_flat_entry_keeps_source_text() {
    let (root, errors) = decoded::<Root>("acl local { \"localhost\"; !\"10.0.0.1\"; }");
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(root.acls, vec![acl("local", &["localhost", "!\"10.0.0.1\""])]);
}

#[test]
fn test_schema_content_includes_body_attributes() {
    let parsed = parse_program("backend web { .ip = \"10.0.0.1\"; .probe = { x = 10; }; }");
    let schema = infer_body_schema::<Backends>();
    let content = parsed.program.content(&schema);
    let backend = content.blocks[0];

    let inner = backend.body.content(&schema.blocks[0].body);
    assert!(inner.attributes.contains_key(".ip"));
    let probe = inner.attributes[".probe"];
    assert_eq!(probe.body().map(|body| body.statements.len()), Some(1));
}
