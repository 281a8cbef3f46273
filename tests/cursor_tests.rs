use pretty_assertions::assert_eq;
use std::collections::HashMap;
use trellis::{Cursor, PathSegment, TreeError, Value};

fn field(name: &str) -> PathSegment {
    PathSegment::Field(name.to_string())
}

fn cursor(path: &str) -> Cursor {
    Cursor::parse(path).unwrap()
}

fn json_object(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

fn sample_tree() -> Value {
    json_object(vec![
        (
            "jobs",
            Value::Array(vec![
                json_object(vec![
                    ("name", Value::String("web".into())),
                    ("instances", Value::Integer(2)),
                ]),
                json_object(vec![
                    ("name", Value::String("db".into())),
                    ("instances", Value::Integer(1)),
                ]),
            ]),
        ),
        (
            "ports",
            Value::Array(vec![Value::Integer(80), Value::Integer(443), Value::Integer(8080)]),
        ),
        ("numbered", json_object(vec![("0", Value::String("zero".into()))])),
        ("name", Value::String("deployment".into())),
    ])
}

// ========================================================================
// Parsing
// ========================================================================

#[test]
fn test_parse_dotted() {
    assert_eq!(
        cursor("meta.jobs.web").segments,
        vec![field("meta"), field("jobs"), field("web")]
    );
}

#[test]
fn test_parse_brackets_and_numbers() {
    assert_eq!(
        cursor("jobs[0].name").segments,
        vec![field("jobs"), PathSegment::Index(0), field("name")]
    );
    assert_eq!(
        cursor("jobs.1.name").segments,
        vec![field("jobs"), PathSegment::Index(1), field("name")]
    );
    assert_eq!(
        cursor("grid[1][-1]").segments,
        vec![field("grid"), PathSegment::Index(1), PathSegment::Index(-1)]
    );
}

#[test]
fn test_parse_root_prefix() {
    assert_eq!(cursor("$.meta.azs"), cursor("meta.azs"));
    assert!(cursor("$").is_empty());
    assert!(cursor("").is_empty());
}

#[test]
fn test_parse_invalid() {
    assert!(matches!(Cursor::parse("a..b"), Err(TreeError::InvalidPath(_))));
    assert!(matches!(Cursor::parse("a[0"), Err(TreeError::InvalidPath(_))));
    assert!(matches!(Cursor::parse("a[]"), Err(TreeError::InvalidPath(_))));
    assert!(matches!(Cursor::parse("a[0]b"), Err(TreeError::InvalidPath(_))));
}

#[test]
fn test_display() {
    assert_eq!(cursor("jobs.0.name").to_string(), "jobs[0].name");
    assert_eq!(cursor("$.meta.azs").to_string(), "meta.azs");
    assert_eq!(Cursor::root().to_string(), "");
}

// ========================================================================
// Containment
// ========================================================================

#[test]
fn test_under_is_strict() {
    assert!(cursor("a.b").under(&cursor("a")));
    assert!(cursor("a.b.c").under(&cursor("a")));
    assert!(!cursor("a").under(&cursor("a")));
    assert!(!cursor("a").under(&cursor("a.b")));
    assert!(!cursor("ab.c").under(&cursor("a")));
    assert!(!cursor("b.a").under(&cursor("a")));
}

#[test]
fn test_under_root() {
    assert!(cursor("a").under(&Cursor::root()));
    assert!(!Cursor::root().under(&Cursor::root()));
}

#[test]
fn test_under_matches_index_and_numeric_field() {
    let parent = Cursor::new(vec![field("list"), field("0")]);
    assert!(cursor("list[0].name").under(&parent));
    assert!(cursor("list[0]").same_as(&parent));
}

// ========================================================================
// Lookup
// ========================================================================

#[test]
fn test_resolve_fields_and_indices() {
    let tree = sample_tree();
    assert_eq!(cursor("name").resolve(&tree).unwrap(), &Value::String("deployment".into()));
    assert_eq!(cursor("ports[1]").resolve(&tree).unwrap(), &Value::Integer(443));
    assert_eq!(cursor("ports.-1").resolve(&tree).unwrap(), &Value::Integer(8080));
    assert_eq!(Cursor::root().resolve(&tree).unwrap(), &tree);
}

#[test]
fn test_resolve_index_on_map_uses_key() {
    let tree = sample_tree();
    assert_eq!(
        cursor("numbered.0").resolve(&tree).unwrap(),
        &Value::String("zero".into())
    );
}

#[test]
fn test_resolve_list_entry_by_name() {
    let tree = sample_tree();
    assert_eq!(cursor("jobs.db.instances").resolve(&tree).unwrap(), &Value::Integer(1));
}

#[test]
fn test_resolve_errors() {
    let tree = sample_tree();

    assert_eq!(
        cursor("jobs.api.instances").resolve(&tree).unwrap_err(),
        TreeError::NotFound { path: "jobs.api".into() }
    );
    assert_eq!(
        cursor("ports[3]").resolve(&tree).unwrap_err(),
        TreeError::IndexOutOfRange { path: "ports[3]".into(), len: 3 }
    );
    assert_eq!(
        cursor("ports[-4]").resolve(&tree).unwrap_err(),
        TreeError::IndexOutOfRange { path: "ports[-4]".into(), len: 3 }
    );
    assert_eq!(
        cursor("name.first").resolve(&tree).unwrap_err(),
        TreeError::NotTraversable { path: "name".into(), kind: "string" }
    );
}

#[test]
fn test_canonical_replaces_names_with_indices() {
    let tree = sample_tree();
    assert_eq!(
        cursor("jobs.db.instances").canonical(&tree).unwrap(),
        cursor("jobs[1].instances")
    );
    assert_eq!(cursor("ports.-1").canonical(&tree).unwrap(), cursor("ports[2]"));
    assert!(cursor("jobs.api").canonical(&tree).is_err());
}

#[test]
fn test_set_replaces_existing_value() {
    let mut tree = sample_tree();

    cursor("jobs.web.instances").set(&mut tree, Value::Integer(5)).unwrap();
    cursor("ports[0]").set(&mut tree, Value::String("http".into())).unwrap();

    assert_eq!(cursor("jobs[0].instances").resolve(&tree).unwrap(), &Value::Integer(5));
    assert_eq!(cursor("ports[0]").resolve(&tree).unwrap(), &Value::String("http".into()));
}

#[test]
fn test_set_missing_path_fails() {
    let mut tree = sample_tree();
    let err = cursor("jobs.api.instances").set(&mut tree, Value::Null).unwrap_err();
    assert_eq!(err, TreeError::NotFound { path: "jobs.api".into() });
}
