use std::sync::Arc;

use argz_core::{
    Argument, ArgumentVector, BypassedArgument, CastError, FnConverter, IssueCode, NameCase,
    NamedArgument, ObjectArgument, ParseError, PathKey, PositionalArgument, ResolveStatus,
    SchemaKind, UnionArgument, UnionError, ValueSchema,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn leaf(name: &str) -> ArgumentVector {
    ArgumentVector::new(NamedArgument::string().named(name))
}

fn nested() -> ArgumentVector {
    ArgumentVector::new(
        ObjectArgument::new().field(
            "hello",
            ObjectArgument::new().field("bye", NamedArgument::string()),
        ),
    )
}

// ---------------------------------------------------------------------------
// Simple flags
// ---------------------------------------------------------------------------

#[test]
fn test_nothing_to_collect_is_absent() {
    let argv = ArgumentVector::new(ObjectArgument::new().field("name", NamedArgument::string()));
    let resolution = argv.resolve::<&str>(&[]);
    assert_eq!(resolution.status, ResolveStatus::Valid);
    assert_eq!(resolution.value, None);
    assert!(resolution.issues.is_empty());
}

#[test]
fn test_simple_leaf_root() {
    let argv = leaf("hello");

    for input in [&["--hello", "world"][..], &["--hello=world"][..]] {
        let resolution = argv.resolve(input);
        assert_eq!(resolution.status, ResolveStatus::Valid);
        assert_eq!(resolution.value, Some(json!("world")));
    }

    assert_eq!(argv.parse(&["--hello=world"]).unwrap(), json!("world"));
}

#[test]
fn test_short_cluster_matches_separate_flags() {
    let argv = ArgumentVector::new(
        ObjectArgument::new()
            .field("all", NamedArgument::boolean().alias("a"))
            .field("block", NamedArgument::number().alias("b")),
    );

    let clustered = argv.resolve(&["-ab", "512"]);
    let separate = argv.resolve(&["-a", "-b", "512"]);
    assert!(clustered.is_valid());
    assert_eq!(clustered.value, Some(json!({"all": true, "block": 512})));
    assert_eq!(clustered.value, separate.value);
}

#[test]
fn test_names_follow_the_converter() {
    let root = ObjectArgument::new().field("dryRun", NamedArgument::boolean());
    let kebab = ArgumentVector::new(root.clone());
    let snake = ArgumentVector::with_converter(root.clone(), Arc::new(NameCase::Snake));

    assert!(kebab.resolve(&["--dry-run"]).is_valid());
    assert!(!kebab.resolve(&["--dry_run"]).is_valid());
    assert!(snake.resolve(&["--dry_run"]).is_valid());

    // A one-off converter for a single call.
    let upper = FnConverter::new("upper", |key: &str| key.to_uppercase());
    let resolution = kebab.resolve_with(&["--DRYRUN"], &upper);
    assert_eq!(resolution.value, Some(json!({"dryRun": true})));
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

#[test]
fn test_dotted_and_json_forms_agree() {
    let argv = nested();
    let expected = Some(json!({"hello": {"bye": "world"}}));

    let inputs: [&[&str]; 4] = [
        &["--hello.bye", "world"],
        &["--hello.bye=world"],
        &["--hello", r#"{ "bye": "world" }"#],
        &[r#"--hello={ "bye": "world" }"#],
    ];
    for input in inputs {
        let resolution = argv.resolve(input);
        assert_eq!(resolution.status, ResolveStatus::Valid, "input: {input:?}");
        assert_eq!(resolution.value, expected, "input: {input:?}");
    }
}

#[test]
fn test_specific_flag_overrides_json_in_any_order() {
    let argv = nested();
    let expected = Some(json!({"hello": {"bye": "specific", "other": 1}}));

    let json_first = argv.resolve(&[
        r#"--hello={"bye": "broad", "other": 1}"#,
        "--hello.bye=specific",
    ]);
    let flag_first = argv.resolve(&[
        "--hello.bye=specific",
        r#"--hello={"bye": "broad", "other": 1}"#,
    ]);

    assert_eq!(json_first.value, expected);
    assert_eq!(flag_first.value, expected);
}

#[test]
fn test_named_object_root() {
    let argv = ArgumentVector::new(
        ObjectArgument::new()
            .named("config")
            .field(
                "first",
                ObjectArgument::new().field("value", NamedArgument::string()),
            )
            .field("second", NamedArgument::string()),
    );

    assert_eq!(
        argv.parse(&["--config.first.value", "value", "--config.second=b"])
            .unwrap(),
        json!({"first": {"value": "value"}, "second": "b"})
    );
    assert_eq!(
        argv.parse(&["--config", r#"{ "first": { "value": "v" }, "second": "b" }"#])
            .unwrap(),
        json!({"first": {"value": "v"}, "second": "b"})
    );

    // Not JSON: the group gets nothing and `first` ends up missing.
    let err = argv
        .parse(&["--config.first", "value", "--config.second", "b"])
        .unwrap_err();
    assert!(matches!(err, ParseError::Invalid(_)));
    assert_eq!(err.issues()[0].code, IssueCode::Required);
}

#[test]
fn test_unknown_key_policies() {
    let base = || ObjectArgument::new().field("value", NamedArgument::string());
    let input = ["--value", "a", "--hello", "b"];

    let strict = ArgumentVector::new(base().strict()).parse(&input).unwrap_err();
    assert_eq!(strict.issues()[0].code, IssueCode::UnknownArgument);

    assert_eq!(
        ArgumentVector::new(base().strip()).parse(&input).unwrap(),
        json!({"value": "a"})
    );
    assert_eq!(
        ArgumentVector::new(base().passthrough()).parse(&input).unwrap(),
        json!({"value": "a", "hello": "b"})
    );
    assert_eq!(
        ArgumentVector::new(base().catchall(NamedArgument::json()))
            .parse(&["--value", "a", "--limit", "3"])
            .unwrap(),
        json!({"value": "a", "limit": 3})
    );
}

// ---------------------------------------------------------------------------
// Positional and bypassed tokens
// ---------------------------------------------------------------------------

#[test]
fn test_positional_root_collects_everything() {
    let argv = ArgumentVector::new(PositionalArgument::default());
    let resolution = argv.resolve(&["hello", "world"]);
    assert!(resolution.is_valid());
    assert_eq!(resolution.value, Some(json!(["hello", "world"])));

    // No flag can resolve against a positional root.
    let resolution = argv.resolve(&["--flag"]);
    assert_eq!(resolution.status, ResolveStatus::Dirty);
    assert_eq!(resolution.issues[0].code, IssueCode::UnknownArgument);
}

#[test]
fn test_positional_field_is_found() {
    let argv = ArgumentVector::new(
        ObjectArgument::new()
            .field("test", NamedArgument::string())
            .field("other", PositionalArgument::default()),
    );

    assert_eq!(
        argv.resolve(&["value", "other"]).value,
        Some(json!({"other": ["value", "other"]}))
    );
    assert_eq!(
        argv.resolve(&["--test", "value", "hello"]).value,
        Some(json!({"test": "value", "other": ["hello"]}))
    );
}

#[test]
fn test_separator_stops_interpretation() {
    let argv = ArgumentVector::new(BypassedArgument::default());
    let resolution = argv.resolve(&["--", "--hello", "world", "test", "-al", "--"]);
    assert!(resolution.is_valid());
    assert_eq!(
        resolution.value,
        Some(json!(["--hello", "world", "test", "-al", "--"]))
    );

    let argv = ArgumentVector::new(
        ObjectArgument::new()
            .field("value", NamedArgument::string())
            .field("anotherValue", BypassedArgument::default()),
    );
    assert_eq!(
        argv.resolve(&["--value=a", "--", "--this", "is", "bypassed"]).value,
        Some(json!({"value": "a", "anotherValue": ["--this", "is", "bypassed"]}))
    );
    assert_eq!(
        argv.resolve(&["--value=a"]).value,
        Some(json!({"value": "a", "anotherValue": []}))
    );
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_flag_keeps_other_values() {
    let argv = ArgumentVector::new(
        ObjectArgument::new()
            .field("name", NamedArgument::string())
            .field("count", NamedArgument::number()),
    );

    let resolution = argv.resolve(&["--name=x", "--bogus", "--count", "2"]);
    assert_eq!(resolution.status, ResolveStatus::Dirty);
    assert_eq!(resolution.value, Some(json!({"name": "x", "count": 2})));
    assert_eq!(resolution.issues.len(), 1);
    assert_eq!(resolution.issues[0].code, IssueCode::UnknownArgument);
    assert_eq!(resolution.issues[0].path, vec![PathKey::Index(1)]);
    assert!(resolution.issues[0].message.contains("--bogus"));

    assert!(matches!(
        resolution.into_result(),
        Err(ParseError::Invalid(issues)) if issues.len() == 1
    ));
}

#[test]
fn test_malformed_tokens_are_reported() {
    let argv = leaf("name");
    let resolution = argv.resolve(&["--name=", "-", "--name=ok"]);
    assert_eq!(resolution.status, ResolveStatus::Dirty);
    let codes: Vec<IssueCode> = resolution.issues.iter().map(|issue| issue.code).collect();
    assert_eq!(
        codes,
        vec![IssueCode::MalformedArgument, IssueCode::MalformedArgument]
    );
    assert_eq!(resolution.value, Some(json!("ok")));
}

#[test]
fn test_custom_caster_failures() {
    let even = NamedArgument::custom(|raw| {
        let raw = raw.ok_or(CastError::Missing)?;
        match raw.parse::<i64>() {
            Ok(n) if n % 2 == 0 => Ok(Some(json!(n))),
            _ => Err(CastError::invalid(format!("`{raw}` is not an even number"))),
        }
    });
    let argv = ArgumentVector::new(ObjectArgument::new().field("even", even));

    assert_eq!(argv.resolve(&["--even=4"]).value, Some(json!({"even": 4})));

    let resolution = argv.resolve(&["--even=3"]);
    assert_eq!(resolution.issues[0].code, IssueCode::IncorrectValue);
    assert!(resolution.issues[0].message.contains("not an even number"));

    let resolution = argv.resolve(&["--even"]);
    assert_eq!(resolution.issues[0].code, IssueCode::MissingValue);
}

// ---------------------------------------------------------------------------
// Unions
// ---------------------------------------------------------------------------

#[test]
fn test_union_construction_rules() {
    assert!(matches!(
        Argument::union(vec![
            PositionalArgument::default().into(),
            NamedArgument::string().into(),
        ]),
        Err(UnionError::IncompatibleKinds { .. })
    ));
    assert!(
        Argument::union(vec![
            NamedArgument::string().into(),
            NamedArgument::number().into(),
        ])
        .is_ok()
    );
}

#[test]
fn test_union_of_objects() {
    let union = UnionArgument::new(vec![
        ObjectArgument::new()
            .field("nested", NamedArgument::string())
            .into(),
        ObjectArgument::new()
            .field("another", NamedArgument::string())
            .into(),
    ])
    .unwrap();
    let argv = ArgumentVector::new(union);

    assert_eq!(
        argv.parse(&["--nested=a"]).unwrap(),
        json!({"nested": "a"})
    );
    assert_eq!(
        argv.parse(&["--another=b"]).unwrap(),
        json!({"another": "b"})
    );
}

#[test]
fn test_union_leaf_casts_first_match() {
    let argv = ArgumentVector::new(
        ObjectArgument::new().field(
            "level",
            UnionArgument::new(vec![
                NamedArgument::number().into(),
                NamedArgument::string().into(),
            ])
            .unwrap(),
        ),
    );

    assert_eq!(argv.parse(&["--level=3"]).unwrap(), json!({"level": 3}));
    assert_eq!(argv.parse(&["--level=max"]).unwrap(), json!({"level": "max"}));
}

// ---------------------------------------------------------------------------
// Validation layer
// ---------------------------------------------------------------------------

#[test]
fn test_defaults_and_optionals() {
    let argv = ArgumentVector::new(
        ObjectArgument::new()
            .field("host", Argument::from(NamedArgument::string()).default_value("localhost"))
            .field("port", Argument::from(NamedArgument::number()).optional())
            .field("mode", NamedArgument::string().with_kind(SchemaKind::Union(vec![
                ValueSchema::literal("fast"),
                ValueSchema::literal("safe"),
            ]))),
    );

    assert_eq!(
        argv.parse(&["--mode", "fast"]).unwrap(),
        json!({"host": "localhost", "mode": "fast"})
    );

    let err = argv.parse(&["--mode", "slow"]).unwrap_err();
    assert_eq!(err.issues()[0].code, IssueCode::InvalidUnion);
    assert_eq!(err.issues()[0].path, vec![PathKey::from("mode")]);

    let err = argv.parse::<&str>(&[]).unwrap_err();
    assert_eq!(err.issues()[0].code, IssueCode::Required);
}

#[test]
fn test_positional_items_are_validated() {
    let argv = ArgumentVector::new(
        ObjectArgument::new().field("words", PositionalArgument::new(ValueSchema::literal("hi"))),
    );

    assert!(argv.parse(&["hi", "hi"]).is_ok());
    let err = argv.parse(&["hi", "bye"]).unwrap_err();
    assert_eq!(
        err.issues()[0].path,
        vec![PathKey::from("words"), PathKey::Index(1)]
    );
}

#[test]
fn test_resolve_json_input() {
    let argv = leaf("hello");
    assert_eq!(
        argv.resolve_json(&json!(["--hello", "world"])).value,
        Some(json!("world"))
    );

    let resolution = argv.resolve_json(&json!("--hello=world"));
    assert_eq!(resolution.status, ResolveStatus::Aborted);
    assert_eq!(resolution.issues[0].code, IssueCode::StructuralAbort);
}
