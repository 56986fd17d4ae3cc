use crate::{
    config::{AggregationConfig, AggregatorKind, AggregatorSpec},
    direction::Direction,
    error::{ErrorClass, ErrorOrigin},
    factory::AnyAggregatorFactory,
    value::ColumnType,
};

const TOML_CONFIG: &str = r#"
[[aggregators]]
type = "longFirst"
name = "first_price"
fieldName = "price"

[[aggregators]]
type = "stringLast"
name = "last_label"
fieldName = "label"
timeColumn = "ts"
maxStringBytes = 64
"#;

#[test]
fn toml_config_builds_typed_factories() {
    let config = AggregationConfig::from_toml_str(TOML_CONFIG).expect("config should parse");
    let factories = config.build_factories().expect("factories should build");

    assert_eq!(factories.len(), 2);

    let AnyAggregatorFactory::Long(first) = &factories[0] else {
        panic!("expected a long factory, found {:?}", factories[0]);
    };
    assert_eq!(first.direction(), Direction::Earliest);
    assert_eq!(first.time_column(), "__time");

    let AnyAggregatorFactory::String(last) = &factories[1] else {
        panic!("expected a string factory, found {:?}", factories[1]);
    };
    assert_eq!(last.direction(), Direction::Latest);
    assert_eq!(last.time_column(), "ts");
    assert_eq!(last.limits().max_string_bytes, 64);
    assert_eq!(last.max_intermediate_size(), 8 + 1 + 4 + 64);
}

#[test]
fn json_config_matches_toml_config() {
    let json = r#"{
        "aggregators": [
            { "type": "longFirst", "name": "first_price", "fieldName": "price" },
            {
                "type": "stringLast",
                "name": "last_label",
                "fieldName": "label",
                "timeColumn": "ts",
                "maxStringBytes": 64
            }
        ]
    }"#;

    assert_eq!(
        AggregationConfig::from_json_str(json).expect("json should parse"),
        AggregationConfig::from_toml_str(TOML_CONFIG).expect("toml should parse")
    );
}

#[test]
fn single_spec_parses_from_json() {
    let spec = AggregatorSpec::from_json_str(
        r#"{ "type": "doubleLast", "name": "x", "fieldName": "y" }"#,
    )
    .expect("spec should parse");

    assert_eq!(spec, AggregatorSpec::new(AggregatorKind::DoubleLast, "x", "y"));

    let factory = spec.build().expect("factory should build");
    assert_eq!(factory.result_type(), ColumnType::Double);
    assert_eq!(factory.required_fields(), ["__time", "y"]);
}

#[test]
fn missing_name_is_a_construction_error_not_a_parse_error() {
    let spec = AggregatorSpec::from_json_str(r#"{ "type": "longLast", "fieldName": "y" }"#)
        .expect("spec should parse");

    let err = spec.build().expect_err("missing name should be rejected");
    assert_eq!(err.class, ErrorClass::Construction);
    assert_eq!(err.origin, ErrorOrigin::Factory);
}

#[test]
fn config_errors_name_the_failing_aggregator() {
    let config = AggregationConfig {
        aggregators: vec![
            AggregatorSpec::new(AggregatorKind::FloatFirst, "a", "x"),
            AggregatorSpec::new(AggregatorKind::FloatFirst, "b", ""),
        ],
    };

    let err = config.build_factories().expect_err("blank field should be rejected");
    assert_eq!(err.origin, ErrorOrigin::Config);
    assert!(err.message.starts_with("aggregator[1]: "));
}

#[test]
fn max_string_bytes_only_applies_to_string_aggregators() {
    let mut spec = AggregatorSpec::new(AggregatorKind::LongFirst, "a", "x");
    spec.max_string_bytes = Some(8);

    let err = spec.build().expect_err("budget on long should be rejected");
    assert_eq!(err.class, ErrorClass::Construction);
    assert!(err.message.contains("long"));
}

#[test]
fn oversized_max_string_bytes_is_rejected_at_build() {
    let spec = AggregatorSpec::from_json_str(
        r#"{
            "type": "stringFirst",
            "name": "a",
            "fieldName": "x",
            "maxStringBytes": 18446744073709551615
        }"#,
    )
    .expect("spec should parse");

    let err = spec.build().expect_err("oversized budget should be rejected");
    assert_eq!(err.class, ErrorClass::Construction);
    assert!(err.message.starts_with("maxStringBytes must be at most"));
}

#[test]
fn duplicate_output_names_are_rejected() {
    let config = AggregationConfig {
        aggregators: vec![
            AggregatorSpec::new(AggregatorKind::LongFirst, "dup", "x"),
            AggregatorSpec::new(AggregatorKind::LongLast, "dup", "y"),
        ],
    };

    let err = config.build_factories().expect_err("duplicate should be rejected");
    assert_eq!(err.message, "aggregator[1]: duplicate output name 'dup'");
}

#[test]
fn unknown_fields_and_kinds_are_rejected() {
    for json in [
        r#"{ "type": "longFirst", "name": "a", "fieldName": "x", "extra": 1 }"#,
        r#"{ "type": "longMin", "name": "a", "fieldName": "x" }"#,
    ] {
        let err = AggregatorSpec::from_json_str(json).expect_err("spec should be rejected");
        assert_eq!(err.origin, ErrorOrigin::Config);
    }
}

#[test]
fn empty_config_builds_nothing() {
    let config = AggregationConfig::from_toml_str("").expect("empty config should parse");

    assert!(config.build_factories().expect("nothing to build").is_empty());
}

#[test]
fn every_kind_maps_to_its_family_and_direction() {
    let kinds = [
        (AggregatorKind::DoubleFirst, ColumnType::Double, Direction::Earliest),
        (AggregatorKind::DoubleLast, ColumnType::Double, Direction::Latest),
        (AggregatorKind::FloatFirst, ColumnType::Float, Direction::Earliest),
        (AggregatorKind::FloatLast, ColumnType::Float, Direction::Latest),
        (AggregatorKind::LongFirst, ColumnType::Long, Direction::Earliest),
        (AggregatorKind::LongLast, ColumnType::Long, Direction::Latest),
        (AggregatorKind::StringFirst, ColumnType::String, Direction::Earliest),
        (AggregatorKind::StringLast, ColumnType::String, Direction::Latest),
    ];

    for (kind, column, direction) in kinds {
        assert_eq!(kind.column_type(), column);
        assert_eq!(kind.direction(), direction);
    }
}
