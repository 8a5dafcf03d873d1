//! End-to-end validation scenarios driving the public API.

use json_prototype_core::{
    HookError, Normalizer, OpaqueValue, SchemaError, Validator, ValidatorOptions, Value,
};
use serde_json::json;

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn validator() -> Validator {
    Validator::with_defaults()
}

#[test]
fn test_any_type_is_identity_for_every_value_kind() {
    let validator = validator();
    let proto = v(json!({ "type": "any" }));
    let samples = [
        Value::Null,
        v(json!(true)),
        v(json!(7.25)),
        v(json!("text")),
        v(json!([1, [2], {"k": null}])),
        v(json!({ "nested": { "deep": [] } })),
        Value::from(OpaqueValue::new("billing.Money", v(json!({"cents": 100})))),
    ];
    for sample in samples {
        let outcome = validator.validate(&sample, &proto).unwrap();
        assert_eq!(outcome.into_value(), Some(sample));
    }
}

#[test]
fn test_null_type_rejects_every_non_null_value() {
    let validator = validator();
    let proto = v(json!({ "type": "null" }));
    assert!(validator.validate(&Value::Null, &proto).unwrap().is_valid());
    for sample in [v(json!(false)), v(json!(0)), v(json!("null")), v(json!([]))] {
        assert!(!validator.validate(&sample, &proto).unwrap().is_valid());
    }
}

#[test]
fn test_number_bounds_scenarios() {
    let validator = validator();
    let proto = v(json!({ "type": "number", "min": 1, "max": 3 }));

    let ok = validator.validate(&v(json!(2)), &proto).unwrap();
    assert_eq!(ok.into_value(), Some(v(json!(2))));

    let failure = validator.validate(&v(json!(5)), &proto).unwrap();
    let message = failure.message().unwrap();
    assert!(message.contains('3'), "message should name the bound: {message}");
    assert!(message.contains('5'), "message should name the actual: {message}");
}

#[test]
fn test_string_enum_scenarios() {
    let validator = validator();
    let proto = v(json!({ "type": "string", "enum": ["a", "b"] }));
    assert!(validator.validate(&v(json!("a")), &proto).unwrap().is_valid());
    assert!(!validator.validate(&v(json!("c")), &proto).unwrap().is_valid());
}

#[test]
fn test_string_not_list_and_err_on_empty() {
    let validator = validator();
    let proto = v(json!({ "type": "string", "not": ["root"], "err_on_empty": true }));
    assert!(validator.validate(&v(json!("alice")), &proto).unwrap().is_valid());
    assert!(!validator.validate(&v(json!("root")), &proto).unwrap().is_valid());
    // Whitespace-only counts as empty.
    let failure = validator.validate(&v(json!("   ")), &proto).unwrap();
    assert!(failure.message().unwrap().contains("empty string"));
}

#[test]
fn test_first_matching_field_pattern_wins() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": [
            { "a": { "req": true, "definition": { "type": "number" } } },
            { "b": { "req": true, "definition": { "type": "string" } } },
            { "b": { "req": true, "definition": { "type": "any" } } }
        ]
    }));

    // The second alternative matches; the third never runs, so the output
    // is exactly what the second alone would have produced.
    let data = v(json!({ "b": "hello" }));
    let outcome = validator.validate(&data, &proto).unwrap();
    assert_eq!(outcome.into_value(), Some(v(json!({ "b": "hello" }))));
}

#[test]
fn test_exhausted_field_patterns_aggregate_failures() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": [
            { "a": { "req": true, "definition": { "type": "number" } } },
            { "b": { "req": true, "definition": { "type": "string" } } }
        ]
    }));

    let failure = validator.validate(&v(json!({ "c": 1 })), &proto).unwrap();
    let message = failure.message().unwrap().to_string();
    assert!(message.contains("none of the possible field patterns validated"));
    assert!(message.contains("required field a was not found"));
    assert!(message.contains("required field b was not found"));
    assert_eq!(message.lines().count(), 3);
}

#[test]
fn test_field_definition_alternatives_first_match_wins() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "id": {
                "req": true,
                "definition": [
                    { "type": "number" },
                    { "type": "string", "regex": "[0-9]+" }
                ]
            }
        }
    }));

    assert!(validator.validate(&v(json!({ "id": 42 })), &proto).unwrap().is_valid());
    assert!(validator.validate(&v(json!({ "id": "42" })), &proto).unwrap().is_valid());

    let failure = validator.validate(&v(json!({ "id": "x" })), &proto).unwrap();
    let message = failure.message().unwrap();
    assert!(message.contains("none of the possible field definitions validated"));
    assert!(message.contains(".id"));
}

#[test]
fn test_array_failure_is_fail_fast_and_index_prefixed() {
    let validator = validator();
    let proto = v(json!({
        "type": "array",
        "children": { "type": "number" }
    }));

    let failure = validator.validate(&v(json!([1, "x", 2])), &proto).unwrap();
    let message = failure.message().unwrap();
    assert!(message.starts_with("[1]"), "unexpected path prefix: {message}");
}

#[test]
fn test_array_length_bounds() {
    let validator = validator();
    let proto = v(json!({
        "type": "array",
        "min": 1,
        "max": 2,
        "children": { "type": "any" }
    }));
    assert!(!validator.validate(&v(json!([])), &proto).unwrap().is_valid());
    assert!(validator.validate(&v(json!([1, 2])), &proto).unwrap().is_valid());
    assert!(!validator.validate(&v(json!([1, 2, 3])), &proto).unwrap().is_valid());
}

#[test]
fn test_nested_failure_paths_are_dotted_and_bracketed() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "orders": {
                "req": true,
                "definition": {
                    "type": "array",
                    "children": {
                        "type": "struct",
                        "fields": {
                            "total": { "req": true, "definition": { "type": "number" } }
                        }
                    }
                }
            }
        }
    }));

    let data = v(json!({ "orders": [ { "total": 1 }, { "total": "oops" } ] }));
    let failure = validator.validate(&data, &proto).unwrap();
    let message = failure.message().unwrap();
    assert!(
        message.starts_with(".orders[1].total"),
        "unexpected path trail: {message}"
    );
}

#[test]
fn test_conditional_requiredness_against_sibling_field() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "kind": { "req": true, "definition": { "type": "string" } },
            "card_number": {
                "req": { "eq&kind": "card" },
                "definition": { "type": "string" }
            }
        }
    }));

    assert!(validator
        .validate(&v(json!({ "kind": "cash" })), &proto)
        .unwrap()
        .is_valid());

    let failure = validator
        .validate(&v(json!({ "kind": "card" })), &proto)
        .unwrap();
    assert_eq!(
        failure.message(),
        Some(" required field card_number was not found")
    );
}

#[test]
fn test_or_condition_short_circuits_before_bad_branch() {
    let validator = validator();
    // Struct keys iterate sorted, so "eq&a" runs before "gt&z"; once it is
    // true the malformed ordering literal must never be examined.
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "flag": {
                "req": { "or": { "eq&a": 1, "gt&z": "not-a-number" } },
                "definition": { "type": "boolean" }
            }
        }
    }));

    let failure = validator.validate(&v(json!({ "a": 1 })), &proto).unwrap();
    assert_eq!(failure.message(), Some(" required field flag was not found"));
}

#[test]
fn test_condition_reaches_grandparent_scope() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "mode": { "req": true, "definition": { "type": "string" } },
            "outer": {
                "req": true,
                "definition": {
                    "type": "struct",
                    "fields": {
                        "inner": {
                            "req": true,
                            "definition": {
                                "type": "struct",
                                "fields": {
                                    "token": {
                                        "req": { "eq^^&mode": "secure" },
                                        "definition": { "type": "string" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }));

    let relaxed = v(json!({ "mode": "open", "outer": { "inner": {} } }));
    assert!(validator.validate(&relaxed, &proto).unwrap().is_valid());

    let secure = v(json!({ "mode": "secure", "outer": { "inner": {} } }));
    let failure = validator.validate(&secure, &proto).unwrap();
    assert!(failure.message().unwrap().contains("required field token"));
}

#[test]
fn test_condition_past_root_is_schema_error() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "x": {
                "req": { "eq^^^^^&mode": "secure" },
                "definition": { "type": "any" }
            }
        }
    }));

    let err = validator.validate(&v(json!({})), &proto).unwrap_err();
    assert!(matches!(err, SchemaError::ConditionBeyondRoot(_)));
}

#[test]
fn test_null_literal_condition_means_absent() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "fallback": {
                "req": { "&primary": null },
                "definition": { "type": "string" }
            }
        }
    }));

    // primary absent: fallback becomes required.
    let failure = validator.validate(&v(json!({})), &proto).unwrap();
    assert!(failure.message().unwrap().contains("required field fallback"));

    // primary present: fallback is optional.
    assert!(validator
        .validate(&v(json!({ "primary": "x" })), &proto)
        .unwrap()
        .is_valid());
}

#[test]
fn test_err_on_suppression() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "legacy_id": { "err_on": true, "definition": { "type": "any" } },
            "id": { "req": true, "definition": { "type": "number" } }
        }
    }));

    assert!(validator.validate(&v(json!({ "id": 1 })), &proto).unwrap().is_valid());
    let failure = validator
        .validate(&v(json!({ "id": 1, "legacy_id": 9 })), &proto)
        .unwrap();
    assert_eq!(
        failure.message(),
        Some(" field legacy_id was found but is not allowed")
    );
}

#[test]
fn test_default_literal_and_default_item_injection() {
    let mut validator = validator();
    validator.add_default_item("origin", v(json!("api")));

    let proto = v(json!({
        "type": "struct",
        "fields": {
            "retries": { "def": 3, "definition": { "type": "number" } },
            "source": { "defitem": "origin", "definition": { "type": "string" } },
            "stamp": { "defitem": "now", "definition": { "type": "date" } }
        }
    }));

    let output = validator
        .validate(&v(json!({})), &proto)
        .unwrap()
        .into_value()
        .unwrap();
    let output = output.as_struct().unwrap();
    assert_eq!(output["retries"], v(json!(3)));
    assert_eq!(output["source"], v(json!("api")));
    assert!(matches!(output["stamp"], Value::Date(_)));
}

#[test]
fn test_undefined_default_item_is_schema_error() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "source": { "defitem": "origin", "definition": { "type": "string" } }
        }
    }));
    let err = validator.validate(&v(json!({})), &proto).unwrap_err();
    assert!(matches!(err, SchemaError::UndefinedDefaultItem(name) if name == "origin"));
}

#[test]
fn test_wildcard_governs_undeclared_fields_with_real_names_in_paths() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "id": { "req": true, "definition": { "type": "number" } },
            "*": { "definition": { "type": "string" } }
        }
    }));

    let ok = validator
        .validate(&v(json!({ "id": 1, "note": "hi", "tag": "x" })), &proto)
        .unwrap();
    assert_eq!(
        ok.into_value(),
        Some(v(json!({ "id": 1, "note": "hi", "tag": "x" })))
    );

    let failure = validator
        .validate(&v(json!({ "id": 1, "note": 5 })), &proto)
        .unwrap();
    assert!(
        failure.message().unwrap().starts_with(".note"),
        "wildcard failures use the data field name"
    );
}

#[test]
fn test_unspecified_key_modes() {
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "id": { "req": true, "definition": { "type": "number" } }
        }
    }));
    let data = v(json!({ "id": 1, "extra": "kept" }));

    // Default: pass-through verbatim.
    let outcome = Validator::with_defaults().validate(&data, &proto).unwrap();
    assert_eq!(outcome.into_value(), Some(data.clone()));

    // Strict: unexpected key fails.
    let strict = Validator::new(ValidatorOptions {
        error_on_unspecified_keys: true,
        ..Default::default()
    })
    .unwrap();
    let failure = strict.validate(&data, &proto).unwrap();
    assert!(failure.message().unwrap().contains("extra"));

    // Strip: unexpected key is dropped from the output.
    let strip = Validator::new(ValidatorOptions {
        remove_unspecified_keys: true,
        ..Default::default()
    })
    .unwrap();
    let outcome = strip.validate(&data, &proto).unwrap();
    assert_eq!(outcome.into_value(), Some(v(json!({ "id": 1 }))));
}

#[test]
fn test_remove_empty_drops_blank_strings() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "note": { "definition": { "type": "string", "remove_empty": true } },
            "name": { "definition": { "type": "string" } }
        }
    }));

    let output = validator
        .validate(&v(json!({ "note": "  ", "name": "" })), &proto)
        .unwrap()
        .into_value()
        .unwrap();
    // note is dropped; name keeps its empty string (no per-field flag).
    assert_eq!(output, v(json!({ "name": "" })));
}

#[test]
fn test_global_empty_omission_covers_pass_through_keys() {
    let omit = Validator::new(ValidatorOptions {
        remove_keys_when_value_empty: true,
        ..Default::default()
    })
    .unwrap();
    let proto = v(json!({
        "type": "struct",
        "fields": {
            "id": { "req": true, "definition": { "type": "number" } }
        }
    }));
    let output = omit
        .validate(&v(json!({ "id": 1, "blank": " ", "full": "x" })), &proto)
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(output, v(json!({ "id": 1, "full": "x" })));
}

#[test]
fn test_date_values_and_exclusive_bounds() {
    let validator = validator();
    let proto = v(json!({
        "type": "date",
        "after": "2020-01-01 00:00:00",
        "before": "2021-01-01 00:00:00"
    }));

    let ok = validator
        .validate(&v(json!("2020-06-15 12:30:00")), &proto)
        .unwrap();
    // Accepted date strings pass through verbatim.
    assert_eq!(ok.into_value(), Some(v(json!("2020-06-15 12:30:00"))));

    // Bounds are exclusive on both ends.
    assert!(!validator
        .validate(&v(json!("2020-01-01 00:00:00")), &proto)
        .unwrap()
        .is_valid());
    assert!(!validator
        .validate(&v(json!("2021-06-01 00:00:00")), &proto)
        .unwrap()
        .is_valid());

    let unparseable = validator.validate(&v(json!("tomorrow")), &proto).unwrap();
    assert!(unparseable.message().unwrap().contains("tomorrow"));
}

#[test]
fn test_malformed_date_bound_is_schema_error() {
    let validator = validator();
    let proto = v(json!({ "type": "date", "after": "whenever" }));
    let err = validator
        .validate(&v(json!("2020-06-15 12:30:00")), &proto)
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnparseableDateBound { key: "after", .. }));
}

#[test]
fn test_custom_type_indirection() {
    let mut validator = validator();
    validator.add_custom_type("zip", v(json!({ "type": "string", "regex": "[0-9]{5}" })));

    let proto = v(json!({
        "type": "struct",
        "fields": {
            "zip": { "req": true, "definition": { "custom": "zip" } }
        }
    }));
    assert!(validator
        .validate(&v(json!({ "zip": "02134" })), &proto)
        .unwrap()
        .is_valid());
    assert!(!validator
        .validate(&v(json!({ "zip": "0213" })), &proto)
        .unwrap()
        .is_valid());

    let err = validator
        .validate(&v(json!(1)), &v(json!({ "custom": "uuid" })))
        .unwrap_err();
    assert!(matches!(err, SchemaError::UndefinedCustomType(name) if name == "uuid"));
}

struct CelsiusHandle;

impl Normalizer for CelsiusHandle {
    fn normalize(&self, value: &Value) -> Result<Value, HookError> {
        match value {
            Value::Opaque(opaque) => Ok((*opaque.value).clone()),
            other => Err(format!("expected an opaque handle, found {}", other.type_name()).into()),
        }
    }

    fn denormalize(&self, value: &Value) -> Result<Value, HookError> {
        Ok(Value::from(OpaqueValue::new("std.Celsius", value.clone())))
    }
}

#[test]
fn test_normalize_denormalize_round_trip_restores_input() {
    let mut validator = validator();
    validator.add_normalizer("celsius", Box::new(CelsiusHandle));

    let proto = v(json!({
        "class": "Celsius",
        "type": "number",
        "normalize": "celsius",
        "min": -273.15
    }));
    let input = Value::from(OpaqueValue::new("std.Celsius", v(json!(21.5))));

    // Inverse hooks: the accepted output equals the input by field.
    let output = validator
        .validate(&input, &proto)
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(output, input);
}

#[test]
fn test_denormalize_false_keeps_normalized_output() {
    let mut validator = validator();
    validator.add_normalizer("celsius", Box::new(CelsiusHandle));

    let proto = v(json!({
        "class": "Celsius",
        "type": "number",
        "normalize": "celsius",
        "denormalize": false
    }));
    let input = Value::from(OpaqueValue::new("std.Celsius", v(json!(21.5))));

    let output = validator
        .validate(&input, &proto)
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(output, v(json!(21.5)));
}

#[test]
fn test_unregistered_normalizer_is_schema_error() {
    let validator = validator();
    let proto = v(json!({ "class": "Celsius", "type": "number", "normalize": "celsius" }));
    let input = Value::from(OpaqueValue::new("std.Celsius", v(json!(1))));
    let err = validator.validate(&input, &proto).unwrap_err();
    assert!(matches!(err, SchemaError::UndefinedNormalizer(name) if name == "celsius"));
}

#[test]
fn test_failing_hook_is_wrapped_with_cause() {
    let mut validator = validator();
    validator.add_normalizer("celsius", Box::new(CelsiusHandle));

    // The hook rejects non-opaque input; that surfaces as a schema error,
    // not a data failure.
    let proto = v(json!({ "class": "number", "type": "number", "normalize": "celsius" }));
    let err = validator.validate(&v(json!(3)), &proto).unwrap_err();
    assert!(matches!(err, SchemaError::Hook { operation: "normalize", .. }));
}

#[test]
fn test_class_mode_without_type_passes_value_through() {
    let validator = validator();
    let proto = v(json!({ "class": "struct, array" }));
    let data = v(json!({ "any": "shape" }));
    let outcome = validator.validate(&data, &proto).unwrap();
    assert_eq!(outcome.into_value(), Some(data));

    let failure = validator.validate(&v(json!(1)), &proto).unwrap();
    assert!(failure
        .message()
        .unwrap()
        .contains("expected class (struct, array) found class (number)"));
}

#[test]
fn test_simple_type_accepts_scalars_only() {
    let validator = validator();
    let proto = v(json!({ "type": "simple" }));
    for ok in [v(json!("x")), v(json!(1)), v(json!(true))] {
        assert!(validator.validate(&ok, &proto).unwrap().is_valid());
    }
    for bad in [v(json!([])), v(json!({}))] {
        assert!(!validator.validate(&bad, &proto).unwrap().is_valid());
    }
}

#[test]
fn test_empty_alternative_lists_are_schema_errors() {
    let validator = validator();

    let err = validator
        .validate(&v(json!({})), &v(json!({ "type": "struct", "fields": [] })))
        .unwrap_err();
    assert!(matches!(err, SchemaError::EmptyAlternatives(key) if key == "fields"));

    let proto = v(json!({
        "type": "struct",
        "fields": { "x": { "definition": [] } }
    }));
    let err = validator.validate(&v(json!({ "x": 1 })), &proto).unwrap_err();
    assert!(matches!(err, SchemaError::EmptyAlternatives(key) if key == "definition"));
}

#[test]
fn test_missing_definition_for_present_field_is_schema_error() {
    let validator = validator();
    let proto = v(json!({
        "type": "struct",
        "fields": { "x": { "req": true } }
    }));
    let err = validator.validate(&v(json!({ "x": 1 })), &proto).unwrap_err();
    assert!(matches!(err, SchemaError::BadConstraint { key, .. } if key == "definition"));
}
