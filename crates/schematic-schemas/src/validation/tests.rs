//! Evaluation tests for compiled validator trees

use super::*;
use crate::problems::{ProblemKind, ValidationResult};
use crate::SchemaError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;

fn doc(json: serde_json::Value) -> Document {
    Document::try_from(json).unwrap()
}

fn compile(json: serde_json::Value) -> Arc<Validator> {
    let mut problems = ValidationResult::new();
    let validator = SchemaCompiler::new().compile(&doc(json), &mut problems);
    assert!(!problems.has_errors(), "schema problems: {}", problems);
    validator
}

fn validate(schema: serde_json::Value, document: serde_json::Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    compile(schema).validate_document(&doc(document), &mut result, &NoReferences);
    result
}

fn paths(result: &ValidationResult) -> Vec<String> {
    result.problems().iter().map(|p| p.path.to_string()).collect()
}

/// Resolver over a fixed set of compiled schemas
struct MapResolver(HashMap<String, Arc<Validator>>);

impl MapResolver {
    fn new(schemas: &[(&str, serde_json::Value)]) -> Self {
        let mut map = HashMap::new();
        for (uri, json) in schemas {
            let mut problems = ValidationResult::new();
            let validator = SchemaCompiler::with_base_uri(*uri).compile(&doc(json.clone()), &mut problems);
            map.insert(uri.to_string(), validator);
        }
        Self(map)
    }
}

impl SchemaResolver for MapResolver {
    fn resolve(&self, uri: &str) -> Result<Arc<Validator>, SchemaError> {
        self.0.get(uri).cloned().ok_or_else(|| SchemaError::not_found(uri))
    }
}

#[test]
fn test_required_property_missing() {
    let schema = json!({"properties": {"name": {"required": true}}});

    let result = validate(schema.clone(), json!({}));
    assert_eq!(result.error_count(), 1);
    assert_eq!(paths(&result), vec!["name"]);
    assert_eq!(result.problems()[0].message, "The top-level 'name' field is required");

    let result = validate(schema, json!({"name": "x"}));
    assert!(!result.has_problems());
}

#[test]
fn test_optional_property_missing_is_fine() {
    let result = validate(json!({"properties": {"age": {"type": "integer"}}}), json!({}));
    assert!(!result.has_problems());
}

#[test]
fn test_required_fails_on_present_null() {
    let result = validate(
        json!({"properties": {"name": {"required": true}}}),
        json!({"name": null}),
    );
    assert_eq!(result.error_count(), 1);
}

#[test]
fn test_required_fields_array_form() {
    let result = validate(
        json!({"required": ["id", "name"], "properties": {"nested": {"required": ["x"]}}}),
        json!({"id": 1, "nested": {}}),
    );
    assert_eq!(paths(&result), vec!["nested.x", "name"]);
    assert_eq!(result.problems()[0].message, "The 'x' field on 'nested' is required");
}

#[test]
fn test_nested_document_paths() {
    let schema = json!({
        "type": "object",
        "properties": {
            "customer": {
                "type": "object",
                "properties": {
                    "email": {"type": "string", "pattern": "[^@]+@[^@]+"},
                    "age": {"type": "integer", "minimum": 18}
                }
            }
        }
    });
    let result = validate(schema, json!({"customer": {"email": "nobody", "age": 12}}));
    assert_eq!(result.error_count(), 2);
    assert_eq!(paths(&result), vec!["customer.email", "customer.age"]);
}

#[test]
fn test_type_mismatch_is_recorded_for_convertible_values() {
    let result = validate(
        json!({"properties": {"qty": {"type": "integer"}}}),
        json!({"qty": "3"}),
    );
    assert_eq!(result.mismatch_count(), 1);
    let mismatch = result.problems()[0].mismatch().unwrap();
    assert_eq!(mismatch.actual_value, Value::from("3"));
    assert_eq!(mismatch.converted_value, Value::Integer(3));
    assert_eq!(mismatch.required_type, Type::Integer);
}

#[test]
fn test_number_accepts_integer() {
    let result = validate(json!({"properties": {"n": {"type": "number"}}}), json!({"n": 4}));
    assert!(!result.has_problems());
    assert_eq!(result.success_count(), 1);
}

#[test]
fn test_whole_document_type() {
    let result = validate(json!({"type": "array"}), json!({"a": 1}));
    assert_eq!(result.error_count(), 1);
    assert!(paths(&result)[0].is_empty());
}

#[test]
fn test_tuple_with_additional_items_disallowed() {
    let schema = json!({"properties": {"t": {
        "items": [{"type": "integer"}, {"type": "string"}],
        "additionalItems": false
    }}});

    let result = validate(schema.clone(), json!({"t": [1, "a", 2]}));
    assert_eq!(result.error_count(), 1);
    assert_eq!(paths(&result), vec!["t.2"]);

    let result = validate(schema.clone(), json!({"t": [1, "a"]}));
    assert!(!result.has_problems());

    let result = validate(schema, json!({"t": [1, "a", 2, 3]}));
    assert_eq!(result.error_count(), 2);
}

#[test]
fn test_tuple_evaluated_directly_on_an_array() {
    let validator = compile(json!({
        "items": [{"type": "integer"}, {"type": "string"}],
        "additionalItems": false
    }));
    let parent = Document::new();
    let root = Path::root();
    let value = Value::from(vec![Value::Integer(1), Value::from("a"), Value::Integer(2)]);
    let mut result = ValidationResult::new();
    let scope = Scope::new(&NoReferences, DEFAULT_MAX_REFERENCE_DEPTH);
    validator
        .validate(&Target::value(&value, "t", &parent, &root), &mut result, &scope)
        .unwrap();
    assert_eq!(result.error_count(), 1);
}

#[test]
fn test_tuple_additional_items_schema() {
    let result = validate(
        json!({"properties": {"t": {"items": [{"type": "string"}], "additionalItems": {"type": "integer"}}}}),
        json!({"t": ["a", 1, "b"]}),
    );
    assert_eq!(paths(&result), vec!["t.2"]);
}

#[test]
fn test_all_items_reports_every_failing_element() {
    let result = validate(
        json!({"properties": {"tags": {"items": {"type": "string", "maxLength": 3}}}}),
        json!({"tags": ["ok", "toolong", 5, "yes"]}),
    );
    assert_eq!(result.error_count(), 2);
    assert_eq!(paths(&result), vec!["tags.1", "tags.2"]);
    assert!(result.problems()[0].message.contains("the 2nd item does not satisfy the schema"));
    assert!(result.problems()[1].message.contains("the 3rd item"));
}

#[test]
fn test_item_mismatches_become_errors() {
    let result = validate(
        json!({"properties": {"ids": {"items": {"type": "integer"}}}}),
        json!({"ids": [1, "2"]}),
    );
    assert_eq!(result.mismatch_count(), 0);
    assert_eq!(result.error_count(), 1);
}

#[test]
fn test_items_that_are_documents() {
    let result = validate(
        json!({"properties": {"lines": {"items": {"properties": {"sku": {"required": true}}}}}}),
        json!({"lines": [{"sku": "a"}, {}]}),
    );
    assert_eq!(paths(&result), vec!["lines.1"]);
    assert!(result.problems()[0].message.contains("The 'sku' field on 'lines.1' is required"));
}

#[test]
fn test_union_first_passing_alternative_wins() {
    let result = validate(
        json!({"properties": {"v": {"type": ["integer", "string"]}}}),
        json!({"v": "x"}),
    );
    assert!(!result.has_problems());
    assert_eq!(result.success_count(), 1);
}

#[test]
fn test_union_reports_actual_type_when_nothing_matches() {
    let result = validate(
        json!({"properties": {"v": {"type": ["integer", "string"]}}}),
        json!({"v": true}),
    );
    assert!(result.has_errors());
    assert!(result.problems().iter().any(|p| p.message.contains("boolean")));
}

#[test]
fn test_union_tie_goes_to_first_alternative() {
    // Both alternatives fail with no successes; the first one's problem is kept
    let result = validate(
        json!({"properties": {"v": {"type": ["integer", "boolean"]}}}),
        json!({"v": "maybe"}),
    );
    assert_eq!(result.problems().len(), 1);
    assert!(result.problems()[0].message.contains("type integer"));
}

#[test]
fn test_union_keeps_the_most_successful_alternative() {
    let result = validate(
        json!({"properties": {"v": {"type": [
            {"type": "object", "properties": {"a": {"required": true}}},
            {"type": "object",
             "properties": {"b": {"required": true}, "c": {"type": "string"}, "d": {"type": "string"}}}
        ]}}}),
        json!({"v": {"c": "x", "d": "y"}}),
    );
    assert_eq!(result.error_count(), 1);
    assert_eq!(paths(&result), vec!["v.b"]);
}

#[test]
fn test_additional_properties_disallowed() {
    let result = validate(
        json!({"properties": {"a": {}}, "patternProperties": {"x-.*": {"type": "string"}}, "additionalProperties": false}),
        json!({"a": 1, "x-note": "n", "b": 2}),
    );
    // Pattern properties do not count as declared
    assert_eq!(paths(&result), vec!["x-note", "b"]);
    assert!(result.problems()[1].message.contains("is not allowed"));
}

#[test]
fn test_additional_properties_schema() {
    let result = validate(
        json!({"properties": {"id": {"type": "string"}}, "additionalProperties": {"type": "integer"}}),
        json!({"id": "a", "x": 1, "y": "no"}),
    );
    assert_eq!(result.mismatch_count(), 0);
    assert_eq!(paths(&result), vec!["y"]);
}

#[test]
fn test_pattern_properties() {
    let result = validate(
        json!({"patternProperties": {"n_.*": {"type": "number"}}}),
        json!({"n_a": 1.5, "n_b": "x", "other": "y"}),
    );
    assert_eq!(paths(&result), vec!["n_b"]);
}

#[test]
fn test_pattern_properties_match_whole_name() {
    let result = validate(
        json!({"patternProperties": {"a": {"type": "integer"}}}),
        json!({"banana": "not a number", "a": 1}),
    );
    assert!(!result.has_problems());

    let result = validate(
        json!({"patternProperties": {"a": {"type": "integer"}}}),
        json!({"banana": 1, "a": "x"}),
    );
    assert_eq!(paths(&result), vec!["a"]);
}

#[test]
fn test_enum_and_unique_items() {
    let result = validate(
        json!({"properties": {
            "color": {"enum": ["Red", "Green"]},
            "sizes": {"uniqueItems": true, "minItems": 1, "maxItems": 2}
        }}),
        json!({"color": "red", "sizes": ["s", "m", "s"]}),
    );
    assert_eq!(paths(&result), vec!["sizes", "sizes.2"]);
}

#[test]
fn test_min_items_too_short() {
    let result = validate(
        json!({"properties": {"sizes": {"minItems": 2}}}),
        json!({"sizes": [1]}),
    );
    assert_eq!(result.error_count(), 1);
    assert_eq!(paths(&result), vec!["sizes"]);
    assert!(result.problems()[0].message.contains("at least '2'"));
}

#[test]
fn test_self_reference_terminates() {
    let schema = json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "child": {"$ref": "#"}
        }
    });
    let result = validate(schema.clone(), json!({"name": "a", "child": {"name": "b", "child": {"name": 3}}}));
    assert_eq!(paths(&result), vec!["child.child.name"]);

    let result = validate(schema, json!({"name": "a"}));
    assert!(!result.has_problems());
}

#[test]
fn test_reference_to_other_schema() {
    let resolver = MapResolver::new(&[(
        "http://example.com/address",
        json!({"properties": {"zip": {"type": "string", "required": true}}}),
    )]);
    let validator = compile(json!({"properties": {"home": {"$ref": "http://example.com/address"}}}));

    let mut result = ValidationResult::new();
    validator.validate_document(&doc(json!({"home": {}})), &mut result, &resolver);
    assert_eq!(paths(&result), vec!["home.zip"]);
}

#[test]
fn test_missing_reference_is_an_error_with_cause() {
    let result = validate(
        json!({"properties": {"home": {"$ref": "http://example.com/missing"}}}),
        json!({"home": {}}),
    );
    let problem = &result.problems()[0];
    assert_eq!(problem.kind(), ProblemKind::Error);
    assert!(problem.message.contains("Unable to find referenced schema"));
    assert!(problem.cause().unwrap().contains("http://example.com/missing"));
}

#[test]
fn test_cyclic_references_hit_the_depth_guard() {
    let resolver = MapResolver::new(&[
        ("http://example.com/a", json!({"$ref": "http://example.com/b"})),
        ("http://example.com/b", json!({"type": "object", "minProperties": 1, "$ref": "http://example.com/a"})),
    ]);
    let validator = compile(json!({"minimum": 0, "$ref": "http://example.com/a"}));

    let mut result = ValidationResult::new();
    validator.validate_document_with_depth(&doc(json!({})), &mut result, &resolver, 16);
    assert_eq!(result.error_count(), 1);
    assert!(result.problems()[0].cause().unwrap().contains("depth limit of 16"));
}

#[test]
fn test_composite_isolates_failing_children() {
    let resolver = MapResolver::new(&[("http://example.com/loop", json!({"$ref": "http://example.com/loop"}))]);
    let validator = compile(json!({
        "properties": {
            "a": {"$ref": "http://example.com/loop"},
            "b": {"type": "boolean"}
        }
    }));

    let mut result = ValidationResult::new();
    validator.validate_document_with_depth(&doc(json!({"a": 1, "b": 2})), &mut result, &resolver, 8);
    assert_eq!(result.error_count(), 2);
    let failure = result.errors().find(|p| p.cause().is_some()).unwrap();
    assert!(failure.path.is_root());
    assert!(paths(&result).contains(&"b".to_string()));
}

#[test]
fn test_detached_self_reference() {
    let mut problems = ValidationResult::new();
    let fragment = SchemaCompiler::new()
        .create(&doc(json!({"$ref": "#"})), &Path::root(), &mut problems)
        .unwrap();
    let mut result = ValidationResult::new();
    fragment.validate_document(&Document::new(), &mut result, &NoReferences);
    assert_eq!(result.problems()[0].cause(), Some("Self reference evaluated outside of its schema"));
}

#[test]
fn test_validation_is_deterministic() {
    let schema = json!({"properties": {
        "a": {"type": "integer", "maximum": 3},
        "b": {"items": {"type": "string"}},
        "c": {"type": ["string", "null"]}
    }});
    let document = json!({"a": "9", "b": ["x", 1], "c": 2});
    let validator = compile(schema);
    let first = {
        let mut r = ValidationResult::new();
        validator.validate_document(&doc(document.clone()), &mut r, &NoReferences);
        r
    };
    let second = {
        let mut r = ValidationResult::new();
        validator.validate_document(&doc(document), &mut r, &NoReferences);
        r
    };
    assert_eq!(first, second);
}

#[test]
fn test_trees_are_shareable_across_threads() {
    let validator = compile(json!({"properties": {"n": {"type": "integer"}}}));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let validator = Arc::clone(&validator);
            std::thread::spawn(move || {
                let mut result = ValidationResult::new();
                let value = if i % 2 == 0 { json!({"n": i}) } else { json!({"n": "x"}) };
                validator.validate_document(&doc(value), &mut result, &NoReferences);
                result.has_errors()
            })
        })
        .collect();
    let outcomes: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes, vec![false, true, false, true]);
}

#[test]
fn test_find_required_and_node_count() {
    let validator = compile(json!({"properties": {"a": {"type": "string", "required": true}}}));
    assert_eq!(validator.node_count(), 4);
    assert!(validator.find_required().is_none());
}

#[test]
fn test_ordinals() {
    assert_eq!(ordinal(1), "1st");
    assert_eq!(ordinal(2), "2nd");
    assert_eq!(ordinal(3), "3rd");
    assert_eq!(ordinal(4), "4th");
    assert_eq!(ordinal(11), "11th");
    assert_eq!(ordinal(12), "12th");
    assert_eq!(ordinal(13), "13th");
    assert_eq!(ordinal(21), "21st");
    assert_eq!(ordinal(102), "102nd");
}
