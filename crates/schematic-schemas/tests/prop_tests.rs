//! Property-based tests for validation and type coercion
//!
//! These tests check that validation is repeatable and that applying the
//! coercions it finds produces documents without type mismatches.

use proptest::prelude::*;
use schematic_core::Document;
use schematic_schemas::{NoReferences, SchemaCompiler, TypeCoercionRewriter, ValidationResult, Validator};
use serde_json::{json, Value};
use std::sync::Arc;

fn order_schema() -> Arc<Validator> {
    let schema = Document::try_from(json!({
        "properties": {
            "count": {"type": "integer"},
            "paid": {"type": "boolean"},
            "total": {"type": "number"},
            "label": {"type": "string"},
            "line": {
                "properties": {
                    "sku": {"type": "string", "required": true},
                    "qty": {"type": "integer"}
                }
            },
            "tags": {"type": "array", "items": {"type": "string"}}
        }
    }))
    .unwrap();
    let mut problems = ValidationResult::new();
    SchemaCompiler::new().compile(&schema, &mut problems)
}

/// Scalars of every type, plus strings that look like other types
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6f64).prop_map(|d| json!(d)),
        "[a-z ]{0,8}".prop_map(Value::String),
        any::<i32>().prop_map(|n| Value::String(n.to_string())),
        prop_oneof![Just("true"), Just("FALSE"), Just(" 7 "), Just("2.5"), Just("-0")]
            .prop_map(|s| Value::String(s.to_string())),
    ]
}

fn order_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of(scalar_strategy()),
        proptest::option::of(scalar_strategy()),
        proptest::option::of(scalar_strategy()),
        proptest::option::of(scalar_strategy()),
        proptest::option::of((scalar_strategy(), scalar_strategy())),
        proptest::option::of(proptest::collection::vec(scalar_strategy(), 0..4)),
    )
        .prop_map(|(count, paid, total, label, line, tags)| {
            let mut order = serde_json::Map::new();
            let fields = [("count", count), ("paid", paid), ("total", total), ("label", label)];
            for (name, value) in fields {
                if let Some(value) = value {
                    order.insert(name.to_string(), value);
                }
            }
            if let Some((sku, qty)) = line {
                order.insert("line".to_string(), json!({"sku": sku, "qty": qty}));
            }
            if let Some(tags) = tags {
                order.insert("tags".to_string(), Value::Array(tags));
            }
            Value::Object(order)
        })
}

fn validate(validator: &Validator, document: &Document) -> ValidationResult {
    let mut result = ValidationResult::new();
    validator.validate_document(document, &mut result, &NoReferences);
    result
}

proptest! {
    #[test]
    fn prop_validation_is_deterministic(order in order_strategy()) {
        let validator = order_schema();
        let document = Document::try_from(order).unwrap();

        let first = validate(&validator, &document);
        let second = validate(&validator, &document);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_coerced_documents_have_no_mismatches(order in order_strategy()) {
        let validator = order_schema();
        let document = Document::try_from(order).unwrap();
        let rewriter = TypeCoercionRewriter::new();

        let result = validate(&validator, &document);
        let corrected = rewriter.apply(&document, &result);
        let revalidated = validate(&validator, &corrected);
        prop_assert_eq!(revalidated.mismatch_count(), 0);

        // Applying again changes nothing
        let again = rewriter.apply(&corrected, &revalidated);
        prop_assert!(again.ptr_eq(&corrected));
    }

    #[test]
    fn prop_mismatch_only_documents_become_valid(order in order_strategy()) {
        let validator = order_schema();
        let document = Document::try_from(order).unwrap();

        let result = validate(&validator, &document);
        if result.error_count() == 0 {
            let corrected = TypeCoercionRewriter::new().apply(&document, &result);
            prop_assert!(validate(&validator, &corrected).is_valid());
        }
    }

    #[test]
    fn prop_documents_without_mismatches_are_shared(order in order_strategy()) {
        let validator = order_schema();
        let document = Document::try_from(order).unwrap();

        let result = validate(&validator, &document);
        if result.mismatch_count() == 0 {
            prop_assert!(TypeCoercionRewriter::new().apply(&document, &result).ptr_eq(&document));
        }
    }
}
