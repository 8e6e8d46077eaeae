//! Compiling schema documents into validator trees
//!
//! Each recognised keyword of a schema document contributes one node; the
//! nodes of one schema are combined with AND semantics. Problems found in
//! the schema itself (unknown type names, malformed regular expressions,
//! unresolvable references) are recorded as warnings or errors against the
//! schema path and the offending keyword is skipped.
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use super::{AdditionalItems, AdditionalProperties, Bound, EnumValues, PatternMatch, PatternProperty, Property, TupleItems, Validator};
use crate::problems::Problems;
use crate::types::Type;
use schematic_core::{Document, Path, Value};
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use url::Url;

/// Turns schema documents into [`Validator`] trees
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    base_uri: Option<String>,
}

impl SchemaCompiler {
    /// Compiler for schemas without a URI of their own
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler for the schema identified by `uri`. Relative `$ref`s are
    /// resolved against it and references to it become self references.
    pub fn with_base_uri(uri: impl Into<String>) -> Self {
        Self {
            base_uri: Some(uri.into()),
        }
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// Compile a whole schema. A schema without any recognised keyword
    /// compiles to a node that accepts everything.
    pub fn compile(&self, schema: &Document, problems: &mut dyn Problems) -> Arc<Validator> {
        Arc::new_cyclic(|root| {
            let mut compilation = Compilation {
                compiler: self,
                root: root.clone(),
                problems,
            };
            compilation
                .create(schema, &Path::root())
                .unwrap_or_else(Validator::empty)
        })
    }

    /// Compile a schema fragment found at `path`. `None` when the fragment
    /// has no recognised keywords. Self references in a fragment compiled
    /// this way are not attached to any root.
    pub fn create(&self, schema: &Document, path: &Path, problems: &mut dyn Problems) -> Option<Validator> {
        let mut compilation = Compilation {
            compiler: self,
            root: Weak::new(),
            problems,
        };
        compilation.create(schema, path)
    }
}

struct Compilation<'c> {
    compiler: &'c SchemaCompiler,
    root: Weak<Validator>,
    problems: &'c mut dyn Problems,
}

impl Compilation<'_> {
    fn create(&mut self, schema: &Document, path: &Path) -> Option<Validator> {
        if let Some(reference) = schema.get("$ref") {
            match reference.as_str() {
                Some(reference) => return Some(self.reference(reference, &path.with("$ref"))),
                None => self.problems.record_warning(
                    &path.with("$ref"),
                    format!("Expected the '$ref' field on '{}' to be a string but found {}", path, reference.type_name()),
                ),
            }
        }

        let mut validators = Vec::new();
        self.add_type(schema, path, &mut validators);
        self.add_properties(schema, path, &mut validators);
        self.add_items(schema, path, &mut validators);
        self.add_required(schema, &mut validators);
        self.add_numeric_bounds(schema, &mut validators);
        self.add_item_counts(schema, path, &mut validators);
        self.add_pattern(schema, path, &mut validators);
        self.add_lengths(schema, path, &mut validators);
        self.add_enum(schema, path, &mut validators);
        self.add_divisible_by(schema, &mut validators);
        self.add_disallowed(schema, path, &mut validators);

        match validators.len() {
            0 => None,
            1 => validators.pop(),
            _ => Some(Validator::Composite(validators)),
        }
    }

    fn reference(&mut self, reference: &str, path: &Path) -> Validator {
        if reference == "#" {
            return Validator::SelfReference(self.root.clone());
        }
        let base = self.compiler.base_uri.as_deref();
        let resolved = if Url::parse(reference).is_ok() {
            reference.to_string()
        } else {
            match base.and_then(|b| Url::parse(b).ok()).and_then(|b| b.join(reference).ok()) {
                Some(url) => url.to_string(),
                None => {
                    self.problems.record_warning(
                        path,
                        format!("Unable to resolve the relative reference '{}' without an absolute base URI", reference),
                    );
                    reference.to_string()
                }
            }
        };
        if base.is_some_and(|b| same_document(b, &resolved)) {
            Validator::SelfReference(self.root.clone())
        } else {
            Validator::Reference(resolved)
        }
    }

    fn add_type(&mut self, schema: &Document, path: &Path, validators: &mut Vec<Validator>) {
        let Some(value) = schema.get("type") else {
            return;
        };
        let path = path.with("type");
        let mut alternatives = Vec::new();
        match value {
            Value::String(name) => alternatives.extend(self.named_type(name, &path)),
            Value::Document(nested) => alternatives.push(self.create(nested, &path).unwrap_or_else(Validator::empty)),
            Value::Array(entries) => {
                for (index, entry) in entries.iter().enumerate() {
                    match entry {
                        Value::String(name) => alternatives.extend(self.named_type(name, &path)),
                        Value::Document(nested) => alternatives.push(
                            self.create(nested, &path.with_index(index))
                                .unwrap_or_else(Validator::empty),
                        ),
                        other => self.problems.record_warning(
                            &path.with_index(index),
                            format!("Expected a type name or schema but found {}", other.type_name()),
                        ),
                    }
                }
            }
            other => self.problems.record_warning(
                &path,
                format!("Expected a type name, schema or array but found {}", other.type_name()),
            ),
        }

        match alternatives.len() {
            0 => {}
            1 => validators.extend(alternatives.pop()),
            _ => validators.push(Validator::Union(alternatives)),
        }
    }

    fn named_type(&mut self, name: &str, path: &Path) -> Option<Validator> {
        match Type::by_name(name) {
            Type::Unknown => {
                self.problems
                    .record_warning(path, format!("Unknown type name '{}'", name));
                None
            }
            known => Some(Validator::Type(known)),
        }
    }

    fn add_properties(&mut self, schema: &Document, path: &Path, validators: &mut Vec<Validator>) {
        let mut declared = BTreeSet::new();

        match schema.get("properties") {
            Some(Value::Document(properties)) => {
                for (name, value) in properties.fields() {
                    declared.insert(name.to_string());
                    let property_path = path.with("properties").with(name);
                    let Value::Document(nested) = value else {
                        self.problems.record_error(
                            &property_path,
                            format!("The schema for the '{}' property must be an object but was {}", name, value.type_name()),
                        );
                        continue;
                    };
                    if let Some(validator) = self.create(nested, &property_path) {
                        validators.push(Validator::Property(Property {
                            name: name.to_string(),
                            validator: Box::new(validator),
                        }));
                    }
                }
            }
            Some(other) => self.problems.record_warning(
                &path.with("properties"),
                format!("Expected 'properties' to be an object but found {}", other.type_name()),
            ),
            None => {}
        }

        if let Some(Value::Document(patterns)) = schema.get("patternProperties") {
            for (pattern, value) in patterns.fields() {
                let pattern_path = path.with("patternProperties").with(pattern);
                let Value::Document(nested) = value else {
                    self.problems.record_error(
                        &pattern_path,
                        format!("The schema for the '{}' pattern property must be an object but was {}", pattern, value.type_name()),
                    );
                    continue;
                };
                let Some(validator) = self.create(nested, &pattern_path) else {
                    continue;
                };
                match PatternProperty::new(pattern, validator) {
                    Ok(property) => validators.push(Validator::PatternProperty(property)),
                    Err(e) => self.problems.record_warning(
                        &pattern_path,
                        format!("Expected the pattern property name '{}' to be a valid regular expression: {}", pattern, e),
                    ),
                }
            }
        }

        match schema.get("additionalProperties") {
            Some(Value::Bool(false)) => {
                validators.push(Validator::AdditionalPropertiesDisallowed(AdditionalProperties {
                    declared,
                    validator: None,
                }));
            }
            Some(Value::Document(nested)) => {
                if let Some(validator) = self.create(nested, &path.with("additionalProperties")) {
                    validators.push(Validator::AdditionalPropertiesAllowed(AdditionalProperties {
                        declared,
                        validator: Some(Box::new(validator)),
                    }));
                }
            }
            _ => {}
        }
    }

    fn add_items(&mut self, schema: &Document, path: &Path, validators: &mut Vec<Validator>) {
        let items_path = path.with("items");
        match schema.get("items") {
            Some(Value::Document(nested)) => {
                if let Some(validator) = self.create(nested, &items_path) {
                    validators.push(Validator::AllItemsMatch(Box::new(validator)));
                }
            }
            Some(Value::Array(entries)) => {
                let mut items = Vec::with_capacity(entries.len());
                for (index, entry) in entries.iter().enumerate() {
                    match entry {
                        Value::Document(nested) => items.push(self.create(nested, &items_path.with_index(index))),
                        other => {
                            self.problems.record_warning(
                                &items_path.with_index(index),
                                format!("Expected an item schema but found {}", other.type_name()),
                            );
                            items.push(None);
                        }
                    }
                }
                let additional = match schema.get("additionalItems") {
                    Some(Value::Bool(false)) => AdditionalItems::Disallowed,
                    Some(Value::Document(nested)) => self
                        .create(nested, &path.with("additionalItems"))
                        .map_or(AdditionalItems::Allowed, |v| AdditionalItems::Schema(Box::new(v))),
                    _ => AdditionalItems::Allowed,
                };
                validators.push(Validator::EachItemMatches(TupleItems { items, additional }));
            }
            Some(other) => self.problems.record_warning(
                &items_path,
                format!("Expected 'items' to be a schema or an array of schemas but found {}", other.type_name()),
            ),
            None => {}
        }
    }

    fn add_required(&mut self, schema: &Document, validators: &mut Vec<Validator>) {
        match schema.get("required") {
            Some(Value::Bool(true)) => validators.push(Validator::Required),
            Some(Value::Array(names)) => {
                let names: Vec<String> = names.iter().filter_map(Value::as_str).map(str::to_string).collect();
                if !names.is_empty() {
                    validators.push(Validator::RequiredFields(names));
                }
            }
            _ => {}
        }
    }

    fn add_numeric_bounds(&mut self, schema: &Document, validators: &mut Vec<Validator>) {
        if let Some(limit) = schema.get_number("minimum") {
            validators.push(Validator::Minimum(Bound {
                limit,
                exclusive: schema.get_bool("exclusiveMinimum", false),
            }));
        }
        if let Some(limit) = schema.get_number("maximum") {
            validators.push(Validator::Maximum(Bound {
                limit,
                exclusive: schema.get_bool("exclusiveMaximum", false),
            }));
        }
    }

    fn count(&mut self, schema: &Document, path: &Path, keyword: &str) -> Option<usize> {
        let value = schema.get(keyword)?;
        match value.as_i64().and_then(|n| usize::try_from(n).ok()) {
            Some(count) => Some(count),
            None => {
                self.problems.record_warning(
                    &path.with(keyword),
                    format!("Expected '{}' to be a non-negative integer but found '{}'", keyword, value),
                );
                None
            }
        }
    }

    fn add_item_counts(&mut self, schema: &Document, path: &Path, validators: &mut Vec<Validator>) {
        if let Some(min) = self.count(schema, path, "minItems") {
            validators.push(Validator::MinItems(min));
        }
        if let Some(max) = self.count(schema, path, "maxItems") {
            validators.push(Validator::MaxItems(max));
        }
        if schema.get_bool("uniqueItems", false) {
            validators.push(Validator::UniqueItems);
        }
    }

    fn add_pattern(&mut self, schema: &Document, path: &Path, validators: &mut Vec<Validator>) {
        let Some(pattern) = schema.get_str("pattern") else {
            return;
        };
        match PatternMatch::new(pattern) {
            Ok(pattern) => validators.push(Validator::Pattern(pattern)),
            Err(e) => self.problems.record_warning(
                &path.with("pattern"),
                format!("Expected the 'pattern' field on '{}' to be a valid regular expression: {}", path, e),
            ),
        }
    }

    fn add_lengths(&mut self, schema: &Document, path: &Path, validators: &mut Vec<Validator>) {
        for keyword in ["minimumLength", "minLength"] {
            if let Some(min) = self.count(schema, path, keyword) {
                validators.push(Validator::MinLength(min));
                break;
            }
        }
        for keyword in ["maximumLength", "maxLength"] {
            if let Some(max) = self.count(schema, path, keyword) {
                validators.push(Validator::MaxLength(max));
                break;
            }
        }
    }

    fn add_enum(&mut self, schema: &Document, path: &Path, validators: &mut Vec<Validator>) {
        match schema.get("enum") {
            Some(Value::Array(values)) => validators.push(Validator::Enum(EnumValues::new(values.iter()))),
            Some(other) => self.problems.record_warning(
                &path.with("enum"),
                format!("Expected 'enum' to be an array but found {}", other.type_name()),
            ),
            None => {}
        }
    }

    fn add_divisible_by(&mut self, schema: &Document, validators: &mut Vec<Validator>) {
        let Some(denominator) = schema.get_number("divisibleBy") else {
            return;
        };
        // Only the integral part is used; 0 and 1 impose nothing
        let denominator = denominator as i64;
        if denominator != 0 && denominator != 1 {
            validators.push(Validator::DivisibleBy(denominator));
        }
    }

    fn add_disallowed(&mut self, schema: &Document, path: &Path, validators: &mut Vec<Validator>) {
        let Some(value) = schema.get("disallowed") else {
            return;
        };
        let mut types = Vec::new();
        for t in Type::types_with_names(value) {
            match t {
                Type::Unknown => self
                    .problems
                    .record_warning(&path.with("disallowed"), "Unknown type name in 'disallowed'".to_string()),
                known => types.push(known),
            }
        }
        if !types.is_empty() {
            validators.push(Validator::DisallowedTypes(types));
        }
    }
}

/// Whether two URIs name the same document, ignoring an empty fragment
fn same_document(a: &str, b: &str) -> bool {
    a.trim_end_matches('#') == b.trim_end_matches('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::{ProblemKind, ValidationResult};
    use serde_json::json;

    fn schema(json: serde_json::Value) -> Document {
        Document::try_from(json).unwrap()
    }

    fn compile(json: serde_json::Value) -> (Arc<Validator>, ValidationResult) {
        let mut problems = ValidationResult::new();
        let validator = SchemaCompiler::with_base_uri("http://example.com/schemas/order.json")
            .compile(&schema(json), &mut problems);
        (validator, problems)
    }

    #[test]
    fn test_empty_schema_compiles_to_accept_all() {
        let (validator, problems) = compile(json!({}));
        assert!(matches!(validator.as_ref(), Validator::Composite(children) if children.is_empty()));
        assert!(!problems.has_problems());
    }

    #[test]
    fn test_single_keyword_is_not_wrapped() {
        let (validator, _) = compile(json!({"type": "string"}));
        assert!(matches!(validator.as_ref(), Validator::Type(Type::String)));
    }

    #[test]
    fn test_several_keywords_make_a_composite() {
        let (validator, _) = compile(json!({"type": "integer", "minimum": 1, "maximum": 10}));
        match validator.as_ref() {
            Validator::Composite(children) => assert_eq!(children.len(), 3),
            other => panic!("expected composite, got {:?}", other),
        }
    }

    #[test]
    fn test_type_list_becomes_union() {
        let (validator, problems) = compile(json!({"type": ["integer", {"type": "string", "maxLength": 2}]}));
        match validator.as_ref() {
            Validator::Union(alternatives) => assert_eq!(alternatives.len(), 2),
            other => panic!("expected union, got {:?}", other),
        }
        assert!(!problems.has_problems());
    }

    #[test]
    fn test_unknown_type_name_warns() {
        let (_, problems) = compile(json!({"type": "date"}));
        let warning = problems.warnings().next().unwrap();
        assert_eq!(warning.path.to_string(), "type");
        assert!(warning.message.contains("date"));
    }

    #[test]
    fn test_non_object_property_schema_is_an_error() {
        let (_, problems) = compile(json!({"properties": {"name": "string"}}));
        let error = problems.errors().next().unwrap();
        assert_eq!(error.path.to_string(), "properties.name");
    }

    #[test]
    fn test_bad_patterns_warn() {
        let (_, problems) = compile(json!({
            "pattern": "(",
            "patternProperties": {"[": {"type": "string"}}
        }));
        assert_eq!(problems.warning_count(), 2);
        assert!(problems.warnings().all(|p| p.kind() == ProblemKind::Warning));
    }

    #[test]
    fn test_ref_short_circuits_other_keywords() {
        let (validator, _) = compile(json!({"$ref": "address.json", "type": "string"}));
        match validator.as_ref() {
            Validator::Reference(uri) => assert_eq!(uri, "http://example.com/schemas/address.json"),
            other => panic!("expected reference, got {:?}", other),
        }
    }

    #[test]
    fn test_absolute_ref_is_kept_verbatim() {
        let (validator, _) = compile(json!({"$ref": "http://other.org/thing"}));
        assert!(matches!(validator.as_ref(), Validator::Reference(uri) if uri == "http://other.org/thing"));
    }

    #[test]
    fn test_hash_and_own_uri_are_self_references() {
        let (validator, _) = compile(json!({"$ref": "#"}));
        assert!(matches!(validator.as_ref(), Validator::SelfReference(_)));

        let (validator, _) = compile(json!({"$ref": "http://example.com/schemas/order.json#"}));
        assert!(matches!(validator.as_ref(), Validator::SelfReference(_)));
    }

    #[test]
    fn test_relative_ref_without_base_warns() {
        let mut problems = ValidationResult::new();
        let validator = SchemaCompiler::new().compile(&schema(json!({"$ref": "address.json"})), &mut problems);
        assert!(matches!(validator.as_ref(), Validator::Reference(uri) if uri == "address.json"));
        assert_eq!(problems.warning_count(), 1);
    }

    #[test]
    fn test_divisible_by_zero_and_one_are_ignored() {
        let (validator, _) = compile(json!({"divisibleBy": 1}));
        assert!(matches!(validator.as_ref(), Validator::Composite(c) if c.is_empty()));
        let (validator, _) = compile(json!({"divisibleBy": 0}));
        assert!(matches!(validator.as_ref(), Validator::Composite(c) if c.is_empty()));
        let (validator, _) = compile(json!({"divisibleBy": 5}));
        assert!(matches!(validator.as_ref(), Validator::DivisibleBy(5)));
    }

    #[test]
    fn test_tuple_keeps_empty_positions() {
        let (validator, _) = compile(json!({"items": [{}, {"type": "string"}], "additionalItems": false}));
        match validator.as_ref() {
            Validator::EachItemMatches(tuple) => {
                assert_eq!(tuple.items.len(), 2);
                assert!(tuple.items[0].is_none());
                assert!(matches!(tuple.additional, AdditionalItems::Disallowed));
            }
            other => panic!("expected tuple, got {:?}", other),
        }
    }

    #[test]
    fn test_required_nested_under_property() {
        let (validator, _) = compile(json!({"properties": {"name": {"type": "string", "required": true}}}));
        match validator.as_ref() {
            Validator::Property(property) => {
                assert_eq!(property.name, "name");
                assert!(property.validator.find_required().is_some());
            }
            other => panic!("expected property, got {:?}", other),
        }
    }

    #[test]
    fn test_length_aliases() {
        let (validator, _) = compile(json!({"minimumLength": 2, "maxLength": 4}));
        match validator.as_ref() {
            Validator::Composite(children) => {
                assert!(matches!(children[0], Validator::MinLength(2)));
                assert!(matches!(children[1], Validator::MaxLength(4)));
            }
            other => panic!("expected composite, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_counts_warn() {
        let (_, problems) = compile(json!({"minItems": -1}));
        assert_eq!(problems.warnings().next().unwrap().path.to_string(), "minItems");
    }
}
