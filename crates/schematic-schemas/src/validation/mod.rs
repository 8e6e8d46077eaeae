//! Compiled validator trees
//!
//! A schema document compiles into a tree of [`Validator`] nodes. Every node
//! shares one evaluation contract: it receives a [`Target`] describing what
//! to check (an explicit value, a named field of a containing document, or
//! the containing document itself), a [`Problems`] sink and a [`Scope`]
//! giving access to other schemas.
//!
//! Nodes that find the subject of the wrong runtime type do nothing; only the
//! `Type` node reports type errors. Trees are immutable once built and may be
//! evaluated from many threads at once, each call owning its own sink.
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

mod array;
pub mod compiler;
mod composite;
mod object;
mod scalar;

#[cfg(test)]
mod tests;

pub use array::{AdditionalItems, TupleItems};
pub use compiler::SchemaCompiler;
pub use object::{AdditionalProperties, PatternProperty, Property};
pub use scalar::{Bound, EnumValues, PatternMatch};

use crate::error::{EvaluationError, SchemaError, SchemaResult};
use crate::problems::Problems;
use crate::types::Type;
use schematic_core::{Document, Path, Value};
use std::borrow::Cow;
use std::sync::{Arc, Weak};

/// Default limit on nested `$ref` hops during one evaluation
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 128;

/// Looks up compiled validators for schema URIs named by `$ref`
pub trait SchemaResolver {
    fn resolve(&self, uri: &str) -> SchemaResult<Arc<Validator>>;
}

/// Resolver for standalone schemas that contain no cross-schema references
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferences;

impl SchemaResolver for NoReferences {
    fn resolve(&self, uri: &str) -> SchemaResult<Arc<Validator>> {
        Err(SchemaError::not_found(uri))
    }
}

/// What a node evaluates
///
/// When `field_value` is `None` the value is looked up in `parent` under
/// `field_name`; when both are `None` the node checks `parent` itself.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub field_value: Option<&'a Value>,
    pub field_name: Option<&'a str>,
    pub parent: &'a Document,
    pub path_to_parent: &'a Path,
}

impl<'a> Target<'a> {
    /// Target a whole document
    pub fn document(document: &'a Document, path: &'a Path) -> Self {
        Self {
            field_value: None,
            field_name: None,
            parent: document,
            path_to_parent: path,
        }
    }

    /// Target a named field of `parent`
    pub fn field(name: &'a str, parent: &'a Document, path_to_parent: &'a Path) -> Self {
        Self {
            field_value: None,
            field_name: Some(name),
            parent,
            path_to_parent,
        }
    }

    /// Target an explicit value stored under `name` in `parent`
    pub fn value(
        value: &'a Value,
        name: &'a str,
        parent: &'a Document,
        path_to_parent: &'a Path,
    ) -> Self {
        Self {
            field_value: Some(value),
            field_name: Some(name),
            parent,
            path_to_parent,
        }
    }

    /// The value under evaluation; `None` when the named field is absent
    pub fn subject(&self) -> Option<Cow<'a, Value>> {
        match (self.field_value, self.field_name) {
            (Some(value), _) => Some(Cow::Borrowed(value)),
            (None, Some(name)) => self.parent.get(name).map(Cow::Borrowed),
            (None, None) => Some(Cow::Owned(Value::Document(self.parent.clone()))),
        }
    }

    /// Path of the value under evaluation
    pub fn subject_path(&self) -> Path {
        match self.field_name {
            Some(name) => self.path_to_parent.with(name),
            None => self.path_to_parent.clone(),
        }
    }

    /// Leading phrase used in problem messages
    pub(crate) fn describe(&self) -> String {
        match (self.field_name, self.path_to_parent.is_root()) {
            (Some(name), true) => format!("The top-level '{}' field", name),
            (Some(name), false) => format!("The '{}' field on '{}'", name, self.path_to_parent),
            (None, true) => "The document".to_string(),
            (None, false) => format!("The '{}' document", self.path_to_parent),
        }
    }
}

/// Reference-following state for one evaluation
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    resolver: &'a dyn SchemaResolver,
    depth: usize,
    max_depth: usize,
}

impl<'a> Scope<'a> {
    pub fn new(resolver: &'a dyn SchemaResolver, max_depth: usize) -> Self {
        Self {
            resolver,
            depth: 0,
            max_depth,
        }
    }

    pub fn resolver(&self) -> &'a dyn SchemaResolver {
        self.resolver
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Scope for evaluating through one more reference
    pub(crate) fn deeper(&self, reference: &str) -> Result<Scope<'a>, EvaluationError> {
        if self.depth >= self.max_depth {
            return Err(EvaluationError::ReferenceDepthExceeded {
                reference: reference.to_string(),
                max_depth: self.max_depth,
            });
        }
        Ok(Scope {
            depth: self.depth + 1,
            ..*self
        })
    }
}

/// A compiled validation node
#[derive(Debug)]
pub enum Validator {
    /// Value must be of (or convertible to) a type
    Type(Type),
    /// Named field must be present and not null
    Required,
    /// Document must contain every listed field
    RequiredFields(Vec<String>),
    Minimum(Bound),
    Maximum(Bound),
    MinLength(usize),
    MaxLength(usize),
    Pattern(PatternMatch),
    Enum(EnumValues),
    DivisibleBy(i64),
    MinItems(usize),
    MaxItems(usize),
    UniqueItems,
    DisallowedTypes(Vec<Type>),
    Property(Property),
    PatternProperty(PatternProperty),
    AdditionalPropertiesAllowed(AdditionalProperties),
    AdditionalPropertiesDisallowed(AdditionalProperties),
    /// Every array element against one schema
    AllItemsMatch(Box<Validator>),
    /// Array elements positionally against a list of schemas
    EachItemMatches(TupleItems),
    /// At least one of the alternatives must pass
    Union(Vec<Validator>),
    /// Another schema, by URI
    Reference(String),
    /// The root of the tree this node belongs to
    SelfReference(Weak<Validator>),
    /// All children must pass
    Composite(Vec<Validator>),
}

impl Validator {
    /// A node that accepts everything
    pub fn empty() -> Self {
        Validator::Composite(Vec::new())
    }

    /// Evaluate this node against `target`
    pub fn validate(
        &self,
        target: &Target<'_>,
        problems: &mut dyn Problems,
        scope: &Scope<'_>,
    ) -> Result<(), EvaluationError> {
        match self {
            Validator::Type(required) => scalar::validate_type(*required, target, problems),
            Validator::Required => scalar::validate_required(target, problems),
            Validator::RequiredFields(names) => object::validate_required_fields(names, target, problems),
            Validator::Minimum(bound) => bound.validate_minimum(target, problems),
            Validator::Maximum(bound) => bound.validate_maximum(target, problems),
            Validator::MinLength(min) => scalar::validate_min_length(*min, target, problems),
            Validator::MaxLength(max) => scalar::validate_max_length(*max, target, problems),
            Validator::Pattern(pattern) => pattern.validate(target, problems),
            Validator::Enum(values) => values.validate(target, problems),
            Validator::DivisibleBy(denominator) => {
                scalar::validate_divisible_by(*denominator, target, problems)
            }
            Validator::MinItems(min) => array::validate_min_items(*min, target, problems),
            Validator::MaxItems(max) => array::validate_max_items(*max, target, problems),
            Validator::UniqueItems => array::validate_unique_items(target, problems),
            Validator::DisallowedTypes(types) => scalar::validate_disallowed(types, target, problems),
            Validator::Property(property) => return property.validate(target, problems, scope),
            Validator::PatternProperty(property) => return property.validate(target, problems, scope),
            Validator::AdditionalPropertiesAllowed(extra) => {
                return extra.validate_allowed(target, problems, scope)
            }
            Validator::AdditionalPropertiesDisallowed(extra) => extra.validate_disallowed(target, problems),
            Validator::AllItemsMatch(items) => return array::validate_all_items(items, target, problems, scope),
            Validator::EachItemMatches(tuple) => return tuple.validate(target, problems, scope),
            Validator::Union(alternatives) => {
                return composite::validate_union(alternatives, target, problems, scope)
            }
            Validator::Reference(uri) => return composite::validate_reference(uri, target, problems, scope),
            Validator::SelfReference(root) => {
                return composite::validate_self_reference(root, target, problems, scope)
            }
            Validator::Composite(children) => {
                composite::validate_all(children, target, problems, scope)
            }
        }
        Ok(())
    }

    /// Validate a whole document from the root path. Evaluation failures are
    /// recorded as problems rather than returned.
    pub fn validate_document(
        &self,
        document: &Document,
        problems: &mut dyn Problems,
        resolver: &dyn SchemaResolver,
    ) {
        self.validate_document_with_depth(document, problems, resolver, DEFAULT_MAX_REFERENCE_DEPTH)
    }

    pub fn validate_document_with_depth(
        &self,
        document: &Document,
        problems: &mut dyn Problems,
        resolver: &dyn SchemaResolver,
        max_reference_depth: usize,
    ) {
        let root = Path::root();
        let target = Target::document(document, &root);
        let scope = Scope::new(resolver, max_reference_depth);
        if let Err(e) = self.validate(&target, problems, &scope) {
            problems.record_error_with_cause(
                &root,
                "Unable to validate the document".to_string(),
                e.to_string(),
            );
        }
    }

    /// The `Required` node among this node and its composite or union
    /// children, if any
    pub fn find_required(&self) -> Option<&Validator> {
        match self {
            Validator::Required => Some(self),
            Validator::Composite(children) | Validator::Union(children) => {
                children.iter().find_map(Validator::find_required)
            }
            _ => None,
        }
    }

    /// Number of nodes in this subtree, not following references
    pub fn node_count(&self) -> usize {
        let nested = match self {
            Validator::Property(p) => p.validator.node_count(),
            Validator::PatternProperty(p) => p.validator.node_count(),
            Validator::AdditionalPropertiesAllowed(extra) => {
                extra.validator.as_ref().map_or(0, |v| v.node_count())
            }
            Validator::AllItemsMatch(items) => items.node_count(),
            Validator::EachItemMatches(tuple) => tuple.node_count(),
            Validator::Union(children) | Validator::Composite(children) => {
                children.iter().map(Validator::node_count).sum()
            }
            _ => 0,
        };
        1 + nested
    }
}

/// English ordinal for a 1-based position: 1st, 2nd, 3rd, 4th, 11th, 21st
pub(crate) fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
