//! Checks on the fields of documents
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use super::{Scope, Target, Validator};
use crate::error::EvaluationError;
use crate::problems::Problems;
use regex::Regex;
use schematic_core::{Document, Path, Value};
use std::collections::BTreeSet;

/// Validate one field of `document` with `validator`.
///
/// Nested documents become the new containing document, so their own
/// properties are looked up relative to them; other values are passed
/// explicitly with the field name.
fn validate_field(
    validator: &Validator,
    name: &str,
    value: &Value,
    document: &Document,
    path_to_document: &Path,
    problems: &mut dyn Problems,
    scope: &Scope<'_>,
) -> Result<(), EvaluationError> {
    match value {
        Value::Document(child) => {
            let path = path_to_document.with(name);
            validator.validate(&Target::document(child, &path), problems, scope)
        }
        other => validator.validate(
            &Target::value(other, name, document, path_to_document),
            problems,
            scope,
        ),
    }
}

/// Schema for one named field
#[derive(Debug)]
pub struct Property {
    pub name: String,
    pub validator: Box<Validator>,
}

impl Property {
    pub(super) fn validate(
        &self,
        target: &Target<'_>,
        problems: &mut dyn Problems,
        scope: &Scope<'_>,
    ) -> Result<(), EvaluationError> {
        let Some(subject) = target.subject() else {
            return Ok(());
        };
        let Value::Document(document) = &*subject else {
            return Ok(());
        };
        let path = target.subject_path();
        match document.get(&self.name) {
            Some(value) => validate_field(
                &self.validator,
                &self.name,
                value,
                document,
                &path,
                problems,
                scope,
            ),
            None => {
                if let Some(required) = self.validator.find_required() {
                    required.validate(&Target::field(&self.name, document, &path), problems, scope)?;
                }
                Ok(())
            }
        }
    }
}

/// Schema for every field whose name matches a regular expression
#[derive(Debug)]
pub struct PatternProperty {
    pub pattern: Regex,
    pub validator: Box<Validator>,
}

impl PatternProperty {
    /// Build from a pattern that must match the whole field name
    pub fn new(pattern: &str, validator: Validator) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{})$", pattern))?,
            validator: Box::new(validator),
        })
    }

    pub(super) fn validate(
        &self,
        target: &Target<'_>,
        problems: &mut dyn Problems,
        scope: &Scope<'_>,
    ) -> Result<(), EvaluationError> {
        let Some(subject) = target.subject() else {
            return Ok(());
        };
        let Value::Document(document) = &*subject else {
            return Ok(());
        };
        let path = target.subject_path();
        for (name, value) in document.fields() {
            if self.pattern.is_match(name) {
                validate_field(&self.validator, name, value, document, &path, problems, scope)?;
            }
        }
        Ok(())
    }
}

/// Policy for fields without an explicit entry under `properties`
#[derive(Debug)]
pub struct AdditionalProperties {
    pub declared: BTreeSet<String>,
    pub validator: Option<Box<Validator>>,
}

impl AdditionalProperties {
    fn undeclared<'d>(&'d self, document: &'d Document) -> impl Iterator<Item = (&'d str, &'d Value)> {
        document
            .fields()
            .filter(move |(name, _)| !self.declared.contains(*name))
    }

    pub(super) fn validate_allowed(
        &self,
        target: &Target<'_>,
        problems: &mut dyn Problems,
        scope: &Scope<'_>,
    ) -> Result<(), EvaluationError> {
        let Some(subject) = target.subject() else {
            return Ok(());
        };
        let Value::Document(document) = &*subject else {
            return Ok(());
        };
        let Some(validator) = &self.validator else {
            problems.record_success();
            return Ok(());
        };
        let path = target.subject_path();
        for (name, value) in self.undeclared(document) {
            validate_field(validator, name, value, document, &path, problems, scope)?;
        }
        Ok(())
    }

    pub(super) fn validate_disallowed(&self, target: &Target<'_>, problems: &mut dyn Problems) {
        let Some(subject) = target.subject() else {
            return;
        };
        let Value::Document(document) = &*subject else {
            return;
        };
        let path = target.subject_path();
        let mut clean = true;
        for (name, _) in self.undeclared(document) {
            clean = false;
            let field = Target::field(name, document, &path);
            problems.record_error(
                &field.subject_path(),
                format!("{} is not allowed by the schema", field.describe()),
            );
        }
        if clean {
            problems.record_success();
        }
    }
}

pub(super) fn validate_required_fields(names: &[String], target: &Target<'_>, problems: &mut dyn Problems) {
    let Some(subject) = target.subject() else {
        return;
    };
    let Value::Document(document) = &*subject else {
        return;
    };
    let path = target.subject_path();
    for name in names {
        let field = Target::field(name, document, &path);
        if document.get(name).map_or(true, Value::is_null) {
            problems.record_error(&field.subject_path(), format!("{} is required", field.describe()));
        } else {
            problems.record_success();
        }
    }
}
