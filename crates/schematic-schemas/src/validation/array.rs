//! Checks on arrays and their elements
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use super::{ordinal, Scope, Target, Validator};
use crate::error::EvaluationError;
use crate::problems::{Problems, SingleProblem};
use schematic_core::{Document, Path, Value};

/// Validate the element at `index` of the array found at `array_path`.
/// Elements that are documents are checked as whole documents.
fn validate_item(
    validator: &Validator,
    index: usize,
    item: &Value,
    parent: &Document,
    array_path: &Path,
    problems: &mut dyn Problems,
    scope: &Scope<'_>,
) -> Result<(), EvaluationError> {
    match item {
        Value::Document(document) => {
            let path = array_path.with_index(index);
            validator.validate(&Target::document(document, &path), problems, scope)
        }
        other => {
            let name = index.to_string();
            validator.validate(&Target::value(other, &name, parent, array_path), problems, scope)
        }
    }
}

/// Check one element into a scratch sink and report a single summary error
/// for it. Returns whether the element passed.
#[allow(clippy::too_many_arguments)]
fn check_item(
    validator: &Validator,
    index: usize,
    item: &Value,
    target: &Target<'_>,
    array_path: &Path,
    scratch: &mut SingleProblem,
    problems: &mut dyn Problems,
    scope: &Scope<'_>,
) -> Result<bool, EvaluationError> {
    scratch.clear();
    validate_item(validator, index, item, target.parent, array_path, scratch, scope)?;
    match scratch.problem().filter(|p| p.is_error()) {
        Some(problem) => {
            problems.record_error(
                &array_path.with_index(index),
                format!(
                    "{} is an array, but the {} item does not satisfy the schema: {}",
                    target.describe(),
                    ordinal(index + 1),
                    problem.message
                ),
            );
            Ok(false)
        }
        None => Ok(true),
    }
}

pub(super) fn validate_all_items(
    items: &Validator,
    target: &Target<'_>,
    problems: &mut dyn Problems,
    scope: &Scope<'_>,
) -> Result<(), EvaluationError> {
    let Some(subject) = target.subject() else {
        return Ok(());
    };
    let Value::Array(array) = &*subject else {
        return Ok(());
    };
    let path = target.subject_path();
    let mut scratch = SingleProblem::new();
    let mut all_passed = true;
    for (index, item) in array.iter().enumerate() {
        all_passed &= check_item(items, index, item, target, &path, &mut scratch, problems, scope)?;
    }
    if all_passed {
        problems.record_success();
    }
    Ok(())
}

/// What to do with tuple elements beyond the positional schemas
#[derive(Debug, Default)]
pub enum AdditionalItems {
    #[default]
    Allowed,
    Disallowed,
    Schema(Box<Validator>),
}

/// Positional schemas for tuple-typed arrays. A `None` slot accepts
/// anything at that position.
#[derive(Debug, Default)]
pub struct TupleItems {
    pub items: Vec<Option<Validator>>,
    pub additional: AdditionalItems,
}

impl TupleItems {
    pub(super) fn validate(
        &self,
        target: &Target<'_>,
        problems: &mut dyn Problems,
        scope: &Scope<'_>,
    ) -> Result<(), EvaluationError> {
        let Some(subject) = target.subject() else {
            return Ok(());
        };
        let Value::Array(array) = &*subject else {
            return Ok(());
        };
        let path = target.subject_path();
        let mut scratch = SingleProblem::new();
        let mut all_passed = true;
        for (index, item) in array.iter().enumerate() {
            let validator = match self.items.get(index) {
                Some(slot) => slot.as_ref(),
                None => match &self.additional {
                    AdditionalItems::Allowed => None,
                    AdditionalItems::Schema(validator) => Some(validator.as_ref()),
                    AdditionalItems::Disallowed => {
                        all_passed = false;
                        problems.record_error(
                            &path.with_index(index),
                            format!(
                                "{} is an array, but the {} item is not allowed by the schema, which describes only {} item(s)",
                                target.describe(),
                                ordinal(index + 1),
                                self.items.len()
                            ),
                        );
                        None
                    }
                },
            };
            if let Some(validator) = validator {
                all_passed &= check_item(validator, index, item, target, &path, &mut scratch, problems, scope)?;
            }
        }
        if all_passed {
            problems.record_success();
        }
        Ok(())
    }

    pub(super) fn node_count(&self) -> usize {
        let positional: usize = self.items.iter().flatten().map(Validator::node_count).sum();
        let additional = match &self.additional {
            AdditionalItems::Schema(validator) => validator.node_count(),
            _ => 0,
        };
        positional + additional
    }
}

pub(super) fn validate_min_items(min: usize, target: &Target<'_>, problems: &mut dyn Problems) {
    let Some(subject) = target.subject() else {
        return;
    };
    let Value::Array(array) = &*subject else {
        return;
    };
    if array.len() < min {
        problems.record_error(
            &target.subject_path(),
            format!(
                "{} has '{}' values but should have at least '{}'",
                target.describe(),
                array.len(),
                min
            ),
        );
    } else {
        problems.record_success();
    }
}

pub(super) fn validate_max_items(max: usize, target: &Target<'_>, problems: &mut dyn Problems) {
    let Some(subject) = target.subject() else {
        return;
    };
    let Value::Array(array) = &*subject else {
        return;
    };
    if array.len() > max {
        problems.record_error(
            &target.subject_path(),
            format!(
                "{} has '{}' values but should have no more than '{}'",
                target.describe(),
                array.len(),
                max
            ),
        );
    } else {
        problems.record_success();
    }
}

pub(super) fn validate_unique_items(target: &Target<'_>, problems: &mut dyn Problems) {
    let Some(subject) = target.subject() else {
        return;
    };
    let Value::Array(array) = &*subject else {
        return;
    };
    let path = target.subject_path();
    let mut unique = true;
    for (index, item) in array.iter().enumerate() {
        if let Some(first) = array[..index].iter().position(|earlier| earlier == item) {
            unique = false;
            problems.record_error(
                &path.with_index(index),
                format!(
                    "{} contains the value '{}' at the {} position, which duplicates the {} item",
                    target.describe(),
                    item,
                    ordinal(index + 1),
                    ordinal(first + 1)
                ),
            );
        }
    }
    if unique {
        problems.record_success();
    }
}
