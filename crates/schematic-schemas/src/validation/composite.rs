//! Nodes combining other nodes: AND, OR and references
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use super::{Scope, Target, Validator};
use crate::error::EvaluationError;
use crate::problems::{Problems, ValidationResult};
use std::sync::Weak;

/// Run every child. A child that fails to evaluate is reported as an error
/// at the containing document and its siblings still run.
pub(super) fn validate_all(
    children: &[Validator],
    target: &Target<'_>,
    problems: &mut dyn Problems,
    scope: &Scope<'_>,
) {
    for child in children {
        if let Err(e) = child.validate(target, problems, scope) {
            tracing::debug!(path = %target.path_to_parent, error = %e, "validator evaluation failed");
            problems.record_error_with_cause(
                target.path_to_parent,
                format!("{} could not be validated", target.describe()),
                e.to_string(),
            );
        }
    }
}

/// The first alternative without errors wins. When every alternative fails,
/// the problems of the one with the most successful checks are kept; ties go
/// to the earliest alternative.
pub(super) fn validate_union(
    alternatives: &[Validator],
    target: &Target<'_>,
    problems: &mut dyn Problems,
    scope: &Scope<'_>,
) -> Result<(), EvaluationError> {
    let mut closest: Option<ValidationResult> = None;
    for alternative in alternatives {
        let mut attempt = ValidationResult::new();
        alternative.validate(target, &mut attempt, scope)?;
        if !attempt.has_errors() {
            problems.record_success();
            return Ok(());
        }
        let better = closest
            .as_ref()
            .map_or(true, |best| attempt.success_count() > best.success_count());
        if better {
            closest = Some(attempt);
        }
    }
    if let Some(best) = closest {
        best.record_in(problems);
    }
    Ok(())
}

pub(super) fn validate_reference(
    uri: &str,
    target: &Target<'_>,
    problems: &mut dyn Problems,
    scope: &Scope<'_>,
) -> Result<(), EvaluationError> {
    let deeper = scope.deeper(uri)?;
    match scope.resolver().resolve(uri) {
        Ok(validator) => {
            problems.record_success();
            validator.validate(target, problems, &deeper)
        }
        Err(e) => {
            problems.record_error_with_cause(
                &target.subject_path(),
                format!("Unable to find referenced schema '{}'", uri),
                e.to_string(),
            );
            Ok(())
        }
    }
}

pub(super) fn validate_self_reference(
    root: &Weak<Validator>,
    target: &Target<'_>,
    problems: &mut dyn Problems,
    scope: &Scope<'_>,
) -> Result<(), EvaluationError> {
    let deeper = scope.deeper("#")?;
    let root = root.upgrade().ok_or(EvaluationError::DetachedSelfReference)?;
    root.validate(target, problems, &deeper)
}
