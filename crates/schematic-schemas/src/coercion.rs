//! Applying type coercions found during validation
//!
//! Validation records a type mismatch whenever a value has the wrong type
//! but converts cleanly to the required one (`"3"` for an integer field).
//! [`TypeCoercionRewriter`] takes those mismatches and produces a corrected
//! copy of the validated document. Only touched documents and arrays are
//! copied; everything else is shared with the original.
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use crate::problems::ValidationResult;
use schematic_core::{Array, Document, Path, Value};
use tracing::debug;

/// Rewrites documents using the converted values of recorded type mismatches
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercionRewriter;

type Correction<'a> = (&'a Path, &'a Value);

impl TypeCoercionRewriter {
    pub fn new() -> Self {
        Self
    }

    /// Corrected copy of `document`. Returns `document` itself (sharing its
    /// storage) when `results` holds no type mismatches.
    ///
    /// Mismatch paths may run through array indices. Array items never
    /// produce such paths during validation, but results assembled by hand
    /// are applied the same way.
    pub fn apply(&self, document: &Document, results: &ValidationResult) -> Document {
        let mut corrections: Vec<Correction<'_>> = results
            .type_mismatches()
            .filter(|problem| !problem.path.is_root())
            .filter_map(|problem| problem.mismatch().map(|m| (&problem.path, &m.converted_value)))
            .collect();
        if corrections.is_empty() {
            return document.clone();
        }

        corrections.sort_by(|a, b| a.0.cmp(b.0));
        debug!(corrections = corrections.len(), "applying type coercions");
        rewrite_document(document, &corrections, 0)
    }
}

/// Split sorted corrections into runs sharing the segment at `depth`
fn groups<'c, 'a>(corrections: &'c [Correction<'a>], depth: usize) -> Vec<(&'a str, &'c [Correction<'a>])> {
    let mut groups = Vec::new();
    let mut start = 0;
    while start < corrections.len() {
        let Some(segment) = corrections[start].0.get(depth) else {
            start += 1;
            continue;
        };
        let end = corrections[start..]
            .iter()
            .position(|(path, _)| path.get(depth) != Some(segment))
            .map_or(corrections.len(), |offset| start + offset);
        groups.push((segment, &corrections[start..end]));
        start = end;
    }
    groups
}

/// New value for the child named by a group, if anything changes. A
/// correction of the child itself wins over corrections inside it.
fn rewrite_child(current: Option<&Value>, group: &[Correction<'_>], depth: usize) -> Option<Value> {
    if let Some((_, value)) = group.iter().rev().find(|(path, _)| path.len() == depth + 1) {
        return Some((*value).clone());
    }
    match current? {
        Value::Document(child) => Some(Value::Document(rewrite_document(child, group, depth + 1))),
        Value::Array(items) => Some(Value::Array(rewrite_array(items, group, depth + 1))),
        _ => None,
    }
}

fn rewrite_document(document: &Document, corrections: &[Correction<'_>], depth: usize) -> Document {
    let changes: Vec<(String, Value)> = groups(corrections, depth)
        .into_iter()
        .filter_map(|(name, group)| {
            // Coercions never add fields that were not there
            let current = document.get(name)?;
            rewrite_child(Some(current), group, depth).map(|value| (name.to_string(), value))
        })
        .collect();

    if changes.is_empty() {
        document.clone()
    } else {
        document.with(changes)
    }
}

fn rewrite_array(items: &Array, corrections: &[Correction<'_>], depth: usize) -> Array {
    let mut rewritten = items.clone();
    for (segment, group) in groups(corrections, depth) {
        let Ok(index) = segment.parse::<usize>() else {
            continue;
        };
        let Some(current) = items.get(index) else {
            continue;
        };
        if let Some(value) = rewrite_child(Some(current), group, depth) {
            rewritten = rewritten.with(index, value);
        }
    }
    rewritten
}
