//! Problem sinks collecting validation outcomes
//!
//! Validators never fail fast: every violation becomes a [`Problem`] recorded
//! into a [`Problems`] sink together with a count of successful checks. The
//! success count is what lets union typing pick the "closest" failing
//! candidate when none of them matches.
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use crate::types::Type;
use schematic_core::{Path, Value};
use serde::Serialize;
use std::fmt;

/// Classification of a recorded problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    Error,
    Warning,
    TypeMismatch,
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemKind::Error => write!(f, "error"),
            ProblemKind::Warning => write!(f, "warning"),
            ProblemKind::TypeMismatch => write!(f, "type mismatch"),
        }
    }
}

/// A value whose type is wrong but which converts to the required type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub actual_type: Type,
    pub actual_value: Value,
    pub required_type: Type,
    pub converted_value: Value,
}

/// Kind-specific payload of a problem
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemDetail {
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        cause: Option<String>,
    },
    Warning,
    TypeMismatch(Mismatch),
}

/// A single finding at a path of the validated document (or schema)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub path: Path,
    pub message: String,
    #[serde(flatten)]
    pub detail: ProblemDetail,
}

impl Problem {
    pub fn error(path: Path, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            detail: ProblemDetail::Error { cause: None },
        }
    }

    pub fn warning(path: Path, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            detail: ProblemDetail::Warning,
        }
    }

    pub fn kind(&self) -> ProblemKind {
        match self.detail {
            ProblemDetail::Error { .. } => ProblemKind::Error,
            ProblemDetail::Warning => ProblemKind::Warning,
            ProblemDetail::TypeMismatch(_) => ProblemKind::TypeMismatch,
        }
    }

    /// Errors and type mismatches both make a document invalid
    pub fn is_error(&self) -> bool {
        !matches!(self.detail, ProblemDetail::Warning)
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match &self.detail {
            ProblemDetail::TypeMismatch(m) => Some(m),
            _ => None,
        }
    }

    pub fn cause(&self) -> Option<&str> {
        match &self.detail {
            ProblemDetail::Error { cause } => cause.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}: {}", self.kind(), self.message)
        } else {
            write!(f, "{} at '{}': {}", self.kind(), self.path, self.message)
        }
    }
}

/// Sink receiving problems and successes during validation
pub trait Problems {
    fn record(&mut self, problem: Problem);

    fn record_success(&mut self);

    fn record_error(&mut self, path: &Path, message: String) {
        self.record(Problem::error(path.clone(), message));
    }

    fn record_error_with_cause(&mut self, path: &Path, message: String, cause: String) {
        self.record(Problem {
            path: path.clone(),
            message,
            detail: ProblemDetail::Error { cause: Some(cause) },
        });
    }

    fn record_warning(&mut self, path: &Path, message: String) {
        self.record(Problem::warning(path.clone(), message));
    }

    fn record_type_mismatch(&mut self, path: &Path, message: String, mismatch: Mismatch) {
        self.record(Problem {
            path: path.clone(),
            message,
            detail: ProblemDetail::TypeMismatch(mismatch),
        });
    }
}

/// Full, ordered record of one validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    problems: Vec<Problem>,
    success_count: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.problems.iter().any(Problem::is_error)
    }

    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    /// No errors and no mismatches; warnings are allowed
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn errors(&self) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(|p| p.kind() == ProblemKind::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(|p| p.kind() == ProblemKind::Warning)
    }

    pub fn type_mismatches(&self) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(|p| p.kind() == ProblemKind::TypeMismatch)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn mismatch_count(&self) -> usize {
        self.type_mismatches().count()
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Replay every problem and success into another sink, in order
    pub fn record_in(&self, other: &mut dyn Problems) {
        for _ in 0..self.success_count {
            other.record_success();
        }
        for problem in &self.problems {
            other.record(problem.clone());
        }
    }

    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }
}

impl Problems for ValidationResult {
    fn record(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    fn record_success(&mut self) {
        self.success_count += 1;
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for problem in &self.problems {
            writeln!(f, "{}", problem)?;
        }
        Ok(())
    }
}

/// Sink that only keeps the most recent problem
#[derive(Debug, Clone, Default)]
pub struct SingleProblem {
    problem: Option<Problem>,
    succeeded: bool,
}

impl SingleProblem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.problem = None;
        self.succeeded = false;
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn has_problem(&self) -> bool {
        self.problem.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.problem.as_ref().is_some_and(Problem::is_error)
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }
}

impl Problems for SingleProblem {
    fn record(&mut self, problem: Problem) {
        self.problem = Some(problem);
    }

    fn record_success(&mut self) {
        self.succeeded = true;
    }
}
