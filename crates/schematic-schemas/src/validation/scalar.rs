//! Checks on single values: type, presence, numeric range, strings, enums
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use super::Target;
use crate::problems::{Mismatch, Problems};
use crate::types::Type;
use regex::Regex;
use schematic_core::Value;
use std::collections::HashSet;

pub(super) fn validate_type(required: Type, target: &Target<'_>, problems: &mut dyn Problems) {
    let Some(value) = target.subject() else {
        return;
    };
    let actual = Type::type_for(&value);
    if required.is_equivalent(actual) {
        problems.record_success();
        return;
    }

    let path = target.subject_path();
    let reason = format!(
        "Field value for '{}' expected to be of type {} but was of type {}",
        path, required, actual
    );
    match required.convert_value_from(&value, actual) {
        Some(converted) => problems.record_type_mismatch(
            &path,
            reason,
            Mismatch {
                actual_type: actual,
                actual_value: value.into_owned(),
                required_type: required,
                converted_value: converted,
            },
        ),
        None => problems.record_error(&path, reason),
    }
}

pub(super) fn validate_required(target: &Target<'_>, problems: &mut dyn Problems) {
    let missing = target.subject().map_or(true, |v| v.is_null());
    if missing && target.field_name.is_some() {
        problems.record_error(&target.subject_path(), format!("{} is required", target.describe()));
    } else {
        problems.record_success();
    }
}

/// Numeric limit for `minimum`/`maximum`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub limit: f64,
    pub exclusive: bool,
}

impl Bound {
    pub(super) fn validate_minimum(&self, target: &Target<'_>, problems: &mut dyn Problems) {
        let Some(number) = target.subject().and_then(|v| v.as_f64()) else {
            return;
        };
        let violated = if self.exclusive {
            number <= self.limit
        } else {
            number < self.limit
        };
        if violated {
            let rule = if self.exclusive {
                "greater than"
            } else {
                "greater than or equal to"
            };
            problems.record_error(
                &target.subject_path(),
                format!(
                    "{} has a value of {} but should be {} {}",
                    target.describe(),
                    number,
                    rule,
                    self.limit
                ),
            );
        } else {
            problems.record_success();
        }
    }

    pub(super) fn validate_maximum(&self, target: &Target<'_>, problems: &mut dyn Problems) {
        let Some(number) = target.subject().and_then(|v| v.as_f64()) else {
            return;
        };
        let violated = if self.exclusive {
            number >= self.limit
        } else {
            number > self.limit
        };
        if violated {
            let rule = if self.exclusive {
                "less than"
            } else {
                "less than or equal to"
            };
            problems.record_error(
                &target.subject_path(),
                format!(
                    "{} has a value of {} but should be {} {}",
                    target.describe(),
                    number,
                    rule,
                    self.limit
                ),
            );
        } else {
            problems.record_success();
        }
    }
}

pub(super) fn validate_min_length(min: usize, target: &Target<'_>, problems: &mut dyn Problems) {
    let Some(value) = target.subject() else {
        return;
    };
    let Some(text) = value.as_str() else {
        return;
    };
    let length = text.chars().count();
    if length < min {
        problems.record_error(
            &target.subject_path(),
            format!(
                "{} has a length of {} but should have at least {} characters",
                target.describe(),
                length,
                min
            ),
        );
    } else {
        problems.record_success();
    }
}

pub(super) fn validate_max_length(max: usize, target: &Target<'_>, problems: &mut dyn Problems) {
    let Some(value) = target.subject() else {
        return;
    };
    let Some(text) = value.as_str() else {
        return;
    };
    let length = text.chars().count();
    if length > max {
        problems.record_error(
            &target.subject_path(),
            format!(
                "{} has a length of {} but should have no more than {} characters",
                target.describe(),
                length,
                max
            ),
        );
    } else {
        problems.record_success();
    }
}

/// Regular expression that must match a whole string
#[derive(Debug)]
pub struct PatternMatch {
    source: String,
    regex: Regex,
}

impl PatternMatch {
    /// Compile `pattern` so that it only matches complete strings
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&format!("^(?:{})$", pattern))?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub(super) fn validate(&self, target: &Target<'_>, problems: &mut dyn Problems) {
        let Some(value) = target.subject() else {
            return;
        };
        let Some(text) = value.as_str() else {
            return;
        };
        if self.is_match(text) {
            problems.record_success();
        } else {
            problems.record_error(
                &target.subject_path(),
                format!(
                    "{} failed to match the pattern specified by '{}'",
                    target.describe(),
                    self.source
                ),
            );
        }
    }
}

/// Case-insensitive set of permitted values, compared by their text form
#[derive(Debug, Clone)]
pub struct EnumValues {
    allowed: HashSet<String>,
    listed: Vec<String>,
}

impl EnumValues {
    pub fn new<'v>(values: impl IntoIterator<Item = &'v Value>) -> Self {
        let listed: Vec<String> = values.into_iter().map(ToString::to_string).collect();
        let allowed = listed.iter().map(|v| v.to_lowercase()).collect();
        Self { allowed, listed }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.allowed.contains(&value.to_string().to_lowercase())
    }

    pub(super) fn validate(&self, target: &Target<'_>, problems: &mut dyn Problems) {
        let Some(value) = target.subject() else {
            return;
        };
        let path = target.subject_path();
        match &*value {
            Value::Array(items) => {
                for item in items.iter() {
                    if self.contains(item) {
                        problems.record_success();
                    } else {
                        problems.record_error(
                            &path,
                            format!(
                                "{} contains a value '{}' in the array that is not part of the enumeration: {:?}",
                                target.describe(),
                                item,
                                self.listed
                            ),
                        );
                    }
                }
            }
            single => {
                if self.contains(single) {
                    problems.record_success();
                } else {
                    problems.record_error(
                        &path,
                        format!(
                            "{} has a value '{}' that is not part of the enumeration: {:?}",
                            target.describe(),
                            single,
                            self.listed
                        ),
                    );
                }
            }
        }
    }
}

pub(super) fn validate_divisible_by(denominator: i64, target: &Target<'_>, problems: &mut dyn Problems) {
    let Some(value) = target.subject() else {
        return;
    };
    let divisible = match &*value {
        Value::Integer(i) => i.checked_rem(denominator).map_or(true, |r| r == 0),
        Value::Double(d) => d % denominator as f64 == 0.0,
        _ => return,
    };
    if divisible {
        problems.record_success();
    } else {
        problems.record_error(
            &target.subject_path(),
            format!(
                "{} had a value of {} and was not divisible by {}",
                target.describe(),
                value,
                denominator
            ),
        );
    }
}

pub(super) fn validate_disallowed(types: &[Type], target: &Target<'_>, problems: &mut dyn Problems) {
    let Some(value) = target.subject() else {
        return;
    };
    let actual = Type::type_for(&value);
    if actual == Type::Null {
        return;
    }
    if types.iter().any(|t| t.is_equivalent(actual)) {
        problems.record_error(
            &target.subject_path(),
            format!(
                "{} contains a value '{}' whose type '{}' is disallowed",
                target.describe(),
                value,
                actual
            ),
        );
    } else {
        problems.record_success();
    }
}
