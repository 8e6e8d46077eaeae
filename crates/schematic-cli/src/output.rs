//! Output formatting and writing utilities
//!
//! This module formats validation reports, problem lists and documents in
//! the selected output format (human-readable, JSON, YAML) and drives the
//! progress indicators shown while several documents are validated.
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use schematic_schemas::{Problem, ProblemKind, ValidationResult};
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Outcome of validating one document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Path of the validated document
    pub document: String,
    /// No errors or type mismatches remain
    pub valid: bool,
    pub errors: usize,
    pub warnings: usize,
    pub mismatches: usize,
    /// Number of type coercions applied before the final check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coerced: Option<usize>,
    pub problems: Vec<Problem>,
}

impl DocumentReport {
    /// Build a report from the (final) validation result of a document
    pub fn new(document: impl Into<String>, result: ValidationResult, coerced: Option<usize>) -> Self {
        Self {
            document: document.into(),
            valid: result.is_valid(),
            errors: result.error_count(),
            warnings: result.warning_count(),
            mismatches: result.mismatch_count(),
            coerced,
            problems: result.into_problems(),
        }
    }
}

/// Outcome of a validate run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// URI of the schema documents were checked against
    pub schema: String,
    pub total: usize,
    pub failed: usize,
    pub documents: Vec<DocumentReport>,
}

impl ValidationReport {
    pub fn new(schema: impl Into<String>, documents: Vec<DocumentReport>) -> Self {
        Self {
            schema: schema.into(),
            total: documents.len(),
            failed: documents.iter().filter(|d| !d.valid).count(),
            documents,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Trait for formatting output with specialized support for reports
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation report
    fn format_report(&self, report: &ValidationReport, use_color: bool) -> Result<String>;

    /// Format a list of problems
    fn format_problems(&self, problems: &[Problem], use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // For human format, use pretty JSON as fallback
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_report(&self, report: &ValidationReport, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_report_human(report, use_color)),
            _ => self.format(report),
        }
    }

    fn format_problems(&self, problems: &[Problem], use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_problems_human(problems, use_color)),
            _ => self.format(&problems),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && format == OutputFormat::Human && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            // No progress bars with custom writers
            show_progress: false,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "writing data");
        self.writeln(formatted.trim_end())
    }

    /// Write a validation report
    pub fn report(&mut self, report: &ValidationReport) -> Result<()> {
        let formatted = self.format.format_report(report, self.use_color)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a list of problems
    pub fn problems(&mut self, problems: &[Problem]) -> Result<()> {
        if problems.is_empty() && self.is_human() {
            return Ok(());
        }
        let formatted = self.format.format_problems(problems, self.use_color)?;
        self.writeln(formatted.trim_end())
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header_row = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:width$}", h, width = w))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(header_row.trim_end().bold().to_string().as_str())?;
        } else {
            self.writeln(header_row.trim_end())?;
        }

        let separator = widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(w) => format!("{:width$}", cell, width = w),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Progress bar style used while validating documents
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Format a validation report for human reading
fn format_report_human(report: &ValidationReport, use_color: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Schema: {}\n\n", report.schema));

    for document in &report.documents {
        let mut counts = vec![format!("{} error(s)", document.errors + document.mismatches)];
        if document.warnings > 0 {
            counts.push(format!("{} warning(s)", document.warnings));
        }
        if let Some(coerced) = document.coerced.filter(|n| *n > 0) {
            counts.push(format!("{} coercion(s) applied", coerced));
        }

        let status = if document.valid { "✓" } else { "✗" };
        let line = format!("{} {}: {}", status, document.document, counts.join(", "));
        output.push_str(&paint(&line, if document.valid { Paint::Ok } else { Paint::Error }, use_color));
        output.push('\n');
        output.push_str(&indent(&format_problems_human(&document.problems, use_color), "  "));
    }

    output.push('\n');
    let summary = format!(
        "{} of {} document(s) valid",
        report.total - report.failed,
        report.total
    );
    output.push_str(&paint(
        &summary,
        if report.is_success() { Paint::Ok } else { Paint::Error },
        use_color,
    ));
    output.push('\n');

    output
}

/// Format problems for human reading, one per line, with the cause and
/// any suggested conversion indented below
fn format_problems_human(problems: &[Problem], use_color: bool) -> String {
    let mut output = String::new();

    for problem in problems {
        let paint_as = match problem.kind() {
            ProblemKind::Error => Paint::Error,
            ProblemKind::Warning => Paint::Warning,
            ProblemKind::TypeMismatch => Paint::Mismatch,
        };
        output.push_str(&paint(&problem.to_string(), paint_as, use_color));
        output.push('\n');

        if let Some(cause) = problem.cause() {
            output.push_str(&format!("    caused by: {}\n", cause));
        }
        if let Some(mismatch) = problem.mismatch() {
            output.push_str(&format!(
                "    can be converted to {} {}\n",
                mismatch.required_type, mismatch.converted_value
            ));
        }
    }

    output
}

#[derive(Clone, Copy)]
enum Paint {
    Ok,
    Error,
    Warning,
    Mismatch,
}

fn paint(text: &str, paint: Paint, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    match paint {
        Paint::Ok => text.green().to_string(),
        Paint::Error => text.red().to_string(),
        Paint::Warning => text.yellow().to_string(),
        Paint::Mismatch => text.magenta().to_string(),
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines().map(|line| format!("{}{}\n", prefix, line)).collect()
}
