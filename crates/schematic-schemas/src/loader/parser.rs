//! Parsing documents and schemas from YAML and JSON
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use schematic_core::Document;
use std::path::Path;

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    /// Whether a path has an extension this parser understands
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }
}

/// Reads documents from files or text in either supported format
#[derive(Debug, Default)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a file, detecting format from its extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<Document> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;

        self.parse_content(&content, format, path)
    }

    /// Parse content with an explicit format; `path` is only used in errors
    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Document> {
        let json = match format {
            Format::Yaml => self.parse_yaml(content, path)?,
            Format::Json => serde_json::from_str(content)
                .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))?,
        };

        Document::try_from(json)
            .map_err(|e| LoaderError::invalid_document(path.to_path_buf(), e.to_string()))
    }

    fn parse_yaml(&self, content: &str, path: &Path) -> LoaderResult<serde_json::Value> {
        // Go through serde_yaml's own value first so YAML syntax errors are
        // reported as such
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;

        serde_json::to_value(yaml_value)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }
}
