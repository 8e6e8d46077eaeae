//! Shared utilities for command handlers
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use crate::cli::SchemaSource;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use schematic_core::Document;
use schematic_schemas::library::{declared_id, file_uri};
use schematic_schemas::{DocumentParser, InMemorySchemaLibrary, SchemaCache, SchemaError, SchemaUnit};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Library holding the bundled metaschema plus every schema found in the
/// schema directory (from the command line, or else the configuration)
pub fn build_library(source: &SchemaSource, config: &Config) -> Result<Arc<InMemorySchemaLibrary>> {
    let library = InMemorySchemaLibrary::with_metaschema();

    if let Some(dir) = source.schemas_dir.as_ref().or(config.schemas.dir.as_ref()) {
        if !dir.is_dir() {
            return Err(Error::FileNotFound { path: dir.clone() });
        }
        let loaded = library.load_dir(dir)?;
        info!(dir = %dir.display(), loaded, "loaded schema directory");
    }

    Ok(Arc::new(library))
}

/// Resolve the `--schema` argument to a URI. An existing file is parsed and
/// registered under its declared id, or its `file://` URI; anything else is
/// taken as a URI already known to the library.
pub fn register_schema(library: &InMemorySchemaLibrary, schema: &str) -> Result<String> {
    let path = Path::new(schema);
    if !path.is_file() {
        return Ok(schema.to_string());
    }

    let document = DocumentParser::new().parse_file(path)?;
    let uri = match declared_id(&document) {
        Some(id) => id.to_string(),
        None => file_uri(path),
    };
    debug!(path = %path.display(), uri = %uri, "registering schema file");
    library.insert(&uri, document);
    Ok(uri)
}

/// Schema cache over `library` using the configured settings
pub fn build_cache(library: Arc<InMemorySchemaLibrary>, source: &SchemaSource, config: &Config) -> SchemaCache {
    let mut cache_config = config.cache_config();
    if source.no_metaschema {
        cache_config = cache_config.with_schema_validation(false);
    }
    SchemaCache::with_config(library, cache_config)
}

/// Load and compile the schema at `uri`. Compilation warnings are shown;
/// when the schema fails its metaschema the problems found are shown before
/// the error is returned.
pub fn load_schema(cache: &SchemaCache, uri: &str, output: &mut OutputWriter) -> Result<Arc<SchemaUnit>> {
    match cache.try_get(uri) {
        Ok(unit) => {
            if !unit.compile_problems().is_empty() {
                output.section("Schema Problems")?;
                output.problems(unit.compile_problems())?;
            }
            Ok(unit)
        }
        Err(SchemaError::InvalidSchema { uri, problems }) => {
            output.error(&format!("✗ Schema '{}' is not valid against its metaschema", uri))?;
            output.problems(&problems)?;
            Err(SchemaError::InvalidSchema { uri, problems }.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse a JSON or YAML document from disk
pub fn load_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(DocumentParser::new().parse_file(path)?)
}

/// Reject output files whose format cannot be told from the extension
pub fn check_output_path(path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") | Some("yaml") | Some("yml") => Ok(()),
        _ => Err(Error::invalid_args(format!(
            "Cannot tell the output format of '{}'; use a .json, .yaml or .yml file",
            path.display()
        ))),
    }
}

/// Write `value` to `path` as YAML (`.yaml`/`.yml`) or pretty JSON
pub fn write_serialized<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::to_string(value)?,
        _ => {
            let mut json = serde_json::to_string_pretty(value)?;
            json.push('\n');
            json
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use schematic_schemas::SchemaLibrary;
    use tempfile::TempDir;

    #[test]
    fn test_schema_file_registered_by_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("order.json");
        fs::write(&path, r#"{"id": "urn:order", "type": "object"}"#).unwrap();

        let library = InMemorySchemaLibrary::new();
        let uri = register_schema(&library, path.to_str().unwrap()).unwrap();
        assert_eq!(uri, "urn:order");
        assert!(library.get("urn:order").is_some());
    }

    #[test]
    fn test_schema_file_without_id_uses_file_uri() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anon.yaml");
        fs::write(&path, "type: string\n").unwrap();

        let library = InMemorySchemaLibrary::new();
        let uri = register_schema(&library, path.to_str().unwrap()).unwrap();
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("anon.yaml"));
        assert!(library.get(&uri).is_some());
    }

    #[test]
    fn test_uri_argument_passes_through() {
        let library = InMemorySchemaLibrary::new();
        let uri = register_schema(&library, "http://example.com/schemas/order").unwrap();
        assert_eq!(uri, "http://example.com/schemas/order");
        assert!(library.is_empty());
    }

    #[test]
    fn test_missing_schema_dir() {
        let source = SchemaSource {
            schemas_dir: Some("/no/such/schemas".into()),
            no_metaschema: false,
        };
        let err = build_library(&source, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_output_path_extension() {
        assert!(check_output_path(Path::new("report.yml")).is_ok());
        let err = check_output_path(Path::new("report.txt")).unwrap_err();
        assert!(err.should_show_help());
    }

    #[test]
    fn test_write_serialized_by_extension() {
        let dir = TempDir::new().unwrap();
        let value = serde_json::json!({"count": 3});

        let json = dir.path().join("out/report.json");
        write_serialized(&json, &value).unwrap();
        assert_eq!(fs::read_to_string(&json).unwrap(), "{\n  \"count\": 3\n}\n");

        let yaml = dir.path().join("report.yml");
        write_serialized(&yaml, &value).unwrap();
        assert_eq!(fs::read_to_string(&yaml).unwrap(), "count: 3\n");
    }
}
