//! Sources of raw schema documents
//!
//! The schema cache never reads files itself; it asks a [`SchemaLibrary`]
//! for the document registered under a URI. [`InMemorySchemaLibrary`] is the
//! bundled implementation and can be filled from a directory tree.
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use crate::loader::{DocumentParser, Format, LoaderError, LoaderResult};
use dashmap::DashMap;
use schematic_core::Document;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;
use walkdir::WalkDir;

/// URI of the bundled metaschema, used when a schema has no `$schema`
pub const DEFAULT_METASCHEMA_URI: &str = "http://json-schema.org/draft-03/schema#";

const DEFAULT_METASCHEMA: &str = include_str!("../schemas/draft-03.json");

/// Parse the bundled metaschema
pub fn default_metaschema() -> schematic_core::Result<Document> {
    Document::from_json_str(DEFAULT_METASCHEMA)
}

/// Provider of schema documents by URI
pub trait SchemaLibrary: Send + Sync {
    fn get(&self, uri: &str) -> Option<Document>;

    /// URIs of every registered schema, sorted
    fn uris(&self) -> Vec<String>;
}

/// Thread-safe map of schema documents keyed by URI. A trailing empty
/// fragment (`#`) is not significant.
#[derive(Debug, Default)]
pub struct InMemorySchemaLibrary {
    documents: DashMap<String, Document>,
}

fn key(uri: &str) -> String {
    uri.trim_end_matches('#').to_string()
}

/// `id` or `$id` declared by a schema document
pub fn declared_id(document: &Document) -> Option<&str> {
    document.get_str("id").or_else(|| document.get_str("$id"))
}

impl InMemorySchemaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding only the bundled metaschema
    pub fn with_metaschema() -> Self {
        let library = Self::new();
        match default_metaschema() {
            Ok(metaschema) => library.insert(DEFAULT_METASCHEMA_URI, metaschema),
            Err(e) => warn!(error = %e, "bundled metaschema could not be parsed"),
        }
        library
    }

    /// Register (or replace) the document for `uri`
    pub fn insert(&self, uri: &str, document: Document) {
        debug!(uri, "registering schema document");
        self.documents.insert(key(uri), document);
    }

    /// Register a document under its declared `id`. Returns the URI used, or
    /// `None` when the document declares no id.
    pub fn add(&self, document: Document) -> Option<String> {
        let uri = declared_id(&document)?.to_string();
        self.insert(&uri, document);
        Some(uri)
    }

    pub fn remove(&self, uri: &str) -> Option<Document> {
        self.documents.remove(&key(uri)).map(|(_, document)| document)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Load every `.json`, `.yaml` and `.yml` file below `dir`. Documents
    /// are registered under their declared id, or their `file://` URI when
    /// they have none. Files that fail to parse are skipped with a warning.
    /// Returns the number of documents registered.
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> LoaderResult<usize> {
        let dir = dir.as_ref();
        let parser = DocumentParser::new();
        let mut loaded = 0;

        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| LoaderError::WalkError {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !Format::is_supported(path) {
                continue;
            }

            let document = match parser.parse_file(path) {
                Ok(document) => document,
                Err(e) if e.is_recoverable() => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable schema file");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let uri = match declared_id(&document) {
                Some(id) => id.to_string(),
                None => file_uri(path),
            };
            self.insert(&uri, document);
            loaded += 1;
        }

        debug!(dir = %dir.display(), loaded, "loaded schema directory");
        Ok(loaded)
    }
}

/// `file://` URI for a path, falling back to the plain path when it cannot
/// be made absolute
pub fn file_uri(path: &Path) -> String {
    std::fs::canonicalize(path)
        .ok()
        .and_then(|absolute| Url::from_file_path(absolute).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl SchemaLibrary for InMemorySchemaLibrary {
    fn get(&self, uri: &str) -> Option<Document> {
        self.documents.get(&key(uri)).map(|entry| entry.value().clone())
    }

    fn uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.documents.iter().map(|entry| entry.key().clone()).collect();
        uris.sort();
        uris
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_metaschema_parses() {
        let metaschema = default_metaschema().unwrap();
        assert_eq!(declared_id(&metaschema), Some(DEFAULT_METASCHEMA_URI));
        assert_eq!(metaschema.get_str("$schema"), Some(DEFAULT_METASCHEMA_URI));
    }

    #[test]
    fn test_fragment_is_not_significant() {
        let library = InMemorySchemaLibrary::with_metaschema();
        assert!(library.get("http://json-schema.org/draft-03/schema").is_some());
        assert!(library.get(DEFAULT_METASCHEMA_URI).is_some());
        assert_eq!(library.uris(), vec!["http://json-schema.org/draft-03/schema".to_string()]);
    }

    #[test]
    fn test_add_uses_declared_id() {
        let library = InMemorySchemaLibrary::new();
        let with_id = Document::from_json_str(r#"{"$id": "urn:order", "type": "object"}"#).unwrap();
        assert_eq!(library.add(with_id), Some("urn:order".to_string()));
        assert!(library.add(Document::new()).is_none());
        assert_eq!(library.len(), 1);
        assert!(library.remove("urn:order").is_some());
        assert!(library.is_empty());
    }

    #[test]
    fn test_load_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("order.json"), r#"{"id": "http://example.com/order", "type": "object"}"#).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/address.yaml"), "type: object\nproperties:\n  zip:\n    type: string\n").unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let library = InMemorySchemaLibrary::new();
        let loaded = library.load_dir(dir.path()).unwrap();
        assert_eq!(loaded, 2);
        assert!(library.get("http://example.com/order").is_some());

        let address_uri = file_uri(&dir.path().join("nested/address.yaml"));
        assert!(address_uri.starts_with("file://"));
        let address = library.get(&address_uri).unwrap();
        assert!(address.get_document("properties").is_some());
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let library = InMemorySchemaLibrary::new();
        let err = library.load_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, LoaderError::WalkError { .. }));
    }
}
