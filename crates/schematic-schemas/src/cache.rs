//! Cache of compiled schemas
//!
//! The cache maps schema URIs to [`SchemaUnit`]s: the raw schema document
//! together with its compiled validator tree. Schemas are fetched from a
//! [`SchemaLibrary`] on first use, checked against their metaschema and
//! compiled once. Lookups and insertions may happen from any number of
//! threads; two threads compiling the same schema at once both succeed and
//! the last insertion is kept.
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use crate::error::{SchemaError, SchemaResult};
use crate::library::{declared_id, SchemaLibrary, DEFAULT_METASCHEMA_URI};
use crate::problems::{Problem, Problems, ValidationResult};
use crate::validation::{SchemaCompiler, SchemaResolver, Validator, DEFAULT_MAX_REFERENCE_DEPTH};
use dashmap::DashMap;
use schematic_core::{Document, Path};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Configuration for a schema cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Metaschema for schemas that do not name one with `$schema`
    pub default_metaschema_uri: String,
    /// Limit on nested `$ref` hops while validating
    pub max_reference_depth: usize,
    /// Whether schemas are checked against their metaschema before use
    pub validate_schemas: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_metaschema_uri: DEFAULT_METASCHEMA_URI.to_string(),
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
            validate_schemas: true,
        }
    }
}

impl CacheConfig {
    pub fn with_default_metaschema(mut self, uri: impl Into<String>) -> Self {
        self.default_metaschema_uri = uri.into();
        self
    }

    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    pub fn with_schema_validation(mut self, enabled: bool) -> Self {
        self.validate_schemas = enabled;
        self
    }
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A compiled schema
#[derive(Debug)]
pub struct SchemaUnit {
    uri: String,
    schema_uri: String,
    document: Document,
    validator: Arc<Validator>,
    compile_problems: Vec<Problem>,
}

impl SchemaUnit {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// URI of the metaschema this schema claims to satisfy
    pub fn schema_uri(&self) -> &str {
        &self.schema_uri
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn validator(&self) -> &Arc<Validator> {
        &self.validator
    }

    /// Warnings and errors found while compiling the schema
    pub fn compile_problems(&self) -> &[Problem] {
        &self.compile_problems
    }

    /// Validate a whole document, resolving references through `resolver`
    pub fn validate(&self, document: &Document, resolver: &dyn SchemaResolver) -> ValidationResult {
        let mut result = ValidationResult::new();
        self.validator.validate_document(document, &mut result, resolver);
        result
    }
}

/// Concurrent URI to compiled schema cache
pub struct SchemaCache {
    library: Arc<dyn SchemaLibrary>,
    units: DashMap<String, Arc<SchemaUnit>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("entries", &self.units.len())
            .field("config", &self.config)
            .finish()
    }
}

impl SchemaCache {
    pub fn new(library: Arc<dyn SchemaLibrary>) -> Self {
        Self::with_config(library, CacheConfig::default())
    }

    pub fn with_config(library: Arc<dyn SchemaLibrary>, config: CacheConfig) -> Self {
        Self {
            library,
            units: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn library(&self) -> &Arc<dyn SchemaLibrary> {
        &self.library
    }

    /// Compiled schema for `uri`, loading and compiling it on first use
    pub fn try_get(&self, uri: &str) -> SchemaResult<Arc<SchemaUnit>> {
        self.load(uri, &mut Vec::new())
    }

    /// Compiled schema for `uri`. On failure the reason is recorded as an
    /// error in `problems` and `None` is returned. Compilation warnings for
    /// the schema are recorded on every call.
    pub fn get(&self, uri: &str, problems: &mut dyn Problems) -> Option<Arc<SchemaUnit>> {
        match self.try_get(uri) {
            Ok(unit) => {
                for problem in unit.compile_problems() {
                    problems.record(problem.clone());
                }
                Some(unit)
            }
            Err(e) => {
                problems.record_error(&Path::root(), e.to_string());
                if let SchemaError::InvalidSchema { problems: found, .. } = e {
                    for problem in found {
                        problems.record(problem);
                    }
                }
                None
            }
        }
    }

    /// Validate `document` against the schema at `uri`
    pub fn validate(&self, uri: &str, document: &Document) -> SchemaResult<ValidationResult> {
        let unit = self.try_get(uri)?;
        let mut result = ValidationResult::new();
        unit.validator()
            .validate_document_with_depth(document, &mut result, self, self.config.max_reference_depth);
        Ok(result)
    }

    /// Drop the compiled schema for `uri`. Returns whether it was cached.
    pub fn remove(&self, uri: &str) -> bool {
        let removed = self.units.remove(cache_key(uri)).is_some();
        if removed {
            debug!(uri, "evicted compiled schema");
        }
        removed
    }

    pub fn remove_all(&self) {
        debug!(entries = self.units.len(), "clearing schema cache");
        self.units.clear();
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.units.contains_key(cache_key(uri))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.units.iter().map(|entry| entry.key().clone()).collect();
        uris.sort();
        uris
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.units.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Load `uri`, with `loading` holding the chain of schemas whose
    /// metaschemas are being resolved
    fn load(&self, uri: &str, loading: &mut Vec<String>) -> SchemaResult<Arc<SchemaUnit>> {
        if let Some(unit) = self.units.get(cache_key(uri)) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(uri, "schema cache hit");
            return Ok(Arc::clone(unit.value()));
        }
        if loading.iter().any(|u| same_uri(u, uri)) {
            loading.push(uri.to_string());
            return Err(SchemaError::circular_metaschema(loading));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let document = self
            .library
            .get(uri)
            .ok_or_else(|| SchemaError::not_found(uri))?;
        let schema_uri = document
            .get_str("$schema")
            .unwrap_or(&self.config.default_metaschema_uri)
            .to_string();
        let id = declared_id(&document).unwrap_or(uri).to_string();

        if self.config.validate_schemas && !same_uri(&schema_uri, &id) && !same_uri(&schema_uri, uri) {
            loading.push(uri.to_string());
            self.check_against_metaschema(uri, &schema_uri, &document, loading)?;
            loading.pop();
        }

        let mut compile_problems = ValidationResult::new();
        let validator = SchemaCompiler::with_base_uri(id).compile(&document, &mut compile_problems);
        debug!(
            uri,
            nodes = validator.node_count(),
            warnings = compile_problems.warning_count(),
            "compiled schema"
        );

        let unit = Arc::new(SchemaUnit {
            uri: uri.to_string(),
            schema_uri,
            document,
            validator,
            compile_problems: compile_problems.into_problems(),
        });
        self.units.insert(cache_key(uri).to_string(), Arc::clone(&unit));
        Ok(unit)
    }

    fn check_against_metaschema(
        &self,
        uri: &str,
        schema_uri: &str,
        document: &Document,
        loading: &mut Vec<String>,
    ) -> SchemaResult<()> {
        let metaschema = match self.load(schema_uri, loading) {
            Ok(unit) => unit,
            Err(SchemaError::SchemaNotFound { uri: missing }) if missing == schema_uri => {
                return Err(SchemaError::MetaschemaNotFound {
                    uri: uri.to_string(),
                    metaschema: schema_uri.to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        let mut result = ValidationResult::new();
        metaschema.validator().validate_document_with_depth(
            document,
            &mut result,
            self,
            self.config.max_reference_depth,
        );
        if result.has_errors() {
            debug!(uri, metaschema = schema_uri, errors = result.error_count(), "schema rejected by metaschema");
            return Err(SchemaError::InvalidSchema {
                uri: uri.to_string(),
                problems: result.into_problems(),
            });
        }
        Ok(())
    }
}

impl SchemaResolver for SchemaCache {
    fn resolve(&self, uri: &str) -> SchemaResult<Arc<Validator>> {
        self.try_get(uri).map(|unit| Arc::clone(unit.validator()))
    }
}

/// Cache entries are keyed without a trailing empty fragment
fn cache_key(uri: &str) -> &str {
    uri.trim_end_matches('#')
}

/// URIs equal up to a trailing empty fragment
fn same_uri(a: &str, b: &str) -> bool {
    a.trim_end_matches('#') == b.trim_end_matches('#')
}
