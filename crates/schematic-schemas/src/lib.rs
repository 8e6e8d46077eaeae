//! Schematic Schemas - schema compilation, validation and type coercion
//!
//! This crate validates semi-structured documents against JSON-Schema style
//! schema documents (draft-03 vocabulary) and reports every violation rather
//! than stopping at the first one.
//!
//! ## Features
//!
//! - **Schema Cache**: Loads schemas by URI, checks them against their metaschema and compiles them once
//! - **Validator Trees**: Immutable compiled schemas, safe to share between threads
//! - **Union Typing**: Reports the diagnostics of the closest failing alternative
//! - **Cross-Schema References**: `$ref` resolution through the cache with a depth guard
//! - **Type Coercion**: Rewrites documents using values that convert to the required type
//!
//! ## Quick Start
//!
//! ```rust
//! use schematic_core::Document;
//! use schematic_schemas::{InMemorySchemaLibrary, SchemaCache, TypeCoercionRewriter};
//! use std::sync::Arc;
//!
//! let library = Arc::new(InMemorySchemaLibrary::with_metaschema());
//! library.insert(
//!     "http://example.com/order",
//!     Document::from_json_str(r#"{"properties": {"count": {"type": "integer"}}}"#).unwrap(),
//! );
//! let cache = SchemaCache::new(library);
//!
//! let order = Document::from_json_str(r#"{"count": "3"}"#).unwrap();
//! let result = cache.validate("http://example.com/order", &order).unwrap();
//! assert_eq!(result.mismatch_count(), 1);
//!
//! let corrected = TypeCoercionRewriter::new().apply(&order, &result);
//! assert_eq!(corrected.get_integer("count", 0), 3);
//! ```
//!
//! ## Problem Kinds
//!
//! - **Error**: The document violates the schema
//! - **Warning**: Something odd in a schema that was skipped (bad regex, unknown type name)
//! - **Type mismatch**: An error whose value converts to the required type
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod coercion;
pub mod error;
pub mod library;
pub mod loader;
pub mod problems;
pub mod types;
pub mod validation;

// Re-export commonly used types for convenience
pub use cache::{CacheConfig, CacheStats, SchemaCache, SchemaUnit};
pub use coercion::TypeCoercionRewriter;
pub use error::{EvaluationError, SchemaError, SchemaResult};
pub use library::{InMemorySchemaLibrary, SchemaLibrary, DEFAULT_METASCHEMA_URI};
pub use loader::{DocumentParser, Format, LoaderError, LoaderResult};
pub use problems::{Mismatch, Problem, ProblemDetail, ProblemKind, Problems, SingleProblem, ValidationResult};
pub use types::Type;
pub use validation::{NoReferences, SchemaCompiler, SchemaResolver, Scope, Target, Validator, DEFAULT_MAX_REFERENCE_DEPTH};
