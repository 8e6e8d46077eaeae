//! Error types for schema resolution and validator evaluation
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use crate::problems::Problem;
use thiserror::Error;

/// Result type for schema cache operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Reasons a schema cannot be turned into a usable schema unit
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    /// The library has no document under this URI
    #[error("Unable to find schema '{uri}'")]
    SchemaNotFound { uri: String },

    /// The schema names a metaschema that cannot be loaded
    #[error("Unable to find metaschema '{metaschema}' for schema '{uri}'")]
    MetaschemaNotFound { uri: String, metaschema: String },

    /// The schema document does not satisfy its metaschema
    #[error("Schema '{uri}' is not valid against its metaschema ({} problem(s))", problems.len())]
    InvalidSchema { uri: String, problems: Vec<Problem> },

    /// Metaschemas refer back to a schema already being loaded
    #[error("Circular metaschema chain detected: {chain}")]
    CircularMetaschema { chain: String },
}

impl SchemaError {
    pub fn not_found(uri: impl Into<String>) -> Self {
        Self::SchemaNotFound { uri: uri.into() }
    }

    /// Create a circular metaschema error from the chain of URIs being loaded
    pub fn circular_metaschema(chain: &[String]) -> Self {
        Self::CircularMetaschema {
            chain: chain.join(" -> "),
        }
    }

    /// URI of the schema the error is about
    pub fn uri(&self) -> &str {
        match self {
            Self::SchemaNotFound { uri }
            | Self::MetaschemaNotFound { uri, .. }
            | Self::InvalidSchema { uri, .. } => uri,
            Self::CircularMetaschema { chain } => chain.split(" -> ").next().unwrap_or(chain),
        }
    }
}

/// Failures that abort evaluation of a validator subtree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Schema references nested deeper than the configured limit
    #[error("Schema reference depth limit of {max_depth} exceeded while following '{reference}'")]
    ReferenceDepthExceeded { reference: String, max_depth: usize },

    /// A `"$ref": "#"` node was evaluated after its tree was dropped
    #[error("Self reference evaluated outside of its schema")]
    DetachedSelfReference,
}
