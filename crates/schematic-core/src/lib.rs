//! Schematic Core - document model for schema validation
//!
//! This crate provides the immutable, JSON-like document model that the
//! validation engine in `schematic-schemas` reads and rewrites.
//!
//! # Main Components
//!
//! - **Documents**: Insertion-ordered field maps with structural sharing
//! - **Values**: Null, booleans, integers, doubles, strings, documents and arrays
//! - **Paths**: Field addresses from the document root, used in every report
//! - **Error Handling**: Error types using `thiserror`
//!
//! # Example
//!
//! ```
//! use schematic_core::{Document, Path, Value};
//!
//! let doc = Document::from_json_str(r#"{"order": {"qty": "3"}}"#).unwrap();
//! let qty = doc.get_path(&Path::from_segments(["order", "qty"]));
//! assert_eq!(qty, Some(&Value::from("3")));
//! ```
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

pub mod document;
pub mod error;
pub mod path;

pub use document::{Array, Document, Value};
pub use error::{Error, Result};
pub use path::Path;
