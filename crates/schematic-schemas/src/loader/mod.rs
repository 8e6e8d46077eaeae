//! Reading schemas and documents from disk
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;

pub use error::{LoaderError, LoaderResult};
pub use parser::{DocumentParser, Format};
