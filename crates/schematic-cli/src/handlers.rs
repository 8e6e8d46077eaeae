//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; this module only re-exports
//! the entry points used by `main`.
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

mod coerce;
mod completions;
mod config;
mod schemas;
mod utils;
mod validate;

pub use coerce::handle_coerce;
pub use completions::handle_completions;
pub use config::handle_config;
pub use schemas::handle_schemas;
pub use validate::handle_validate;
