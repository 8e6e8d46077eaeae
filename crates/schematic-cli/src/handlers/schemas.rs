//! Schema inspection command handlers
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use super::utils::{build_cache, build_library, load_schema, register_schema};
use crate::cli::{OutputFormat, SchemaSource, SchemasAction, SchemasArgs, SchemasCheckArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use schematic_schemas::{Problem, SchemaLibrary};
use serde::Serialize;

/// One row of `schemas list`
#[derive(Debug, Serialize)]
struct SchemaEntry {
    uri: String,
    metaschema: String,
}

/// Result of `schemas check`
#[derive(Debug, Serialize)]
struct SchemaCheck<'a> {
    uri: &'a str,
    metaschema: &'a str,
    validators: usize,
    problems: &'a [Problem],
}

/// Handle the schemas command
pub fn handle_schemas(args: SchemasArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        SchemasAction::List(source) => handle_list(&source, config, output),
        SchemasAction::Check(check) => handle_check(check, config, output),
    }
}

fn handle_list(source: &SchemaSource, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let library = build_library(source, config)?;

    let entries: Vec<SchemaEntry> = library
        .uris()
        .into_iter()
        .map(|uri| {
            let metaschema = library
                .get(&uri)
                .and_then(|doc| doc.get_str("$schema").map(str::to_string))
                .unwrap_or_else(|| config.schemas.default_metaschema.clone());
            SchemaEntry { uri, metaschema }
        })
        .collect();

    if output.format() != OutputFormat::Human {
        return output.data(&entries);
    }

    output.section(&format!("{} Schema(s)", entries.len()))?;
    output.table(
        &["URI", "Metaschema"],
        entries.into_iter().map(|e| vec![e.uri, e.metaschema]).collect(),
    )
}

fn handle_check(args: SchemasCheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let library = build_library(&args.source, config)?;
    let uri = register_schema(&library, &args.schema)?;
    let cache = build_cache(library, &args.source, config);
    let unit = load_schema(&cache, &uri, output)?;

    let check = SchemaCheck {
        uri: unit.uri(),
        metaschema: unit.schema_uri(),
        validators: unit.validator().node_count(),
        problems: unit.compile_problems(),
    };

    if output.format() != OutputFormat::Human {
        return output.data(&check);
    }

    output.success(&format!(
        "✓ Schema '{}' is valid against '{}' ({} validator(s))",
        check.uri, check.metaschema, check.validators
    ))
}
