//! Coerce command handler
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use super::utils::{
    build_cache, build_library, check_output_path, load_document, load_schema, register_schema, write_serialized,
};
use crate::cli::CoerceArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use schematic_schemas::TypeCoercionRewriter;
use tracing::warn;

/// Handle the coerce command
///
/// The corrected document goes to `--save-to`, or to stdout in the selected
/// output format. Problems that coercion cannot fix make the command fail
/// after the document has been written.
pub fn handle_coerce(args: CoerceArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    if let Some(path) = &args.save_to {
        check_output_path(path)?;
    }

    let library = build_library(&args.source, config)?;
    let uri = register_schema(&library, &args.schema)?;
    let cache = build_cache(library, &args.source, config);
    load_schema(&cache, &uri, output)?;

    let document = load_document(&args.document)?;
    let result = cache.validate(&uri, &document)?;
    let applied = result.mismatch_count();
    let corrected = TypeCoercionRewriter::new().apply(&document, &result);
    let remaining = cache.validate(&uri, &corrected)?;

    match &args.save_to {
        Some(path) => {
            write_serialized(path, &corrected)?;
            output.success(&format!(
                "✓ Applied {} coercion(s), wrote {}",
                applied,
                path.display()
            ))?;
            if !remaining.is_valid() {
                output.section("Remaining Problems")?;
                output.problems(remaining.problems())?;
            }
        }
        None => {
            output.data(&corrected)?;
            // stdout holds the document; report leftovers through the log
            for problem in remaining.errors() {
                warn!(document = %args.document.display(), "{}", problem);
            }
        }
    }

    if remaining.is_valid() {
        Ok(())
    } else {
        Err(Error::ValidationFailed { failed: 1, total: 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputFormat, SchemaSource};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn setup(document: &str) -> (TempDir, CoerceArgs) {
        let dir = TempDir::new().unwrap();
        let schema = dir.path().join("schema.json");
        fs::write(
            &schema,
            r#"{"properties": {"count": {"type": "integer"}, "active": {"type": "boolean"}, "name": {"type": "string", "required": true}}}"#,
        )
        .unwrap();
        let doc = dir.path().join("doc.json");
        fs::write(&doc, document).unwrap();

        let args = CoerceArgs {
            document: doc,
            schema: schema.display().to_string(),
            source: SchemaSource::default(),
            save_to: Some(dir.path().join("fixed.yaml")),
        };
        (dir, args)
    }

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(std::io::sink()))
    }

    #[test]
    fn test_writes_corrected_document() {
        let (dir, args) = setup(r#"{"name": "n", "count": " 7 ", "active": "TRUE"}"#);
        handle_coerce(args, &Config::default(), &mut quiet_output()).unwrap();

        let written = fs::read_to_string(dir.path().join("fixed.yaml")).unwrap();
        let value: serde_json::Value = serde_yaml::from_str(&written).unwrap();
        assert_eq!(value, serde_json::json!({"name": "n", "count": 7, "active": true}));
    }

    #[test]
    fn test_unfixable_problems_fail_after_writing() {
        let (dir, args) = setup(r#"{"count": "12"}"#);
        let err = handle_coerce(args, &Config::default(), &mut quiet_output()).unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { .. }));

        let written = fs::read_to_string(dir.path().join("fixed.yaml")).unwrap();
        assert_eq!(written, "count: 12\n");
    }
}
