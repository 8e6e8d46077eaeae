//! Validate command handler
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use super::utils::{
    build_cache, build_library, check_output_path, load_document, load_schema, register_schema, write_serialized,
};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{DocumentReport, OutputWriter, ValidationReport};
use schematic_schemas::TypeCoercionRewriter;
use tracing::debug;

/// Handle the validate command
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    if let Some(path) = &args.save_to {
        check_output_path(path)?;
    }

    let library = build_library(&args.source, config)?;
    let uri = register_schema(&library, &args.schema)?;
    let cache = build_cache(library, &args.source, config);
    let unit = load_schema(&cache, &uri, output)?;

    output.info(&format!(
        "Validating {} document(s) against {}",
        args.documents.len(),
        unit.uri()
    ))?;

    let rewriter = TypeCoercionRewriter::new();
    let progress = if args.documents.len() > 1 {
        output.progress_bar(args.documents.len() as u64, "validating")
    } else {
        None
    };

    let mut reports = Vec::with_capacity(args.documents.len());
    for path in &args.documents {
        let name = path.display().to_string();
        let timer = Timer::with_details("validate_document", &name);

        let document = load_document(path)?;
        let mut result = cache.validate(&uri, &document)?;

        let mut coerced = None;
        if args.coerce && result.mismatch_count() > 0 {
            let applied = result.mismatch_count();
            let corrected = rewriter.apply(&document, &result);
            result = cache.validate(&uri, &corrected)?;
            coerced = Some(applied);
        }

        debug!(
            document = %name,
            errors = result.error_count(),
            mismatches = result.mismatch_count(),
            "validated document"
        );
        reports.push(DocumentReport::new(name, result, coerced));
        timer.finish();

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = ValidationReport::new(unit.uri(), reports);

    if let Some(save_to) = &args.save_to {
        write_serialized(save_to, &report)?;
        output.info(&format!("Report saved to {}", save_to.display()))?;
    }

    output.report(&report)?;

    if report.is_success() {
        Ok(())
    } else {
        Err(Error::ValidationFailed {
            failed: report.failed,
            total: report.total,
        })
    }
}
