use std::path::Path;
use std::process;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use xtuml_codegen::{translate, TypeScriptConfig};
use xtuml_core::validate_str;

use super::format_diagnostic;
use crate::{read_input, report_error, OutputFormat};

pub(crate) struct TranslateOptions<'a> {
    pub out: Option<&'a Path>,
    pub header: bool,
    pub timestamp: bool,
}

pub(crate) fn cmd_translate(
    file: &Path,
    options: TranslateOptions<'_>,
    output: OutputFormat,
    quiet: bool,
) {
    let text = read_input(file, output, quiet);

    // Translation only runs on a model that passed every phase.
    let validation = validate_str(&text);
    let doc = match validation.document {
        Some(doc) if !validation.diagnostics.iter().any(|d| d.is_error()) => doc,
        _ => {
            match output {
                OutputFormat::Json => {
                    let errors: Vec<_> = validation
                        .diagnostics
                        .iter()
                        .filter(|d| d.is_error())
                        .collect();
                    eprintln!("{}", serde_json::json!({ "error": "validation failed", "diagnostics": errors }));
                }
                OutputFormat::Text => {
                    if !quiet {
                        for d in validation.diagnostics.iter().filter(|d| d.is_error()) {
                            eprint!("{}", format_diagnostic(d));
                        }
                        eprintln!("translation aborted: {} has validation errors", file.display());
                    }
                }
            }
            process::exit(1);
        }
    };

    let generated_at = if options.timestamp {
        match OffsetDateTime::now_utc().format(&Rfc3339) {
            Ok(at) => Some(at),
            Err(e) => {
                report_error(&format!("error formatting timestamp: {}", e), output, quiet);
                process::exit(1);
            }
        }
    } else {
        None
    };
    let config = TypeScriptConfig {
        header: options.header,
        generated_at,
        ..TypeScriptConfig::default()
    };

    let translation = match translate(&doc, &config) {
        Ok(t) => t,
        Err(e) => {
            report_error(&format!("translation error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if let Some(out) = options.out {
        if let Err(e) = std::fs::write(out, &translation.source) {
            let msg = format!("error writing '{}': {}", out.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }

    match (output, options.out) {
        (OutputFormat::Json, out) => {
            let written = out.map(|p| p.display().to_string());
            let source = out.is_none().then_some(&translation.source);
            let report = serde_json::json!({
                "written": written,
                "source": source,
                "forward_references": translation.forward_references,
            });
            let pretty = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", pretty);
        }
        (OutputFormat::Text, None) => print!("{}", translation.source),
        (OutputFormat::Text, Some(out)) => {
            if !quiet {
                println!("wrote {}", out.display());
            }
        }
    }
}
