use std::path::Path;
use std::process;

use xtuml_core::validate_str;

use super::format_diagnostic;
use crate::{read_input, OutputFormat};

pub(crate) fn cmd_parse(file: &Path, output: OutputFormat, quiet: bool) {
    let text = read_input(file, output, quiet);
    let validation = validate_str(&text);
    let valid = !validation.has_errors();

    match output {
        OutputFormat::Json => {
            let analysis = validation
                .document
                .as_ref()
                .filter(|_| valid)
                .map(xtuml_analyze::analyze);
            let report = serde_json::json!({
                "valid": valid,
                "errors": validation.error_count(),
                "warnings": validation.warning_count(),
                "diagnostics": validation.diagnostics,
                "analysis": analysis,
            });
            let pretty = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for d in &validation.diagnostics {
                // Errors always reach stderr; the rest is informational.
                if d.is_error() {
                    eprint!("{}", format_diagnostic(d));
                } else if !quiet {
                    print!("{}", format_diagnostic(d));
                }
            }
            if !quiet {
                println!(
                    "{}: {} error(s), {} warning(s)",
                    file.display(),
                    validation.error_count(),
                    validation.warning_count()
                );
                if let Some(doc) = validation.document.as_ref().filter(|_| valid) {
                    let analysis = xtuml_analyze::analyze(doc);
                    println!("Class order: {}", analysis.class_order.order.join(", "));
                    for fwd in &analysis.class_order.forward_references {
                        println!("  note: {fwd}");
                    }
                }
            }
        }
    }

    if !valid {
        process::exit(1);
    }
}
