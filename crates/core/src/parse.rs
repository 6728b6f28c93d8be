//! Three-phase validation of an xtUML JSON document.
//!
//! Phase 1 checks the raw JSON against the schema and normalizes defaults.
//! Phases 2 and 3 run on the typed [`Document`] and are skipped when phase 1
//! reports an error.

use crate::error::{DiagnosticKind, Diagnostic, Diagnostics};
use crate::model::Document;
use crate::pass1_schema;
use crate::pass2_consistency;
use crate::pass3_semantic;
use serde_json::Value;

/// Result of a validation run.
#[derive(Debug)]
pub struct Validation {
    pub diagnostics: Vec<Diagnostic>,
    /// The typed document, present when phase 1 passed and deserialization
    /// succeeded.
    pub document: Option<Document>,
}

impl Validation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

/// Run all three phases and keep the typed document for translation.
pub fn validate(input: &Value) -> Validation {
    let mut diags = Diagnostics::new();

    // Phase 1: schema and defaults
    let mut normalized = input.clone();
    pass1_schema::validate(&mut normalized, &mut diags);
    tracing::debug!(phase = 1, diagnostics = diags.len(), "schema validation finished");
    if diags.has_errors(Some(1)) {
        tracing::debug!("phase 1 reported errors, skipping phases 2 and 3");
        return Validation {
            diagnostics: diags.into_vec(),
            document: None,
        };
    }

    let document = match Document::from_value(&normalized) {
        Ok(doc) => doc,
        Err(e) => {
            diags.error(
                1,
                DiagnosticKind::Structural,
                "$",
                format!("Critical parser exception: {e}"),
                "Ensure JSON is valid and restart validation",
            );
            return Validation {
                diagnostics: diags.into_vec(),
                document: None,
            };
        }
    };

    // Phase 2: cross-reference consistency
    let before = diags.len();
    pass2_consistency::validate(&document, &mut diags);
    tracing::debug!(phase = 2, diagnostics = diags.len() - before, "consistency validation finished");

    // Phase 3: state models and OAL
    let before = diags.len();
    pass3_semantic::validate(&document, &mut diags);
    tracing::debug!(phase = 3, diagnostics = diags.len() - before, "semantic validation finished");

    Validation {
        diagnostics: diags.into_vec(),
        document: Some(document),
    }
}

/// Run all three phases and return only the diagnostics.
pub fn parse(input: &Value) -> Vec<Diagnostic> {
    validate(input).diagnostics
}

/// Like [`validate`], starting from JSON text. Text that is not JSON at all
/// yields a single phase-1 error.
pub fn validate_str(text: &str) -> Validation {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => validate(&value),
        Err(e) => {
            let mut diags = Diagnostics::new();
            diags.error(
                1,
                DiagnosticKind::Structural,
                "$",
                format!("Invalid JSON: {e}"),
                "Fix the JSON syntax and restart validation",
            );
            Validation {
                diagnostics: diags.into_vec(),
                document: None,
            }
        }
    }
}
