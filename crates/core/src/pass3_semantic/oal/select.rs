use super::{Action, OalScope};
use crate::error::{Diagnostics, Severity};
use crate::grammar::{parse_select, relationship_labels};
use crate::source::{is_identifier, statement_at};

const USAGE: &str =
    "Use: select any|many|one <var> related by <navigation> [where <condition>];";

/// `select any|many|one <id> related by <nav> [where <cond>];`
pub(super) fn check(action: &Action<'_>, scope: &OalScope<'_>, diags: &mut Diagnostics) {
    for (_, tok) in action.code_tokens() {
        if !action.is_word(tok, "select") {
            continue;
        }
        let line = action.line_at(tok.index);
        let Some(select) = statement_at(&action.masked, tok.index).and_then(parse_select) else {
            action.report(
                diags,
                Severity::Error,
                line,
                "Malformed select statement",
                USAGE,
            );
            continue;
        };

        if !is_identifier(select.var) {
            action.report(
                diags,
                Severity::Error,
                line,
                format!(
                    "Invalid variable name \"{}\". Must start with letter or underscore.",
                    select.var
                ),
                "Use valid identifier (letters, numbers, underscore)",
            );
        }

        for label in relationship_labels(select.navigation) {
            if !scope.relationships.contains_key(label) {
                action.report(
                    diags,
                    Severity::Error,
                    line,
                    format!("Relationship \"{label}\" not found in model."),
                    "Check model relationships",
                );
            }
        }

        if let Some(condition) = select.condition {
            if !condition.contains("selected.") {
                action.report(
                    diags,
                    Severity::Warning,
                    line,
                    "WHERE clause should reference 'selected' keyword.",
                    "Example: \"selected.Status == \\\"Active\\\"\"",
                );
            }
            let has_comparison = ["==", "!=", "<", ">"].iter().any(|op| condition.contains(op));
            if !has_comparison {
                action.report(
                    diags,
                    Severity::Error,
                    line,
                    "WHERE clause must contain comparison operator (==, !=, <, >, <=, >=)",
                    "Add comparison to WHERE clause",
                );
            }
        }
    }
}
