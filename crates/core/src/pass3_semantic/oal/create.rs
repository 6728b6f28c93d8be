use super::{Action, OalScope};
use crate::error::{Diagnostics, Severity};
use crate::grammar::parse_create;
use crate::source::{is_identifier, statement_at};

const USAGE: &str = "Use: create object instance <var> of <Class>;";

/// `create object instance <id> of <Class>;`
pub(super) fn check(action: &Action<'_>, scope: &OalScope<'_>, diags: &mut Diagnostics) {
    for (_, tok) in action.code_tokens() {
        if !action.is_word(tok, "create") {
            continue;
        }
        let line = action.line_at(tok.index);
        let Some((var, class)) = statement_at(&action.masked, tok.index).and_then(parse_create) else {
            action.report(
                diags,
                Severity::Error,
                line,
                "Malformed create statement",
                USAGE,
            );
            continue;
        };

        if !is_identifier(var) {
            action.report(
                diags,
                Severity::Error,
                line,
                format!("Invalid variable name \"{var}\". Must start with letter or underscore."),
                "Use valid identifier (letters, numbers, underscore)",
            );
        }

        if scope.class(class).is_none() {
            let available: Vec<&str> = scope.classes.iter().map(|c| c.name.as_str()).collect();
            action.report(
                diags,
                Severity::Error,
                line,
                format!("Class \"{class}\" not found in model. Cannot create instance."),
                format!("Available classes: {}", available.join(", ")),
            );
        }
    }
}
