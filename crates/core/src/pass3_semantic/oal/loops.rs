use super::Action;
use crate::error::{Diagnostics, Severity};
use crate::grammar::{is_end, parse_for_each, take_word};
use crate::source::is_identifier;

/// Leading variable of a collection path such as `self->KRS[R2]` or `mhs.krs`.
fn collection_head(collection: &str) -> &str {
    let end = collection
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(collection.len());
    &collection[..end]
}

struct OpenLoop {
    line: u32,
}

/// `for each <var> in <collection>` / `end for;` nesting.
pub(super) fn check(action: &Action<'_>, diags: &mut Diagnostics) {
    let mut stack: Vec<OpenLoop> = Vec::new();

    for (line_no, offset, line) in action.lines() {
        let trimmed = line.trim();

        if take_word(trimmed).0 == "for" {
            let Some((var, collection)) = parse_for_each(trimmed) else {
                action.report(
                    diags,
                    Severity::Error,
                    line_no,
                    format!("Malformed 'for each' statement at line {line_no}"),
                    "Use: for each <var> in <collection>",
                );
                continue;
            };
            if !is_identifier(var) {
                action.report(
                    diags,
                    Severity::Error,
                    line_no,
                    format!(
                        "Invalid loop variable name \"{var}\". Must start with letter or underscore."
                    ),
                    "Use valid identifier for loop variable",
                );
            }
            let head = collection_head(collection);
            if head != "self" && !action.declared_before(head, offset) {
                action.report(
                    diags,
                    Severity::Warning,
                    line_no,
                    format!(
                        "Collection variable \"{head}\" not found. Ensure it's declared before loop."
                    ),
                    "Declare collection variable before using in loop",
                );
            }
            stack.push(OpenLoop { line: line_no });
        } else if is_end(trimmed, "for") && stack.pop().is_none() {
            action.report(
                diags,
                Severity::Error,
                line_no,
                format!("'end for' without matching 'for each' at line {line_no}"),
                "Remove 'end for' or add 'for each' before it",
            );
        }
    }

    for open in stack {
        action.report(
            diags,
            Severity::Error,
            open.line,
            format!(
                "Unclosed 'for each' loop starting at line {}. Missing 'end for'.",
                open.line
            ),
            "Add 'end for;' to close the loop",
        );
    }
}
