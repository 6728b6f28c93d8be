mod lex;
mod parse;
mod translate;

pub(crate) use lex::cmd_lex;
pub(crate) use parse::cmd_parse;
pub(crate) use translate::{cmd_translate, TranslateOptions};

use xtuml_core::Diagnostic;

/// Human-readable rendering of one diagnostic, with its suggestion and
/// code preview when present.
pub(crate) fn format_diagnostic(d: &Diagnostic) -> String {
    let mut out = format!("{d}\n");
    if !d.suggestion.is_empty() {
        out.push_str(&format!("  suggestion: {}\n", d.suggestion));
    }
    if let Some(context) = &d.context {
        for line in &context.lines {
            let marker = if line.is_error { '>' } else { ' ' };
            out.push_str(&format!(
                "  {marker} {:>4} | {}\n",
                line.line_number, line.content
            ));
        }
    }
    out
}
