use super::Action;
use crate::error::{Diagnostics, Severity};
use crate::grammar::parse_delete;
use crate::source::{is_identifier, statement_at};

/// `delete object instance <id>;`
pub(super) fn check(action: &Action<'_>, diags: &mut Diagnostics) {
    for (i, tok) in action.code_tokens() {
        let starts_delete = action.is_word(tok, "delete")
            && action
                .tokens
                .get(i + 1)
                .is_some_and(|t| t.is("object"));
        if !starts_delete {
            continue;
        }
        let line = action.line_at(tok.index);
        let Some(var) = statement_at(&action.masked, tok.index).and_then(parse_delete) else {
            action.report(
                diags,
                Severity::Error,
                line,
                "Malformed delete statement",
                "Use: delete object instance <var>;",
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
        } else if var != "self" && !action.declared_before(var, tok.index) {
            action.report(
                diags,
                Severity::Warning,
                line,
                format!("Variable \"{var}\" not found. Ensure it's declared before deletion."),
                "Declare variable before deleting",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<(bool, String)> {
        let mut diags = Diagnostics::new();
        check(&Action::new(text, "$".into()), &mut diags);
        diags
            .into_vec()
            .into_iter()
            .map(|d| (d.is_error(), d.message))
            .collect()
    }

    #[test]
    fn declared_variable_can_be_deleted() {
        let text = "select one krs related by self->KRS[R2];\ndelete object instance krs;";
        assert!(run(text).is_empty());
        assert!(run("delete object instance self;").is_empty());
    }

    #[test]
    fn undeclared_variable_warns() {
        let msgs = run("delete object instance ghost;");
        assert_eq!(
            msgs,
            vec![(
                false,
                "Variable \"ghost\" not found. Ensure it's declared before deletion.".to_string()
            )]
        );
    }

    #[test]
    fn declaration_after_delete_does_not_count() {
        let msgs = run("delete object instance x;\ncreate object instance x of A;");
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn invalid_name_is_an_error() {
        let msgs = run("delete object instance 3x;");
        assert!(msgs[0].0);
    }
}
