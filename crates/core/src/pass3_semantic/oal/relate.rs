use super::Action;
use crate::error::{Diagnostics, Severity};
use crate::grammar::is_relationship_label;

const USAGE: &str = "Use: relate var1 to var2 across R1;";

/// `relate <a> to <b> across R<n>;`, checked token by token.
pub(super) fn check(action: &Action<'_>, diags: &mut Diagnostics) {
    let tokens = &action.tokens;
    for (i, tok) in action.code_tokens() {
        if !action.is_word(tok, "relate") {
            continue;
        }
        let at = |k: usize| tokens.get(i + k);
        let problem = if !at(1).is_some_and(|t| !t.is_string) {
            Some(("Missing instance variable after 'relate' keyword", USAGE))
        } else if !at(2).is_some_and(|t| t.is("to")) {
            Some((
                "Expected 'to' keyword after instance variable in relate statement",
                USAGE,
            ))
        } else if !at(3).is_some_and(|t| !t.is_string) {
            Some((
                "Missing second instance variable after 'to' in relate statement",
                USAGE,
            ))
        } else if !at(4).is_some_and(|t| t.is("across")) {
            Some(("Expected 'across' keyword in relate statement", USAGE))
        } else if !at(5).is_some_and(|t| !t.is_string && is_relationship_label(&t.value)) {
            Some((
                "Invalid relationship label in relate statement",
                "Use relationship label like R1, R2, R10, etc.",
            ))
        } else if !at(6).is_some_and(|t| t.is(";")) {
            Some(("Missing semicolon at end of relate statement", "Add ';' at the end"))
        } else {
            None
        };

        if let Some((message, suggestion)) = problem {
            action.report(
                diags,
                Severity::Error,
                action.line_at(tok.index),
                message,
                suggestion,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<String> {
        let mut diags = Diagnostics::new();
        check(&Action::new(text, "$".into()), &mut diags);
        diags.into_vec().into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn well_formed_relate() {
        assert!(run("relate pnj to agt across R1;").is_empty());
    }

    #[test]
    fn each_missing_part_has_its_own_message() {
        assert_eq!(
            run("relate pnj agt across R1;"),
            vec!["Expected 'to' keyword after instance variable in relate statement"]
        );
        assert_eq!(
            run("relate pnj to agt R1;"),
            vec!["Expected 'across' keyword in relate statement"]
        );
        assert_eq!(
            run("relate pnj to agt across X1;"),
            vec!["Invalid relationship label in relate statement"]
        );
        assert_eq!(
            run("relate pnj to agt across R1"),
            vec!["Missing semicolon at end of relate statement"]
        );
        assert_eq!(
            run("relate"),
            vec!["Missing instance variable after 'relate' keyword"]
        );
    }

    #[test]
    fn related_is_not_relate() {
        assert!(run("select one a related by self->A[R1];").is_empty());
    }
}
