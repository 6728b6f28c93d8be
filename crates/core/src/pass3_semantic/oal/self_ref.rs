use super::Action;
use crate::error::{Diagnostics, Severity};

/// `self` must be followed by `.` or `->`.
pub(super) fn check(action: &Action<'_>, diags: &mut Diagnostics) {
    for (i, tok) in action.code_tokens() {
        if tok.value != "self" {
            continue;
        }
        let next = action.tokens.get(i + 1).map(|t| t.value.as_str());
        if !matches!(next, Some("." | "->")) {
            action.report(
                diags,
                Severity::Error,
                action.line_at(tok.index),
                "Keyword 'self' must be followed by '.' (attribute access) or '->' (relationship navigation)",
                "Use 'self.AttributeName' or 'self->ClassName[Rn]'",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(text: &str) -> usize {
        let mut diags = Diagnostics::new();
        check(&Action::new(text, "$".into()), &mut diags);
        diags.len()
    }

    #[test]
    fn attribute_access_and_navigation_pass() {
        assert_eq!(count("self.Nama = \"x\";"), 0);
        assert_eq!(count("select one p related by self->PRS[R1];"), 0);
    }

    #[test]
    fn bare_self_fails() {
        assert_eq!(count("x = self;"), 1);
        assert_eq!(count("foo(self)"), 1);
    }

    #[test]
    fn self_inside_string_is_ignored() {
        assert_eq!(count("LOG::LogInfo(message: \"self is here\");"), 0);
    }

    #[test]
    fn keyword_prefix_of_identifier_is_still_self() {
        assert_eq!(count("selfie = 1;"), 1);
        assert_eq!(count("myself = 1;"), 0);
    }
}
