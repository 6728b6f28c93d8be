//! OAL well-formedness checks over one state's action body.
//!
//! Every check runs on the comment-masked text and skips string tokens, so
//! prose inside comments or literals never looks like a statement.

mod bridge;
mod control_flow;
mod create;
mod delete;
mod loops;
mod relate;
mod select;
mod self_ref;

use std::collections::HashMap;

use super::PHASE;
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
use crate::lexer::{ends_word, lex, Token};
use crate::model::{ClassDef, ExternalEntity, Relationship, Subsystem};
use crate::source;

/// Per-subsystem lookups shared by the checks.
pub(crate) struct OalScope<'a> {
    pub classes: &'a [ClassDef],
    pub relationships: HashMap<&'a str, &'a Relationship>,
    pub external_entities: HashMap<&'a str, &'a ExternalEntity>,
}

impl<'a> OalScope<'a> {
    pub fn new(subsystem: &'a Subsystem) -> Self {
        OalScope {
            classes: &subsystem.classes,
            relationships: subsystem
                .relationships
                .iter()
                .map(|r| (r.label.as_str(), r))
                .collect(),
            external_entities: subsystem
                .external_entities
                .iter()
                .map(|e| (e.key_letter.as_str(), e))
                .collect(),
        }
    }

    /// Class named `name` or with key-letter `name`.
    pub fn class(&self, name: &str) -> Option<&'a ClassDef> {
        self.classes
            .iter()
            .find(|c| c.name == name || c.key_letter == name)
    }
}

/// One action body prepared for checking.
pub(crate) struct Action<'t> {
    text: &'t str,
    masked: String,
    tokens: Vec<Token>,
    path: String,
    declarations: Vec<Declaration>,
}

/// A variable introduced by create, select, for each, or bare assignment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Declaration {
    pub name: String,
    pub offset: usize,
}

impl<'t> Action<'t> {
    pub fn new(text: &'t str, path: String) -> Self {
        let masked = source::mask_comments(text);
        let tokens = lex(&masked);
        let declarations = declarations(&masked, &tokens);
        Action {
            text,
            masked,
            tokens,
            path,
            declarations,
        }
    }

    /// Tokens outside string literals.
    fn code_tokens(&self) -> impl Iterator<Item = (usize, &Token)> {
        self.tokens.iter().enumerate().filter(|(_, t)| !t.is_string)
    }

    /// `tok` is the whole word `word`, not a keyword prefix of a longer name.
    fn is_word(&self, tok: &Token, word: &str) -> bool {
        tok.is(word) && ends_word(&self.masked, tok)
    }

    fn line_at(&self, offset: usize) -> u32 {
        source::line_of(&self.masked, offset)
    }

    fn lines(&self) -> impl Iterator<Item = (u32, usize, &str)> {
        let mut start = 0usize;
        self.masked.split('\n').enumerate().map(move |(idx, line)| {
            let offset = start;
            start += line.len() + 1;
            (idx as u32 + 1, offset, line)
        })
    }

    /// True if `name` was declared before `offset`.
    fn declared_before(&self, name: &str, offset: usize) -> bool {
        self.declarations
            .iter()
            .any(|d| d.name == name && d.offset < offset)
    }

    fn report(
        &self,
        diags: &mut Diagnostics,
        severity: Severity,
        line: u32,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        diags.push(
            Diagnostic::new(
                severity,
                PHASE,
                DiagnosticKind::OalSyntax,
                source::line_path(&self.path, line),
                message,
                suggestion,
            )
            .with_context(source::context(self.text, line, 2)),
        );
    }
}

/// Run every OAL check on one action body.
pub(crate) fn validate_action(text: &str, path: String, scope: &OalScope<'_>, diags: &mut Diagnostics) {
    if text.trim().is_empty() {
        return;
    }
    let action = Action::new(text, path);

    bridge::check(&action, scope, diags);
    self_ref::check(&action, diags);
    create::check(&action, scope, diags);
    select::check(&action, scope, diags);
    delete::check(&action, diags);
    relate::check(&action, diags);
    control_flow::check(&action, diags);
    loops::check(&action, diags);
}

/// Variables introduced in `masked`, in source order.
pub(crate) fn declarations(masked: &str, tokens: &[Token]) -> Vec<Declaration> {
    let mut found = Vec::new();
    let word = |i: usize| tokens.get(i).filter(|t| !t.is_string).map(|t| t.value.as_str());

    for (i, tok) in tokens.iter().enumerate() {
        if tok.is_string {
            continue;
        }
        if !ends_word(masked, tok) {
            continue;
        }
        let name = match tok.value.as_str() {
            "create" if word(i + 1) == Some("object") && word(i + 2) == Some("instance") => {
                tokens.get(i + 3)
            }
            "select" if matches!(word(i + 1), Some("any" | "many" | "one")) => tokens.get(i + 2),
            "for" if word(i + 1) == Some("each") => tokens.get(i + 2),
            _ => None,
        };
        if let Some(t) = name.filter(|t| !t.is_string) {
            found.push(Declaration {
                name: t.value.clone(),
                offset: t.index,
            });
        }
    }

    let mut offset = 0usize;
    for line in masked.split('\n') {
        if let Some(name) = source::assigned_name(line) {
            if name != "self" {
                found.push(Declaration {
                    name: name.to_string(),
                    offset: offset + (line.len() - line.trim_start().len()),
                });
            }
        }
        offset += line.len() + 1;
    }

    found.sort_by_key(|d| d.offset);
    found
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_cover_every_form() {
        let text = "create object instance a of A;\nselect one b related by self->B[R1];\nfor each c in bs\nend for;\n  d = 1;\nself.x = 2;";
        let masked = source::mask_comments(text);
        let decls = declarations(&masked, &lex(&masked));
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn declared_before_respects_order() {
        let action = Action::new("x = 1;\ndelete object instance y;\ny = 2;", "$".into());
        let delete_at = action.masked.find("delete").unwrap();
        assert!(action.declared_before("x", delete_at));
        assert!(!action.declared_before("y", delete_at));
    }

    #[test]
    fn reports_carry_line_suffix_and_context() {
        let action = Action::new("a = 1;\nb = 2;\nc = 3;", "$.p".into());
        let mut diags = Diagnostics::new();
        action.report(&mut diags, Severity::Error, 2, "m", "s");
        let d = &diags.as_slice()[0];
        assert_eq!(d.path, "$.p [line ~2]");
        let ctx = d.context.as_ref().unwrap();
        assert_eq!(ctx.lines.len(), 3);
        assert!(ctx.lines[1].is_error);
    }
}
