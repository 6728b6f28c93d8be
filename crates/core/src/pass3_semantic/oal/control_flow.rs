use super::Action;
use crate::grammar::{condition_of, is_end};
use crate::error::{Diagnostics, Severity};

struct OpenIf {
    line: u32,
    has_else: bool,
}


/// `if (...)` / `elif (...)` / `else` / `end if;` nesting.
pub(super) fn check(action: &Action<'_>, diags: &mut Diagnostics) {
    let mut stack: Vec<OpenIf> = Vec::new();

    for (line_no, _, line) in action.lines() {
        let trimmed = line.trim();

        if let Some(condition) = condition_of(trimmed, "if") {
            stack.push(OpenIf {
                line: line_no,
                has_else: false,
            });
            if condition.is_empty() {
                action.report(
                    diags,
                    Severity::Error,
                    line_no,
                    format!("Empty condition in 'if' statement at line {line_no}"),
                    "Add condition inside if(...)",
                );
            }
        } else if let Some(condition) = condition_of(trimmed, "elif") {
            if stack.last().map_or(true, |b| b.has_else) {
                action.report(
                    diags,
                    Severity::Error,
                    line_no,
                    format!("'elif' without matching 'if' or after 'else' at line {line_no}"),
                    "Remove elif or add if before it",
                );
            }
            if condition.is_empty() {
                action.report(
                    diags,
                    Severity::Error,
                    line_no,
                    format!("Empty condition in 'elif' statement at line {line_no}"),
                    "Add condition inside elif(...)",
                );
            }
        } else if trimmed == "else" {
            match stack.last_mut() {
                None => action.report(
                    diags,
                    Severity::Error,
                    line_no,
                    format!("'else' without matching 'if' at line {line_no}"),
                    "Remove else or add if before it",
                ),
                Some(block) if block.has_else => action.report(
                    diags,
                    Severity::Error,
                    line_no,
                    format!("Multiple 'else' clauses in same if block at line {line_no}"),
                    "Remove duplicate else clause",
                ),
                Some(block) => block.has_else = true,
            }
        } else if is_end(trimmed, "if") && stack.pop().is_none() {
            action.report(
                diags,
                Severity::Error,
                line_no,
                format!("'end if' without matching 'if' at line {line_no}"),
                "Remove 'end if' or add if before it",
            );
        }
    }

    for block in stack {
        action.report(
            diags,
            Severity::Error,
            block.line,
            format!(
                "Unclosed 'if' block starting at line {}. Missing 'end if'.",
                block.line
            ),
            "Add 'end if;' to close the if block",
        );
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
    fn balanced_blocks_pass() {
        let text = "if (a > 0)\n  x = 1;\nelif (a == 0)\n  x = 0;\nelse\n  x = -1;\nend if;";
        assert!(run(text).is_empty());
    }

    #[test]
    fn nested_blocks_pass() {
        let text = "if (a)\n  if (b)\n    x = 1;\n  end if;\nend if;";
        assert!(run(text).is_empty());
    }

    #[test]
    fn unclosed_if() {
        assert_eq!(
            run("x = 0;\nif (a > 0)\n  x = 1;"),
            vec!["Unclosed 'if' block starting at line 2. Missing 'end if'."]
        );
    }

    #[test]
    fn stray_branches() {
        assert_eq!(run("else"), vec!["'else' without matching 'if' at line 1"]);
        assert_eq!(run("end if;"), vec!["'end if' without matching 'if' at line 1"]);
        assert_eq!(
            run("elif (x)"),
            vec!["'elif' without matching 'if' or after 'else' at line 1"]
        );
    }

    #[test]
    fn double_else_and_elif_after_else() {
        let msgs = run("if (a)\nelse\nelse\nelif (b)\nend if;");
        assert_eq!(
            msgs,
            vec![
                "Multiple 'else' clauses in same if block at line 3",
                "'elif' without matching 'if' or after 'else' at line 4",
            ]
        );
    }

    #[test]
    fn empty_condition() {
        assert_eq!(
            run("if ()\nend if;"),
            vec!["Empty condition in 'if' statement at line 1"]
        );
    }

    #[test]
    fn keywords_in_comments_are_ignored() {
        assert!(run("x = 1; // if (y) without end").is_empty());
    }
}
