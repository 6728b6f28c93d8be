//! Line-oriented parser from OAL text to [`Stmt`] trees.
//!
//! Block headers (`if`, `elif`, `else`, `end if`, `for each`, `end for`)
//! occupy their own line. Other statements end at an unquoted `;` and may
//! span lines. `//` comments are kept as [`Stmt::Comment`].

use std::mem;

use xtuml_core::grammar::{
    condition_of, is_else, is_end, parse_create, parse_delete, parse_for_each, parse_relate,
    parse_select, take_word,
};
use xtuml_core::source::is_identifier;

use super::ast::Stmt;
use crate::error::LoweringError;

pub(crate) fn parse(text: &str) -> Result<Vec<Stmt>, LoweringError> {
    let mut parser = Parser::default();
    for (idx, raw) in text.lines().enumerate() {
        parser.line(idx as u32 + 1, raw)?;
    }
    parser.finish()
}

enum Block {
    /// `condition` is the open branch's condition, `None` once in `else`.
    If {
        branches: Vec<(String, Vec<Stmt>)>,
        condition: Option<String>,
    },
    For {
        var: String,
        collection: String,
    },
}

struct Frame {
    line: u32,
    header: String,
    block: Block,
    body: Vec<Stmt>,
}

#[derive(Default)]
struct Parser {
    root: Vec<Stmt>,
    frames: Vec<Frame>,
    /// Text of a statement whose `;` has not been seen yet.
    pending: String,
    pending_line: u32,
}

fn malformed(line: u32, statement: &str) -> LoweringError {
    LoweringError::Malformed {
        line,
        statement: statement.trim().to_string(),
    }
}

fn is_header(code: &str) -> bool {
    condition_of(code, "if").is_some()
        || condition_of(code, "elif").is_some()
        || is_else(code)
        || is_end(code, "if")
        || is_end(code, "for")
        || parse_for_each(code).is_some()
}

impl Parser {
    fn body(&mut self) -> &mut Vec<Stmt> {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.body,
            None => &mut self.root,
        }
    }

    /// Pop the innermost frame if it is the kind being closed.
    fn close(&mut self, kind: impl Fn(&Block) -> bool) -> Option<Frame> {
        if kind(&self.frames.last()?.block) {
            self.frames.pop()
        } else {
            None
        }
    }

    fn line(&mut self, line_no: u32, raw: &str) -> Result<(), LoweringError> {
        let (code, comment) = split_comment(raw);
        let code = code.trim();

        // An unterminated statement does not swallow the next header.
        if !self.pending.is_empty() && is_header(code) {
            self.flush_pending()?;
        }
        if !(self.pending.is_empty() && self.header(line_no, code)?) {
            self.statements(line_no, code)?;
        }
        if let Some(comment) = comment {
            self.body().push(Stmt::Comment(comment.to_string()));
        }
        Ok(())
    }

    /// Handle `code` as a block header. Returns false if it is not one.
    fn header(&mut self, line_no: u32, code: &str) -> Result<bool, LoweringError> {
        if let Some(condition) = condition_of(code, "if") {
            self.frames.push(Frame {
                line: line_no,
                header: code.to_string(),
                block: Block::If {
                    branches: Vec::new(),
                    condition: Some(condition.to_string()),
                },
                body: Vec::new(),
            });
        } else if let Some(condition) = condition_of(code, "elif") {
            let Some(Frame {
                block:
                    Block::If {
                        branches,
                        condition: Some(current),
                    },
                body,
                ..
            }) = self.frames.last_mut()
            else {
                return Err(malformed(line_no, code));
            };
            let finished = mem::replace(current, condition.to_string());
            branches.push((finished, mem::take(body)));
        } else if is_else(code) {
            let Some(Frame {
                block: Block::If {
                    branches,
                    condition,
                },
                body,
                ..
            }) = self.frames.last_mut()
            else {
                return Err(malformed(line_no, code));
            };
            let Some(finished) = condition.take() else {
                return Err(malformed(line_no, code));
            };
            branches.push((finished, mem::take(body)));
        } else if is_end(code, "if") {
            let Some(Frame {
                block:
                    Block::If {
                        mut branches,
                        condition,
                    },
                body,
                ..
            }) = self.close(|b| matches!(b, Block::If { .. }))
            else {
                return Err(malformed(line_no, code));
            };
            let otherwise = match condition {
                Some(condition) => {
                    branches.push((condition, body));
                    None
                }
                None => Some(body),
            };
            self.body().push(Stmt::If {
                branches,
                otherwise,
            });
        } else if take_word(code).0 == "for" {
            let Some((var, collection)) = parse_for_each(code) else {
                return Err(malformed(line_no, code));
            };
            self.frames.push(Frame {
                line: line_no,
                header: code.to_string(),
                block: Block::For {
                    var: var.to_string(),
                    collection: collection.to_string(),
                },
                body: Vec::new(),
            });
        } else if is_end(code, "for") {
            let Some(Frame {
                block: Block::For { var, collection },
                body,
                ..
            }) = self.close(|b| matches!(b, Block::For { .. }))
            else {
                return Err(malformed(line_no, code));
            };
            self.body().push(Stmt::ForEach {
                var,
                collection,
                body,
            });
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    /// Split `code` at unquoted `;` and parse each complete statement.
    fn statements(&mut self, line_no: u32, code: &str) -> Result<(), LoweringError> {
        let mut rest = code;
        while !rest.is_empty() {
            let Some(end) = find_unquoted(rest, ';') else {
                if self.pending.is_empty() {
                    self.pending_line = line_no;
                } else {
                    self.pending.push(' ');
                }
                self.pending.push_str(rest.trim());
                break;
            };
            let piece = rest[..=end].trim();
            let (line, text) = if self.pending.is_empty() {
                (line_no, piece.to_string())
            } else {
                let mut text = mem::take(&mut self.pending);
                text.push(' ');
                text.push_str(piece);
                (self.pending_line, text)
            };
            self.statement(line, &text)?;
            rest = rest[end + 1..].trim_start();
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<(), LoweringError> {
        let mut text = mem::take(&mut self.pending);
        text.push(';');
        self.statement(self.pending_line, &text)
    }

    /// Parse one `;`-terminated statement.
    fn statement(&mut self, line: u32, text: &str) -> Result<(), LoweringError> {
        let body = text.strip_suffix(';').unwrap_or(text).trim();
        if body.is_empty() {
            return Ok(());
        }
        let stmt = match take_word(body).0 {
            "create" => parse_create(text).map(|(var, class)| Stmt::Create {
                var: var.to_string(),
                class: class.to_string(),
            }),
            "select" => parse_select(text).map(|s| Stmt::Select {
                cardinality: s.cardinality,
                var: s.var.to_string(),
                navigation: s.navigation.to_string(),
                condition: s.condition.map(str::to_string),
            }),
            "delete" => parse_delete(text).map(|var| Stmt::Delete {
                var: var.to_string(),
            }),
            "relate" => parse_relate(text).map(|(from, to, label)| Stmt::Relate {
                from: from.to_string(),
                to: to.to_string(),
                label: label.to_string(),
            }),
            _ => Some(assignment(body).unwrap_or_else(|| Stmt::Expr(body.to_string()))),
        };
        let stmt = stmt.ok_or_else(|| malformed(line, text))?;
        self.body().push(stmt);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Stmt>, LoweringError> {
        if !self.pending.is_empty() {
            self.flush_pending()?;
        }
        if let Some(frame) = self.frames.pop() {
            return Err(malformed(frame.line, &frame.header));
        }
        Ok(self.root)
    }
}

/// `target = value` where `target` is a variable or attribute path.
fn assignment(body: &str) -> Option<Stmt> {
    let bytes = body.as_bytes();
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'=' => {
                let prev = i.checked_sub(1).map(|p| bytes[p]);
                let next = bytes.get(i + 1).copied();
                if matches!(prev, Some(b'=' | b'!' | b'<' | b'>')) || next == Some(b'=') {
                    continue;
                }
                let target = body[..i].trim();
                let value = body[i + 1..].trim();
                if !target.split('.').all(is_identifier) || value.is_empty() {
                    return None;
                }
                return Some(Stmt::Assign {
                    target: target.to_string(),
                    value: value.to_string(),
                });
            }
            None => {}
        }
    }
    None
}

/// Code part of a line and the text of its trailing `//` comment.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match find_unquoted_str(line, "//") {
        Some(i) => (&line[..i], Some(line[i + 2..].trim())),
        None => (line, None),
    }
}

fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut buf = [0u8; 4];
    find_unquoted_str(s, target.encode_utf8(&mut buf))
}

/// Byte offset of the first `needle` outside quotes.
fn find_unquoted_str(s: &str, needle: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if s[i..].starts_with(needle) => return Some(i),
            None => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use xtuml_core::grammar::Cardinality;

    #[test]
    fn statements_and_comments() {
        let stmts = parse(
            "// hitung\nselisih = TIM::get_days_diff(date1: self.A, date2: param.b); // hari\nLOG::LogInfo(message: \"a; b // c\");",
        )
        .unwrap();
        assert_eq!(
            stmts,
            vec![
                Stmt::Comment("hitung".into()),
                Stmt::Assign {
                    target: "selisih".into(),
                    value: "TIM::get_days_diff(date1: self.A, date2: param.b)".into(),
                },
                Stmt::Comment("hari".into()),
                Stmt::Expr("LOG::LogInfo(message: \"a; b // c\")".into()),
            ]
        );
    }

    #[test]
    fn statement_spanning_lines() {
        let stmts = parse("select many krs related by self->KRS[R2]\n    where selected.SKS > 2;").unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Select {
                cardinality: Cardinality::Many,
                var: "krs".into(),
                navigation: "self->KRS[R2]".into(),
                condition: Some("selected.SKS > 2".into()),
            }]
        );
    }

    #[test]
    fn nested_blocks() {
        let text = "for each k in ks\n  if (k.A == 1)\n    x = 1;\n  elif (k.A == 2)\n    x = 2;\n  else\n    x = 3;\n  end if;\nend for;";
        let stmts = parse(text).unwrap();
        let [Stmt::ForEach { var, body, .. }] = stmts.as_slice() else {
            panic!("expected one loop: {stmts:?}");
        };
        assert_eq!(var, "k");
        let [Stmt::If {
            branches,
            otherwise,
        }] = body.as_slice()
        else {
            panic!("expected one if: {body:?}");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[1].0, "k.A == 2");
        assert_eq!(otherwise.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn comparison_is_not_assignment() {
        assert_eq!(assignment("x == 1"), None);
        assert_eq!(assignment("f(a >= 1)"), None);
        assert_eq!(
            assignment("self.Status = \"a=b\""),
            Some(Stmt::Assign {
                target: "self.Status".into(),
                value: "\"a=b\"".into()
            })
        );
    }

    #[test]
    fn unbalanced_blocks_are_malformed() {
        assert_eq!(
            parse("x = 1;\nif (a)\n  x = 2;"),
            Err(LoweringError::Malformed {
                line: 2,
                statement: "if (a)".into()
            })
        );
        assert!(matches!(
            parse("end for;"),
            Err(LoweringError::Malformed { line: 1, .. })
        ));
        assert!(parse("if (a)\nelse\nelse\nend if;").is_err());
        assert!(parse("create object instance x;").is_err());
    }

    #[test]
    fn trailing_statement_without_semicolon() {
        assert_eq!(
            parse("x = 1").unwrap(),
            vec![Stmt::Assign {
                target: "x".into(),
                value: "1".into()
            }]
        );
    }
}
