//! Expression rewriting from OAL to TypeScript.
//!
//! A single left-to-right scan that copies string literals untouched and
//! rewrites bridge calls, logical and equality operators, the emptiness
//! tests, `param.` and `self`.

use super::LoweringContext;
use crate::error::LoweringError;

pub(crate) fn lower_expr(text: &str, ctx: &LoweringContext<'_>) -> Result<String, LoweringError> {
    let mut rewriter = Rewriter {
        text,
        pos: 0,
        out: String::with_capacity(text.len() + 16),
        after_dot: false,
        ctx,
    };
    rewriter.run()?;
    Ok(rewriter.out)
}

struct Rewriter<'t, 'c, 'm> {
    text: &'t str,
    pos: usize,
    out: String,
    /// Last emitted character was a member-access dot.
    after_dot: bool,
    ctx: &'c LoweringContext<'m>,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// All upper-case ASCII letters, the shape of an external entity key-letter.
fn is_key_letter(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_uppercase())
}

impl<'t> Rewriter<'t, '_, '_> {
    fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    fn word_end(&self, from: usize) -> usize {
        self.text.as_bytes()[from..]
            .iter()
            .position(|&b| !is_word_byte(b))
            .map_or(self.text.len(), |n| from + n)
    }

    fn run(&mut self) -> Result<(), LoweringError> {
        let text = self.text;
        let bytes = text.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b == b'"' || b == b'\'' {
                let end = closing_quote(text, self.pos);
                self.out.push_str(&text[self.pos..end]);
                self.pos = end;
                self.after_dot = false;
            } else if b.is_ascii_alphabetic() || b == b'_' {
                self.word()?;
                self.after_dot = false;
            } else if b.is_ascii_digit() {
                let end = self.word_end(self.pos);
                self.out.push_str(&text[self.pos..end]);
                self.pos = end;
                self.after_dot = false;
            } else {
                self.operator();
            }
        }
        Ok(())
    }

    fn operator(&mut self) {
        let rest = self.rest();
        let (emit, len) = if rest.starts_with("===") || rest.starts_with("!==") {
            (&rest[..3], 3)
        } else if rest.starts_with("==") {
            ("===", 2)
        } else if rest.starts_with("!=") {
            ("!==", 2)
        } else if rest.starts_with("<=") || rest.starts_with(">=") || rest.starts_with("->") {
            (&rest[..2], 2)
        } else {
            let len = rest.chars().next().map_or(1, char::len_utf8);
            (&rest[..len], len)
        };
        self.after_dot = emit == ".";
        self.out.push_str(emit);
        self.pos += len;
    }

    fn word(&mut self) -> Result<(), LoweringError> {
        let text = self.text;
        let start = self.pos;
        let end = self.word_end(start);
        let word = &text[start..end];
        let after = &text[end..];
        self.pos = end;

        if self.after_dot {
            self.out.push_str(word);
            return Ok(());
        }
        if is_key_letter(word) && after.starts_with("::") {
            return self.bridge_call(word, end + 2);
        }
        match word.to_ascii_uppercase().as_str() {
            "AND" => self.out.push_str("&&"),
            "OR" => self.out.push_str("||"),
            "NOT" => self.out.push('!'),
            _ => match word {
                "not_empty" | "empty" => self.emptiness(word)?,
                "param" if after.starts_with('.') => self.out.push_str("params"),
                "self" if !after.starts_with("->") => self.out.push_str("this"),
                _ => self.out.push_str(word),
            },
        }
        Ok(())
    }

    /// `not_empty x` / `empty x` as explicit null and undefined tests.
    fn emptiness(&mut self, word: &str) -> Result<(), LoweringError> {
        let text = self.text;
        let start = self.pos + (self.rest().len() - self.rest().trim_start().len());
        let end = text.as_bytes()[start..]
            .iter()
            .position(|&b| !(is_word_byte(b) || b == b'.'))
            .map_or(text.len(), |n| start + n);
        if start == end {
            self.out.push_str(word);
            return Ok(());
        }
        let operand = lower_expr(&text[start..end], self.ctx)?;
        self.pos = end;
        if word == "not_empty" {
            self.out
                .push_str(&format!("({operand} !== null && {operand} !== undefined)"));
        } else {
            self.out
                .push_str(&format!("({operand} === null || {operand} === undefined)"));
        }
        Ok(())
    }

    /// `KL::Method(args)` as `KL.Method({ args })`, checked against the
    /// declared external entities.
    fn bridge_call(&mut self, key_letter: &str, method_start: usize) -> Result<(), LoweringError> {
        let text = self.text;
        let method_end = self.word_end(method_start);
        let method = &text[method_start..method_end];
        let Some(entity) = self.ctx.external_entity(key_letter) else {
            return Err(LoweringError::UnknownExternalEntity {
                key_letter: key_letter.to_string(),
                available: self.ctx.available_entities(),
            });
        };
        if entity.bridge(method).is_none() {
            let available: Vec<&str> = entity.bridges.iter().map(|b| b.name.as_str()).collect();
            return Err(LoweringError::UnknownBridge {
                key_letter: key_letter.to_string(),
                method: method.to_string(),
                available: available.join(", "),
            });
        }

        self.out.push_str(&format!("{key_letter}.{method}"));
        self.pos = method_end;
        let after = self.rest().trim_start();
        if !after.starts_with('(') {
            return Ok(());
        }
        let open = text.len() - after.len();
        let close = matching_paren(text, open).unwrap_or(text.len());
        let args = text[open + 1..close].trim();
        if args.is_empty() {
            self.out.push_str("()");
        } else {
            let args = lower_expr(args, self.ctx)?;
            self.out.push_str(&format!("({{ {args} }})"));
        }
        self.pos = (close + 1).min(text.len());
        Ok(())
    }
}

/// Offset just past the quote closing the literal opened at `start`, or the
/// end of text.
fn closing_quote(text: &str, start: usize) -> usize {
    let quote = text.as_bytes()[start];
    text.as_bytes()[start + 1..]
        .iter()
        .position(|&b| b == quote)
        .map_or(text.len(), |n| start + 1 + n + 1)
}

/// Offset of the `)` matching the `(` at `open`, skipping quoted text.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = closing_quote(text, i);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use xtuml_core::ExternalEntity;

    fn entities() -> Vec<ExternalEntity> {
        serde_json::from_value(serde_json::json!([
            {"name": "Logging", "key_letter": "LOG", "bridges": [
                {"name": "LogInfo", "parameters": [{"name": "message", "type": "string"}]}
            ]},
            {"name": "Time", "key_letter": "TIM", "bridges": [
                {"name": "current_time", "parameters": [], "return_type": "date"},
                {"name": "get_days_diff", "parameters": [], "return_type": "integer"}
            ]}
        ]))
        .unwrap()
    }

    fn lower(text: &str) -> Result<String, LoweringError> {
        let ees = entities();
        let ctx = LoweringContext::new(&ees, []);
        lower_expr(text, &ctx)
    }

    #[test]
    fn operators() {
        assert_eq!(
            lower("a == 1 AND b != 2 or NOT c").unwrap(),
            "a === 1 && b !== 2 || ! c"
        );
        assert_eq!(lower("a <= b").unwrap(), "a <= b");
        assert_eq!(lower("a === b").unwrap(), "a === b");
    }

    #[test]
    fn strings_are_copied_verbatim() {
        assert_eq!(
            lower("x == \"self AND param.y == 1\"").unwrap(),
            "x === \"self AND param.y == 1\""
        );
    }

    #[test]
    fn self_and_params() {
        assert_eq!(lower("self.Denda + param.hari").unwrap(), "this.Denda + params.hari");
        assert_eq!(lower("f(self)").unwrap(), "f(this)");
        assert_eq!(lower("self->AGT[R1]").unwrap(), "self->AGT[R1]");
        assert_eq!(lower("x.self").unwrap(), "x.self");
        assert_eq!(lower("param").unwrap(), "param");
    }

    #[test]
    fn emptiness_tests() {
        assert_eq!(
            lower("not_empty agt").unwrap(),
            "(agt !== null && agt !== undefined)"
        );
        assert_eq!(
            lower("empty self.Buku AND x").unwrap(),
            "(this.Buku === null || this.Buku === undefined) && x"
        );
    }

    #[test]
    fn bridge_calls() {
        assert_eq!(
            lower("TIM::get_days_diff(date1: self.A, date2: param.b)").unwrap(),
            "TIM.get_days_diff({ date1: this.A, date2: params.b })"
        );
        assert_eq!(lower("TIM::current_time()").unwrap(), "TIM.current_time()");
        assert_eq!(
            lower("LOG::LogInfo(message: \"a (b)\")").unwrap(),
            "LOG.LogInfo({ message: \"a (b)\" })"
        );
    }

    #[test]
    fn unknown_bridge_targets_are_errors() {
        assert_eq!(
            lower("MAIL::send()"),
            Err(LoweringError::UnknownExternalEntity {
                key_letter: "MAIL".into(),
                available: "LOG, TIM".into(),
            })
        );
        assert_eq!(
            lower("LOG::LogDebug(message: \"x\")"),
            Err(LoweringError::UnknownBridge {
                key_letter: "LOG".into(),
                method: "LogDebug".into(),
                available: "LogInfo".into(),
            })
        );
    }
}
