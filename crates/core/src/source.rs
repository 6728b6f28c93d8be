//! Helpers for locating things inside OAL action text.

use crate::error::{ContextLine, SourceContext};

/// 1-based line number of a byte offset.
pub fn line_of(text: &str, offset: usize) -> u32 {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() as u32 + 1
}

/// The error line plus up to `radius` lines either side.
pub fn context(text: &str, line: u32, radius: u32) -> SourceContext {
    let lines: Vec<&str> = text.split('\n').collect();
    let start = line.saturating_sub(radius + 1) as usize;
    let end = ((line + radius) as usize).min(lines.len());
    let lines = lines
        .iter()
        .enumerate()
        .take(end)
        .skip(start)
        .map(|(idx, content)| ContextLine {
            line_number: idx as u32 + 1,
            content: content.to_string(),
            is_error: idx as u32 + 1 == line,
        })
        .collect();
    SourceContext { line, lines }
}

/// `base [line ~N]`
pub fn line_path(base: &str, line: u32) -> String {
    format!("{base} [line ~{line}]")
}

/// Replace `//` comments with spaces, keeping every offset and newline
/// where it was. Quoted text is left alone.
pub fn mask_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut in_comment = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
                out.push('\n');
            } else {
                for _ in 0..c.len_utf8() {
                    out.push(' ');
                }
            }
            continue;
        }
        match quote {
            Some(q) => {
                if c == q || c == '\n' {
                    quote = None;
                }
                out.push(c);
            }
            None => {
                if c == '/' && chars.peek() == Some(&'/') {
                    in_comment = true;
                    out.push(' ');
                } else {
                    if c == '"' || c == '\'' {
                        quote = Some(c);
                    }
                    out.push(c);
                }
            }
        }
    }
    out
}

/// Text from `start` up to and including the next `;` outside quotes, or
/// `None` when the statement is never terminated.
pub fn statement_at(text: &str, start: usize) -> Option<&str> {
    let rest = text.get(start..)?;
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ';' => return Some(&rest[..=i]),
            None => {}
        }
    }
    None
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Variable a line assigns with a bare `name = expr`, if any.
pub fn assigned_name(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    let name = &trimmed[..end];
    let rest = trimmed[end..].trim_start();
    if !is_identifier(name) || !rest.starts_with('=') || rest.starts_with("==") {
        return None;
    }
    Some(name)
}
