use super::{Action, OalScope};
use crate::error::{Diagnostics, Severity};
use crate::lexer::word_at;

fn is_upper_key_letter(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// `KEY::method` must name a declared external entity and one of its bridges.
pub(super) fn check(action: &Action<'_>, scope: &OalScope<'_>, diags: &mut Diagnostics) {
    let tokens = &action.tokens;
    for (i, tok) in action.code_tokens() {
        if tok.value != "::" {
            continue;
        }
        let line = action.line_at(tok.index);
        let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
        let next = tokens.get(i + 1);

        if !prev.is_some_and(|p| is_upper_key_letter(&p.value)) {
            action.report(
                diags,
                Severity::Error,
                line,
                "Bridge call format error: KeyLetter before '::' must be UPPERCASE (e.g., LOG::LogInfo)",
                "Use UPPERCASE keyletter for External Entity (e.g., LOG, TIM, MATH)",
            );
        }
        let Some(prev) = prev else {
            continue;
        };

        let key_letter = prev.value.as_str();
        let Some(entity) = scope.external_entities.get(key_letter) else {
            let mut available: Vec<&str> = scope.external_entities.keys().copied().collect();
            available.sort_unstable();
            let suggestion = if available.is_empty() {
                "Define external_entities in subsystem JSON".to_string()
            } else {
                format!("Available External Entities: {}", available.join(", "))
            };
            action.report(
                diags,
                Severity::Error,
                line,
                format!("Unknown External Entity: '{key_letter}'"),
                suggestion,
            );
            continue;
        };

        let Some(method) = next.map(|t| word_at(&action.masked, t)).filter(|m| !m.is_empty()) else {
            continue;
        };
        if entity.bridge(method).is_none() {
            let names: Vec<&str> = entity.bridges.iter().map(|b| b.name.as_str()).collect();
            let available = if names.is_empty() {
                "none".to_string()
            } else {
                names.join(", ")
            };
            action.report(
                diags,
                Severity::Error,
                line,
                format!("Unknown bridge method: '{key_letter}::{method}'"),
                format!("Available bridges for {key_letter}: {available}"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Subsystem;
    use serde_json::json;

    fn subsystem() -> Subsystem {
        serde_json::from_value(json!({
            "name": "S", "prefix": "S", "classes": [], "relationships": [],
            "external_entities": [
                {"name": "Logging", "key_letter": "LOG", "bridges": [{"name": "LogInfo"}]},
                {"name": "Time", "key_letter": "TIM", "bridges": [{"name": "current_time"}, {"name": "to_text"}]}
            ]
        }))
        .unwrap()
    }

    fn run(text: &str) -> Vec<String> {
        let sub = subsystem();
        let scope = OalScope::new(&sub);
        let mut diags = Diagnostics::new();
        check(&Action::new(text, "$".into()), &scope, &mut diags);
        diags.into_vec().into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn declared_bridges_pass() {
        assert!(run("LOG::LogInfo(message: \"ok\");\nt = TIM::current_time();").is_empty());
    }

    #[test]
    fn method_names_starting_with_keywords_resolve() {
        assert!(run("s = TIM::to_text();").is_empty());
        assert_eq!(run("s = TIM::total();"), vec!["Unknown bridge method: 'TIM::total'"]);
    }

    #[test]
    fn unknown_entity_and_method() {
        assert_eq!(run("MAIL::send();"), vec!["Unknown External Entity: 'MAIL'"]);
        assert_eq!(run("LOG::LogDebug();"), vec!["Unknown bridge method: 'LOG::LogDebug'"]);
    }

    #[test]
    fn lowercase_key_letter_is_a_format_error() {
        let msgs = run("log::LogInfo();");
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].starts_with("Bridge call format error"));
    }

    #[test]
    fn bridges_in_strings_and_comments_are_ignored() {
        assert!(run("x = \"MAIL::send\"; // MAIL::send()").is_empty());
    }
}
