//! Statement shapes of the OAL action language.
//!
//! These recognizers work on a single statement or header line with comments
//! already removed. Phase 3 uses them to report malformed statements and the
//! TypeScript lowering uses them to build its syntax tree, so both agree on
//! what a well-formed statement looks like.

/// First whitespace-separated word of `s` and the trimmed remainder.
pub fn take_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

/// `R` followed by one or more digits.
pub fn is_relationship_label(s: &str) -> bool {
    s.len() > 1 && s.starts_with('R') && s[1..].chars().all(|c| c.is_ascii_digit())
}

/// Cardinality keyword of a select statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Any,
    Many,
}

impl Cardinality {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "one" => Some(Cardinality::One),
            "any" => Some(Cardinality::Any),
            "many" => Some(Cardinality::Many),
            _ => None,
        }
    }

    /// `many` selects a collection; `one` and `any` a single instance.
    pub fn is_many(self) -> bool {
        self == Cardinality::Many
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStatement<'s> {
    pub cardinality: Cardinality,
    pub var: &'s str,
    pub navigation: &'s str,
    pub condition: Option<&'s str>,
}

/// `create object instance <var> of <Class>;` as `(var, class)`.
pub fn parse_create(stmt: &str) -> Option<(&str, &str)> {
    let body = stmt.strip_suffix(';')?;
    let (kw, rest) = take_word(body);
    let (object, rest) = take_word(rest);
    let (instance, rest) = take_word(rest);
    let (var, rest) = take_word(rest);
    let (of, rest) = take_word(rest);
    let (class, rest) = take_word(rest);
    let shape_ok = kw == "create"
        && object == "object"
        && instance == "instance"
        && !var.is_empty()
        && of == "of"
        && !class.is_empty()
        && rest.is_empty();
    shape_ok.then_some((var, class))
}

/// `select any|many|one <var> related by <nav> [where <cond>];`
pub fn parse_select(stmt: &str) -> Option<SelectStatement<'_>> {
    let body = stmt.strip_suffix(';')?;
    let (kw, rest) = take_word(body);
    let (cardinality, rest) = take_word(rest);
    let (var, rest) = take_word(rest);
    let (related, rest) = take_word(rest);
    let (by, rest) = take_word(rest);
    let (navigation, rest) = take_word(rest);
    let cardinality = Cardinality::parse(cardinality)?;
    if kw != "select" || var.is_empty() || related != "related" || by != "by" || navigation.is_empty()
    {
        return None;
    }
    let condition = if rest.trim().is_empty() {
        None
    } else {
        let (where_kw, cond) = take_word(rest);
        if where_kw != "where" || cond.trim().is_empty() {
            return None;
        }
        Some(cond.trim())
    };
    Some(SelectStatement {
        cardinality,
        var,
        navigation,
        condition,
    })
}

/// `delete object instance <var>;`
pub fn parse_delete(stmt: &str) -> Option<&str> {
    let body = stmt.strip_suffix(';')?;
    let (kw, rest) = take_word(body);
    let (object, rest) = take_word(rest);
    let (instance, rest) = take_word(rest);
    let (var, rest) = take_word(rest);
    let shape_ok = kw == "delete"
        && object == "object"
        && instance == "instance"
        && !var.is_empty()
        && rest.is_empty();
    shape_ok.then_some(var)
}

/// `relate <a> to <b> across R<n>;` as `(a, b, label)`.
pub fn parse_relate(stmt: &str) -> Option<(&str, &str, &str)> {
    let body = stmt.strip_suffix(';')?;
    let (kw, rest) = take_word(body);
    let (from, rest) = take_word(rest);
    let (to_kw, rest) = take_word(rest);
    let (to, rest) = take_word(rest);
    let (across, rest) = take_word(rest);
    let (label, rest) = take_word(rest);
    let shape_ok = kw == "relate"
        && !from.is_empty()
        && to_kw == "to"
        && !to.is_empty()
        && across == "across"
        && is_relationship_label(label)
        && rest.is_empty();
    shape_ok.then_some((from, to, label))
}

/// Condition of an `if`/`elif` header, with or without parentheses.
/// `None` when the line does not start with `keyword` as a whole word.
pub fn condition_of<'l>(line: &'l str, keyword: &str) -> Option<&'l str> {
    let rest = line.strip_prefix(keyword)?;
    if !(rest.starts_with('(') || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    let rest = rest.trim();
    if !rest.starts_with('(') {
        return Some(rest.trim_end_matches(';').trim());
    }
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(rest[1..i].trim());
                }
            }
            _ => {}
        }
    }
    Some(rest[1..].trim())
}

/// True for `end <what>` with an optional trailing `;`.
pub fn is_end(line: &str, what: &str) -> bool {
    let Some(rest) = line.strip_prefix("end") else {
        return false;
    };
    if !rest.starts_with(char::is_whitespace) {
        return false;
    }
    let rest = rest.trim_start();
    rest.strip_prefix(what)
        .is_some_and(|tail| tail.trim_start().trim_start_matches(';').trim().is_empty())
}

/// True for a bare `else` header.
pub fn is_else(line: &str) -> bool {
    line.trim().trim_end_matches(';').trim() == "else"
}

/// `(var, collection)` of a `for each <var> in <collection>` line.
pub fn parse_for_each(line: &str) -> Option<(&str, &str)> {
    let (kw, rest) = take_word(line);
    let (each, rest) = take_word(rest);
    let (var, rest) = take_word(rest);
    let (in_kw, rest) = take_word(rest);
    let (collection, rest) = take_word(rest);
    let shape_ok = kw == "for"
        && each == "each"
        && !var.is_empty()
        && in_kw == "in"
        && !collection.is_empty()
        && rest.is_empty();
    shape_ok.then_some((var, collection))
}

/// Every `R<n>` inside `[...]` of a navigation chain.
pub fn relationship_labels(navigation: &str) -> Vec<&str> {
    let mut labels = Vec::new();
    let mut rest = navigation;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            break;
        };
        let label = &after[..close];
        if is_relationship_label(label) {
            labels.push(label);
        }
        rest = &after[close + 1..];
    }
    labels
}

/// One `->Target[Rn]` step of a navigation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop<'s> {
    pub target: &'s str,
    pub label: Option<&'s str>,
}

/// Split `start->A[R1]->B[R2]` into its start and hops.
pub fn navigation_hops(navigation: &str) -> (&str, Vec<Hop<'_>>) {
    let mut parts = navigation.split("->");
    let start = parts.next().unwrap_or("").trim();
    let hops = parts
        .map(|part| {
            let part = part.trim();
            match part.find('[') {
                Some(open) => Hop {
                    target: part[..open].trim(),
                    label: part[open + 1..].strip_suffix(']').map(str::trim),
                },
                None => Hop {
                    target: part,
                    label: None,
                },
            }
        })
        .collect();
    (start, hops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_word_splits_on_whitespace() {
        assert_eq!(take_word("  many  x related"), ("many", "x related"));
        assert_eq!(take_word("last"), ("last", ""));
    }

    #[test]
    fn relationship_label_shape() {
        assert!(is_relationship_label("R1"));
        assert!(is_relationship_label("R10"));
        assert!(!is_relationship_label("R"));
        assert!(!is_relationship_label("Rx"));
        assert!(!is_relationship_label("r1"));
    }

    #[test]
    fn create_shape() {
        assert_eq!(
            parse_create("create object instance log of LogCuti;"),
            Some(("log", "LogCuti"))
        );
        assert_eq!(parse_create("create object instance log of LogCuti"), None);
        assert_eq!(parse_create("create instance log of LogCuti;"), None);
    }

    #[test]
    fn select_shape() {
        let s = parse_select("select one agt related by self->AGT[R1];").unwrap();
        assert_eq!(s.cardinality, Cardinality::One);
        assert_eq!(s.var, "agt");
        assert_eq!(s.navigation, "self->AGT[R1]");
        assert_eq!(s.condition, None);

        let s = parse_select(
            "select many krs related by self->KRS[R2] where selected.Status == \"Lulus\";",
        )
        .unwrap();
        assert!(s.cardinality.is_many());
        assert_eq!(s.condition, Some("selected.Status == \"Lulus\""));

        assert!(parse_select("select some x related by self->A[R1];").is_none());
        assert!(parse_select("select one x related by self->A[R1] where;").is_none());
    }

    #[test]
    fn delete_and_relate_shapes() {
        assert_eq!(parse_delete("delete object instance x;"), Some("x"));
        assert_eq!(parse_delete("delete object instance;"), None);
        assert_eq!(
            parse_relate("relate a to b across R3;"),
            Some(("a", "b", "R3"))
        );
        assert_eq!(parse_relate("relate a to b across X3;"), None);
    }

    #[test]
    fn headers() {
        assert_eq!(condition_of("if (f(a) > 0)", "if"), Some("f(a) > 0"));
        assert_eq!(condition_of("if x > 0", "if"), Some("x > 0"));
        assert_eq!(condition_of("ifx = 1;", "if"), None);
        assert!(is_end("end if;", "if"));
        assert!(is_end("end   for", "for"));
        assert!(!is_end("end_if", "if"));
        assert!(is_else("else"));
        assert!(!is_else("elsewhere = 1;"));
        assert_eq!(
            parse_for_each("for each krs in krs_list"),
            Some(("krs", "krs_list"))
        );
        assert_eq!(parse_for_each("for krs in krs_list"), None);
    }

    #[test]
    fn navigation() {
        assert_eq!(relationship_labels("self->A[R1]->B[R12]"), vec!["R1", "R12"]);
        assert!(relationship_labels("self->A").is_empty());

        let (start, hops) = navigation_hops("self->MHS[R1]->KRS[R2]");
        assert_eq!(start, "self");
        assert_eq!(
            hops,
            vec![
                Hop { target: "MHS", label: Some("R1") },
                Hop { target: "KRS", label: Some("R2") },
            ]
        );
    }
}
