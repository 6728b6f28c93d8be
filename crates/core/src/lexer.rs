use serde::Serialize;

/// Lexical class of a token, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Double- or single-quoted literal, quotes included in the text.
    Str,
    /// `->` or `::`
    Operator,
    Keyword,
    /// One of `. [ ] ; =`
    Punct,
    Ident,
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub value: String,
    /// Byte offset of the first character in the source.
    pub index: usize,
    pub is_string: bool,
    pub kind: TokenKind,
}

impl Token {
    /// True for a non-string token whose text equals `text`.
    pub fn is(&self, text: &str) -> bool {
        !self.is_string && self.value == text
    }
}

/// Longest first so `related` wins over `relate`.
const KEYWORDS: &[&str] = &[
    "generate", "related", "select", "create", "across", "relate", "param", "where", "self", "by",
    "to",
];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The whole word starting at `token`, which is longer than the token when a
/// keyword prefix was split off.
pub fn word_at<'a>(src: &'a str, token: &Token) -> &'a str {
    let rest = src.get(token.index..).unwrap_or("");
    let end = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
    &rest[..end]
}

/// True unless `token` is the leading part of a longer word in `src`.
pub fn ends_word(src: &str, token: &Token) -> bool {
    src.get(token.index + token.value.len()..)
        .and_then(|rest| rest.chars().next())
        .map_or(true, |c| !is_word_char(c))
}

/// Tokenize OAL text. Whitespace and any character that starts no token
/// are skipped; lexing never fails.
pub fn lex(src: &str) -> Vec<Token> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    let push = |tokens: &mut Vec<Token>, start: usize, end: usize, kind: TokenKind| {
        let from = chars[start].0;
        let to = chars.get(end).map_or(src.len(), |(i, _)| *i);
        tokens.push(Token {
            value: src[from..to].to_string(),
            index: from,
            is_string: kind == TokenKind::Str,
            kind,
        });
    };

    while pos < chars.len() {
        let c = chars[pos].1;

        // Quoted literal, closed on the same line
        if c == '"' || c == '\'' {
            let mut end = pos + 1;
            while end < chars.len() && chars[end].1 != c && chars[end].1 != '\n' {
                end += 1;
            }
            if end < chars.len() && chars[end].1 == c {
                push(&mut tokens, pos, end + 1, TokenKind::Str);
                pos = end + 1;
                continue;
            }
            pos += 1;
            continue;
        }

        if pos + 1 < chars.len() {
            let pair = (c, chars[pos + 1].1);
            if pair == ('-', '>') || pair == (':', ':') {
                push(&mut tokens, pos, pos + 2, TokenKind::Operator);
                pos += 2;
                continue;
            }
        }

        // Keywords match as prefixes, ahead of identifiers: `selfie` lexes
        // as `self` + `ie`.
        let rest = &src[chars[pos].0..];
        if let Some(kw) = KEYWORDS.iter().find(|kw| rest.starts_with(**kw)) {
            push(&mut tokens, pos, pos + kw.len(), TokenKind::Keyword);
            pos += kw.len();
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut end = pos;
            while end < chars.len() && is_word_char(chars[end].1) {
                end += 1;
            }
            push(&mut tokens, pos, end, TokenKind::Ident);
            pos = end;
            continue;
        }

        if matches!(c, '.' | '[' | ']' | ';' | '=') {
            push(&mut tokens, pos, pos + 1, TokenKind::Punct);
            pos += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let mut end = pos;
            while end < chars.len() && chars[end].1.is_ascii_digit() {
                end += 1;
            }
            push(&mut tokens, pos, end, TokenKind::Int);
            pos = end;
            continue;
        }

        pos += 1;
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(src: &str) -> Vec<String> {
        lex(src).into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn lexes_attribute_access_and_navigation() {
        assert_eq!(values("self.Nama"), vec!["self", ".", "Nama"]);
        assert_eq!(
            values("self->PRS[R1]"),
            vec!["self", "->", "PRS", "[", "R1", "]"]
        );
    }

    #[test]
    fn related_is_not_split_into_relate() {
        let toks = lex("related by");
        assert_eq!(toks[0].value, "related");
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[1].value, "by");
    }

    #[test]
    fn keywords_win_over_identifiers_at_word_start() {
        assert_eq!(values("selfie = 1;"), vec!["self", "ie", "=", "1", ";"]);
        assert_eq!(values("selected.Status"), vec!["select", "ed", ".", "Status"]);
        assert_eq!(values("total_to"), vec!["to", "tal_to"]);
        assert_eq!(lex("selfie")[0].kind, TokenKind::Keyword);
        assert_eq!(lex("selfie")[1].kind, TokenKind::Ident);
    }

    #[test]
    fn keywords_inside_identifiers_are_not_split() {
        assert_eq!(values("myself _self"), vec!["myself", "_self"]);
        assert_eq!(lex("myself")[0].kind, TokenKind::Ident);
    }

    #[test]
    fn ends_word_detects_keyword_prefixes() {
        let src = "select selected";
        let toks = lex(src);
        assert!(ends_word(src, &toks[0]));
        assert!(!ends_word(src, &toks[1]));
        assert_eq!(word_at(src, &toks[1]), "selected");
        assert_eq!(word_at(src, &toks[2]), "ed");
    }

    #[test]
    fn strings_are_single_tokens_flagged_as_strings() {
        let src = r#"LOG::LogInfo(message: "self is here");"#;
        let toks = lex(src);
        let strings: Vec<_> = toks.iter().filter(|t| t.is_string).collect();
        assert_eq!(strings.len(), 1);
        assert_eq!(strings[0].value, "\"self is here\"");
        assert!(toks.iter().filter(|t| !t.is_string).all(|t| t.value != "self"));
    }

    #[test]
    fn string_flag_only_inside_quotes() {
        let src = "x = 'a' ; y = \"b c\"; z = 3";
        for t in lex(src) {
            let bytes = src.as_bytes();
            if t.is_string {
                let q = bytes[t.index];
                assert!(q == b'"' || q == b'\'');
                assert_eq!(bytes[t.index + t.value.len() - 1], q);
            } else {
                assert!(!t.value.starts_with('"') && !t.value.starts_with('\''));
            }
        }
    }

    #[test]
    fn unterminated_quote_is_skipped() {
        let toks = lex("x = \"open\ny = 1;");
        assert!(toks.iter().all(|t| !t.is_string));
        assert!(toks.iter().any(|t| t.value == "open"));
    }

    #[test]
    fn unknown_characters_are_dropped() {
        assert_eq!(values("a + (b)"), vec!["a", "b"]);
    }

    #[test]
    fn offsets_point_into_source() {
        let src = "  select one x";
        let toks = lex(src);
        assert_eq!(toks[0].index, 2);
        assert_eq!(&src[toks[2].index..], "x");
    }

    #[test]
    fn digits_then_letters_split() {
        assert_eq!(values("12ab"), vec!["12", "ab"]);
        assert_eq!(lex("12")[0].kind, TokenKind::Int);
    }
}
