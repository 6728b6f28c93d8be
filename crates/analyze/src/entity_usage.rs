//! External entities referenced from state actions.
//!
//! Runtime shims are generated only for entities that appear as
//! `KEY::Method` in some action body. Comments and string literals do not
//! count.

use std::collections::{BTreeSet, HashSet};

use xtuml_core::{lex, source, Document};

fn is_upper_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase())
}

/// Key-letters of declared external entities used in any action body.
pub fn used_external_entities(doc: &Document) -> BTreeSet<String> {
    let declared: HashSet<&str> = doc
        .external_entities()
        .map(|ee| ee.key_letter.as_str())
        .collect();

    let mut used = BTreeSet::new();
    let actions = doc
        .classes()
        .filter_map(|c| c.state_model.as_ref())
        .flat_map(|sm| sm.states.iter())
        .filter_map(|st| st.action_oal.as_deref());

    for text in actions {
        let tokens = lex(&source::mask_comments(text));
        for pair in tokens.windows(2) {
            let (prev, tok) = (&pair[0], &pair[1]);
            if tok.is_string || prev.is_string || tok.value != "::" {
                continue;
            }
            if is_upper_word(&prev.value) && declared.contains(prev.value.as_str()) {
                used.insert(prev.value.clone());
            }
        }
    }
    used
}
