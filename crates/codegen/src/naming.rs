//! Identifier casing used for generated member names.

/// First character upper-cased.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First character lower-cased.
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Space-separated words joined as camelCase: `"ajukan Cuti"` becomes
/// `ajukanCuti`. Only first letters change, so `"KRS"` becomes `kRS`.
pub fn camel_case(s: &str) -> String {
    s.split(' ')
        .filter(|w| !w.is_empty())
        .enumerate()
        .map(|(i, word)| {
            if i == 0 {
                decapitalize(word)
            } else {
                capitalize(word)
            }
        })
        .collect()
}

/// Accessor name for navigating to `class_name`: `getAnggota`, or
/// `getKRSList` for a collection.
pub fn accessor(class_name: &str, many: bool) -> String {
    format!("get{}", capitalize(&property(class_name, many)))
}

/// Field holding the navigated instance(s).
pub fn property(class_name: &str, many: bool) -> String {
    let mut prop = camel_case(class_name);
    if many {
        prop.push_str("List");
    }
    prop
}
