//! Mapping of model type expressions to TypeScript types.

use std::collections::HashMap;
use std::fmt;

use xtuml_core::{ClassDef, Document};

/// A TypeScript type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    /// A declared domain alias, kept by name.
    Alias(String),
    /// `T | null`
    Nullable(Box<TargetType>),
    /// `T[]`
    Sequence(Box<TargetType>),
    /// Generated state enumeration of the named class.
    StateEnum(String),
    Core(&'static str),
    /// A generated class.
    Named(String),
    Any,
}

impl TargetType {
    pub fn is_sequence(&self) -> bool {
        matches!(self, TargetType::Sequence(_))
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Alias(name) | TargetType::Named(name) => f.write_str(name),
            TargetType::Nullable(inner) => write!(f, "{inner} | null"),
            TargetType::Sequence(inner) if matches!(**inner, TargetType::Nullable(_)) => {
                write!(f, "({inner})[]")
            }
            TargetType::Sequence(inner) => write!(f, "{inner}[]"),
            TargetType::StateEnum(class) => write!(f, "{class}State"),
            TargetType::Core(name) => f.write_str(name),
            TargetType::Any => f.write_str("any"),
        }
    }
}

fn core_type(name: &str) -> Option<&'static str> {
    Some(match name {
        "unique_ID" => "UniqueID",
        "string" => "string",
        "integer" => "number",
        "boolean" => "boolean",
        "date" => "Date",
        "real" => "number",
        "void" => "void",
        _ => return None,
    })
}

/// Inner type of `wrapper<inner>`.
fn unwrap<'t>(type_expr: &'t str, wrapper: &str) -> Option<&'t str> {
    type_expr
        .strip_prefix(wrapper)?
        .strip_prefix('<')?
        .strip_suffix('>')
        .map(str::trim)
}

/// Resolves type expressions against one document's aliases and classes.
pub struct TypeMapper<'d> {
    aliases: HashMap<&'d str, &'d str>,
    by_key_letter: HashMap<&'d str, &'d ClassDef>,
    by_name: HashMap<&'d str, &'d ClassDef>,
}

impl<'d> TypeMapper<'d> {
    pub fn new(doc: &'d Document) -> Self {
        let aliases = doc
            .data_types()
            .filter(|dt| is_alias(&dt.name, &dt.core_type))
            .map(|dt| (dt.name.as_str(), dt.core_type.as_str()))
            .collect();
        let mut by_key_letter = HashMap::new();
        let mut by_name = HashMap::new();
        for class in doc.classes() {
            by_key_letter.entry(class.key_letter.as_str()).or_insert(class);
            by_name.entry(class.name.as_str()).or_insert(class);
        }
        TypeMapper {
            aliases,
            by_key_letter,
            by_name,
        }
    }

    /// Map `type_expr` as used on an attribute of `owner`.
    pub fn map(&self, type_expr: &str, owner: Option<&ClassDef>) -> TargetType {
        let type_expr = type_expr.trim();
        if self.aliases.contains_key(type_expr) {
            return TargetType::Alias(type_expr.to_string());
        }
        if let Some(inner) = unwrap(type_expr, "inst_ref_set") {
            return TargetType::Sequence(Box::new(self.map_reference(inner, owner)));
        }
        if let Some(inner) = unwrap(type_expr, "inst_ref") {
            return TargetType::Nullable(Box::new(self.map_reference(inner, owner)));
        }
        if let Some(kl) = unwrap(type_expr, "state") {
            let class = if kl.is_empty() {
                owner
            } else {
                self.by_key_letter.get(kl).copied()
            };
            return match class {
                Some(class) => TargetType::StateEnum(class.name.clone()),
                None => TargetType::Core("string"),
            };
        }
        match core_type(type_expr) {
            Some(core) => TargetType::Core(core),
            None => TargetType::Any,
        }
    }

    /// Inner type of a reference wrapper: a class by name or key-letter,
    /// otherwise any other type expression.
    fn map_reference(&self, inner: &str, owner: Option<&ClassDef>) -> TargetType {
        match self.class(inner) {
            Some(class) => TargetType::Named(class.name.clone()),
            None => self.map(inner, owner),
        }
    }

    pub fn class(&self, name_or_key_letter: &str) -> Option<&'d ClassDef> {
        self.by_name
            .get(name_or_key_letter)
            .or_else(|| self.by_key_letter.get(name_or_key_letter))
            .copied()
    }

    /// Literal a value of `ty` starts out as.
    pub fn default_value(&self, ty: &TargetType) -> &'static str {
        match ty {
            TargetType::Core("string") => "\"\"",
            TargetType::Core("number") => "0",
            TargetType::Core("boolean") => "false",
            TargetType::Sequence(_) => "[]",
            TargetType::Alias(name) => match self.aliases.get(name.as_str()) {
                Some(core) => self.default_value(&self.map(core, None)),
                None => "null",
            },
            _ => "null",
        }
    }

    /// Emitted alias declarations as `(name, target)`, in document order.
    pub fn alias_declarations(&self, doc: &'d Document) -> Vec<(&'d str, TargetType)> {
        let mut seen = std::collections::HashSet::new();
        doc.data_types()
            .filter(|dt| is_alias(&dt.name, &dt.core_type))
            .filter(|dt| seen.insert(dt.name.as_str()))
            .map(|dt| (dt.name.as_str(), self.map(&dt.core_type, None)))
            .collect()
    }
}

/// A data type declares an alias unless it renames a core type to itself.
fn is_alias(name: &str, core_type: &str) -> bool {
    !core_type.is_empty() && name != core_type && name != "unique_ID"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Document {
        Document::from_value(&json!({
            "system_model": {
                "system_name": "S", "version": "1",
                "subsystems": [{
                    "name": "A", "prefix": "A",
                    "data_types": [
                        {"name": "jumlah", "core_type": "integer"},
                        {"name": "string", "core_type": "string"}
                    ],
                    "classes": [
                        {"name": "Anggota", "key_letter": "AGT", "attributes": []},
                        {"name": "Peminjaman", "key_letter": "PNJ", "attributes": []}
                    ],
                    "relationships": []
                }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn resolution_order() {
        let doc = doc();
        let mapper = TypeMapper::new(&doc);
        let pnj = doc.classes().nth(1);

        assert_eq!(mapper.map("jumlah", None).to_string(), "jumlah");
        assert_eq!(mapper.map("string", None).to_string(), "string");
        assert_eq!(mapper.map("inst_ref<AGT>", None).to_string(), "Anggota | null");
        assert_eq!(
            mapper.map("inst_ref_set<Peminjaman>", None).to_string(),
            "Peminjaman[]"
        );
        assert_eq!(
            mapper.map("inst_ref_set<inst_ref<AGT>>", None).to_string(),
            "(Anggota | null)[]"
        );
        assert_eq!(mapper.map("state<PNJ>", None).to_string(), "PeminjamanState");
        assert_eq!(mapper.map("state<>", pnj).to_string(), "PeminjamanState");
        assert_eq!(mapper.map("state<XYZ>", None).to_string(), "string");
        assert_eq!(mapper.map("unique_ID", None).to_string(), "UniqueID");
        assert_eq!(mapper.map("date", None).to_string(), "Date");
        assert_eq!(mapper.map("timestamp", None), TargetType::Any);
    }

    #[test]
    fn defaults_follow_aliases() {
        let doc = doc();
        let mapper = TypeMapper::new(&doc);
        assert_eq!(mapper.default_value(&mapper.map("jumlah", None)), "0");
        assert_eq!(mapper.default_value(&mapper.map("string", None)), "\"\"");
        assert_eq!(mapper.default_value(&mapper.map("inst_ref_set<AGT>", None)), "[]");
        assert_eq!(mapper.default_value(&mapper.map("date", None)), "null");
    }

    #[test]
    fn self_named_data_types_are_not_aliases() {
        let doc = doc();
        let mapper = TypeMapper::new(&doc);
        let names: Vec<&str> = mapper
            .alias_declarations(&doc)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["jumlah"]);
    }
}
