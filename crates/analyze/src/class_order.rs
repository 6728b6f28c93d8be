//! Class emission order.
//!
//! Order: independent classes (no referential attributes, not a subtype),
//! then supertypes, then subtypes, then everything else. Only inheritance is
//! taken into account. A referential attribute whose referenced class is
//! emitted later is reported as a [`ForwardReference`]; the order itself is
//! left alone.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use xtuml_core::{ClassDef, Document, Relationship, RelationshipKind};

/// A referential attribute pointing at a class emitted after its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardReference {
    /// Key-letter of the class owning the attribute.
    pub class: String,
    pub attribute: String,
    pub relationship: String,
    /// Key-letter of the referenced class.
    pub referenced: String,
}

impl fmt::Display for ForwardReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} refers to {} across {}, which is emitted later",
            self.class, self.attribute, self.referenced, self.relationship
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassOrder {
    /// Class key-letters in emission order, each once.
    pub order: Vec<String>,
    pub forward_references: Vec<ForwardReference>,
}

impl ClassOrder {
    pub fn position(&self, key_letter: &str) -> Option<usize> {
        self.order.iter().position(|kl| kl == key_letter)
    }
}

/// Appends key-letters, ignoring ones already placed.
struct OrderBuilder<'a> {
    order: Vec<&'a str>,
    placed: HashSet<&'a str>,
}

impl<'a> OrderBuilder<'a> {
    fn push(&mut self, key_letter: &'a str) {
        if self.placed.insert(key_letter) {
            self.order.push(key_letter);
        }
    }
}

fn has_referentials(cls: &ClassDef) -> bool {
    cls.attributes.iter().any(|a| a.is_referential())
}

pub fn class_order(doc: &Document) -> ClassOrder {
    // First definition of a key-letter wins.
    let mut classes: Vec<&ClassDef> = Vec::new();
    let mut by_kl: HashMap<&str, &ClassDef> = HashMap::new();
    for cls in doc.classes() {
        if !by_kl.contains_key(cls.key_letter.as_str()) {
            by_kl.insert(&cls.key_letter, cls);
            classes.push(cls);
        }
    }

    let subtype_rels: Vec<&Relationship> = doc
        .relationships()
        .filter(|r| r.kind() == Some(RelationshipKind::Subtype))
        .collect();

    let mut subtypes: Vec<&str> = Vec::new();
    for rel in &subtype_rels {
        for sub in &rel.subclasses {
            if !subtypes.contains(&sub.key_letter.as_str()) {
                subtypes.push(&sub.key_letter);
            }
        }
    }

    let mut builder = OrderBuilder {
        order: Vec::with_capacity(classes.len()),
        placed: HashSet::new(),
    };

    // Independent classes
    for cls in &classes {
        if !subtypes.contains(&cls.key_letter.as_str()) && !has_referentials(cls) {
            builder.push(&cls.key_letter);
        }
    }

    // Supertypes
    for kl in subtype_rels.iter().filter_map(|r| r.superclass_kl()) {
        if by_kl.contains_key(kl) {
            builder.push(kl);
        }
    }

    // Subtypes
    for kl in &subtypes {
        if by_kl.contains_key(kl) {
            builder.push(kl);
        }
    }

    // Everything else
    for cls in &classes {
        builder.push(&cls.key_letter);
    }

    let order: Vec<String> = builder.order.iter().map(|kl| kl.to_string()).collect();
    let forward_references = forward_references(doc, &order, &by_kl);
    ClassOrder {
        order,
        forward_references,
    }
}

fn forward_references(
    doc: &Document,
    order: &[String],
    by_kl: &HashMap<&str, &ClassDef>,
) -> Vec<ForwardReference> {
    let relationships: HashMap<&str, &Relationship> = doc
        .relationships()
        .map(|r| (r.label.as_str(), r))
        .collect();
    let position: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, kl)| (kl.as_str(), i))
        .collect();

    let mut found = Vec::new();
    for (idx, kl) in order.iter().enumerate() {
        let Some(cls) = by_kl.get(kl.as_str()) else {
            continue;
        };
        for attr in &cls.attributes {
            let Some(label) = attr.referential.as_ref().and_then(|r| r.label()) else {
                continue;
            };
            let Some(rel) = relationships.get(label) else {
                continue;
            };
            if rel.kind() == Some(RelationshipKind::Subtype) {
                continue;
            }
            let referenced = match (rel.one_side_kl(), rel.other_side_kl()) {
                (Some(one), _) if one != kl => one,
                (_, Some(other)) if other != kl => other,
                _ => continue,
            };
            if position.get(referenced).is_some_and(|&p| p > idx) {
                found.push(ForwardReference {
                    class: kl.clone(),
                    attribute: attr.name.clone(),
                    relationship: label.to_string(),
                    referenced: referenced.to_string(),
                });
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(classes: Value, relationships: Value) -> Document {
        Document::from_value(&json!({
            "system_model": {
                "system_name": "S", "version": "1",
                "subsystems": [{
                    "name": "A", "prefix": "A",
                    "classes": classes,
                    "relationships": relationships
                }]
            }
        }))
        .unwrap()
    }

    fn class(kl: &str, referential: Option<&str>) -> Value {
        let mut attrs = vec![json!({"name": format!("{kl}_ID"), "type": "unique_ID", "is_identifier": true})];
        if let Some(label) = referential {
            attrs.push(json!({"name": "Ref_ID", "type": "unique_ID", "referential": label}));
        }
        json!({"name": kl, "key_letter": kl, "class_number": 1, "attributes": attrs})
    }

    #[test]
    fn independent_then_super_then_sub_then_rest() {
        let d = doc(
            json!([
                class("DEP", Some("R2")),
                class("SUB", Some("R1")),
                class("SUP", None),
                class("IND", None),
            ]),
            json!([
                {"label": "R1", "type": "Subtype",
                 "superclass": {"key_letter": "SUP"}, "subclasses": [{"key_letter": "SUB"}]},
                {"label": "R2", "type": "Simple",
                 "one_side": {"key_letter": "IND"}, "other_side": {"key_letter": "DEP"}}
            ]),
        );
        let order = class_order(&d);
        assert_eq!(order.order, vec!["SUP", "IND", "SUB", "DEP"]);
        assert!(order.forward_references.is_empty());
    }

    #[test]
    fn supertype_with_referentials_is_placed_before_subtypes() {
        let d = doc(
            json!([class("SUB", Some("R1")), class("SUP", Some("R2")), class("X", None)]),
            json!([
                {"label": "R1", "type": "Subtype",
                 "superclass": {"key_letter": "SUP"}, "subclasses": [{"key_letter": "SUB"}]},
                {"label": "R2", "type": "Simple",
                 "one_side": {"key_letter": "X"}, "other_side": {"key_letter": "SUP"}}
            ]),
        );
        assert_eq!(class_order(&d).order, vec!["X", "SUP", "SUB"]);
    }

    #[test]
    fn forward_reference_is_reported_not_fixed() {
        // Both have referentials, so both land in the last group in document
        // order and A comes before the B it refers to.
        let d = doc(
            json!([class("A", Some("R1")), class("B", Some("R2")), class("C", None)]),
            json!([
                {"label": "R1", "type": "Simple",
                 "one_side": {"key_letter": "B"}, "other_side": {"key_letter": "A"}},
                {"label": "R2", "type": "Simple",
                 "one_side": {"key_letter": "C"}, "other_side": {"key_letter": "B"}}
            ]),
        );
        let order = class_order(&d);
        assert_eq!(order.order, vec!["C", "A", "B"]);
        assert_eq!(
            order.forward_references,
            vec![ForwardReference {
                class: "A".into(),
                attribute: "Ref_ID".into(),
                relationship: "R1".into(),
                referenced: "B".into(),
            }]
        );
        assert_eq!(
            order.forward_references[0].to_string(),
            "A.Ref_ID refers to B across R1, which is emitted later"
        );
    }

    #[test]
    fn each_class_appears_once() {
        let d = doc(
            json!([class("SUP", None), class("SUB", Some("R1"))]),
            json!([
                {"label": "R1", "type": "Subtype",
                 "superclass": {"key_letter": "SUP"}, "subclasses": [{"key_letter": "SUB"}]},
                {"label": "R9", "type": "Subtype",
                 "superclass": {"key_letter": "SUP"}, "subclasses": [{"key_letter": "SUB"}]}
            ]),
        );
        let order = class_order(&d);
        assert_eq!(order.order, vec!["SUP", "SUB"]);
        assert_eq!(order.position("SUB"), Some(1));
    }
}
