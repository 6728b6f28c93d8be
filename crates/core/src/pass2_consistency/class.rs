//! Class-level checks: identifiers, attribute names, referential attributes.

use std::collections::HashMap;

use super::{SubsystemScope, PHASE};
use crate::error::{DiagnosticKind, Diagnostics};
use crate::model::{Attribute, ClassDef, Referential, RelationshipKind};

pub(super) fn validate_class(
    cls: &ClassDef,
    cls_path: &str,
    scope: &SubsystemScope<'_>,
    diags: &mut Diagnostics,
) {
    if cls.identifiers().next().is_none() {
        diags.error(
            PHASE,
            DiagnosticKind::Reference,
            cls_path,
            format!("Class '{}' has no identifier attribute", cls.name),
            "Mark at least one attribute with 'is_identifier': true",
        );
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (idx, attr) in cls.attributes.iter().enumerate() {
        if attr.name.is_empty() {
            continue;
        }
        if let Some(first) = seen.get(attr.name.as_str()) {
            diags.error(
                PHASE,
                DiagnosticKind::Reference,
                format!("{cls_path}.attributes[{idx}]"),
                format!(
                    "Duplicate attribute name '{}' in class '{}' (first defined at attributes[{first}])",
                    attr.name, cls.name
                ),
                "Use unique attribute names within each class",
            );
        } else {
            seen.insert(&attr.name, idx);
        }
    }

    for (idx, attr) in cls.attributes.iter().enumerate() {
        if let Some(referential) = &attr.referential {
            let attr_path = format!("{cls_path}.attributes[{idx}]");
            validate_referential(attr, referential, cls, &attr_path, scope, diags);
        }
    }
}

fn validate_referential(
    attr: &Attribute,
    referential: &Referential,
    cls: &ClassDef,
    attr_path: &str,
    scope: &SubsystemScope<'_>,
    diags: &mut Diagnostics,
) {
    let Some(label) = referential.label() else {
        let (message, suggestion) = match referential {
            Referential::Label(_) => (
                format!("Referential attribute '{}' has empty relationship label", attr.name),
                "Provide a valid relationship label (e.g., 'R1', 'R2')",
            ),
            Referential::Detailed(_) => (
                format!("Referential attribute '{}' missing 'relationship_label'", attr.name),
                "Add 'relationship_label' field (e.g., 'R1', 'R2')",
            ),
        };
        diags.error(
            PHASE,
            DiagnosticKind::Reference,
            format!("{attr_path}.referential"),
            message,
            suggestion,
        );
        return;
    };

    // An unknown label is reported by the relationship checks, if at all.
    let Some(rel) = scope.subsystem.relationship(label) else {
        return;
    };

    let referenced_kl = if rel.kind() == Some(RelationshipKind::Subtype) && rel.superclass.is_some()
    {
        rel.superclass_kl()
    } else if rel.one_side_kl().is_some_and(|kl| kl != cls.key_letter) {
        rel.one_side_kl()
    } else if rel.other_side_kl().is_some_and(|kl| kl != cls.key_letter) {
        rel.other_side_kl()
    } else {
        None
    };
    let Some(referenced) = referenced_kl.and_then(|kl| scope.subsystem.class_by_key_letter(kl))
    else {
        return;
    };

    let matching = referenced.attributes.iter().find(|a| {
        a.name == attr.name || (a.is_identifier && attr.name.contains(&referenced.key_letter))
    });
    if let Some(target) = matching {
        if target.attr_type != attr.attr_type {
            diags.error(
                PHASE,
                DiagnosticKind::Reference,
                attr_path,
                format!(
                    "Referential attribute '{}' type '{}' doesn't match referenced attribute type '{}'",
                    attr.name, attr.attr_type, target.attr_type
                ),
                format!(
                    "Change type to '{}' to match referenced attribute",
                    target.attr_type
                ),
            );
        }
    }
}
