//! Relationship checks: labels, composition formulas, endpoints.

use super::{SubsystemScope, PHASE};
use crate::error::{DiagnosticKind, Diagnostics};
use crate::model::{Endpoint, Relationship, RelationshipKind};

pub(super) fn validate_relationship<'a>(
    rel: &'a Relationship,
    rel_path: &str,
    scope: &mut SubsystemScope<'a>,
    diags: &mut Diagnostics,
) {
    if rel.label.trim().is_empty() {
        diags.error(
            PHASE,
            DiagnosticKind::Reference,
            format!("{rel_path}.label"),
            "Relationship missing or has empty label",
            "Provide a valid relationship label (e.g., 'R1', 'R2', 'R3')",
        );
    } else if !scope.labels.insert(rel.label.as_str()) {
        diags.error(
            PHASE,
            DiagnosticKind::Reference,
            rel_path,
            format!("Duplicate relationship label '{}'", rel.label),
            "Use unique labels (R1, R2, R3, etc.)",
        );
    }

    if let Some(formula) = &rel.composition {
        validate_composition(formula, rel_path, scope, diags);
    }

    let Some(kind) = rel.kind() else {
        diags.warning(
            PHASE,
            DiagnosticKind::Reference,
            format!("{rel_path}.type"),
            format!("Unknown relationship type '{}'", rel.rel_type),
            "Use one of: Simple, Associative, Subtype, Reflexive, Composition, Aggregation",
        );
        return;
    };

    let endpoints = EndpointCheck {
        rel,
        rel_path,
        kind,
        scope: &*scope,
    };
    match kind {
        RelationshipKind::Subtype => {
            endpoints.require("superclass", "Superclass", rel.superclass.as_ref(), diags);
            if rel.subclasses.is_empty() {
                diags.error(
                    PHASE,
                    DiagnosticKind::Reference,
                    format!("{rel_path}.subclasses"),
                    format!(
                        "Subtype relationship '{}' must declare at least one subclass",
                        rel.label
                    ),
                    "Add a 'subclasses' entry such as { \"key_letter\": \"XYZ\" }",
                );
            }
            for (idx, sub) in rel.subclasses.iter().enumerate() {
                endpoints.resolve(&format!("subclasses[{idx}]"), "Subclass", sub, diags);
            }
        }
        RelationshipKind::Associative => {
            endpoints.require("one_side", "One-side", rel.one_side.as_ref(), diags);
            endpoints.require("other_side", "Other-side", rel.other_side.as_ref(), diags);
            endpoints.require(
                "association_class",
                "Association class",
                rel.association_class.as_ref(),
                diags,
            );
        }
        RelationshipKind::Simple
        | RelationshipKind::Reflexive
        | RelationshipKind::Composition
        | RelationshipKind::Aggregation => {
            endpoints.require("one_side", "One-side", rel.one_side.as_ref(), diags);
            endpoints.require("other_side", "Other-side", rel.other_side.as_ref(), diags);
        }
    }
}

fn validate_composition(
    formula: &str,
    rel_path: &str,
    scope: &SubsystemScope<'_>,
    diags: &mut Diagnostics,
) {
    let path = format!("{rel_path}.composition");
    let parts: Vec<&str> = formula.split('+').map(str::trim).collect();
    if parts.len() != 2 {
        diags.error(
            PHASE,
            DiagnosticKind::Reference,
            path,
            format!("Invalid composition format '{formula}'"),
            "Use format 'Rj+Rk' (e.g., 'R1+R2')",
        );
        return;
    }
    for label in parts {
        if scope.subsystem.relationship(label).is_none() {
            diags.error(
                PHASE,
                DiagnosticKind::Reference,
                path.clone(),
                format!("Composition references undefined relationship '{label}'"),
                format!("Define relationship '{label}' first or fix composition formula"),
            );
        }
    }
}

struct EndpointCheck<'s, 'a> {
    rel: &'a Relationship,
    rel_path: &'s str,
    kind: RelationshipKind,
    scope: &'s SubsystemScope<'a>,
}

impl EndpointCheck<'_, '_> {
    fn require(
        &self,
        field: &str,
        role: &str,
        endpoint: Option<&Endpoint>,
        diags: &mut Diagnostics,
    ) {
        match endpoint {
            Some(ep) => self.resolve(field, role, ep, diags),
            None => diags.error(
                PHASE,
                DiagnosticKind::Reference,
                format!("{}.{field}", self.rel_path),
                format!(
                    "{:?} relationship '{}' is missing '{field}'",
                    self.kind, self.rel.label
                ),
                format!("Add '{field}' with the key_letter of an existing class"),
            ),
        }
    }

    fn resolve(&self, field: &str, role: &str, endpoint: &Endpoint, diags: &mut Diagnostics) {
        if self.scope.subsystem.class_by_key_letter(&endpoint.key_letter).is_none() {
            diags.error(
                PHASE,
                DiagnosticKind::Reference,
                format!("{}.{field}", self.rel_path),
                format!("{role} KeyLetter '{}' not found in classes", endpoint.key_letter),
                "Reference an existing class KeyLetter",
            );
        }
    }
}
