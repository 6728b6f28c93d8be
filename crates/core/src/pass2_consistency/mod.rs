//! Phase 2: cross-referential consistency of classes, attributes,
//! relationships, and state models.
//!
//! All uniqueness maps live for one call. Subsystem names are unique across
//! the model; key-letters, relationship labels, and state-model key-letters
//! are unique within their subsystem.

mod class;
mod relationship;
mod state_model;

use std::collections::{HashMap, HashSet};

use crate::error::{DiagnosticKind, Diagnostics};
use crate::model::{Document, Subsystem};

pub(crate) const PHASE: u8 = 2;

/// Lookup state for one subsystem.
pub(super) struct SubsystemScope<'a> {
    pub path: String,
    pub subsystem: &'a Subsystem,
    /// key-letter -> path of its first definition
    pub key_letters: HashMap<&'a str, String>,
    pub state_models: HashMap<&'a str, &'a str>,
    pub labels: HashSet<&'a str>,
}

impl<'a> SubsystemScope<'a> {
    fn new(idx: usize, subsystem: &'a Subsystem) -> Self {
        SubsystemScope {
            path: format!("$.system_model.subsystems[{idx}]"),
            subsystem,
            key_letters: HashMap::new(),
            state_models: HashMap::new(),
            labels: HashSet::new(),
        }
    }

    /// Record `key_letter` at `path`, reporting a clash with an earlier one.
    pub fn claim_key_letter(&mut self, key_letter: &'a str, path: &str, diags: &mut Diagnostics) {
        if key_letter.is_empty() {
            return;
        }
        match self.key_letters.get(key_letter) {
            Some(first) => diags.error(
                PHASE,
                DiagnosticKind::Reference,
                path,
                format!("Duplicate KeyLetter '{key_letter}' (first defined at {first})"),
                "Use a unique KeyLetter for each class/external entity",
            ),
            None => {
                self.key_letters.insert(key_letter, path.to_string());
            }
        }
    }
}

pub fn validate(doc: &Document, diags: &mut Diagnostics) {
    let mut subsystem_names: HashSet<&str> = HashSet::new();

    for (idx, subsystem) in doc.subsystems().iter().enumerate() {
        let mut scope = SubsystemScope::new(idx, subsystem);

        if !subsystem.name.is_empty() && !subsystem_names.insert(subsystem.name.as_str()) {
            diags.error(
                PHASE,
                DiagnosticKind::Reference,
                format!("{}.name", scope.path),
                format!("Duplicate subsystem name '{}'", subsystem.name),
                "Use a unique name for each subsystem",
            );
        }

        for (cls_idx, cls) in subsystem.classes.iter().enumerate() {
            let cls_path = format!("{}.classes[{cls_idx}]", scope.path);
            scope.claim_key_letter(&cls.key_letter, &cls_path, diags);
            class::validate_class(cls, &cls_path, &scope, diags);
            if let Some(sm) = &cls.state_model {
                state_model::validate_state_model(sm, cls, &cls_path, &mut scope, diags);
            }
        }

        for (ee_idx, ee) in subsystem.external_entities.iter().enumerate() {
            let ee_path = format!("{}.external_entities[{ee_idx}]", scope.path);
            scope.claim_key_letter(&ee.key_letter, &ee_path, diags);
        }

        for (rel_idx, rel) in subsystem.relationships.iter().enumerate() {
            let rel_path = format!("{}.relationships[{rel_idx}]", scope.path);
            relationship::validate_relationship(rel, &rel_path, &mut scope, diags);
        }
    }
}
