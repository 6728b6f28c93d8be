//! State-model consistency: unique names and numbers, `Current_State`.

use std::collections::HashMap;

use serde_json::Value;

use super::{SubsystemScope, PHASE};
use crate::error::{DiagnosticKind, Diagnostics};
use crate::model::{ClassDef, StateModel};

pub(super) fn validate_state_model<'a>(
    sm: &'a StateModel,
    cls: &'a ClassDef,
    cls_path: &str,
    scope: &mut SubsystemScope<'a>,
    diags: &mut Diagnostics,
) {
    let sm_path = format!("{cls_path}.state_model");

    if !cls.key_letter.is_empty() {
        if scope.state_models.contains_key(cls.key_letter.as_str()) {
            diags.error(
                PHASE,
                DiagnosticKind::StateModel,
                sm_path.clone(),
                format!("State model KeyLetter '{}' already used", cls.key_letter),
                "Each state model must have unique KeyLetter",
            );
        } else {
            scope
                .state_models
                .insert(cls.key_letter.as_str(), cls.name.as_str());
        }
    }

    let mut names: HashMap<&str, usize> = HashMap::new();
    let mut numbers: HashMap<String, &str> = HashMap::new();
    for (idx, state) in sm.states.iter().enumerate() {
        if !state.name.is_empty() {
            if let Some(first) = names.get(state.name.as_str()) {
                diags.error(
                    PHASE,
                    DiagnosticKind::StateModel,
                    format!("{sm_path}.states[{idx}].name"),
                    format!(
                        "Duplicate state name '{}' (first defined at states[{first}])",
                        state.name
                    ),
                    "Use unique state names within each state model",
                );
            } else {
                names.insert(&state.name, idx);
            }
        }

        if let Some(number) = &state.state_number {
            let key = number_key(number);
            if let Some(first) = numbers.get(&key) {
                diags.error(
                    PHASE,
                    DiagnosticKind::StateModel,
                    format!("{sm_path}.states[{idx}].state_number"),
                    format!("Duplicate state number {key} (first used by '{first}')"),
                    "Assign unique state numbers (1, 2, 3, ...)",
                );
            } else {
                numbers.insert(key, &state.name);
            }
        }
    }

    let has_current_state = cls
        .attributes
        .iter()
        .any(|a| a.name == "Current_State" && a.attr_type.starts_with("state<"));
    if !has_current_state {
        diags.warning(
            PHASE,
            DiagnosticKind::StateModel,
            sm_path,
            format!(
                "Class '{}' with state model must have 'Current_State' attribute",
                cls.name
            ),
            format!(
                "Add attribute: {{ name: 'Current_State', type: 'state<{}>', is_identifier: false }}",
                cls.key_letter
            ),
        );
    }
}

/// Comparable text for a state number, so `1` and `1.0` collide.
fn number_key(number: &Value) -> String {
    let Some(n) = number.as_number() else {
        return number.to_string();
    };
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
