use std::collections::HashSet;

use super::PHASE;
use crate::error::{DiagnosticKind, Diagnostics};
use crate::model::StateModel;

/// Transition endpoints must be declared states. An unknown event is only a
/// warning since events may be raised from outside the model.
pub(super) fn check_transitions(sm: &StateModel, sm_path: &str, diags: &mut Diagnostics) {
    let states: HashSet<&str> = sm.states.iter().map(|s| s.name.as_str()).collect();
    let events: HashSet<&str> = sm.events.iter().map(|e| e.label()).collect();

    for (idx, tr) in sm.transitions.iter().enumerate() {
        let tr_path = format!("{sm_path}.transitions[{idx}]");

        for (field, value) in [("from_state", &tr.from_state), ("to_state", &tr.to_state)] {
            match value.as_deref().filter(|s| !s.is_empty()) {
                None => diags.error(
                    PHASE,
                    DiagnosticKind::StateModel,
                    tr_path.clone(),
                    format!("Transition is missing '{field}'"),
                    format!("Add '{field}' naming one of the declared states"),
                ),
                Some(name) if !states.contains(name) => diags.error(
                    PHASE,
                    DiagnosticKind::StateModel,
                    format!("{tr_path}.{field}"),
                    format!("Transition {field} '{name}' not found"),
                    "Reference an existing state name",
                ),
                Some(_) => {}
            }
        }

        if let Some(event) = tr.event.as_deref().filter(|s| !s.is_empty()) {
            if !events.contains(event) {
                diags.warning(
                    PHASE,
                    DiagnosticKind::StateModel,
                    format!("{tr_path}.event"),
                    format!("Transition event '{event}' not found"),
                    "Define the event in state_model.events with matching label",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(transitions: serde_json::Value) -> Vec<(bool, String, String)> {
        let sm: StateModel = serde_json::from_value(json!({
            "initial_state": "A",
            "states": [{"name": "A"}, {"name": "B"}],
            "events": [{"label": "X1"}],
            "transitions": transitions
        }))
        .unwrap();
        let mut diags = Diagnostics::new();
        check_transitions(&sm, "$", &mut diags);
        diags
            .into_vec()
            .into_iter()
            .map(|d| (d.is_error(), d.path, d.message))
            .collect()
    }

    #[test]
    fn declared_endpoints_pass() {
        assert!(run(json!([{"from_state": "A", "to_state": "B", "event": "X1"}])).is_empty());
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let found = run(json!([{"from_state": "A", "event": "X1"}, {"to_state": "", "from_state": "B"}]));
        assert_eq!(
            found,
            vec![
                (true, "$.transitions[0]".to_string(), "Transition is missing 'to_state'".to_string()),
                (true, "$.transitions[1]".to_string(), "Transition is missing 'to_state'".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_state_and_event() {
        let found = run(json!([{"from_state": "Z", "to_state": "B", "event": "X9"}]));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].2, "Transition from_state 'Z' not found");
        assert!(!found[1].0);
    }
}
