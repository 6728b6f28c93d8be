use std::collections::BTreeMap;

use super::PHASE;
use crate::error::{DiagnosticKind, Diagnostics};
use crate::model::{Parameter, StateModel};

fn follows_label_format(label: &str, key_letter: &str) -> bool {
    label
        .strip_prefix(key_letter)
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

pub(super) fn check_labels(sm: &StateModel, key_letter: &str, sm_path: &str, diags: &mut Diagnostics) {
    for (idx, ev) in sm.events.iter().enumerate() {
        let ev_path = format!("{sm_path}.events[{idx}]");
        let label = ev.label();

        if !label.is_empty() && !follows_label_format(label, key_letter) {
            diags.error(
                PHASE,
                DiagnosticKind::StateModel,
                format!("{ev_path}.label"),
                format!(
                    "Event label '{label}' doesn't follow format '{key_letter}<number>' (e.g., {key_letter}1, {key_letter}2)"
                ),
                format!("Use format: {key_letter}1, {key_letter}2, {key_letter}3, etc."),
            );
        }

        let described = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        if !described(&ev.meaning) && !described(&ev.description) {
            diags.warning(
                PHASE,
                DiagnosticKind::StateModel,
                ev_path.clone(),
                format!("Event '{label}' missing 'meaning' or 'description'"),
                "Add 'meaning' field to describe event purpose",
            );
        }

        if matches!(&ev.parameters, Some(p) if !p.is_array() && !p.is_null()) {
            diags.error(
                PHASE,
                DiagnosticKind::StateModel,
                format!("{ev_path}.parameters"),
                format!("Event '{label}' parameters must be an array"),
                "Change to array format: [{name: 'param1', type: 'string'}]",
            );
        }
    }
}

/// Parameter list sorted by name, used to compare event signatures.
fn signature(params: Vec<Parameter>) -> Vec<Parameter> {
    let mut params = params;
    params.sort();
    params
}

/// Events leading into the same state must carry the same parameters.
/// Each event is compared with the first one seen for that state.
pub(super) fn check_consistency(sm: &StateModel, sm_path: &str, diags: &mut Diagnostics) {
    if sm.events.is_empty() {
        return;
    }

    let mut by_target: BTreeMap<&str, Vec<(usize, &str)>> = BTreeMap::new();
    let mut target_order: Vec<&str> = Vec::new();
    for (idx, tr) in sm.transitions.iter().enumerate() {
        let Some(to) = tr.to_state.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        if !by_target.contains_key(to) {
            target_order.push(to);
        }
        by_target
            .entry(to)
            .or_default()
            .push((idx, tr.event.as_deref().unwrap_or("")));
    }

    for to in target_order {
        let inbound = &by_target[to];
        if inbound.len() < 2 {
            continue;
        }
        let mut first: Option<(&str, Vec<Parameter>)> = None;
        for &(idx, label) in inbound {
            let Some(ev) = sm.event(label) else {
                continue;
            };
            let sig = signature(ev.params());
            if let Some((first_label, first_sig)) = &first {
                if *first_sig != sig {
                    diags.error(
                        PHASE,
                        DiagnosticKind::StateModel,
                        format!("{sm_path}.transitions[{idx}]"),
                        format!(
                            "Event '{label}' parameters differ from '{first_label}' but both transition to state '{to}'"
                        ),
                        "All events transitioning to the same state must have identical parameter structure",
                    );
                }
            } else {
                first = Some((label, sig));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sm(value: Value) -> StateModel {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn label_format() {
        assert!(follows_label_format("STD1", "STD"));
        assert!(follows_label_format("STD12", "STD"));
        assert!(!follows_label_format("S1", "STD"));
        assert!(!follows_label_format("STD", "STD"));
        assert!(!follows_label_format("STDx", "STD"));
    }

    #[test]
    fn parameters_must_be_an_array() {
        let model = sm(json!({
            "initial_state": "A", "states": [],
            "events": [{"label": "A1", "meaning": "go", "parameters": {"x": 1}}]
        }));
        let mut diags = Diagnostics::new();
        check_labels(&model, "A", "$", &mut diags);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.as_slice()[0].path, "$.events[0].parameters");
    }

    #[test]
    fn differing_signatures_into_same_state() {
        let model = sm(json!({
            "initial_state": "A",
            "states": [{"name": "A"}, {"name": "B"}, {"name": "C"}],
            "events": [
                {"label": "X1", "meaning": "a", "parameters": [{"name": "t", "type": "date"}]},
                {"label": "X2", "meaning": "b", "parameters": [{"name": "t", "type": "string"}]},
                {"label": "X3", "meaning": "c", "parameters": [{"name": "t", "type": "date"}]}
            ],
            "transitions": [
                {"from_state": "A", "to_state": "C", "event": "X1"},
                {"from_state": "B", "to_state": "C", "event": "X2"},
                {"from_state": "A", "to_state": "C", "event": "X3"}
            ]
        }));
        let mut diags = Diagnostics::new();
        check_consistency(&model, "$", &mut diags);
        assert_eq!(diags.len(), 1);
        let d = &diags.as_slice()[0];
        assert_eq!(
            d.message,
            "Event 'X2' parameters differ from 'X1' but both transition to state 'C'"
        );
        assert_eq!(d.path, "$.transitions[1]");
    }

    #[test]
    fn comparison_is_against_first_only() {
        // Full pairwise comparison would flag X3 twice.
        let model = sm(json!({
            "initial_state": "A",
            "states": [{"name": "A"}, {"name": "C"}],
            "events": [
                {"label": "X1", "meaning": "a", "parameters": [{"name": "p", "type": "integer"}]},
                {"label": "X2", "meaning": "b", "parameters": [{"name": "p", "type": "integer"}]},
                {"label": "X3", "meaning": "c", "parameters": [{"name": "q", "type": "integer"}]}
            ],
            "transitions": [
                {"from_state": "A", "to_state": "C", "event": "X1"},
                {"from_state": "A", "to_state": "C", "event": "X2"},
                {"from_state": "A", "to_state": "C", "event": "X3"}
            ]
        }));
        let mut diags = Diagnostics::new();
        check_consistency(&model, "$", &mut diags);
        assert_eq!(diags.len(), 1);
        assert!(diags.as_slice()[0].message.starts_with("Event 'X3'"));
    }

    #[test]
    fn parameter_order_does_not_matter() {
        let model = sm(json!({
            "initial_state": "A",
            "states": [{"name": "A"}, {"name": "C"}],
            "events": [
                {"label": "X1", "meaning": "a", "parameters": [{"name": "a", "type": "integer"}, {"name": "b", "type": "string"}]},
                {"label": "X2", "meaning": "b", "parameters": [{"name": "b", "type": "string"}, {"name": "a", "type": "integer"}]}
            ],
            "transitions": [
                {"from_state": "A", "to_state": "C", "event": "X1"},
                {"from_state": "C", "to_state": "C", "event": "X2"}
            ]
        }));
        let mut diags = Diagnostics::new();
        check_consistency(&model, "$", &mut diags);
        assert!(diags.is_empty());
    }
}
