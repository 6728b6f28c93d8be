//! Phase 3: state-machine well-formedness and OAL checks.
//!
//! Only classes that carry a state model are visited. Checks run in a fixed
//! order per class: initial state, event labels, event consistency, OAL
//! bodies, transitions, `Current_State` updates.

mod event;
pub(crate) mod oal;
mod state;
mod transition;

use crate::error::Diagnostics;
use crate::model::Document;
use oal::OalScope;

pub(crate) const PHASE: u8 = 3;

pub fn validate(doc: &Document, diags: &mut Diagnostics) {
    for (sub_idx, subsystem) in doc.subsystems().iter().enumerate() {
        let scope = OalScope::new(subsystem);

        for (cls_idx, cls) in subsystem.classes.iter().enumerate() {
            let Some(sm) = &cls.state_model else {
                continue;
            };
            let sm_path = format!("$.system_model.subsystems[{sub_idx}].classes[{cls_idx}].state_model");

            state::check_initial_state(sm, &sm_path, diags);
            event::check_labels(sm, &cls.key_letter, &sm_path, diags);
            event::check_consistency(sm, &sm_path, diags);
            for (state_idx, st) in sm.states.iter().enumerate() {
                if let Some(text) = &st.action_oal {
                    let path = format!("{sm_path}.states[{state_idx}].action_oal");
                    oal::validate_action(text, path, &scope, diags);
                }
            }
            transition::check_transitions(sm, &sm_path, diags);
            state::check_current_state_updates(sm, &sm_path, diags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostic;
    use serde_json::{json, Value};

    fn run(state_model: Value) -> Vec<Diagnostic> {
        let doc = Document::from_value(&json!({
            "system_model": {
                "system_name": "Akademik", "version": "1.0",
                "subsystems": [{
                    "name": "Kampus", "prefix": "KMP",
                    "classes": [{
                        "name": "Mahasiswa", "key_letter": "STD", "class_number": 1,
                        "attributes": [
                            {"name": "NIM", "type": "unique_ID", "is_identifier": true},
                            {"name": "Current_State", "type": "state<STD>", "is_identifier": false}
                        ],
                        "state_model": state_model
                    }],
                    "relationships": [],
                    "external_entities": [
                        {"name": "Logging", "key_letter": "LOG", "bridges": [{"name": "LogInfo"}]}
                    ]
                }]
            }
        }))
        .unwrap();
        let mut diags = Diagnostics::new();
        validate(&doc, &mut diags);
        diags.into_vec()
    }

    #[test]
    fn clean_state_model() {
        let diags = run(json!({
            "initial_state": "Aktif",
            "states": [
                {"name": "Aktif", "state_number": 1, "action_oal": "self.Current_State = \"Aktif\";"},
                {"name": "Cuti", "state_number": 2,
                 "action_oal": "LOG::LogInfo(message: \"cuti\");\nself.Current_State = \"Cuti\";"}
            ],
            "events": [{"label": "STD1", "meaning": "ajukan cuti"}],
            "transitions": [{"from_state": "Aktif", "to_state": "Cuti", "event": "STD1"}]
        }));
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn checks_run_in_order_and_all_report() {
        let diags = run(json!({
            "initial_state": "Nowhere",
            "states": [{"name": "Aktif", "action_oal": "x = self;"}],
            "events": [{"label": "S1"}],
            "transitions": [{"from_state": "Aktif", "to_state": "Gone", "event": "STD9"}]
        }));
        let messages: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Initial state 'Nowhere' not found in states",
                "Event label 'S1' doesn't follow format 'STD<number>' (e.g., STD1, STD2)",
                "Event 'S1' missing 'meaning' or 'description'",
                "Keyword 'self' must be followed by '.' (attribute access) or '->' (relationship navigation)",
                "Transition to_state 'Gone' not found",
                "Transition event 'STD9' not found",
                "State 'Aktif' action doesn't update Current_State",
            ]
        );
        assert!(diags.iter().all(|d| d.phase == 3));
        assert_eq!(
            diags[3].path,
            "$.system_model.subsystems[0].classes[0].state_model.states[0].action_oal [line ~1]"
        );
    }
}
