use super::PHASE;
use crate::error::{DiagnosticKind, Diagnostics};
use crate::model::StateModel;
use crate::source::mask_comments;

pub(super) fn check_initial_state(sm: &StateModel, sm_path: &str, diags: &mut Diagnostics) {
    if sm.initial_state.is_empty() || sm.state(&sm.initial_state).is_some() {
        return;
    }
    diags.error(
        PHASE,
        DiagnosticKind::StateModel,
        format!("{sm_path}.initial_state"),
        format!("Initial state '{}' not found in states", sm.initial_state),
        "Reference an existing state name",
    );
}

/// True if `text` contains `self.Current_State =` (not `==`).
fn updates_current_state(text: &str) -> bool {
    let needle = "self.Current_State";
    text.match_indices(needle).any(|(i, _)| {
        let rest = text[i + needle.len()..].trim_start();
        rest.starts_with('=') && !rest.starts_with("==")
    })
}

/// Every action body must assign `Current_State`, except in states whose
/// name or body mentions deletion.
pub(super) fn check_current_state_updates(sm: &StateModel, sm_path: &str, diags: &mut Diagnostics) {
    for (idx, st) in sm.states.iter().enumerate() {
        let Some(text) = &st.action_oal else {
            continue;
        };
        let name = st.name.to_lowercase();
        if name.contains("delete") || name.contains("removed") || text.to_lowercase().contains("delete")
        {
            continue;
        }
        if !updates_current_state(&mask_comments(text)) {
            diags.warning(
                PHASE,
                DiagnosticKind::StateModel,
                format!("{sm_path}.states[{idx}].action_oal"),
                format!("State '{}' action doesn't update Current_State", st.name),
                format!("Add: self.Current_State = \"{}\";", st.name),
            );
        }
    }
}
