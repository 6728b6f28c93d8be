use std::collections::HashSet;

use xtuml_core::{ClassDef, Document};

use crate::type_mapper::TypeMapper;

/// `UniqueID`, domain aliases, state enumerations, event parameter
/// interfaces and the transition result type.
pub(crate) fn render(doc: &Document, classes: &[&ClassDef], mapper: &TypeMapper<'_>) -> String {
    let mut out = String::from("// Type Definitions\n");
    out.push_str("type UniqueID = string;\n");

    for (name, target) in mapper.alias_declarations(doc) {
        out.push_str(&format!("type {name} = {target};\n"));
    }

    for class in classes {
        let Some(sm) = &class.state_model else {
            continue;
        };
        let states: Vec<String> = sm.states.iter().map(|s| format!("\"{}\"", s.name)).collect();
        let states = if states.is_empty() {
            "string".to_string()
        } else {
            states.join(" | ")
        };
        out.push_str(&format!("type {}State = {states};\n", class.name));
    }

    let mut interfaces = HashSet::new();
    for class in classes {
        let Some(sm) = &class.state_model else {
            continue;
        };
        for event in &sm.events {
            let params = event.params();
            if params.is_empty() || !interfaces.insert(event.label()) {
                continue;
            }
            out.push_str(&format!("\ninterface {}EventParams {{\n", event.label()));
            for param in params {
                let ty = mapper.map(&param.param_type, Some(class));
                out.push_str(&format!("  {}: {ty};\n", param.name));
            }
            out.push_str("}\n");
        }
    }

    if classes.iter().any(|c| c.state_model.is_some()) {
        out.push_str("\ntype TransitionResult<S> =\n");
        out.push_str("  | { fired: true; from: S; to: S }\n");
        out.push_str("  | { fired: false; state: S };\n");
    }

    out.push('\n');
    out
}
