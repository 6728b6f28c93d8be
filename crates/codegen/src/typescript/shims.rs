//! Runtime shims for external entities.
//!
//! Only entities the actions actually call are emitted. `LOG` and `TIM`
//! get working implementations; anything else logs the call and returns
//! the default value of its return type.

use std::collections::{BTreeSet, HashSet};

use xtuml_core::{Bridge, Document, ExternalEntity};

use crate::type_mapper::{TargetType, TypeMapper};

pub(crate) fn render(doc: &Document, used: &BTreeSet<String>, mapper: &TypeMapper<'_>) -> String {
    if used.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    out.push_str("// ============================================================================\n");
    out.push_str("// Runtime shims for the external entities used by this model\n");
    out.push_str("// ============================================================================\n\n");

    let mut emitted = HashSet::new();
    for ee in doc.external_entities() {
        if used.contains(&ee.key_letter) && emitted.insert(ee.key_letter.as_str()) {
            out.push_str(&entity(ee, mapper));
        }
    }
    out
}

fn entity(ee: &ExternalEntity, mapper: &TypeMapper<'_>) -> String {
    let mut out = String::from("/**\n");
    out.push_str(&format!(" * External Entity: {} ({})\n", ee.name, ee.key_letter));
    if let Some(description) = ee.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!(" * {description}\n"));
    }
    out.push_str(" */\n");
    out.push_str(&format!("class {} {{\n", ee.key_letter));
    for bridge in &ee.bridges {
        out.push_str(&self::bridge(&ee.key_letter, bridge, mapper));
    }
    out.push_str("}\n\n");
    out
}

fn bridge(key_letter: &str, bridge: &Bridge, mapper: &TypeMapper<'_>) -> String {
    let return_type = bridge
        .return_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .map_or(TargetType::Core("void"), |t| mapper.map(t, None));

    let mut out = String::from("  /**\n");
    let summary = bridge
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(&bridge.name);
    out.push_str(&format!("   * {summary}\n"));
    for param in &bridge.parameters {
        out.push_str(&format!("   * @param {} - {}\n", param.name, param.param_type));
    }
    if let Some(ret) = &bridge.return_type {
        out.push_str(&format!("   * @returns {ret}\n"));
    }
    out.push_str("   */\n");

    let params = if key_letter == "TIM" {
        "params?: any".to_string()
    } else if bridge.parameters.is_empty() {
        String::new()
    } else {
        let fields: Vec<String> = bridge
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, mapper.map(&p.param_type, None)))
            .collect();
        format!("params: {{ {} }}", fields.join("; "))
    };
    out.push_str(&format!(
        "  static {}({params}): {return_type} {{\n",
        bridge.name
    ));
    out.push_str(&body(key_letter, bridge, &return_type, mapper));
    out.push_str("  }\n\n");
    out
}

fn body(key_letter: &str, bridge: &Bridge, return_type: &TargetType, mapper: &TypeMapper<'_>) -> String {
    let name = bridge.name.as_str();
    match (key_letter, name) {
        ("LOG", "LogInfo") => "    console.log(`[INFO]: ${params.message}`);\n".to_string(),
        ("LOG", "LogError") => "    console.error(`[ERROR]: ${params.message}`);\n".to_string(),
        ("LOG", "LogWarning") => "    console.warn(`[WARNING]: ${params.message}`);\n".to_string(),
        ("TIM", "current_time") => "    return new Date();\n".to_string(),
        ("TIM", "get_days_diff") => concat!(
            "    const ms = new Date(params.date2).getTime() - new Date(params.date1).getTime();\n",
            "    return Math.round(ms / 86400000);\n",
        )
        .to_string(),
        ("TIM", "timer_start") => concat!(
            "    console.log(`[TIM]: Timer started for ${params.microseconds}us`);\n",
            "    const timerId = setTimeout(() => {\n",
            "      console.log(\"[TIM]: Timer expired\");\n",
            "    }, params.microseconds / 1000);\n",
            "    return timerId as unknown as number;\n",
        )
        .to_string(),
        ("TIM", "timer_cancel") => concat!(
            "    clearTimeout(params.timer_id);\n",
            "    console.log(`[TIM]: Timer ${params.timer_id} cancelled`);\n",
            "    return true;\n",
        )
        .to_string(),
        ("TIM", "timer_remaining_time") => "    return 0;\n".to_string(),
        _ => {
            let mut out = if key_letter == "LOG" && !bridge.parameters.is_empty() {
                "    console.log(`[LOG]: ${JSON.stringify(params)}`);\n".to_string()
            } else {
                format!("    console.log(\"[{key_letter}]: Bridge {name} called\");\n")
            };
            if *return_type != TargetType::Core("void") {
                out.push_str(&format!("    return {};\n", mapper.default_value(return_type)));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Document {
        Document::from_value(&json!({
            "system_model": {
                "system_name": "S", "version": "1",
                "subsystems": [{
                    "name": "A", "prefix": "A", "classes": [], "relationships": [],
                    "external_entities": [
                        {"name": "Logging", "key_letter": "LOG", "bridges": [
                            {"name": "LogInfo", "parameters": [{"name": "message", "type": "string"}]}
                        ]},
                        {"name": "Notifikasi", "key_letter": "NTF", "description": "Kirim notifikasi",
                         "bridges": [
                            {"name": "kirim_email",
                             "parameters": [{"name": "to", "type": "string"}, {"name": "isi", "type": "string"}],
                             "return_type": "boolean"}
                        ]}
                    ]
                }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn nothing_used_nothing_emitted() {
        let doc = document();
        let mapper = TypeMapper::new(&doc);
        assert_eq!(render(&doc, &BTreeSet::new(), &mapper), "");
    }

    #[test]
    fn only_used_entities_are_emitted() {
        let doc = document();
        let mapper = TypeMapper::new(&doc);
        let used = BTreeSet::from(["LOG".to_string()]);
        let out = render(&doc, &used, &mapper);
        assert!(out.contains("class LOG {"));
        assert!(out.contains("static LogInfo(params: { message: string }): void {"));
        assert!(out.contains("console.log(`[INFO]: ${params.message}`);"));
        assert!(!out.contains("class NTF"));
    }

    #[test]
    fn generic_shim_returns_a_default() {
        let doc = document();
        let mapper = TypeMapper::new(&doc);
        let used = BTreeSet::from(["NTF".to_string()]);
        let out = render(&doc, &used, &mapper);
        assert!(out.contains(" * Kirim notifikasi\n"));
        assert!(out.contains("static kirim_email(params: { to: string; isi: string }): boolean {"));
        assert!(out.contains("console.log(\"[NTF]: Bridge kirim_email called\");"));
        assert!(out.contains("return false;"));
    }
}
