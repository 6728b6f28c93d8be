use xtuml_core::Document;

const RULE: &str =
    "// ============================================================================\n";

/// Banner naming the system and version, plus the generation time if one
/// was supplied.
pub(crate) fn render(doc: &Document, generated_at: Option<&str>) -> String {
    let model = &doc.system_model;
    let name = non_empty(&model.system_name).unwrap_or("System");
    let version = non_empty(&model.version).unwrap_or("1.0.0");

    let mut out = String::from(RULE);
    out.push_str("// Generated TypeScript Code\n");
    out.push_str(&format!("// System: {name}\n"));
    out.push_str(&format!("// Version: {version}\n"));
    if let Some(at) = generated_at {
        out.push_str(&format!("// Generated: {at}\n"));
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|s| !s.is_empty())
}
