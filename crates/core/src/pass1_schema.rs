//! Phase 1: structural checks against a declarative field schema.

use serde_json::{Map, Value};

use crate::error::{DiagnosticKind, Diagnostics};

const PHASE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    Str,
    Integer,
    Bool,
    Object,
    Array,
    StringOrObject,
    Any,
}

impl FieldType {
    fn name(self) -> &'static str {
        match self {
            FieldType::Str => "string",
            FieldType::Integer => "integer",
            FieldType::Bool => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::StringOrObject => "string|object",
            FieldType::Any => "any",
        }
    }
}

/// A nested object (or array of objects) validated with its own schema.
struct Child {
    field: &'static str,
    schema: &'static ObjectSchema,
    many: bool,
}

struct ObjectSchema {
    required: &'static [(&'static str, FieldType)],
    optional: &'static [(&'static str, FieldType)],
    children: &'static [Child],
}

impl ObjectSchema {
    fn field_type(&self, field: &str) -> Option<FieldType> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|(name, _)| *name == field)
            .map(|(_, t)| *t)
    }
}

use FieldType::*;

static PARAMETER: ObjectSchema = ObjectSchema {
    required: &[("name", Str), ("type", Str)],
    optional: &[("description", Str)],
    children: &[],
};

static ENDPOINT: ObjectSchema = ObjectSchema {
    required: &[("key_letter", Str)],
    optional: &[
        ("mult", Str),
        ("multiplicity", Str),
        ("role", Str),
        ("phrase", Str),
        ("conditional", Bool),
        ("description", Str),
    ],
    children: &[],
};

static ATTRIBUTE: ObjectSchema = ObjectSchema {
    required: &[("name", Str), ("type", Str)],
    optional: &[
        ("description", Str),
        ("default_value", Any),
        ("referential", StringOrObject),
        ("is_identifier", Bool),
    ],
    children: &[],
};

static STATE: ObjectSchema = ObjectSchema {
    required: &[("name", Str)],
    optional: &[
        ("state_number", Integer),
        ("action_oal", Str),
        ("description", Str),
    ],
    children: &[],
};

// `parameters` stays untyped here; Phase 3 reports a non-array value.
static EVENT: ObjectSchema = ObjectSchema {
    required: &[],
    optional: &[
        ("label", Str),
        ("name", Str),
        ("meaning", Str),
        ("description", Str),
        ("parameters", Any),
    ],
    children: &[],
};

// Missing endpoints are a Phase 3 finding, so they do not stop validation here.
static TRANSITION: ObjectSchema = ObjectSchema {
    required: &[],
    optional: &[
        ("from_state", Str),
        ("to_state", Str),
        ("event", Str),
        ("description", Str),
        ("guard", Str),
    ],
    children: &[],
};

static STATE_MODEL: ObjectSchema = ObjectSchema {
    required: &[("initial_state", Str), ("states", Array)],
    optional: &[
        ("events", Array),
        ("transitions", Array),
        ("lifecycle_type", Str),
    ],
    children: &[
        Child { field: "states", schema: &STATE, many: true },
        Child { field: "events", schema: &EVENT, many: true },
        Child { field: "transitions", schema: &TRANSITION, many: true },
    ],
};

static CLASS: ObjectSchema = ObjectSchema {
    required: &[
        ("name", Str),
        ("key_letter", Str),
        ("class_number", Integer),
        ("attributes", Array),
    ],
    optional: &[
        ("description", Str),
        ("state_model", Object),
        ("operations", Array),
        ("type", Str),
    ],
    children: &[
        Child { field: "attributes", schema: &ATTRIBUTE, many: true },
        Child { field: "state_model", schema: &STATE_MODEL, many: false },
    ],
};

static RELATIONSHIP: ObjectSchema = ObjectSchema {
    required: &[("label", Str), ("type", Str)],
    optional: &[
        ("description", Str),
        ("one_side", Object),
        ("other_side", Object),
        ("superclass", Object),
        ("subclasses", Array),
        ("association_class", Object),
        ("composition", Str),
    ],
    children: &[
        Child { field: "one_side", schema: &ENDPOINT, many: false },
        Child { field: "other_side", schema: &ENDPOINT, many: false },
        Child { field: "superclass", schema: &ENDPOINT, many: false },
        Child { field: "subclasses", schema: &ENDPOINT, many: true },
        Child { field: "association_class", schema: &ENDPOINT, many: false },
    ],
};

static BRIDGE: ObjectSchema = ObjectSchema {
    required: &[("name", Str)],
    optional: &[
        ("parameters", Array),
        ("return_type", Str),
        ("description", Str),
    ],
    children: &[Child { field: "parameters", schema: &PARAMETER, many: true }],
};

static EXTERNAL_ENTITY: ObjectSchema = ObjectSchema {
    required: &[("key_letter", Str)],
    optional: &[("name", Str), ("description", Str), ("bridges", Array)],
    children: &[Child { field: "bridges", schema: &BRIDGE, many: true }],
};

static DATA_TYPE: ObjectSchema = ObjectSchema {
    required: &[("name", Str)],
    optional: &[("core_type", Str), ("description", Str)],
    children: &[],
};

static SUBSYSTEM: ObjectSchema = ObjectSchema {
    required: &[
        ("name", Str),
        ("prefix", Str),
        ("classes", Array),
        ("relationships", Array),
    ],
    optional: &[
        ("data_types", Array),
        ("external_entities", Array),
        ("description", Str),
    ],
    children: &[
        Child { field: "classes", schema: &CLASS, many: true },
        Child { field: "relationships", schema: &RELATIONSHIP, many: true },
        Child { field: "external_entities", schema: &EXTERNAL_ENTITY, many: true },
        Child { field: "data_types", schema: &DATA_TYPE, many: true },
    ],
};

static SYSTEM_MODEL: ObjectSchema = ObjectSchema {
    required: &[
        ("system_name", Str),
        ("version", Str),
        ("subsystems", Array),
    ],
    optional: &[("description", Str)],
    children: &[Child { field: "subsystems", schema: &SUBSYSTEM, many: true }],
};

/// JSON kind name used in messages.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_whole_number(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    }
}

/// Run Phase 1. Normalizes `doc` in place (missing `is_identifier`
/// becomes `false`) before checking it.
pub fn validate(doc: &mut Value, diags: &mut Diagnostics) {
    let Some(root) = doc.as_object_mut() else {
        diags.error(
            PHASE,
            DiagnosticKind::Structural,
            "$",
            "Root must be a valid JSON object",
            "Ensure the input is valid JSON and starts with '{'",
        );
        return;
    };

    if !root.contains_key("system_model") {
        diags.error(
            PHASE,
            DiagnosticKind::Structural,
            "$",
            "Missing required root key 'system_model'",
            "Add 'system_model' object at root level",
        );
        return;
    }

    normalize(root);

    let unknown: Vec<&str> = root
        .keys()
        .map(String::as_str)
        .filter(|k| *k != "system_model")
        .collect();
    if !unknown.is_empty() {
        diags.warning(
            PHASE,
            DiagnosticKind::Structural,
            "$",
            format!("Unknown root key(s): {}", unknown.join(", ")),
            "Only 'system_model' is allowed at root level",
        );
    }

    if let Some(system_model) = root.get("system_model") {
        validate_object(system_model, &SYSTEM_MODEL, "$.system_model", diags);
    }
}

fn normalize(root: &mut Map<String, Value>) {
    let Some(subsystems) = root
        .get_mut("system_model")
        .and_then(|m| m.get_mut("subsystems"))
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    for subsystem in subsystems {
        let Some(classes) = subsystem.get_mut("classes").and_then(Value::as_array_mut) else {
            continue;
        };
        for class in classes {
            let Some(attributes) = class.get_mut("attributes").and_then(Value::as_array_mut)
            else {
                continue;
            };
            for attr in attributes.iter_mut().filter_map(Value::as_object_mut) {
                attr.entry("is_identifier").or_insert(Value::Bool(false));
            }
        }
    }
}

fn validate_object(value: &Value, schema: &ObjectSchema, path: &str, diags: &mut Diagnostics) {
    let Some(obj) = value.as_object() else {
        diags.error(
            PHASE,
            DiagnosticKind::Structural,
            path,
            format!("Expected object at '{path}'"),
            "Ensure this field is a valid JSON object",
        );
        return;
    };

    for (field, field_type) in schema.required {
        if !obj.contains_key(*field) {
            diags.error(
                PHASE,
                DiagnosticKind::Structural,
                path,
                format!("Missing required field '{field}'"),
                format!("Add '{field}' field with type {}", field_type.name()),
            );
        }
    }

    for (field, value) in obj {
        let field_path = format!("{path}.{field}");
        match schema.field_type(field) {
            None => diags.warning(
                PHASE,
                DiagnosticKind::Structural,
                field_path,
                format!("Unknown field '{field}'"),
                "Remove this field or check spelling against schema",
            ),
            Some(expected) => check_type(value, expected, &field_path, diags),
        }
    }

    for child in schema.children {
        let Some(value) = obj.get(child.field) else {
            continue;
        };
        let child_path = format!("{path}.{}", child.field);
        if child.many {
            // A non-array was already reported by the type check.
            if let Some(items) = value.as_array() {
                for (idx, item) in items.iter().enumerate() {
                    validate_object(item, child.schema, &format!("{child_path}[{idx}]"), diags);
                }
            }
        } else if value.is_object() {
            validate_object(value, child.schema, &child_path, diags);
        }
    }
}

fn check_type(value: &Value, expected: FieldType, path: &str, diags: &mut Diagnostics) {
    let actual = kind_of(value);
    let (ok, message, suggestion) = match expected {
        Any => return,
        Integer => (
            is_whole_number(value),
            format!("Expected integer, got {actual}"),
            "Use an integer value (e.g., 1, 2, 3)".to_string(),
        ),
        StringOrObject => (
            value.is_string() || value.is_object(),
            format!("Expected string or object, got {actual}"),
            "Use either a string (e.g., \"R1\") or an object".to_string(),
        ),
        other => (
            other.name() == actual,
            format!("Expected {}, got {actual}", other.name()),
            format!("Change to {} type", other.name()),
        ),
    };
    if !ok {
        diags.error(PHASE, DiagnosticKind::Structural, path, message, suggestion);
    }
}
