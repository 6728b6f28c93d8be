//! Typed view of an xtUML JSON document.
//!
//! Deserialization is lenient: Phase 1 has already reported every missing
//! or mistyped field, so optional parts default to empty and only a shape
//! the schema cannot describe fails to load.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub system_model: SystemModel,
}

impl Document {
    pub fn from_value(value: &Value) -> Result<Self, ModelError> {
        if value.get("system_model").is_none() {
            return Err(ModelError::MissingSystemModel);
        }
        Ok(Document::deserialize(value)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn subsystems(&self) -> &[Subsystem] {
        &self.system_model.subsystems
    }

    /// Every class of every subsystem, in document order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.system_model
            .subsystems
            .iter()
            .flat_map(|s| s.classes.iter())
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.system_model
            .subsystems
            .iter()
            .flat_map(|s| s.relationships.iter())
    }

    pub fn external_entities(&self) -> impl Iterator<Item = &ExternalEntity> {
        self.system_model
            .subsystems
            .iter()
            .flat_map(|s| s.external_entities.iter())
    }

    pub fn data_types(&self) -> impl Iterator<Item = &DataType> {
        self.system_model
            .subsystems
            .iter()
            .flat_map(|s| s.data_types.iter())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemModel {
    #[serde(default)]
    pub system_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subsystems: Vec<Subsystem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subsystem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub classes: Vec<ClassDef>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub external_entities: Vec<ExternalEntity>,
    #[serde(default)]
    pub data_types: Vec<DataType>,
}

impl Subsystem {
    pub fn class_by_key_letter(&self, key_letter: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.key_letter == key_letter)
    }

    pub fn relationship(&self, label: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.label == label)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key_letter: String,
    #[serde(default)]
    pub class_number: Option<serde_json::Number>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub state_model: Option<StateModel>,
    #[serde(default)]
    pub operations: Vec<Value>,
    /// `"Association"` marks an association class.
    #[serde(default, rename = "type")]
    pub class_type: Option<String>,
}

impl ClassDef {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.is_identifier)
    }

    pub fn is_association(&self) -> bool {
        self.class_type.as_deref() == Some("Association")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub attr_type: String,
    #[serde(default)]
    pub is_identifier: bool,
    #[serde(default)]
    pub referential: Option<Referential>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Attribute {
    pub fn is_referential(&self) -> bool {
        self.referential.is_some()
    }
}

/// A referential link: either a bare relationship label or a detail object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Referential {
    Label(String),
    Detailed(ReferentialDetail),
}

impl Referential {
    /// The relationship label, if one is present and non-blank.
    pub fn label(&self) -> Option<&str> {
        let label = match self {
            Referential::Label(l) => Some(l.as_str()),
            Referential::Detailed(d) => d.relationship_label.as_deref(),
        };
        label.filter(|l| !l.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferentialDetail {
    #[serde(default)]
    pub relationship_label: Option<String>,
    #[serde(default)]
    pub referenced_class: Option<String>,
    #[serde(default)]
    pub referenced_attribute: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationshipKind {
    Simple,
    Associative,
    Subtype,
    Reflexive,
    Composition,
    Aggregation,
}

impl RelationshipKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Simple" | "Association" => Some(RelationshipKind::Simple),
            "Associative" => Some(RelationshipKind::Associative),
            "Subtype" => Some(RelationshipKind::Subtype),
            "Reflexive" => Some(RelationshipKind::Reflexive),
            "Composition" => Some(RelationshipKind::Composition),
            "Aggregation" => Some(RelationshipKind::Aggregation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub key_letter: String,
    #[serde(default, alias = "multiplicity")]
    pub mult: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phrase: Option<String>,
}

impl Endpoint {
    pub fn is_many(&self) -> bool {
        self.mult.as_deref() == Some("Many")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub one_side: Option<Endpoint>,
    #[serde(default)]
    pub other_side: Option<Endpoint>,
    #[serde(default)]
    pub superclass: Option<Endpoint>,
    #[serde(default)]
    pub subclasses: Vec<Endpoint>,
    #[serde(default)]
    pub association_class: Option<Endpoint>,
    #[serde(default)]
    pub composition: Option<String>,
}

impl Relationship {
    pub fn kind(&self) -> Option<RelationshipKind> {
        RelationshipKind::parse(&self.rel_type)
    }

    pub fn one_side_kl(&self) -> Option<&str> {
        self.one_side.as_ref().map(|e| e.key_letter.as_str())
    }

    pub fn other_side_kl(&self) -> Option<&str> {
        self.other_side.as_ref().map(|e| e.key_letter.as_str())
    }

    pub fn superclass_kl(&self) -> Option<&str> {
        self.superclass.as_ref().map(|e| e.key_letter.as_str())
    }

    pub fn association_kl(&self) -> Option<&str> {
        self.association_class.as_ref().map(|e| e.key_letter.as_str())
    }

    pub fn has_subclass(&self, key_letter: &str) -> bool {
        self.subclasses.iter().any(|s| s.key_letter == key_letter)
    }

    /// True if `key_letter` appears at any endpoint.
    pub fn involves(&self, key_letter: &str) -> bool {
        self.one_side_kl() == Some(key_letter)
            || self.other_side_kl() == Some(key_letter)
            || self.superclass_kl() == Some(key_letter)
            || self.association_kl() == Some(key_letter)
            || self.has_subclass(key_letter)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateModel {
    #[serde(default)]
    pub initial_state: String,
    #[serde(default)]
    pub states: Vec<StateDef>,
    #[serde(default)]
    pub events: Vec<EventDef>,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
    #[serde(default)]
    pub lifecycle_type: Option<String>,
}

impl StateModel {
    pub fn state(&self, name: &str) -> Option<&StateDef> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn event(&self, label: &str) -> Option<&EventDef> {
        self.events.iter().find(|e| e.label() == label)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state_number: Option<Value>,
    #[serde(default)]
    pub action_oal: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDef {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub meaning: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Kept raw; a non-array value is reported by Phase 3.
    #[serde(default)]
    pub parameters: Option<Value>,
}

impl EventDef {
    /// `label`, falling back to `name`.
    pub fn label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .or(self.name.as_deref())
            .unwrap_or("")
    }

    /// Parameters of an array-valued `parameters` field; entries without a
    /// string name are skipped.
    pub fn params(&self) -> Vec<Parameter> {
        let Some(Value::Array(items)) = &self.parameters else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|p| {
                let name = p.get("name")?.as_str()?;
                let param_type = p.get("type").and_then(Value::as_str).unwrap_or("");
                Some(Parameter {
                    name: name.to_string(),
                    param_type: param_type.to_string(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionDef {
    #[serde(default)]
    pub from_state: Option<String>,
    #[serde(default)]
    pub to_state: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub param_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalEntity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key_letter: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bridges: Vec<Bridge>,
}

impl ExternalEntity {
    pub fn bridge(&self, name: &str) -> Option<&Bridge> {
        self.bridges.iter().find(|b| b.name == name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bridge {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A domain type alias such as `jumlah -> integer`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub core_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn referential_accepts_label_or_object() {
        let a: Attribute =
            serde_json::from_value(json!({"name": "x", "type": "unique_ID", "referential": "R1"}))
                .unwrap();
        assert_eq!(a.referential, Some(Referential::Label("R1".into())));
        assert_eq!(a.referential.unwrap().label(), Some("R1"));

        let b: Attribute = serde_json::from_value(json!({
            "name": "x", "type": "unique_ID",
            "referential": {"relationship_label": "R2", "referenced_class": "AGT"}
        }))
        .unwrap();
        assert_eq!(b.referential.unwrap().label(), Some("R2"));

        let c: Attribute = serde_json::from_value(json!({
            "name": "x", "type": "unique_ID", "referential": {}
        }))
        .unwrap();
        assert_eq!(c.referential.unwrap().label(), None);
    }

    #[test]
    fn event_label_falls_back_to_name() {
        let e: EventDef = serde_json::from_value(json!({"name": "PNJ1"})).unwrap();
        assert_eq!(e.label(), "PNJ1");
    }

    #[test]
    fn event_params_ignore_non_arrays() {
        let e: EventDef =
            serde_json::from_value(json!({"label": "A1", "parameters": "nope"})).unwrap();
        assert!(e.params().is_empty());
        let e: EventDef = serde_json::from_value(
            json!({"label": "A1", "parameters": [{"name": "t", "type": "date"}]}),
        )
        .unwrap();
        assert_eq!(e.params()[0].param_type, "date");
    }

    #[test]
    fn missing_system_model_is_reported() {
        let err = Document::from_value(&json!({"other": 1})).unwrap_err();
        assert!(matches!(err, ModelError::MissingSystemModel));
    }

    #[test]
    fn relationship_kind_aliases() {
        assert_eq!(
            RelationshipKind::parse("Association"),
            Some(RelationshipKind::Simple)
        );
        assert_eq!(RelationshipKind::parse("Weird"), None);
    }
}
