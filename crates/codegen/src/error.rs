//! Error types for lowering and translation.

use xtuml_core::ModelError;

/// A reference or statement the validator should have rejected reached the
/// lowering stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoweringError {
    #[error("Unknown External Entity: {key_letter}. Available: {available}")]
    UnknownExternalEntity {
        key_letter: String,
        available: String,
    },
    #[error("Unknown bridge: {key_letter}::{method}. Available for {key_letter}: {available}")]
    UnknownBridge {
        key_letter: String,
        method: String,
        available: String,
    },
    #[error("Unknown class: {name}")]
    UnknownClass { name: String },
    #[error("line {line}: malformed statement `{statement}`")]
    Malformed { line: u32, statement: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
    #[error("invalid model structure: no subsystems")]
    NoSubsystems,
    #[error("cannot lower action of {class}.{state}: {source}")]
    Lowering {
        class: String,
        state: String,
        #[source]
        source: LoweringError,
    },
}
