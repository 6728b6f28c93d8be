//! xtuml-core: xtUML model validation.
//!
//! A JSON model document goes through three phases, each a module:
//!
//! - [`pass1_schema`] -- structural checks against a declarative schema
//! - [`pass2_consistency`] -- key-letters, identifiers, referentials,
//!   relationships, state model bookkeeping
//! - [`pass3_semantic`] -- state machines and the OAL action bodies
//!
//! [`parse()`] runs them in order and returns the collected diagnostics.
//! The typed model ([`Document`]), the OAL [`lexer`], and the [`source`]
//! text helpers are shared with the translator.

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod model;
pub mod parse;
pub mod pass1_schema;
pub mod pass2_consistency;
pub mod pass3_semantic;
pub mod source;

// ── Convenience re-exports: key types ────────────────────────────────

pub use error::{
    ContextLine, Diagnostic, DiagnosticKind, Diagnostics, ModelError, Severity, SourceContext,
};
pub use lexer::{lex, Token, TokenKind};
pub use model::{
    Attribute, Bridge, ClassDef, DataType, Document, Endpoint, EventDef, ExternalEntity,
    Parameter, Referential, Relationship, RelationshipKind, StateDef, StateModel, Subsystem,
    SystemModel, TransitionDef,
};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use parse::{parse, validate, validate_str, Validation};
