//! xtuml-codegen: TypeScript generation from a validated xtUML model.
//!
//! The [`type_mapper`] resolves model type expressions, [`oal`] lowers
//! state action bodies, and [`typescript`] assembles the module. The input
//! is expected to have passed all three validation phases; anything the
//! validator should have caught surfaces as a [`LoweringError`].

pub mod error;
pub mod naming;
pub mod oal;
pub mod type_mapper;
pub mod typescript;

// ── Convenience re-exports: errors ───────────────────────────────────

pub use error::{LoweringError, TranslateError};

// ── Convenience re-exports: lowering and types ───────────────────────

pub use oal::{lower, LoweringContext};
pub use type_mapper::{TargetType, TypeMapper};

// ── Convenience re-exports: translation ──────────────────────────────

pub use typescript::{translate, translate_value, Translation, TypeScriptConfig};
