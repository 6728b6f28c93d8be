//! Lowering of OAL action bodies to TypeScript statements.
//!
//! The text is parsed into a statement tree ([`ast::Stmt`]) and emitted in
//! one walk. Lowering assumes the body passed phase 3; a reference the
//! validator should have rejected is a [`LoweringError`].

pub mod ast;
mod emit;
mod expr;
mod parser;

use std::collections::{BTreeMap, HashMap};

use xtuml_core::{ClassDef, Document, ExternalEntity};

use crate::error::LoweringError;

/// Base indentation of a lowered body inside a generated method.
pub const DEFAULT_INDENT: usize = 6;

/// External entities and classes visible to an action body.
#[derive(Debug, Clone)]
pub struct LoweringContext<'m> {
    external_entities: BTreeMap<&'m str, &'m ExternalEntity>,
    classes: HashMap<&'m str, &'m ClassDef>,
    indent: usize,
}

impl<'m> LoweringContext<'m> {
    pub fn new(
        external_entities: impl IntoIterator<Item = &'m ExternalEntity>,
        classes: impl IntoIterator<Item = &'m ClassDef>,
    ) -> Self {
        let mut ees = BTreeMap::new();
        for ee in external_entities {
            ees.entry(ee.key_letter.as_str()).or_insert(ee);
        }
        let mut by_key_letter = HashMap::new();
        for class in classes {
            by_key_letter.entry(class.key_letter.as_str()).or_insert(class);
        }
        LoweringContext {
            external_entities: ees,
            classes: by_key_letter,
            indent: DEFAULT_INDENT,
        }
    }

    pub fn for_document(doc: &'m Document) -> Self {
        Self::new(doc.external_entities(), doc.classes())
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn external_entity(&self, key_letter: &str) -> Option<&'m ExternalEntity> {
        self.external_entities.get(key_letter).copied()
    }

    pub(crate) fn available_entities(&self) -> String {
        let keys: Vec<&str> = self.external_entities.keys().copied().collect();
        keys.join(", ")
    }

    /// A class by key-letter, or failing that by name.
    pub fn class(&self, name_or_key_letter: &str) -> Option<&'m ClassDef> {
        self.classes.get(name_or_key_letter).copied().or_else(|| {
            self.classes
                .values()
                .copied()
                .find(|c| c.name == name_or_key_letter)
        })
    }
}

/// Lower one action body. Every emitted line ends in a newline and carries
/// the context's base indentation; empty text lowers to an empty string.
pub fn lower(text: &str, ctx: &LoweringContext<'_>) -> Result<String, LoweringError> {
    let stmts = parser::parse(text)?;
    emit::emit(&stmts, ctx)
}
