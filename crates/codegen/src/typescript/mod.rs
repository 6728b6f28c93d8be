//! TypeScript module generation.
//!
//! The output is one source text: header, runtime shims for the external
//! entities the actions call, type definitions, then one class per model
//! class in [`xtuml_analyze::class_order`] order.

mod classes;
mod header;
mod shims;
mod types;

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use xtuml_analyze::ForwardReference;
use xtuml_core::{ClassDef, Document};

use crate::error::TranslateError;
use crate::oal::{LoweringContext, DEFAULT_INDENT};
use crate::type_mapper::TypeMapper;

use classes::ClassGenerator;

/// Knobs for [`translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScriptConfig {
    /// Emit the banner naming the system.
    pub header: bool,
    /// Written into the banner as the generation time.
    pub generated_at: Option<String>,
    /// Indentation of lowered action bodies inside event methods.
    pub body_indent: usize,
}

impl Default for TypeScriptConfig {
    fn default() -> Self {
        TypeScriptConfig {
            header: true,
            generated_at: None,
            body_indent: DEFAULT_INDENT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    pub source: String,
    /// Referential attributes pointing at classes emitted later.
    pub forward_references: Vec<ForwardReference>,
}

/// Translate a validated document.
pub fn translate(doc: &Document, config: &TypeScriptConfig) -> Result<Translation, TranslateError> {
    if doc.subsystems().is_empty() {
        return Err(TranslateError::NoSubsystems);
    }
    let analysis = xtuml_analyze::analyze(doc);
    for fwd in &analysis.class_order.forward_references {
        tracing::warn!(
            class = %fwd.class,
            attribute = %fwd.attribute,
            referenced = %fwd.referenced,
            "forward reference: {fwd}"
        );
    }

    let mapper = TypeMapper::new(doc);
    let ctx = LoweringContext::for_document(doc).with_indent(config.body_indent);
    let generator = ClassGenerator::new(doc, &mapper, &ctx);

    let mut seen = HashSet::new();
    let declared: Vec<&ClassDef> = doc
        .classes()
        .filter(|c| seen.insert(c.key_letter.as_str()))
        .collect();

    let mut source = String::new();
    if config.header {
        source.push_str(&header::render(doc, config.generated_at.as_deref()));
    }
    source.push_str(&shims::render(doc, &analysis.used_external_entities, &mapper));
    source.push_str(&types::render(doc, &declared, &mapper));
    for key_letter in &analysis.class_order.order {
        if let Some(class) = generator.class_by_key_letter(key_letter) {
            source.push_str(&generator.render(class)?);
        }
    }

    tracing::debug!(
        classes = analysis.class_order.order.len(),
        shims = analysis.used_external_entities.len(),
        bytes = source.len(),
        "translation finished"
    );
    Ok(Translation {
        source,
        forward_references: analysis.class_order.forward_references,
    })
}

/// [`translate`] a raw JSON value.
pub fn translate_value(value: &Value, config: &TypeScriptConfig) -> Result<Translation, TranslateError> {
    let doc = Document::from_value(value)?;
    translate(&doc, config)
}
