//! xtuml-analyze: pure analyses over a validated xtUML model.
//!
//! Each analysis is a separate module producing a serializable result.
//! The translator consumes both: the class order decides emission order and
//! the usage set decides which runtime shims are generated.

pub mod class_order;
pub mod entity_usage;

use std::collections::BTreeSet;

use serde::Serialize;
use xtuml_core::Document;

pub use class_order::{class_order, ClassOrder, ForwardReference};
pub use entity_usage::used_external_entities;

/// Combined analysis output.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub class_order: ClassOrder,
    pub used_external_entities: BTreeSet<String>,
}

/// Run both analyses on a validated document.
pub fn analyze(doc: &Document) -> Analysis {
    let class_order = class_order(doc);
    let used_external_entities = used_external_entities(doc);
    tracing::debug!(
        classes = class_order.order.len(),
        forward_references = class_order.forward_references.len(),
        external_entities = used_external_entities.len(),
        "model analysis finished"
    );
    Analysis {
        class_order,
        used_external_entities,
    }
}
