//! Integration tests for the model analyses.
//!
//! These tests validate the shared fixtures first, then run the analyses
//! on the typed document.

use std::path::{Path, PathBuf};

use xtuml_core::Document;

/// Locate the workspace root.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Validate a fixture and return its typed document.
fn load_fixture(name: &str) -> Document {
    let path = workspace_root().join("fixtures").join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    let result = xtuml_core::validate_str(&text);
    assert!(!result.has_errors(), "{:#?}", result.diagnostics);
    result.document.expect("document")
}

#[test]
fn library_order_puts_masters_before_loans() {
    let analysis = xtuml_analyze::analyze(&load_fixture("perpustakaan.json"));
    assert_eq!(analysis.class_order.order, vec!["AGT", "BKU", "PNJ"]);
    assert!(analysis.class_order.forward_references.is_empty());
}

#[test]
fn library_uses_only_called_entities() {
    let analysis = xtuml_analyze::analyze(&load_fixture("perpustakaan.json"));
    let used: Vec<&str> = analysis
        .used_external_entities
        .iter()
        .map(String::as_str)
        .collect();
    // NTF is declared but never called.
    assert_eq!(used, vec!["LOG", "TIM"]);
}

#[test]
fn academic_order_follows_inheritance() {
    let analysis = xtuml_analyze::analyze(&load_fixture("akademik.json"));
    assert_eq!(
        analysis.class_order.order,
        vec!["PRS", "LGC", "MHS", "DSN", "KRS"]
    );
    let order = &analysis.class_order;
    assert!(order.position("PRS") < order.position("MHS"));
    assert!(order.position("MHS") < order.position("KRS"));
}
