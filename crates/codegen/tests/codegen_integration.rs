//! End-to-end translation of the shared model fixtures.

use std::fs;
use std::path::Path;

use xtuml_codegen::{translate_value, TypeScriptConfig};

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> &'static Path {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/codegen -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
}

fn read_fixture(name: &str) -> serde_json::Value {
    let path = workspace_root().join("fixtures").join(format!("{name}.json"));
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture '{}': {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("failed to parse fixture '{}': {}", path.display(), e))
}

fn translate_fixture(name: &str) -> String {
    translate_value(&read_fixture(name), &TypeScriptConfig::default())
        .expect("translation failed")
        .source
}

#[test]
fn create_lowers_to_typed_empty_value() {
    let ts = translate_fixture("akademik");
    assert!(ts.contains("let log_cuti = {} as LogCuti;"));
    assert!(!ts.contains("new LogCuti("));
}

#[test]
fn select_with_where_lowers_to_filter() {
    let ts = translate_fixture("akademik");
    assert!(ts.contains("this.getKRSList().filter(selected => selected.Status === \"Lulus\")"));
}

#[test]
fn control_flow_is_fully_braced() {
    let ts = translate_fixture("akademik");
    assert_eq!(ts.matches('{').count(), ts.matches('}').count());
    assert!(!ts.contains("end if"));
    assert!(!ts.contains("end for"));
    assert!(!ts.contains("elif"));
    assert!(ts.contains("} else if (total_sks >= 144) {"));
    assert!(ts.contains("for (const krs of krs_list) {"));
}

#[test]
fn subtypes_follow_their_supertype() {
    let ts = translate_fixture("akademik");
    let person = ts.find("export class Person {").expect("Person emitted");
    let mahasiswa = ts
        .find("export class Mahasiswa extends Person {")
        .expect("Mahasiswa emitted");
    assert!(person < mahasiswa);
    assert!(ts.contains("ajukanCuti(params: MHS1EventParams): TransitionResult<MahasiswaState>"));
}

#[test]
fn canonical_loan_return() {
    let ts = translate_fixture("perpustakaan");
    assert!(ts.contains("kembalikanBuku(params: PNJ1EventParams): TransitionResult<PeminjamanState> {"));
    assert!(ts.contains(
        "let selisih = TIM.get_days_diff({ date1: this.Tgl_Harus_Kembali, date2: params.tgl_kembali })"
    ));
    assert!(ts.contains("agt !== null && agt !== undefined"));
    assert!(ts.contains("let agt = this.getAnggota();"));
    assert!(ts.contains("this.Current_State = \"Dikembalikan\";"));
    assert_eq!(ts.matches('{').count(), ts.matches('}').count());
}

#[test]
fn only_used_entities_get_shims() {
    let ts = translate_fixture("perpustakaan");
    assert!(ts.contains("class TIM {"));
    assert!(ts.contains("class LOG {"));
    assert!(!ts.contains("class NTF"));
}

#[test]
fn type_definitions() {
    let ts = translate_fixture("perpustakaan");
    assert!(ts.contains("type UniqueID = string;"));
    assert!(ts.contains("type jumlah = number;"));
    assert!(ts.contains("type PeminjamanState = \"Dipinjam\" | \"Dikembalikan\";"));
    assert!(ts.contains("interface PNJ1EventParams {\n  tgl_kembali: Date;\n}"));
}

#[test]
fn header_timestamp_is_opt_in() {
    let ts = translate_fixture("perpustakaan");
    assert!(ts.starts_with("// ===="));
    assert!(ts.contains("// Generated TypeScript Code\n"));
    assert!(!ts.contains("// Generated: "));

    let config = TypeScriptConfig {
        generated_at: Some("2026-10-18T00:00:00Z".to_string()),
        ..TypeScriptConfig::default()
    };
    let ts = translate_value(&read_fixture("perpustakaan"), &config)
        .expect("translation failed")
        .source;
    assert!(ts.contains("// Generated: 2026-10-18T00:00:00Z\n"));
}
