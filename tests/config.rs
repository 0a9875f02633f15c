use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn fixture(name: &str) -> String {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    fs::read_to_string(manifest_dir.join("tests/fixtures").join(name)).expect("fixture should load")
}

#[test]
fn valid_fixture_passes_schema() {
    mindmark::config::validate_config_with_schema_str(&fixture("config.yml"), mindmark::BUILTIN_SCHEMA)
        .expect("fixture should validate against schema");
}

#[test]
fn invalid_fixture_fails_schema() {
    let err = mindmark::config::validate_config_with_schema_str(
        &fixture("invalid_config.yml"),
        mindmark::BUILTIN_SCHEMA,
    )
    .expect_err("invalid fixture should fail schema validation");
    assert!(matches!(err, mindmark::MindmapError::Schema(_)));
}

#[test]
fn config_rejects_non_mapping() {
    let err = mindmark::parse_config("[]").expect_err("array should not match schema");
    assert!(matches!(err, mindmark::MindmapError::Schema(_)));
}

#[test]
fn load_config_reads_fixture_file() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config = mindmark::load_config(manifest_dir.join("tests/fixtures/config.yml"))
        .expect("config should load");
    assert_eq!(config.viewer, "freeplane");
    assert_eq!(config.artifact_dir(), PathBuf::from("/tmp/mindmark"));
    assert!(config.extensions.tables);
    assert!(config.extensions.strikethrough);
    assert!(config.extensions.tasklists);
    assert!(!config.extensions.footnotes);
}

#[test]
fn load_config_reports_missing_file() {
    let err = mindmark::load_config("/nonexistent/mindmark.yml").expect_err("missing file");
    assert!(matches!(err, mindmark::MindmapError::Config(_)));
}

#[test]
fn defaults_use_freeplane_and_temp_dir() {
    let config = mindmark::Config::default();
    assert_eq!(config.viewer, "freeplane");
    assert_eq!(config.artifact_dir(), std::env::temp_dir());
}

#[test]
fn validate_allows_external_schema() {
    let mut schema_path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    schema_path.push(format!("mindmark-schema-{nanos}.yml"));
    fs::write(&schema_path, mindmark::BUILTIN_SCHEMA).expect("schema write");

    let result = mindmark::config::validate_config_with_schema(&fixture("config.yml"), &schema_path);
    let _ = fs::remove_file(&schema_path);
    result.expect("schema path should validate");
}
