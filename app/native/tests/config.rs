//! Configuration loading tests using real files on disk.

use std::fs;

use tempfile::TempDir;
use wallspan_lib::config::{self, ConfigError, RotationMode, WallspanConfig};
use wallspan_lib::schema::generate_schema;
use wallspan_lib::wallpaper::{ScalingMode, VerticalAxis};

const SAMPLE: &str = r#"{
    // Rotate every ten minutes
    "interval": 600,
    "searchTerms": ["fjord", "desert"],
    "mode": "individual",
    "scaling": "fit",
    /* Two displays, one stacked on top of the other */
    "verticalAxis": "down",
    "displays": [
        { "id": 1, "x": 0, "y": 0, "width": 1920, "height": 1080 },
        { "id": 2, "x": 0, "y": -1080, "width": 1920, "height": 1080, "scale": 2 }
    ]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_jsonc_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "wallspan.jsonc", SAMPLE);

    let loaded = config::load(Some(&path)).unwrap();
    let cfg = &loaded.config;

    assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    assert_eq!(cfg.interval, 600);
    assert_eq!(cfg.search_terms, vec!["fjord".to_string(), "desert".to_string()]);
    assert_eq!(cfg.mode, RotationMode::Individual);
    assert_eq!(cfg.scaling, ScalingMode::Fit);
    assert_eq!(cfg.vertical_axis, VerticalAxis::Down);
    assert_eq!(cfg.displays.len(), 2);
    assert!((cfg.displays[1].y + 1080.0).abs() < f64::EPSILON);
}

#[test]
fn test_missing_options_use_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "wallspan.json", r#"{ "interval": 0 }"#);

    let cfg = config::load(Some(&path)).unwrap().config;

    assert_eq!(cfg.interval, 0);
    assert!(cfg.rotation_interval().is_none(), "Zero disables the timer");
    assert_eq!(cfg.mode, WallspanConfig::default().mode);
    assert_eq!(cfg.search_terms, WallspanConfig::default().search_terms);
}

#[test]
fn test_invalid_file_reports_its_path() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "wallspan.jsonc", r#"{ "mode": "tiled" }"#);

    let err = config::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("wallspan.jsonc"), "Error should name the file: {err}");
}

#[test]
fn test_missing_custom_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.jsonc");

    assert!(matches!(config::load(Some(&path)), Err(ConfigError::Io { .. })));
}

#[test]
fn test_display_without_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "wallspan.jsonc",
        r#"{ "displays": [{ "x": 0, "y": 0, "width": 1920, "height": 1080 }] }"#,
    );

    let err = config::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }), "Unexpected error: {err}");
}

#[test]
fn test_duplicate_display_ids_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "wallspan.jsonc",
        r#"{ "displays": [
            { "id": 1, "x": 0, "y": 0, "width": 1920, "height": 1080 },
            { "id": 1, "x": 1920, "y": 0, "width": 1920, "height": 1080 }
        ] }"#,
    );

    let err = config::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid { .. }), "Unexpected error: {err}");
    assert!(err.to_string().contains("wallspan.jsonc"), "Error should name the file: {err}");
}

// ============================================================================
// Access key
// ============================================================================

#[test]
fn test_access_key_from_env_file_next_to_config() {
    let dir = TempDir::new().unwrap();
    write(&dir, ".env", "UNSPLASH_ACCESS_KEY=from-env-file\n");
    let path = write(&dir, "wallspan.jsonc", r#"{ "apiKeys": ".env" }"#);

    let loaded = config::load(Some(&path)).unwrap();

    assert_eq!(loaded.access_key().as_deref(), Some("from-env-file"));
}

#[test]
fn test_inline_access_key_wins() {
    let dir = TempDir::new().unwrap();
    write(&dir, ".env", "UNSPLASH_ACCESS_KEY=from-env-file\n");
    let path =
        write(&dir, "wallspan.jsonc", r#"{ "apiKey": " inline ", "apiKeys": ".env" }"#);

    let loaded = config::load(Some(&path)).unwrap();

    assert_eq!(loaded.access_key().as_deref(), Some("inline"));
}

// ============================================================================
// Schema
// ============================================================================

#[test]
fn test_schema_describes_every_option() {
    let schema = generate_schema();
    let properties = schema["properties"].as_object().expect("schema should list properties");

    let value = serde_json::to_value(WallspanConfig::default()).unwrap();
    for key in value.as_object().unwrap().keys() {
        assert!(properties.contains_key(key), "Schema is missing `{key}`");
    }
}
