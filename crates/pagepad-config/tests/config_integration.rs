use pagepad_config::{EditorConfig, CONFIG_ENV_VAR};

#[test]
fn test_load_creates_default_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagepad.json");
    assert!(!path.exists());

    let config = EditorConfig::load_or_create(&path);
    assert!(path.exists());
    assert_eq!(config, EditorConfig::default());

    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["chunk_size"], 1000);
}

#[test]
fn test_load_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagepad.json");
    let json = r#"{
        "viewport_size": 30,
        "indentation": 2,
        "chunk_size": 500,
        "paging_threshold_lines": 10000,
        "placeholder": "~"
    }"#;
    std::fs::write(&path, json).unwrap();

    let config = EditorConfig::load_or_create(&path);
    assert_eq!(config.viewport_size, 30);
    assert_eq!(config.indentation, 2);
    assert_eq!(config.chunk_size, 500);
    assert_eq!(config.paging_threshold_lines, 10_000);
    assert_eq!(config.placeholder, "~");
}

#[test]
fn test_broken_json_returns_defaults_and_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagepad.json");
    std::fs::write(&path, "{ this is not valid json }}}").unwrap();

    let config = EditorConfig::load_or_create(&path);
    assert_eq!(config, EditorConfig::default());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{ this is not valid json }}}"
    );
}

#[test]
fn test_loaded_config_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagepad.json");
    std::fs::write(&path, r#"{"viewport_size": 40, "chunk_size": 10}"#).unwrap();

    let config = EditorConfig::load_or_create(&path);
    assert_eq!(config.viewport_size, 40);
    assert_eq!(config.chunk_size, 41);
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagepad.json");

    let config = EditorConfig {
        viewport_size: 12,
        placeholder: "...".to_string(),
        ..EditorConfig::default()
    };
    config.save(&path).unwrap();

    let reloaded = EditorConfig::load_or_create(&path);
    assert_eq!(reloaded, config);
}

#[test]
fn test_save_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("pagepad").join("pagepad.json");
    EditorConfig::default().save(&path).unwrap();
    assert_eq!(EditorConfig::load_or_create(&path), EditorConfig::default());
}

#[test]
fn test_save_below_a_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let err = EditorConfig::default()
        .save(&blocker.join("pagepad.json"))
        .unwrap_err();
    assert!(err.to_string().contains("failed to create config dir"));
}

#[test]
fn test_config_path_honors_env_var() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.json");
    std::env::set_var(CONFIG_ENV_VAR, &path);
    let resolved = EditorConfig::config_path();
    std::env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(resolved, path);
    assert!(EditorConfig::config_path().ends_with("pagepad.json"));
}
