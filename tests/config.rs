use modal_relay::config::Config;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.dialogs.id_attempts, 3);
    assert_eq!(config.dialogs.expiry_secs, 0);
    assert_eq!(config.notifications.max_display_ms, 600_000);
    assert!(!config.logging.enabled);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();

    // Valid config should pass
    assert!(config.validate().is_ok());

    config.dialogs.id_attempts = 0;
    assert!(config.validate().is_err());

    config.dialogs.id_attempts = 1;
    config.dialogs.expiry_secs = 100_000;
    assert!(config.validate().is_err());

    config.dialogs.expiry_secs = 60;
    config.notifications.max_display_ms = 0;
    assert!(config.validate().is_err());

    config.notifications.max_display_ms = 5000;
    config.logging.level = "chatty".to_string();
    assert!(config.validate().is_err());

    config.logging.level = "debug".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("id_attempts = 3"));
    assert!(toml_str.contains("max_display_ms = 600000"));
}

#[test]
fn test_partial_config_deserialization() {
    let partial_toml = r#"
[dialogs]
expiry_secs = 300

[logging]
enabled = true
"#;

    let config: Config = toml::from_str(partial_toml).unwrap();

    assert_eq!(config.dialogs.expiry_secs, 300);
    assert!(config.logging.enabled);

    // Unspecified values fall back to defaults
    assert_eq!(config.dialogs.id_attempts, 3);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.notifications.max_display_ms, 600_000);
}

#[test]
fn test_empty_config_deserialization() {
    let config: Config = toml::from_str("").unwrap();
    let default_config = Config::default();

    assert_eq!(config.dialogs.id_attempts, default_config.dialogs.id_attempts);
    assert_eq!(config.dialogs.expiry_secs, default_config.dialogs.expiry_secs);
    assert_eq!(config.logging.enabled, default_config.logging.enabled);
}

#[test]
fn test_load_from_file_rejects_invalid_values() {
    use std::fs;

    let temp_dir = std::env::temp_dir().join("modal_relay_test_invalid_config");
    fs::create_dir_all(&temp_dir).unwrap();
    let config_path = temp_dir.join("config.toml");
    fs::write(&config_path, "[dialogs]\nid_attempts = 0\n").unwrap();

    assert!(Config::load_from_file(&config_path).is_err());

    fs::write(&config_path, "[dialogs]\nid_attempts = 5\n").unwrap();
    let config = Config::load_from_file(&config_path).unwrap();
    assert_eq!(config.dialogs.id_attempts, 5);

    let _ = fs::remove_dir_all(&temp_dir);
}

#[test]
fn test_generate_config_creates_directory() {
    use std::fs;

    let temp_dir = std::env::temp_dir().join("modal_relay_test_config");
    let config_path = temp_dir.join("nested").join("config.toml");

    if temp_dir.exists() {
        let _ = fs::remove_dir_all(&temp_dir);
    }
    assert!(!temp_dir.exists());

    let result = Config::generate_default_config(&config_path);
    assert!(result.is_ok());

    assert!(config_path.exists());

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("# modal-relay Configuration File"));
    assert!(content.contains("id_attempts = 3"));

    // The generated file loads back cleanly
    assert!(Config::load_from_file(&config_path).is_ok());

    let _ = fs::remove_dir_all(&temp_dir);
}
