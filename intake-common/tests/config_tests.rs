//! Tests for configuration resolution priority
//!
//! Tier order: command line > environment > TOML file > compiled default.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate INTAKE_* variables are marked with #[serial].

use intake_common::config::{
    ConfigNote, Overrides, ServiceConfig, DEFAULT_BIND, DEFAULT_PORT, ENV_BIND, ENV_DATA_FILE, ENV_LOG_LEVEL,
    ENV_PORT,
};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    for var in [ENV_BIND, ENV_PORT, ENV_DATA_FILE, ENV_LOG_LEVEL] {
        env::remove_var(var);
    }
}

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
#[serial]
fn test_toml_used_when_no_cli_or_env() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_file = write_config(
        &dir,
        "port = 6100\ndata_file = \"/srv/intake/candidates.json\"\n[logging]\nlevel = \"debug\"\n",
    );

    let config = ServiceConfig::resolve(&Overrides {
        config_file: Some(config_file),
        ..Default::default()
    })
    .unwrap()
    .config;

    assert_eq!(config.port, 6100);
    assert_eq!(config.bind, DEFAULT_BIND);
    assert_eq!(config.data_file, PathBuf::from("/srv/intake/candidates.json"));
    assert_eq!(config.log_level, "debug");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, "port = 6100\nbind = \"0.0.0.0\"\n");
    env::set_var(ENV_PORT, "6200");
    env::set_var(ENV_DATA_FILE, "/env/candidates.json");

    let config = ServiceConfig::resolve(&Overrides {
        config_file: Some(config_file),
        ..Default::default()
    })
    .unwrap()
    .config;
    clear_env();

    assert_eq!(config.port, 6200);
    assert_eq!(config.bind, "0.0.0.0");
    assert_eq!(config.data_file, PathBuf::from("/env/candidates.json"));
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_PORT, "6200");
    env::set_var(ENV_BIND, "10.0.0.1");

    let config = ServiceConfig::resolve(&Overrides {
        port: Some(6300),
        bind: Some("127.0.0.2".to_string()),
        data_file: Some(PathBuf::from("cli.json")),
        ..Default::default()
    })
    .unwrap()
    .config;
    clear_env();

    assert_eq!(config.port, 6300);
    assert_eq!(config.bind, "127.0.0.2");
    assert_eq!(config.data_file, PathBuf::from("cli.json"));
    assert_eq!(config.listen_addr(), "127.0.0.2:6300");
}

#[test]
#[serial]
fn test_invalid_env_port_is_config_error() {
    clear_env();
    env::set_var(ENV_PORT, "not-a-port");

    let result = ServiceConfig::resolve(&Overrides {
        data_file: Some(PathBuf::from("cli.json")),
        ..Default::default()
    });
    clear_env();

    assert!(matches!(result, Err(intake_common::Error::Config(_))));
}

#[test]
#[serial]
fn test_explicit_missing_config_file_is_error() {
    clear_env();
    let dir = TempDir::new().unwrap();

    let result = ServiceConfig::resolve(&Overrides {
        config_file: Some(dir.path().join("absent.toml")),
        ..Default::default()
    });

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_defaults_with_empty_config_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, "");

    let config = ServiceConfig::resolve(&Overrides {
        config_file: Some(config_file),
        ..Default::default()
    })
    .unwrap()
    .config;

    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.bind, DEFAULT_BIND);
    assert_eq!(config.log_level, "info");
    assert!(config.data_file.ends_with("candidates.json"));
}

#[test]
#[serial]
fn test_explicit_config_file_reports_loaded() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, "port = 6100\n");

    let resolved = ServiceConfig::resolve(&Overrides {
        config_file: Some(config_file.clone()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(resolved.notes, vec![ConfigNote::Loaded(config_file)]);
}

/// A broken file at the default location is skipped, and the skip is
/// returned to the caller instead of being logged before tracing is up
#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_unparseable_default_config_is_reported() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let app_dir = dir.path().join("candidate-intake");
    fs::create_dir_all(&app_dir).unwrap();
    fs::write(app_dir.join("config.toml"), "port = [not toml").unwrap();

    let saved = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());
    let result = ServiceConfig::resolve(&Overrides::default());
    match saved {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    let resolved = result.unwrap();
    assert_eq!(resolved.config.port, DEFAULT_PORT);
    assert_eq!(resolved.notes.len(), 1);
    match &resolved.notes[0] {
        ConfigNote::Ignored { path, reason } => {
            assert_eq!(path, &app_dir.join("config.toml"));
            assert!(reason.contains("Parse"));
        }
        other => panic!("expected Ignored, got {:?}", other),
    }
}
