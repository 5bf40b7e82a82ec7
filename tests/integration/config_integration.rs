//! Integration tests for Configuration System

use crate::integration::test_utils::with_env;
use foldsync::config::{global_config_path, ConfigLoader};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_environment_overrides_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("foldsync.toml");
    std::fs::write(
        &config_file,
        r#"
source = "/srv/source"
replica = "/mnt/replica"

[sync]
interval_secs = 60
"#,
    )
    .unwrap();

    let config = with_env(
        &[
            ("FOLDSYNC_SYNC__INTERVAL_SECS", Some("15")),
            ("FOLDSYNC_REPLICA", Some("/mnt/elsewhere")),
        ],
        || ConfigLoader::load_from_file(&config_file).unwrap(),
    );

    assert_eq!(config.source, Some(PathBuf::from("/srv/source")));
    assert_eq!(config.replica, Some(PathBuf::from("/mnt/elsewhere")));
    assert_eq!(config.sync.interval_secs, 15);
}

#[test]
fn test_global_config_file_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let config_home = temp_dir.path().join("config");

    let config = with_env(
        &[
            ("XDG_CONFIG_HOME", Some(config_home.to_str().unwrap())),
            ("FOLDSYNC_SYNC__INTERVAL_SECS", None),
            ("FOLDSYNC_REPLICA", None),
        ],
        || {
            let path = global_config_path().unwrap();
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(
                &path,
                r#"
source = "/home/me/documents"
replica = "/backup/documents"

[sync]
prefilter = true
ignore = [".cache"]

[logging]
format = "json"
"#,
            )
            .unwrap();
            ConfigLoader::load().unwrap()
        },
    );

    assert_eq!(config.source, Some(PathBuf::from("/home/me/documents")));
    assert!(config.sync.prefilter);
    assert_eq!(config.sync.ignore, vec![".cache".to_string()]);
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.sync.interval_secs, 300);
}

#[test]
fn test_loaded_config_validates_against_real_roots() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("source");
    std::fs::create_dir(&source).unwrap();
    let config_file = temp_dir.path().join("foldsync.toml");
    std::fs::write(
        &config_file,
        format!(
            "source = {:?}\nreplica = {:?}\n",
            source.to_str().unwrap(),
            source.join("inside").to_str().unwrap()
        ),
    )
    .unwrap();

    let config = with_env(&[("FOLDSYNC_REPLICA", None)], || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("nested"));
}

#[test]
fn test_malformed_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("broken.toml");
    std::fs::write(&config_file, "[sync\ninterval_secs = ").unwrap();

    let result = with_env(&[], || ConfigLoader::load_from_file(&config_file));
    assert!(result.is_err());
}

#[test]
fn test_explicit_file_layers_over_global_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_home = temp_dir.path().join("config");
    let config_file = temp_dir.path().join("foldsync.toml");
    std::fs::write(
        &config_file,
        r#"
source = "/srv/source"
replica = "/mnt/replica"

[sync]
interval_secs = 45
"#,
    )
    .unwrap();

    let config = with_env(
        &[
            ("XDG_CONFIG_HOME", Some(config_home.to_str().unwrap())),
            ("FOLDSYNC_SYNC__INTERVAL_SECS", None),
            ("FOLDSYNC_REPLICA", None),
        ],
        || {
            let path = global_config_path().unwrap();
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(
                &path,
                r#"
source = "/home/me/documents"

[sync]
prefilter = true
interval_secs = 600

[logging]
format = "json"
"#,
            )
            .unwrap();
            ConfigLoader::load_from_file(&config_file).unwrap()
        },
    );

    // Keys the explicit file sets win; the rest come from the global file
    assert_eq!(config.source, Some(PathBuf::from("/srv/source")));
    assert_eq!(config.replica, Some(PathBuf::from("/mnt/replica")));
    assert_eq!(config.sync.interval_secs, 45);
    assert!(config.sync.prefilter);
    assert_eq!(config.logging.format, "json");
}
