use std::env;
use std::fs;

use osrt::config::{load_config, CONFIG_ENV};
use osrt::LogLevel;
use serial_test::serial;
use tempfile::tempdir;

fn with_config_env<T>(value: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let saved = env::var_os(CONFIG_ENV);
    unsafe {
        env::set_var(CONFIG_ENV, value);
    }
    let out = f();
    unsafe {
        match saved {
            Some(v) => env::set_var(CONFIG_ENV, v),
            None => env::remove_var(CONFIG_ENV),
        }
    }
    out
}

#[test]
#[serial]
fn env_points_at_config_file() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("osrt.xml");
    fs::write(
        &cfg,
        "<config>\n  <log_level>info</log_level>\n  <dir_mode>700</dir_mode>\n</config>\n",
    )
    .unwrap();
    let loaded = with_config_env(&cfg, load_config).unwrap();
    assert_eq!(loaded.source.as_deref(), Some(cfg.as_path()));
    assert_eq!(loaded.config.log_level, LogLevel::Info);
    assert_eq!(loaded.config.dir_mode, Some(0o700));
}

#[test]
#[serial]
fn missing_env_file_gives_defaults() {
    let td = tempdir().unwrap();
    let loaded = with_config_env(&td.path().join("absent.xml"), load_config).unwrap();
    assert!(loaded.source.is_none());
    assert_eq!(loaded.config, osrt::Config::default());
}

#[test]
#[serial]
fn empty_log_file_element_means_none() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("osrt.xml");
    fs::write(&cfg, "<config><log_file>   </log_file></config>").unwrap();
    let loaded = with_config_env(&cfg, load_config).unwrap();
    assert_eq!(loaded.config.log_file, None);
}

#[test]
#[serial]
fn unknown_field_is_refused() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("osrt.xml");
    fs::write(&cfg, "<config><download_base>/x</download_base></config>").unwrap();
    assert!(with_config_env(&cfg, load_config).is_err());
}
