//! Integration test for the TOML settings store.

use std::fs;
use std::path::PathBuf;

use britannia_core::{ClientSettings, ClientVersion, SettingsStore, TomlSettingsStore};

fn temp_settings_path() -> PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join(format!("britannia_settings_{id}"))
        .join("settings.toml")
}

#[test]
fn test_missing_file_loads_defaults() {
    let store = TomlSettingsStore::new(temp_settings_path());
    let settings = store.load().unwrap();
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn test_save_then_load() {
    let path = temp_settings_path();
    let store = TomlSettingsStore::new(&path);

    let mut settings = ClientSettings::default();
    settings.ultima_online.data_directory = Some(PathBuf::from("/opt/uo"));
    settings.ultima_online.client_version = Some(ClientVersion::new(7, 0, 15, 1));
    settings.network.max_packets_per_slice = 16;
    store.save(&settings).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("client_version = \"7.0.15.1\""));

    let reloaded = TomlSettingsStore::new(&path).load().unwrap();
    assert_eq!(reloaded, settings);

    fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn test_malformed_file_is_an_error() {
    let path = temp_settings_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[network\nmax_packets_per_slice = ").unwrap();

    assert!(TomlSettingsStore::new(&path).load().is_err());

    fs::remove_dir_all(path.parent().unwrap()).ok();
}
