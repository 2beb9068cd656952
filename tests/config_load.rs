// tests/config_load.rs
use opinion_triage::config::{config_path_from_env, load_config_from, ENV_CONFIG_PATH};
use opinion_triage::TriagePipeline;
use std::{env, fs, path::PathBuf};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("triage.toml");
    fs::write(
        &p_toml,
        r#"
keywords = ["小米", "Beta"]
window_hours = 24

[associations]
"小米" = ["手机", "汽车"]

[dedup]
body_prefix_chars = 0
"#,
    )
    .unwrap();
    let cfg = load_config_from(&p_toml).unwrap();
    assert_eq!(cfg.keywords, vec!["小米".to_string(), "Beta".to_string()]);
    assert_eq!(cfg.window_hours, 24);
    assert_eq!(cfg.associations["小米"].len(), 2);
    assert_eq!(cfg.dedup.body_prefix_chars, 0);
    assert!(!cfg.dedup.tracking_params.is_empty());
    assert!(TriagePipeline::new(cfg).is_ok());

    let p_json = dir.path().join("triage.json");
    fs::write(
        &p_json,
        r#"{"keywords":["Alpha"],"associations":{"Alpha":["phone"]},"search_author":true}"#,
    )
    .unwrap();
    let cj = load_config_from(&p_json).unwrap();
    assert!(cj.search_author);
    assert_eq!(cj.window_hours, 48);
}

#[test]
fn missing_or_broken_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_config_from(&dir.path().join("nope.toml")).is_err());

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "window_hours = \"soon\"").unwrap();
    let err = load_config_from(&broken).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[test]
fn sample_config_is_valid() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/triage.toml");
    let cfg = load_config_from(&path).unwrap();
    assert!(TriagePipeline::new(cfg).is_ok());
}

#[serial_test::serial]
#[test]
fn env_var_overrides_default_path() {
    env::remove_var(ENV_CONFIG_PATH);
    assert_eq!(config_path_from_env(), PathBuf::from("config/triage.toml"));

    env::set_var(ENV_CONFIG_PATH, "/tmp/other.json");
    assert_eq!(config_path_from_env(), PathBuf::from("/tmp/other.json"));
    env::remove_var(ENV_CONFIG_PATH);
}
