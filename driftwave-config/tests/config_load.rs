use driftwave_config::DriftwaveConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_file_with_env_placeholder_for_the_secret() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
api_key: "${DRIFTWAVE_TEST_KEY}"
timeout_secs: 20
"#;
    let p = write_yaml(&tmp, "driftwave.yaml", file_yaml);

    temp_env::with_var("DRIFTWAVE_TEST_KEY", Some("dw-from-env"), || {
        let config = DriftwaveConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load connector config");

        assert_eq!(config.api_key, "dw-from-env");
        assert_eq!(config.base_url, "https://api.driftwave.com");
        assert_eq!(config.timeout_secs, Some(20));
    });
}

#[test]
#[serial]
fn environment_variables_work_without_any_file() {
    temp_env::with_vars(
        [
            ("DRIFTWAVE_API_KEY", Some("dw-env-only")),
            ("DRIFTWAVE_BASE_URL", Some("https://staging.driftwave.test")),
        ],
        || {
            let config = DriftwaveConfigLoader::new()
                .load()
                .expect("load from env alone");

            assert_eq!(config.api_key, "dw-env-only");
            assert_eq!(config.base_url, "https://staging.driftwave.test");
        },
    );
}

#[test]
#[serial]
fn missing_api_key_is_a_load_error() {
    let err = DriftwaveConfigLoader::new()
        .with_yaml_str("timeout_secs: 5")
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("api_key"));
}
