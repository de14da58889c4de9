//! Loader for connector credentials and settings with YAML + environment
//! overlays.
//!
//! The host normally supplies the API key from its own credential store;
//! when the connector runs standalone (CLI, integration tests) this crate
//! stands in: an optional `driftwave.yaml` merged with `DRIFTWAVE_*`
//! environment variables, with `${VAR}` placeholders expanded so keys can
//! live outside the file.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const ENV_EXPANSION_DEPTH: usize = 8;

fn default_base_url() -> String {
    "https://api.driftwave.com".into()
}

#[derive(Debug, Deserialize)]
pub struct DriftwaveConfig {
    /// The one secret the connector needs; injected as `X-API-Key`.
    pub api_key: String,
    /// Upstream endpoint; override for self-hosted or test targets.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds; the HTTP client default applies
    /// when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Expand `${VAR}` placeholders in every string leaf, re-expanding a few
/// times so variables that reference other variables settle. A cycle just
/// stops at the depth cap.
fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML file + env overrides).
pub struct DriftwaveConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for DriftwaveConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DriftwaveConfigLoader {
    /// Start with the defaults: `DRIFTWAVE_`-prefixed env overrides, no
    /// file yet.
    pub fn new() -> Self {
        // prefix_separator must stay "_" explicitly; setting only
        // `separator` would silently require DRIFTWAVE__ variables.
        let builder = Config::builder().add_source(
            Environment::with_prefix("DRIFTWAVE")
                .prefix_separator("_")
                .separator("__"),
        );
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet (tests and CLI overrides).
    ///
    /// ```
    /// use driftwave_config::DriftwaveConfigLoader;
    ///
    /// let cfg = DriftwaveConfigLoader::new()
    ///     .with_yaml_str("api_key: dw-test-key")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.api_key, "dw-test-key");
    /// assert_eq!(cfg.base_url, "https://api.driftwave.com");
    /// assert!(cfg.timeout_secs.is_none());
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources, expanding
    /// `${VAR}` placeholders before typing the result.
    pub fn load(self) -> Result<DriftwaveConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: DriftwaveConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_placeholders_in_strings_only() {
        temp_env::with_var("DW_KEY", Some("dw-secret"), || {
            let mut v = json!({"api_key": "${DW_KEY}", "timeout_secs": 30});
            expand_env_in_value(&mut v);
            assert_eq!(v, json!({"api_key": "dw-secret", "timeout_secs": 30}));
        });
    }

    #[test]
    fn expansion_follows_chained_variables() {
        temp_env::with_vars(
            [
                ("DW_REGION", Some("eu")),
                ("DW_HOST", Some("api-${DW_REGION}.driftwave.com")),
            ],
            || {
                let mut v = json!("https://${DW_HOST}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("https://api-eu.driftwave.com"));
            },
        );
    }

    #[test]
    fn cyclic_variables_terminate_at_the_depth_cap() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("key-${A}");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("key-"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_variables_are_left_untouched() {
        let mut v = json!("${DW_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("${DW_DOES_NOT_EXIST}"));
    }
}
