use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use client_core::{StoreEndpoints, StoreError, DEFAULT_RETRY_DELAY};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "movies.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub list_url: String,
    pub store_base_url: String,
    /// Appended to store resource paths, e.g. `.json` for document stores.
    pub resource_suffix: String,
    pub retry_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            list_url: "https://swapi.dev/api/films/".into(),
            store_base_url: "http://127.0.0.1:8787".into(),
            resource_suffix: String::new(),
            retry_delay_ms: u64::try_from(DEFAULT_RETRY_DELAY.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl Settings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn endpoints(&self) -> Result<StoreEndpoints, StoreError> {
        StoreEndpoints::new(
            self.list_url.clone(),
            self.store_base_url.clone(),
            self.resource_suffix.clone(),
        )
    }
}

/// Defaults, then `path` if it exists, then environment variables.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    match fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read config file '{}'", path.display())),
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = first_set(&lookup, &["APP__LIST_URL", "MOVIES_LIST_URL"]) {
        settings.list_url = v;
    }
    if let Some(v) = first_set(&lookup, &["APP__STORE_URL", "MOVIES_STORE_URL"]) {
        settings.store_base_url = v;
    }
    if let Some(v) = first_set(&lookup, &["APP__RESOURCE_SUFFIX", "MOVIES_RESOURCE_SUFFIX"]) {
        settings.resource_suffix = v;
    }
    if let Some(v) = first_set(&lookup, &["APP__RETRY_DELAY_MS", "MOVIES_RETRY_DELAY_MS"]) {
        match v.parse::<u64>() {
            Ok(parsed) => settings.retry_delay_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid retry delay override"),
        }
    }
}

fn first_set(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|&key| lookup(key))
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings =
            read_settings_file(Path::new("./does-not-exist/movies.toml")).expect("defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.retry_delay(), Duration::from_millis(5000));
    }

    #[test]
    fn file_values_override_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("movies_config_test_{suffix}.toml"));
        fs::write(
            &path,
            "store_base_url = \"https://store.example\"\nresource_suffix = \".json\"\n",
        )
        .expect("write config");

        let settings = read_settings_file(&path).expect("parse");
        fs::remove_file(&path).expect("cleanup");

        assert_eq!(settings.store_base_url, "https://store.example");
        assert_eq!(settings.resource_suffix, ".json");
        assert_eq!(settings.list_url, Settings::default().list_url);
    }

    #[test]
    fn env_overrides_prefer_app_prefix() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            lookup_from(&[
                ("MOVIES_LIST_URL", "https://films.example/a"),
                ("APP__LIST_URL", "https://films.example/b"),
                ("MOVIES_RETRY_DELAY_MS", "250"),
            ]),
        );

        assert_eq!(settings.list_url, "https://films.example/b");
        assert_eq!(settings.retry_delay(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_retry_delay_is_ignored() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            lookup_from(&[("MOVIES_RETRY_DELAY_MS", "soon")]),
        );
        assert_eq!(settings.retry_delay_ms, 5000);
    }

    #[test]
    fn default_settings_build_valid_endpoints() {
        let endpoints = Settings::default().endpoints().expect("endpoints");
        assert_eq!(
            endpoints.create_url().as_str(),
            "http://127.0.0.1:8787/movies"
        );
    }
}
