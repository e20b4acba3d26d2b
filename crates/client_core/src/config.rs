use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "guestbook.toml";
pub const DEFAULT_SCHOOL_NAME: &str = "SD Negeri 3 Karau Kuala";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_CLASSIFIER_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const APP_DIR_NAME: &str = "sdn3_guestbook";
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 20;
const DEFAULT_SINK_TIMEOUT_SECS: u64 = 30;

/// Sink endpoint baked in at build time; empty keeps the kiosk offline.
const BUILD_SINK_URL: Option<&str> = option_env!("GUESTBOOK_SINK_URL");

/// Credential variables, in lookup order.
const CLASSIFIER_KEY_VARS: [&str; 3] = ["VITE_API_KEY", "API_KEY", "GEMINI_API_KEY"];

#[derive(Clone, PartialEq)]
pub struct Settings {
    pub school_name: String,
    pub cloud_forwarding_enabled: bool,
    pub sink_url: Option<Url>,
    pub sink_timeout: Duration,
    pub classifier_api_key: Option<String>,
    pub classifier_model: String,
    pub classifier_base_url: Url,
    pub classifier_timeout: Duration,
    pub data_dir: Option<PathBuf>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("school_name", &self.school_name)
            .field("cloud_forwarding_enabled", &self.cloud_forwarding_enabled)
            .field("sink_url", &self.sink_url.as_ref().map(Url::as_str))
            .field("sink_timeout", &self.sink_timeout)
            .field(
                "classifier_api_key",
                &self.classifier_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("classifier_model", &self.classifier_model)
            .field("classifier_base_url", &self.classifier_base_url.as_str())
            .field("classifier_timeout", &self.classifier_timeout)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        let sink_url = BUILD_SINK_URL.and_then(parse_http_url);
        Self {
            school_name: DEFAULT_SCHOOL_NAME.into(),
            cloud_forwarding_enabled: sink_url.is_some(),
            sink_url,
            sink_timeout: Duration::from_secs(DEFAULT_SINK_TIMEOUT_SECS),
            classifier_api_key: None,
            classifier_model: DEFAULT_CLASSIFIER_MODEL.into(),
            classifier_base_url: Url::parse(DEFAULT_CLASSIFIER_BASE_URL)
                .expect("default classifier url is valid"),
            classifier_timeout: Duration::from_secs(DEFAULT_CLASSIFIER_TIMEOUT_SECS),
            data_dir: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    school_name: Option<String>,
    cloud_forwarding: Option<bool>,
    sink_url: Option<String>,
    sink_timeout_secs: Option<u64>,
    classifier_model: Option<String>,
    classifier_base_url: Option<String>,
    classifier_timeout_secs: Option<u64>,
    data_dir: Option<PathBuf>,
}

/// Loads settings from compiled defaults, `guestbook.toml` in the working
/// directory, then the process environment.
pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    resolve_settings(file.as_deref(), |name| std::env::var(name).ok())
}

pub fn resolve_settings(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();
    let env = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    let file_cfg = match file_contents.map(toml::from_str::<FileSettings>) {
        Some(Ok(cfg)) => cfg,
        Some(Err(err)) => {
            tracing::warn!("ignoring malformed {SETTINGS_FILE}: {err}");
            FileSettings::default()
        }
        None => FileSettings::default(),
    };

    if let Some(v) = file_cfg.school_name {
        settings.school_name = v;
    }
    if let Some(v) = file_cfg.sink_timeout_secs {
        settings.sink_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file_cfg.classifier_model {
        settings.classifier_model = v;
    }
    if let Some(v) = file_cfg.classifier_timeout_secs {
        settings.classifier_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file_cfg.data_dir {
        settings.data_dir = Some(v);
    }

    let mut raw_sink_url = file_cfg.sink_url;
    if let Some(v) = env("GUESTBOOK_SINK_URL") {
        raw_sink_url = Some(v);
    }
    if let Some(raw) = raw_sink_url {
        settings.sink_url = parse_http_url(&raw);
        if settings.sink_url.is_none() && !raw.trim().is_empty() {
            tracing::warn!(sink_url = %raw, "sink url is not a valid http(s) url; cloud forwarding disabled");
        }
    }

    let mut raw_base_url = file_cfg.classifier_base_url;
    if let Some(v) = env("GUESTBOOK_CLASSIFIER_BASE_URL") {
        raw_base_url = Some(v);
    }
    if let Some(raw) = raw_base_url {
        match parse_http_url(&raw) {
            Some(url) => settings.classifier_base_url = url,
            None => tracing::warn!(base_url = %raw, "ignoring invalid classifier base url"),
        }
    }

    if let Some(v) = env("GUESTBOOK_CLASSIFIER_MODEL") {
        settings.classifier_model = v;
    }
    if let Some(v) = env("GUESTBOOK_CLASSIFIER_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.classifier_timeout = Duration::from_secs(parsed);
        }
    }
    if let Some(v) = env("GUESTBOOK_DATA_DIR") {
        settings.data_dir = Some(PathBuf::from(v));
    }

    settings.classifier_api_key = CLASSIFIER_KEY_VARS
        .iter()
        .find_map(|name| env(*name))
        .map(|key| key.trim().to_string());

    let mut forwarding = file_cfg.cloud_forwarding;
    if let Some(v) = env("GUESTBOOK_CLOUD_FORWARDING") {
        forwarding = parse_flag(&v).or(forwarding);
    }
    settings.cloud_forwarding_enabled = match forwarding {
        Some(true) if settings.sink_url.is_none() => {
            tracing::warn!("cloud forwarding requested without a usable sink url; staying offline");
            false
        }
        Some(flag) => flag,
        None => settings.sink_url.is_some(),
    };

    settings
}

impl Settings {
    /// Directory holding the local store: an explicit override first, then
    /// the configured `data_dir`, then the per-user local data directory.
    pub fn resolve_data_dir(&self, cli_override: Option<&Path>) -> anyhow::Result<PathBuf> {
        if let Some(dir) = cli_override.or(self.data_dir.as_deref()) {
            return Ok(dir.to_path_buf());
        }
        let base = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("unable to resolve local app data dir"))?;
        Ok(base.join(APP_DIR_NAME))
    }
}

fn parse_http_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Url::parse(raw)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn sink_url_enables_forwarding_by_default() {
        let settings = resolve_settings(
            Some(r#"sink_url = "https://script.example.org/exec""#),
            env_from(&[]),
        );
        assert!(settings.cloud_forwarding_enabled);
        assert_eq!(
            settings.sink_url.as_ref().map(Url::as_str),
            Some("https://script.example.org/exec")
        );
    }

    #[test]
    fn explicit_flag_can_disable_forwarding() {
        let settings = resolve_settings(
            Some(r#"sink_url = "https://script.example.org/exec""#),
            env_from(&[("GUESTBOOK_CLOUD_FORWARDING", "false")]),
        );
        assert!(!settings.cloud_forwarding_enabled);
    }

    #[test]
    fn forwarding_without_valid_url_stays_offline() {
        let settings = resolve_settings(
            Some("cloud_forwarding = true\nsink_url = \"not a url\""),
            env_from(&[]),
        );
        assert!(settings.sink_url.is_none());
        assert!(!settings.cloud_forwarding_enabled);
    }

    #[test]
    fn credential_lookup_prefers_first_variable_and_skips_empty() {
        let settings = resolve_settings(
            None,
            env_from(&[("VITE_API_KEY", "  "), ("API_KEY", "key-2"), ("GEMINI_API_KEY", "key-3")]),
        );
        assert_eq!(settings.classifier_api_key.as_deref(), Some("key-2"));
    }

    #[test]
    fn env_overrides_file_values() {
        let settings = resolve_settings(
            Some("classifier_model = \"file-model\"\nclassifier_timeout_secs = 5"),
            env_from(&[("GUESTBOOK_CLASSIFIER_MODEL", "env-model")]),
        );
        assert_eq!(settings.classifier_model, "env-model");
        assert_eq!(settings.classifier_timeout, Duration::from_secs(5));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let settings = resolve_settings(Some("sink_url = ["), env_from(&[]));
        assert_eq!(settings.school_name, DEFAULT_SCHOOL_NAME);
        assert_eq!(settings.classifier_model, DEFAULT_CLASSIFIER_MODEL);
    }

    #[test]
    fn data_dir_prefers_cli_then_settings() {
        let settings = resolve_settings(None, env_from(&[("GUESTBOOK_DATA_DIR", "/srv/kiosk")]));
        assert_eq!(
            settings
                .resolve_data_dir(Some(Path::new("/tmp/override")))
                .expect("cli dir"),
            PathBuf::from("/tmp/override")
        );
        assert_eq!(
            settings.resolve_data_dir(None).expect("settings dir"),
            PathBuf::from("/srv/kiosk")
        );
    }

    #[test]
    fn debug_output_redacts_credential() {
        let settings = resolve_settings(None, env_from(&[("API_KEY", "secret-key")]));
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
