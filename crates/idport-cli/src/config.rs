//! Startup configuration: remote endpoints, locale and the token-file path.
//!
//! Resolved exactly once: config file first, env overrides on top, defaults
//! last. The locale in particular is decided here and injected into views;
//! nothing re-derives it later.

use std::path::PathBuf;

use serde::Deserialize;

use idport_client_core::locale::Locale;

pub const ENV_CONFIG_PATH: &str = "IDPORT_CONFIG";
pub const ENV_API_BASE_URL: &str = "IDPORT_API_BASE_URL";
pub const ENV_AUTH_PORTAL_URL: &str = "IDPORT_AUTH_PORTAL_URL";
pub const ENV_GEO_BASE_URL: &str = "IDPORT_GEO_BASE_URL";
pub const ENV_LOCALE: &str = "IDPORT_LOCALE";

pub const DEFAULT_API_BASE_URL: &str = "https://api.idport.dev";
pub const DEFAULT_AUTH_PORTAL_URL: &str = "https://auth.idport.dev";

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub api_base_url: String,
    pub auth_portal_url: String,
    pub geo_base_url: String,
    pub locale: Locale,
    pub token_path: PathBuf,
}

/// On-disk shape; every field optional so a partial file works.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    auth_portal_url: Option<String>,
    #[serde(default)]
    geo_base_url: Option<String>,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    token_path: Option<PathBuf>,
}

impl PortalConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw = read_config_file()?;
        Ok(Self::resolve(raw))
    }

    fn resolve(raw: RawConfig) -> Self {
        let api_base_url = env_non_empty(ENV_API_BASE_URL)
            .or(raw.api_base_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let auth_portal_url = env_non_empty(ENV_AUTH_PORTAL_URL)
            .or(raw.auth_portal_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_AUTH_PORTAL_URL.to_string());
        let geo_base_url = env_non_empty(ENV_GEO_BASE_URL)
            .or(raw.geo_base_url)
            .unwrap_or_else(|| idport_api_client::geo::DEFAULT_GEO_BASE_URL.to_string());

        let locale = env_non_empty(ENV_LOCALE)
            .or(raw.locale)
            .map(|value| match Locale::parse(&value) {
                Some(locale) => locale,
                None => {
                    tracing::warn!(%value, "unknown locale, falling back to english");
                    Locale::English
                }
            })
            .unwrap_or_default();

        let token_path = raw.token_path.unwrap_or_else(default_token_path);

        Self {
            api_base_url,
            auth_portal_url,
            geo_base_url,
            locale,
            token_path,
        }
    }
}

fn read_config_file() -> anyhow::Result<RawConfig> {
    let path = match env_non_empty(ENV_CONFIG_PATH) {
        Some(path) => PathBuf::from(path),
        None => match dirs::config_dir() {
            Some(dir) => dir.join("idport").join("config.toml"),
            None => return Ok(RawConfig::default()),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(raw) => toml::from_str(&raw)
            .map_err(|error| anyhow::anyhow!("invalid config {}: {error}", path.display())),
        Err(_) => Ok(RawConfig::default()),
    }
}

fn default_token_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("idport")
        .join("session-token")
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn with_env<T>(overrides: &[(&str, Option<&str>)], test: impl FnOnce() -> T) -> T {
        let lock = ENV_LOCK.get_or_init(|| Mutex::new(()));
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let previous = overrides
            .iter()
            .map(|(key, _)| (*key, std::env::var(key).ok()))
            .collect::<Vec<_>>();

        for (key, value) in overrides {
            if let Some(value) = value {
                unsafe { std::env::set_var(key, value) };
            } else {
                unsafe { std::env::remove_var(key) };
            }
        }

        let result = test();

        for (key, value) in previous {
            if let Some(value) = value {
                unsafe { std::env::set_var(key, value) };
            } else {
                unsafe { std::env::remove_var(key) };
            }
        }

        result
    }

    #[test]
    fn defaults_apply_when_nothing_is_configured() {
        with_env(
            &[
                (ENV_API_BASE_URL, None),
                (ENV_AUTH_PORTAL_URL, None),
                (ENV_GEO_BASE_URL, None),
                (ENV_LOCALE, None),
            ],
            || {
                let config = PortalConfig::resolve(RawConfig::default());
                assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
                assert_eq!(config.auth_portal_url, DEFAULT_AUTH_PORTAL_URL);
                assert_eq!(config.locale, Locale::English);
            },
        );
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        with_env(
            &[
                (ENV_API_BASE_URL, Some("https://api.staging.example.com/")),
                (ENV_AUTH_PORTAL_URL, None),
                (ENV_GEO_BASE_URL, None),
                (ENV_LOCALE, Some("ru")),
            ],
            || {
                let raw = RawConfig {
                    api_base_url: Some("https://api.file.example.com".to_string()),
                    locale: Some("en".to_string()),
                    ..RawConfig::default()
                };
                let config = PortalConfig::resolve(raw);
                assert_eq!(config.api_base_url, "https://api.staging.example.com");
                assert_eq!(config.locale, Locale::Russian);
            },
        );
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        with_env(
            &[
                (ENV_API_BASE_URL, None),
                (ENV_AUTH_PORTAL_URL, None),
                (ENV_GEO_BASE_URL, None),
                (ENV_LOCALE, Some("de")),
            ],
            || {
                let config = PortalConfig::resolve(RawConfig::default());
                assert_eq!(config.locale, Locale::English);
            },
        );
    }

    #[test]
    fn file_values_parse_from_toml() {
        let raw: RawConfig = toml::from_str(
            r#"
                api_base_url = "https://api.example.com"
                locale = "ru"
                token_path = "/tmp/idport-token"
            "#,
        )
        .expect("config parses");

        with_env(
            &[
                (ENV_API_BASE_URL, None),
                (ENV_AUTH_PORTAL_URL, None),
                (ENV_GEO_BASE_URL, None),
                (ENV_LOCALE, None),
            ],
            || {
                let config = PortalConfig::resolve(raw);
                assert_eq!(config.api_base_url, "https://api.example.com");
                assert_eq!(config.locale, Locale::Russian);
                assert_eq!(config.token_path, PathBuf::from("/tmp/idport-token"));
            },
        );
    }
}
