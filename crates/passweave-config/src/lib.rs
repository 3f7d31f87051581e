//! Endpoint profiles for passweave tools.
//!
//! TOML profiles of named management endpoints, token resolution
//! (env var + plaintext), and translation to the core's
//! [`StaticDirectory`] so an editing session can look up API roots and
//! bearer tokens by controller id.

use std::collections::HashMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use passweave_core::{ApiEndpoint, StaticDirectory};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no token configured for endpoint '{endpoint}'")]
    NoToken { endpoint: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Named management endpoints, keyed by controller id.
    #[serde(default)]
    pub endpoints: HashMap<String, EndpointProfile>,
}

/// One named management endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointProfile {
    /// Display name shown next to controller nodes.
    pub name: String,

    /// API root URL (e.g., "https://203.0.113.7:9090/api/v1").
    pub api_url: Option<String>,

    /// Bearer token (plaintext — prefer token_env).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "passweave", "passweave").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("passweave");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path (tests, `--config` overrides).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PASSWEAVE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve an endpoint's bearer token: env var first, then plaintext.
pub fn resolve_token(profile: &EndpointProfile, endpoint_id: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoToken {
        endpoint: endpoint_id.into(),
    })
}

// ── Directory construction ──────────────────────────────────────────

/// Build the lookup directory the core consults during propagation and
/// submission. Profiles with a bad URL or no resolvable token are kept
/// with the field unset — the core treats those groups as misconfigured
/// instead of failing the whole load.
pub fn directory(config: &Config) -> StaticDirectory {
    let endpoints = config.endpoints.iter().map(|(id, profile)| {
        let api_url = profile.api_url.as_ref().and_then(|raw| match raw.parse::<url::Url>() {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(endpoint = %id, url = %raw, error = %err, "invalid API root in profile");
                None
            }
        });
        let token = match resolve_token(profile, id) {
            Ok(token) => Some(token),
            Err(err) => {
                warn!(endpoint = %id, error = %err, "no token resolvable for profile");
                None
            }
        };
        ApiEndpoint {
            id: id.clone(),
            name: profile.name.clone(),
            api_url,
            token,
        }
    });
    StaticDirectory::new(endpoints)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use passweave_core::EndpointDirectory;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_endpoint_profiles() {
        let file = write_config(
            r#"
            [endpoints.api-1]
            name = "Main"
            api_url = "https://203.0.113.7:9090/api/v1"
            token = "tok-plain"
            "#,
        );

        let config = load_config_from(file.path()).unwrap();
        let profile = &config.endpoints["api-1"];
        assert_eq!(profile.name, "Main");
        assert_eq!(profile.api_url.as_deref(), Some("https://203.0.113.7:9090/api/v1"));
    }

    #[test]
    fn env_token_takes_precedence_over_plaintext() {
        figment::Jail::expect_with(|jail| {
            let profile = EndpointProfile {
                name: "Main".into(),
                api_url: None,
                token: Some("plain".into()),
                token_env: Some("PASSWEAVE_TEST_TOKEN_PRECEDENCE".into()),
            };

            // Env unset: fall through to plaintext.
            let token = resolve_token(&profile, "api-1").unwrap();
            assert_eq!(token.expose_secret(), "plain");

            jail.set_env("PASSWEAVE_TEST_TOKEN_PRECEDENCE", "from-env");
            let token = resolve_token(&profile, "api-1").unwrap();
            assert_eq!(token.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn missing_token_is_an_error() {
        let profile = EndpointProfile {
            name: "Main".into(),
            api_url: None,
            token: None,
            token_env: None,
        };
        let err = resolve_token(&profile, "api-1").unwrap_err();
        assert!(matches!(err, ConfigError::NoToken { .. }));
    }

    #[test]
    fn directory_keeps_misconfigured_profiles_with_unset_fields() {
        let file = write_config(
            r#"
            [endpoints.good]
            name = "Good"
            api_url = "https://198.51.100.4:9090"
            token = "tok"

            [endpoints.bad-url]
            name = "BadUrl"
            api_url = "not a url"
            token = "tok"

            [endpoints.no-token]
            name = "NoToken"
            api_url = "https://198.51.100.5:9090"
            "#,
        );

        let config = load_config_from(file.path()).unwrap();
        let dir = directory(&config);

        assert!(dir.api_url("good").is_some());
        assert!(dir.token("good").is_some());
        assert!(dir.api_url("bad-url").is_none());
        assert!(dir.token("bad-url").is_some());
        assert!(dir.api_url("no-token").is_some());
        assert!(dir.token("no-token").is_none());
        assert!(dir.api_url("absent").is_none());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.endpoints.insert(
            "api-1".into(),
            EndpointProfile {
                name: "Main".into(),
                api_url: Some("https://203.0.113.7:9090/api/v1".into()),
                token: None,
                token_env: Some("NP_TOKEN".into()),
            },
        );

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.endpoints["api-1"].token_env.as_deref(), Some("NP_TOKEN"));
    }
}
