use std::path::PathBuf;

use crate::volume::VolumeFile;

// -----------------------------------------------------------------------------
// Models
// -----------------------------------------------------------------------------

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

pub const DEFAULT_VOLUME_CATALOG: &str = "example";
pub const DEFAULT_VOLUME_SCHEMA: &str = "default";
pub const DEFAULT_VOLUME_NAME: &str = "test-volume";
pub const DEFAULT_FILE_NAME: &str = "big.json";
pub const DEFAULT_LOCAL_FILE_PATH: &str = "big.json";

const LOCAL_ENVIRONMENT: &str = "LOCAL";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not found in environment variables.")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// How the workspace client authenticates.
///
/// `ENVIRONMENT=LOCAL` means a developer machine with a personal access token.
/// Anything else is the Apps runtime, which injects a service principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    Token {
        host: String,
        token: String,
    },
    Ambient {
        host: String,
        client_id: String,
        client_secret: String,
    },
}

impl AuthMode {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("DATABRICKS_HOST")
            .map(|host| normalize_host(&host))
            .ok_or(ConfigError::Missing("DATABRICKS_HOST"))?;

        let is_local = lookup("ENVIRONMENT").map_or(false, |env| env == LOCAL_ENVIRONMENT);
        if is_local {
            let token = lookup("DATABRICKS_TOKEN").ok_or(ConfigError::Missing("DATABRICKS_TOKEN"))?;
            return Ok(AuthMode::Token { host, token });
        }

        match (lookup("DATABRICKS_CLIENT_ID"), lookup("DATABRICKS_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Ok(AuthMode::Ambient {
                host,
                client_id,
                client_secret,
            }),
            (Some(_), None) => Err(ConfigError::Missing("DATABRICKS_CLIENT_SECRET")),
            // A token in the environment also counts as ambient auth.
            (None, _) => match lookup("DATABRICKS_TOKEN") {
                Some(token) => Ok(AuthMode::Token { host, token }),
                None => Err(ConfigError::Missing("DATABRICKS_CLIENT_ID")),
            },
        }
    }

    pub fn host(&self) -> &str {
        match self {
            AuthMode::Token { host, .. } => host,
            AuthMode::Ambient { host, .. } => host,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Token { .. } => "token",
            AuthMode::Ambient { .. } => "oauth-m2m",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("DATABRICKS_APP_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "DATABRICKS_APP_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(ServerConfig {
            host: DEFAULT_BIND_HOST.to_string(),
            port,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeConfig {
    pub file: VolumeFile,
    pub local_path: PathBuf,
}

impl VolumeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        VolumeConfig {
            file: VolumeFile {
                catalog: get("VOLUME_CATALOG", DEFAULT_VOLUME_CATALOG),
                schema: get("VOLUME_SCHEMA", DEFAULT_VOLUME_SCHEMA),
                volume: get("VOLUME_NAME", DEFAULT_VOLUME_NAME),
                file_name: get("VOLUME_FILE_NAME", DEFAULT_FILE_NAME),
            },
            local_path: PathBuf::from(get("LOCAL_FILE_PATH", DEFAULT_LOCAL_FILE_PATH)),
        }
    }
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// Loads `.env` when present; the Apps runtime sets variables directly.
pub fn load_env() {
    dotenvy::dotenv().ok();
}

/// Reads a variable, treating blank values as unset.
pub fn env_var(name: &str) -> Option<String> {
    dotenvy::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Apps sets `DATABRICKS_HOST` without a scheme.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("https://") || host.starts_with("http://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_local_environment_uses_token() {
        let auth = AuthMode::from_lookup(lookup(&[
            ("ENVIRONMENT", "LOCAL"),
            ("DATABRICKS_HOST", "https://dbc-123.cloud.databricks.com/"),
            ("DATABRICKS_TOKEN", "dapi-local"),
            ("DATABRICKS_CLIENT_ID", "ignored"),
            ("DATABRICKS_CLIENT_SECRET", "ignored"),
        ]))
        .expect("Failed to resolve auth");

        assert_eq!(
            auth,
            AuthMode::Token {
                host: "https://dbc-123.cloud.databricks.com".to_string(),
                token: "dapi-local".to_string(),
            }
        );
    }

    #[test]
    fn test_local_environment_requires_token() {
        let err = AuthMode::from_lookup(lookup(&[
            ("ENVIRONMENT", "LOCAL"),
            ("DATABRICKS_HOST", "dbc-123.cloud.databricks.com"),
        ]))
        .unwrap_err();

        assert_eq!(err, ConfigError::Missing("DATABRICKS_TOKEN"));
    }

    #[test]
    fn test_ambient_environment_uses_service_principal() {
        let auth = AuthMode::from_lookup(lookup(&[
            ("DATABRICKS_HOST", "dbc-123.cloud.databricks.com"),
            ("DATABRICKS_CLIENT_ID", "sp-id"),
            ("DATABRICKS_CLIENT_SECRET", "sp-secret"),
        ]))
        .expect("Failed to resolve auth");

        assert_eq!(auth.as_str(), "oauth-m2m");
        assert_eq!(auth.host(), "https://dbc-123.cloud.databricks.com");
    }

    #[test]
    fn test_ambient_environment_falls_back_to_token() {
        let auth = AuthMode::from_lookup(lookup(&[
            ("ENVIRONMENT", "PROD"),
            ("DATABRICKS_HOST", "https://dbc-123.cloud.databricks.com"),
            ("DATABRICKS_TOKEN", "dapi-ambient"),
        ]))
        .expect("Failed to resolve auth");

        assert_eq!(auth.as_str(), "token");
    }

    #[test]
    fn test_missing_host() {
        let err = AuthMode::from_lookup(lookup(&[("DATABRICKS_TOKEN", "x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABRICKS_HOST"));
        assert_eq!(
            err.to_string(),
            "DATABRICKS_HOST not found in environment variables."
        );
    }

    #[test]
    fn test_server_port() {
        let default = ServerConfig::from_lookup(lookup(&[])).expect("Failed to load server config");
        assert_eq!(default.port, DEFAULT_PORT);
        assert_eq!(default.host, "0.0.0.0");

        let custom = ServerConfig::from_lookup(lookup(&[("DATABRICKS_APP_PORT", "8501")]))
            .expect("Failed to load server config");
        assert_eq!(custom.port, 8501);

        let err = ServerConfig::from_lookup(lookup(&[("DATABRICKS_APP_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DATABRICKS_APP_PORT", .. }));
    }

    #[test]
    fn test_volume_defaults_and_overrides() {
        let defaults = VolumeConfig::from_lookup(lookup(&[]));
        assert_eq!(defaults.file.path(), "/Volumes/example/default/test-volume/big.json");
        assert_eq!(defaults.local_path, PathBuf::from("big.json"));

        let custom = VolumeConfig::from_lookup(lookup(&[
            ("VOLUME_CATALOG", "main"),
            ("VOLUME_FILE_NAME", "events.json"),
            ("LOCAL_FILE_PATH", "/tmp/events.json"),
        ]));
        assert_eq!(custom.file.path(), "/Volumes/main/default/test-volume/events.json");
        assert_eq!(custom.local_path, PathBuf::from("/tmp/events.json"));
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("example.com"), "https://example.com");
        assert_eq!(normalize_host(" http://localhost:8080/ "), "http://localhost:8080");
    }
}
