//! [`FirestoreEmulatorConfig`], loaded once at startup from the environment or json.
use serde::Deserialize;

use crate::error::ConfigError;

/// Default host:port of `gcloud emulators firestore start`.
pub const DEFAULT_HOST_PORT: &str = "localhost:8080";

pub const ENABLED_VAR: &str = "FIRESTORE_EMULATOR_ENABLED";
pub const HOST_VAR: &str = "FIRESTORE_EMULATOR_HOST";
pub const PROJECT_ID_VAR: &str = "FIRESTORE_PROJECT_ID";
pub const FALLBACK_PROJECT_ID_VAR: &str = "GOOGLE_CLOUD_PROJECT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FirestoreEmulatorConfig {
    /// Whether to wire anything up at all.
    pub enabled: bool,
    /// Network address of the emulator, i.e `localhost:8080`.
    #[serde(alias = "hostPort")]
    pub host_port: String,
    /// Required when `enabled` is set.
    #[serde(alias = "projectId")]
    pub project_id: Option<String>,
}

impl Default for FirestoreEmulatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host_port: DEFAULT_HOST_PORT.to_owned(),
            project_id: None,
        }
    }
}

impl FirestoreEmulatorConfig {
    /// Builds a config for an enabled emulator.
    pub fn enabled(host_port: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            enabled: true,
            host_port: host_port.into(),
            project_id: Some(project_id.into()),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::from)
    }

    pub fn from_json_slice(json: &[u8]) -> Result<Self, ConfigError> {
        serde_json::from_slice(json).map_err(ConfigError::from)
    }

    /// Reads the config from the process environment.
    ///
    /// `$FIRESTORE_EMULATOR_HOST` on its own implies the emulator is enabled, matching the
    /// other Firestore SDKs, unless `$FIRESTORE_EMULATOR_ENABLED` says otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// [`FirestoreEmulatorConfig::from_env`], but reading variables from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let non_empty = |var| lookup(var).filter(|value| !value.trim().is_empty());

        let host = non_empty(HOST_VAR);

        let enabled = match non_empty(ENABLED_VAR) {
            Some(value) => parse_bool(ENABLED_VAR, &value)?,
            None => host.is_some(),
        };

        let project_id = non_empty(PROJECT_ID_VAR).or_else(|| non_empty(FALLBACK_PROJECT_ID_VAR));

        Ok(Self {
            enabled,
            host_port: host.unwrap_or_else(|| DEFAULT_HOST_PORT.to_owned()),
            project_id,
        })
    }

    /// The project id, treating an empty/blank string the same as a missing one.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    let trimmed = value.trim();

    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        Ok(false)
    } else {
        Err(ConfigError::InvalidBool {
            var,
            value: value.to_owned(),
        })
    }
}
