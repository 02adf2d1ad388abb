use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::errors::CliResult;

pub const DEFAULT_CONFIG_NAME: &str = "skiff.toml";

pub const SKIFF_ENV_SETTINGS_PATH: &str = "SKIFF_CONFIG_PATH";
pub const SKIFF_ENV_AUTH_TOKEN: &str = "SKIFF_AUTH_TOKEN";
pub const SKIFF_ENV_SITE_ID: &str = "SKIFF_SITE_ID";
pub const SKIFF_ENV_API_HOST: &str = "SKIFF_API_HOST";

#[remain::sorted]
#[derive(Debug, Error)]
pub enum SettingErrors {
    #[error("no site id configured; pass --site, set SKIFF_SITE_ID, or add `site_id` to skiff.toml")]
    MissingSiteId,

    #[error("no auth token configured; set SKIFF_AUTH_TOKEN or add `token` to skiff.toml")]
    MissingToken,
}

/// Contents of the optional `skiff.toml` settings file. Everything in here
/// can be overridden by environment variables at run time.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Settings {
    pub token: Option<String>,
    pub site_id: Option<String>,
    pub api_host: Option<String>,
}

impl Settings {
    /// Reads the settings file if one exists; a missing file is not an
    /// error, it just means everything must come from the environment.
    pub fn load() -> CliResult<Self> {
        let Some(path) = settings_file_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        Ok(toml::from_str(&raw)?)
    }
}

fn settings_file_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(SKIFF_ENV_SETTINGS_PATH) {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("", "", "skiff").map(|dirs| dirs.config_dir().join(DEFAULT_CONFIG_NAME))
}

/// Configuration for exactly one deployment run, resolved up front so every
/// later step works from plain values instead of ambient state.
#[derive(Clone)]
pub struct RunSettings {
    pub token: String,
    pub site_id: String,
    pub host: String,
}

impl RunSettings {
    /// Resolution order: explicit site argument, then process environment,
    /// then the settings file. A missing token or site id fails here, before
    /// any network call.
    pub fn resolve(settings: &Settings, site_override: Option<String>) -> CliResult<Self> {
        let token = env::var(SKIFF_ENV_AUTH_TOKEN)
            .ok()
            .or_else(|| settings.token.clone())
            .ok_or(SettingErrors::MissingToken)?;

        let site_id = site_override
            .or_else(|| env::var(SKIFF_ENV_SITE_ID).ok())
            .or_else(|| settings.site_id.clone())
            .ok_or(SettingErrors::MissingSiteId)?;

        let host = env::var(SKIFF_ENV_API_HOST)
            .ok()
            .or_else(|| settings.api_host.clone())
            .unwrap_or_else(|| netlify_client::DEFAULT_HOST.to_string());

        Ok(Self {
            token,
            site_id,
            host,
        })
    }
}

impl fmt::Debug for RunSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunSettings")
            .field("token", &"*".repeat(self.token.len()))
            .field("site_id", &self.site_id)
            .field("host", &self.host)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_fails_resolution() {
        let settings = Settings {
            token: None,
            site_id: Some("site-1".into()),
            api_host: None,
        };
        // resolution consults the process environment; skip when the host
        // happens to have a token set
        if env::var(SKIFF_ENV_AUTH_TOKEN).is_ok() {
            return;
        }
        assert!(matches!(
            RunSettings::resolve(&settings, None),
            Err(crate::SkiffCliError::SettingError(
                SettingErrors::MissingToken
            ))
        ));
    }

    #[test]
    fn site_override_wins() {
        let settings = Settings {
            token: Some("tok".into()),
            site_id: Some("configured".into()),
            api_host: None,
        };
        let run = RunSettings::resolve(&settings, Some("explicit".into())).unwrap();
        assert_eq!(run.site_id, "explicit");
    }

    #[test]
    fn host_defaults_to_provider_api() {
        if env::var(SKIFF_ENV_API_HOST).is_ok() {
            return;
        }
        let settings = Settings {
            token: Some("tok".into()),
            site_id: Some("site-1".into()),
            api_host: None,
        };
        let run = RunSettings::resolve(&settings, None).unwrap();
        assert_eq!(run.host, netlify_client::DEFAULT_HOST);
    }

    #[test]
    fn debug_redacts_token() {
        let run = RunSettings {
            token: "super-secret".into(),
            site_id: "site-1".into(),
            host: "https://example.test".into(),
        };
        assert!(!format!("{run:?}").contains("super-secret"));
    }
}
