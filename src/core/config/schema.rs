//! core::config::schema
//!
//! Configuration schema and the `key=value` file format.
//!
//! # Format
//!
//! ```ini
//! # comment
//! ; comment
//! EnableApiExport=true
//! ApiToken=abc
//! ApiEndpoint=https://stats.example.com/api
//! SaveLocalBackup=false
//! Secret=
//! ```
//!
//! - blank lines and lines starting with `#` or `;` are ignored
//! - each line splits on the first `=`; lines without one are ignored
//! - keys are case-insensitive; unknown keys are ignored
//! - booleans are true only for `true` (any case); anything else is false
//! - text values that are blank or the literal `null` are absent

use serde::Serialize;

use super::ConfigError;

/// Contents written when no configuration file exists.
pub const DEFAULT_CONFIG: &str = "\
# TownOfUs Stats Exporter Configuration
# Whether to enable API export (true/false)
EnableApiExport=false

# API Authentication Token
ApiToken=

# API Endpoint URL
ApiEndpoint=

# Whether to save local backup copies (true/false)
SaveLocalBackup=false

# Additional secret/password for API authentication
Secret=

# Example configuration:
# EnableApiExport=true
# ApiToken=your_secret_token_here
# ApiEndpoint=https://api.example.com/api/among-data
# SaveLocalBackup=true
# Secret=your_secret_key_here
";

/// Exporter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    pub enable_api_export: bool,
    pub api_token: Option<String>,
    pub api_endpoint: Option<String>,
    pub save_local_backup: bool,
    pub secret: Option<String>,
}

/// Authentication values carried in the payload.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub secret: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A configuration that permits exporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub endpoint: String,
    pub credentials: Credentials,
    pub save_local_backup: bool,
}

impl ApiConfig {
    /// Parse the `key=value` format.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_ascii_lowercase().as_str() {
                "enableapiexport" => config.enable_api_export = parse_bool(value),
                "apitoken" => set_text(&mut config.api_token, value),
                "apiendpoint" => set_text(&mut config.api_endpoint, value),
                "savelocalbackup" => config.save_local_backup = parse_bool(value),
                "secret" => set_text(&mut config.secret, value),
                _ => {}
            }
        }

        config
    }

    /// Check whether the configuration permits exporting.
    pub fn is_valid(&self) -> bool {
        self.export_target().is_ok()
    }

    /// Derive the export target.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Disabled` if export is turned off
    /// - `ConfigError::Incomplete` if the token or endpoint is blank
    pub fn export_target(&self) -> Result<ExportTarget, ConfigError> {
        if !self.enable_api_export {
            return Err(ConfigError::Disabled);
        }
        let token = non_blank(&self.api_token).ok_or(ConfigError::Incomplete("ApiToken"))?;
        let endpoint = non_blank(&self.api_endpoint).ok_or(ConfigError::Incomplete("ApiEndpoint"))?;

        Ok(ExportTarget {
            endpoint: endpoint.to_string(),
            credentials: Credentials {
                token: token.to_string(),
                secret: non_blank(&self.secret).map(str::to_string),
            },
            save_local_backup: self.save_local_backup,
        })
    }

    /// Copy with the token and secret masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "********".to_string());
        Self {
            api_token: mask(&self.api_token),
            secret: mask(&self.secret),
            ..self.clone()
        }
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

fn set_text(slot: &mut Option<String>, value: &str) {
    if !value.is_empty() && value != "null" {
        *slot = Some(value.to_string());
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
