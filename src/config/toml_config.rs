use crate::utils::error::{Result, SanctuaryError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.resend.com/emails";

/// Application settings loaded from `sanctuary.toml`. Every section is
/// optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SanctuaryConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub email: EmailConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "santuario.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// When false, notifications are only logged.
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: DEFAULT_EMAIL_ENDPOINT.to_string(),
            api_key: None,
            from: None,
            timeout_seconds: 10,
            retry_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl EmailConfig {
    /// Upper bound for one notification, retries included.
    pub fn dispatch_timeout(&self) -> Duration {
        let per_attempt = Duration::from_secs(self.timeout_seconds);
        let pauses = Duration::from_millis(self.retry_delay_ms);
        let attempts = self.retry_attempts.max(1);
        per_attempt * attempts + pauses * (attempts - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl SanctuaryConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Like `from_file`, but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::info!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| SanctuaryError::ConfigValidation {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SanctuaryError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for SanctuaryConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        if self.server.port == 0 {
            return Err(SanctuaryError::InvalidConfigValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
                reason: "Port must be greater than zero".to_string(),
            });
        }

        validate_path("database.path", &self.database.path)?;

        if self.email.enabled {
            validate_url("email.endpoint", &self.email.endpoint)?;
            validate_non_empty_string(
                "email.api_key",
                validate_required_field("email.api_key", &self.email.api_key)?,
            )?;
            validate_non_empty_string(
                "email.from",
                validate_required_field("email.from", &self.email.from)?,
            )?;
            validate_range("email.timeout_seconds", self.email.timeout_seconds, 1, 300)?;
            validate_range("email.retry_attempts", self.email.retry_attempts, 1, 10)?;
        }

        Ok(())
    }
}
