//! `.issuehook/config.toml` loading.
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [auth]
//! token_env = "ISSUEHOOK_TOKEN"
//!
//! [telemetry]
//! format = "json"
//! otlp_endpoint = "http://localhost:4317"
//!
//! [[jobs]]
//! name = "deploy"
//! parameters = [
//!     { type = "string", name = "issue_key" },
//!     { type = "choice", name = "env", choices = ["staging", "production"] },
//! ]
//! ```

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{bail, Context, Result};
use host::JobConfig;
use serde::Deserialize;

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".issuehook/config.toml";

/// Environment variable consulted when `[auth]` names neither a token nor a variable.
pub const DEFAULT_TOKEN_ENV: &str = "ISSUEHOOK_TOKEN";

/// Whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the trigger listener binds to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Where the shared bearer token comes from.
///
/// An inline `token` wins over `token_env`. Keeping the token in the
/// environment is preferred so the file can be committed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub token_env: Option<String>,
}

impl AuthConfig {
    /// Resolves the token, reading the environment through `lookup`.
    pub fn resolve_token(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(token.to_owned());
        }
        let var = self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
        match lookup(var).filter(|t| !t.is_empty()) {
            Some(token) => Ok(token),
            None => bail!("no trigger token configured: set [auth] token or the {var} environment variable"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub format: LogFormat,

    /// OTLP gRPC endpoint. Span export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Parses configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[server]
bind = "0.0.0.0:9000"

[auth]
token_env = "HOOK_TOKEN"

[telemetry]
format = "json"

[[jobs]]
name = "deploy"
parameters = [
    { type = "string", name = "issue_key" },
    { type = "choice", name = "env", choices = ["staging", "production"] },
]

[[jobs]]
name = "frozen"
enabled = false
"#;

    #[test]
    fn parses_full_file() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.telemetry.format, LogFormat::Json);
        assert!(config.telemetry.otlp_endpoint.is_none());
        assert_eq!(config.jobs.len(), 2);
        assert_eq!(config.jobs[0].parameters.as_ref().map(Vec::len), Some(2));
        assert!(!config.jobs[1].enabled);
        assert!(config.jobs[1].parameters.is_none());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.bind, default_bind());
        assert_eq!(config.telemetry.format, LogFormat::Pretty);
        assert!(config.jobs.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[server]\nport = 1\n").is_err());
    }

    #[test]
    fn token_resolution_order() {
        let inline = AuthConfig {
            token: Some("inline".into()),
            token_env: Some("HOOK_TOKEN".into()),
        };
        assert_eq!(inline.resolve_token(|_| Some("env".into())).unwrap(), "inline");

        let from_env = AuthConfig {
            token: None,
            token_env: Some("HOOK_TOKEN".into()),
        };
        let token = from_env
            .resolve_token(|var| (var == "HOOK_TOKEN").then(|| "env".to_owned()))
            .unwrap();
        assert_eq!(token, "env");

        let fallback = AuthConfig::default();
        let token = fallback
            .resolve_token(|var| (var == DEFAULT_TOKEN_ENV).then(|| "default".to_owned()))
            .unwrap();
        assert_eq!(token, "default");

        assert!(fallback.resolve_token(|_| Some(String::new())).is_err());
    }
}
