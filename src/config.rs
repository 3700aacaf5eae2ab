use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the approval workflow host
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortalConfig {
    /// Backend API settings
    pub backend: BackendConfig,
    /// Invoice generation retry policy
    pub generation: GenerationConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the REST API, e.g. `https://portal.example.com/api`
    pub base_url: String,
    /// Bearer token (can be set via env var)
    pub token: Option<String>,
    /// Client-wide request timeout, independent of the per-attempt generation timeout
    pub request_timeout_seconds: u64,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Maximum generation attempts per run
    pub max_attempts: u32,
    /// Backoff base; the wait after attempt n is base * 2^n
    pub base_backoff_ms: u64,
    /// Timeout applied to each generation attempt
    pub attempt_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
    /// Log orchestration counters when the host exits
    pub metrics_enabled: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 1000,
            attempt_timeout_seconds: 30,
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:5000/api".to_string(),
                token: None, // Will be read from env var or portal-approvals.toml
                request_timeout_seconds: 60,
                rate_limit: RateLimitConfig {
                    requests_per_second: 5,
                    burst_capacity: 10,
                },
            },
            generation: GenerationConfig::default(),
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: true,
                metrics_enabled: true,
            },
        }
    }
}

impl PortalConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (portal-approvals.toml, .portal-approvals-rc)
    /// 3. Environment variables (prefixed with PORTAL__)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("portal-approvals.toml").exists() {
            builder = builder.add_source(File::with_name("portal-approvals"));
        }

        if Path::new(".portal-approvals-rc").exists() {
            builder = builder.add_source(
                File::with_name(".portal-approvals-rc").format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("PORTAL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut portal_config: PortalConfig = builder
            .build()?
            .try_deserialize()
            .context("Invalid configuration")?;

        if portal_config.backend.token.is_none() {
            if let Ok(token) = std::env::var("PORTAL_API_TOKEN") {
                portal_config.backend.token = Some(token);
            }
        }

        portal_config.validate()?;
        Ok(portal_config)
    }

    /// Load from a single TOML file layered over the defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path).format(config::FileFormat::Toml))
            .build()
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let portal_config: PortalConfig = config.try_deserialize()?;
        portal_config.validate()?;
        Ok(portal_config)
    }

    /// Reject settings under which the per-attempt timeout could never fire.
    /// The client-wide request timeout also bounds each generation call, so it
    /// must not be shorter than the attempt timeout.
    pub fn validate(&self) -> Result<()> {
        let request_timeout = self.backend.request_timeout_seconds;
        let attempt_timeout = self.generation.attempt_timeout_seconds;

        if request_timeout == 0 {
            bail!("backend.request_timeout_seconds must be greater than 0");
        }
        if attempt_timeout == 0 {
            bail!("generation.attempt_timeout_seconds must be greater than 0");
        }
        if request_timeout < attempt_timeout {
            bail!(
                "backend.request_timeout_seconds ({request_timeout}) must be at least \
                 generation.attempt_timeout_seconds ({attempt_timeout})"
            );
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Copy of the configuration that is safe to print
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.backend.token.is_some() {
            copy.backend.token = Some("***".to_string());
        }
        copy
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_generation_policy() {
        let config = PortalConfig::default();
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.generation.base_backoff_ms, 1000);
        assert_eq!(config.generation.attempt_timeout_seconds, 30);
        assert!(config.backend.token.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal-approvals.toml");
        std::fs::write(
            &path,
            r#"
[backend]
base_url = "https://portal.example.com/api"
token = "secret"

[generation]
max_attempts = 5
"#,
        )
        .unwrap();

        let config = PortalConfig::load_from(&path).unwrap();
        assert_eq!(config.backend.base_url, "https://portal.example.com/api");
        assert_eq!(config.backend.token.as_deref(), Some("secret"));
        assert_eq!(config.generation.max_attempts, 5);
        // Untouched keys keep their defaults
        assert_eq!(config.generation.base_backoff_ms, 1000);
        assert_eq!(config.backend.rate_limit.burst_capacity, 10);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = PortalConfig::default();
        config.generation.attempt_timeout_seconds = 12;
        config.save_to_file(&path).unwrap();

        let loaded = PortalConfig::load_from(&path).unwrap();
        assert_eq!(loaded.generation.attempt_timeout_seconds, 12);
    }

    #[test]
    fn test_redacted_hides_token() {
        let mut config = PortalConfig::default();
        config.backend.token = Some("secret".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.backend.token.as_deref(), Some("***"));
        assert_eq!(config.backend.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(PortalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_request_timeout_is_rejected() {
        let mut config = PortalConfig::default();
        config.backend.request_timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_seconds"));
    }

    #[test]
    fn test_request_timeout_below_attempt_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal-approvals.toml");
        std::fs::write(
            &path,
            r#"
[backend]
request_timeout_seconds = 10

[generation]
attempt_timeout_seconds = 30
"#,
        )
        .unwrap();

        let err = PortalConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("must be at least"), "{err}");
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PortalConfig::load_from(dir.path().join("absent.toml")).is_err());
    }
}
