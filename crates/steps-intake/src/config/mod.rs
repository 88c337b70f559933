use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// How CV attachments are delivered to staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Upload to the object store, falling back to inline encoding on failure.
    Live,
    /// Never upload; always embed the file inline in the notification.
    InlineFallback,
    /// Never upload or encode; staff receive a description of the file.
    Disabled,
}

impl StorageMode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "inline-fallback" | "inline_fallback" | "inline" => Ok(Self::InlineFallback),
            "disabled" | "off" => Ok(Self::Disabled),
            other => Err(ConfigError::InvalidStorageMode(other.to_string())),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StorageMode::Live => "live",
            StorageMode::InlineFallback => "inline-fallback",
            StorageMode::Disabled => "disabled",
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub email: EmailRelayConfig,
    pub preferences: PreferencesConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mode = StorageMode::parse(
            &env::var("STORAGE_MODE").unwrap_or_else(|_| "inline-fallback".to_string()),
        )?;
        let bucket = env::var("STORAGE_BUCKET").unwrap_or_default();
        if mode == StorageMode::Live && bucket.trim().is_empty() {
            return Err(ConfigError::MissingSetting("STORAGE_BUCKET"));
        }
        let upload_timeout_secs = parse_number("STORAGE_UPLOAD_TIMEOUT_SECS", 8)?;
        let inline_limit_bytes =
            parse_number("STORAGE_INLINE_LIMIT_BYTES", DEFAULT_INLINE_LIMIT_BYTES as u64)? as usize;

        let storage = StorageConfig {
            mode,
            endpoint: env::var("STORAGE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_STORAGE_ENDPOINT.to_string()),
            bucket,
            auth_token: non_empty_var("STORAGE_AUTH_TOKEN"),
            upload_timeout: Duration::from_secs(upload_timeout_secs),
            inline_limit_bytes,
        };

        let email = EmailRelayConfig {
            endpoint: env::var("EMAIL_RELAY_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_RELAY_ENDPOINT.to_string()),
            service_id: env::var("EMAIL_SERVICE_ID").unwrap_or_default(),
            cv_template_id: env::var("EMAIL_CV_TEMPLATE_ID").unwrap_or_default(),
            contact_template_id: env::var("EMAIL_CONTACT_TEMPLATE_ID").unwrap_or_default(),
            public_key: env::var("EMAIL_PUBLIC_KEY").unwrap_or_default(),
            private_key: non_empty_var("EMAIL_PRIVATE_KEY"),
            recipient_name: env::var("EMAIL_RECIPIENT_NAME")
                .unwrap_or_else(|_| DEFAULT_RECIPIENT_NAME.to_string()),
        };

        let preferences = PreferencesConfig {
            path: env::var("PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PREFERENCES_PATH)),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage,
            email,
            preferences,
        })
    }
}

pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://firebasestorage.googleapis.com";
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
pub const DEFAULT_RECIPIENT_NAME: &str = "Steps Education Team";
pub const DEFAULT_PREFERENCES_PATH: &str = ".steps/preferences.json";
pub const DEFAULT_INLINE_LIMIT_BYTES: usize = 40 * 1024;

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_number(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber(key)),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Object store used for CV attachments.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub mode: StorageMode,
    pub endpoint: String,
    pub bucket: String,
    pub auth_token: Option<String>,
    pub upload_timeout: Duration,
    pub inline_limit_bytes: usize,
}

/// Transactional email relay credentials and templates.
#[derive(Debug, Clone)]
pub struct EmailRelayConfig {
    pub endpoint: String,
    pub service_id: String,
    pub cv_template_id: String,
    pub contact_template_id: String,
    pub public_key: String,
    pub private_key: Option<String>,
    pub recipient_name: String,
}

#[derive(Debug, Clone)]
pub struct PreferencesConfig {
    pub path: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStorageMode(String),
    InvalidNumber(&'static str),
    MissingSetting(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStorageMode(value) => write!(
                f,
                "STORAGE_MODE must be one of live, inline-fallback, disabled (found '{value}')"
            ),
            ConfigError::InvalidNumber(key) => write!(f, "{key} must be a non-negative integer"),
            ConfigError::MissingSetting(key) => {
                write!(f, "{key} is required for the selected configuration")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidStorageMode(_)
            | ConfigError::InvalidNumber(_)
            | ConfigError::MissingSetting(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "STORAGE_MODE",
            "STORAGE_BUCKET",
            "STORAGE_UPLOAD_TIMEOUT_SECS",
            "STORAGE_INLINE_LIMIT_BYTES",
            "EMAIL_SERVICE_ID",
            "EMAIL_RECIPIENT_NAME",
            "PREFERENCES_PATH",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.storage.mode, StorageMode::InlineFallback);
        assert_eq!(config.storage.upload_timeout, Duration::from_secs(8));
        assert_eq!(config.storage.inline_limit_bytes, DEFAULT_INLINE_LIMIT_BYTES);
        assert_eq!(config.email.recipient_name, DEFAULT_RECIPIENT_NAME);
        assert_eq!(
            config.preferences.path,
            PathBuf::from(DEFAULT_PREFERENCES_PATH)
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn live_storage_requires_bucket() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STORAGE_MODE", "live");
        let err = AppConfig::load().expect_err("bucket missing");
        assert!(matches!(err, ConfigError::MissingSetting("STORAGE_BUCKET")));

        env::set_var("STORAGE_BUCKET", "steps-cvs.appspot.com");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.storage.mode, StorageMode::Live);
        reset_env();
    }

    #[test]
    fn rejects_unknown_storage_mode() {
        assert!(matches!(
            StorageMode::parse("sometimes"),
            Err(ConfigError::InvalidStorageMode(_))
        ));
        assert_eq!(
            StorageMode::parse("Inline-Fallback").expect("parses"),
            StorageMode::InlineFallback
        );
        assert_eq!(StorageMode::parse("disabled").expect("parses").label(), "disabled");
    }
}
