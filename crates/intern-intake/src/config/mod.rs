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

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

const DEVELOPMENT_JWT_SECRET: &str = "intern-intake-development-secret";

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub forms: FormAssetConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var("APP_PORT", 3001_u16, ConfigError::InvalidPort)?;
        let max_body_bytes = parse_var(
            "MAX_BODY_BYTES",
            10 * 1024 * 1024_usize,
            ConfigError::InvalidNumber("MAX_BODY_BYTES"),
        )?;
        let cors_origins = env::var("CORS_ORIGIN")
            .map(|raw| split_list(&raw))
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:3000".to_string(),
                ]
            });

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => return Err(ConfigError::MissingJwtSecret),
            None => DEVELOPMENT_JWT_SECRET.to_string(),
        };
        let token_ttl_hours = parse_var(
            "JWT_TTL_HOURS",
            24_i64,
            ConfigError::InvalidNumber("JWT_TTL_HOURS"),
        )?;

        let smtp_host = env::var("EMAIL_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let smtp_port = parse_var("EMAIL_PORT", 587_u16, ConfigError::InvalidNumber("EMAIL_PORT"))?;
        let credentials = match (non_empty_var("EMAIL_USER"), non_empty_var("EMAIL_PASS")) {
            (Some(username), Some(password)) => Some(SmtpCredentials { username, password }),
            _ => None,
        };
        let from_name =
            env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "ONGC Dehradun - SAIL".to_string());
        let batch_size = parse_var(
            "BULK_BATCH_SIZE",
            5_usize,
            ConfigError::InvalidNumber("BULK_BATCH_SIZE"),
        )?;
        if batch_size == 0 {
            return Err(ConfigError::InvalidNumber("BULK_BATCH_SIZE"));
        }
        let batch_pause_ms = parse_var(
            "BULK_BATCH_PAUSE_MS",
            1000_u64,
            ConfigError::InvalidNumber("BULK_BATCH_PAUSE_MS"),
        )?;

        let font_path = env::var("FORM_FONT_PATH")
            .unwrap_or_else(|_| "templates/NotoSansDevanagari-Regular.ttf".to_string());
        let template_path =
            env::var("FORM_TEMPLATE_PATH").unwrap_or_else(|_| "templates/template.pdf".to_string());

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                cors_origins,
                max_body_bytes,
            },
            telemetry: TelemetryConfig { log_level },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
            },
            mail: MailConfig {
                smtp_host,
                smtp_port,
                credentials,
                from_name,
                batch_size,
                batch_pause: Duration::from_millis(batch_pause_ms),
            },
            forms: FormAssetConfig {
                font_path: PathBuf::from(font_path),
                template_path: PathBuf::from(template_path),
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(
    key: &str,
    default: T,
    error: ConfigError,
) -> Result<T, ConfigError> {
    match non_empty_var(key) {
        Some(raw) => raw.parse::<T>().map_err(|_| error),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_body_bytes: usize,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Token signing settings for staff sessions.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

#[derive(Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Outbound SMTP relay and bulk pacing.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub credentials: Option<SmtpCredentials>,
    pub from_name: String,
    pub batch_size: usize,
    pub batch_pause: Duration,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Static assets used by the application form generator.
#[derive(Debug, Clone)]
pub struct FormAssetConfig {
    pub font_path: PathBuf,
    pub template_path: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber(&'static str),
    MissingJwtSecret,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber(key) => write!(f, "{key} must be a positive number"),
            ConfigError::MissingJwtSecret => {
                write!(f, "JWT_SECRET must be set when APP_ENV is production")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber(_)
            | ConfigError::MissingJwtSecret => None,
        }
    }
}
