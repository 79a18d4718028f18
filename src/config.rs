use std::net::IpAddr;
use std::time::Duration;

use axum::http::HeaderValue;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub cors_origins: Vec<HeaderValue>,
    pub log_level: String,
    pub mongo: MongoConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub max_pool_size: u32,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub notify_to: String,
    pub tls: TlsMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Implicit TLS, usually port 465.
    Tls,
    StartTls,
    /// Plaintext. Only for local relays.
    None,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup so it can be exercised
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host: IpAddr = env
            .or("FORMRELAY_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_HOST: {e}"))?;
        let port: u16 = env.parsed("FORMRELAY_PORT", "8000")?;
        let max_body_size: usize = env.parsed("FORMRELAY_MAX_BODY_SIZE", "65536")?;

        let cors_origins = env
            .or("FORMRELAY_CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    return Err(
                        "Invalid FORMRELAY_CORS_ORIGINS entry '*': list explicit origins instead"
                            .to_string(),
                    );
                }
                HeaderValue::from_str(s)
                    .map_err(|e| format!("Invalid FORMRELAY_CORS_ORIGINS entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let log_level = env.or("FORMRELAY_LOG_LEVEL", "info");

        let mongo = MongoConfig {
            uri: env.required("MONGO_URI")?,
            database: env.or("FORMRELAY_MONGO_DATABASE", "formrelay"),
            collection: env.or("FORMRELAY_MONGO_COLLECTION", "form_submissions"),
            max_pool_size: env.parsed("FORMRELAY_MONGO_MAX_POOL_SIZE", "10")?,
            connect_timeout: Duration::from_secs(
                env.parsed("FORMRELAY_MONGO_CONNECT_TIMEOUT_SECS", "30")?,
            ),
        };

        let user = env.required("FORMRELAY_SMTP_USER")?;
        let tls = match env.or("FORMRELAY_SMTP_TLS", "tls").as_str() {
            "tls" => TlsMode::Tls,
            "starttls" => TlsMode::StartTls,
            "none" => TlsMode::None,
            other => return Err(format!("Invalid FORMRELAY_SMTP_TLS: {other}")),
        };
        let smtp = SmtpConfig {
            host: env.required("FORMRELAY_SMTP_HOST")?,
            port: env.parsed("FORMRELAY_SMTP_PORT", "465")?,
            pass: env.required("FORMRELAY_SMTP_PASS")?,
            from: env.or("FORMRELAY_SMTP_FROM", &user),
            notify_to: env.required("FORMRELAY_NOTIFY_TO")?,
            user,
            tls,
        };

        Ok(Config {
            host,
            port,
            max_body_size,
            cors_origins,
            log_level,
            mongo,
            smtp,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, String> {
        self.get(key)
            .ok_or_else(|| format!("Missing required environment variable: {key}"))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, String>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or(key, default)
            .parse()
            .map_err(|e| format!("Invalid {key}: {e}"))
    }
}
