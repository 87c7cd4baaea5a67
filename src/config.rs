use actix_web::http::Uri;
use jsonwebtoken::Algorithm;
use std::str::FromStr;
use thiserror::Error;

/// Frontend origins allowed by CORS when `CORS_ORIGINS` is not set.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "https://studentcollaborationhub.onrender.com",
];

pub const DEFAULT_LOG_FILTER: &str = "studenthub=info,actix_web=info";

/// Secret used when `JWT_SECRET` is missing. Only fit for local development.
pub const INSECURE_JWT_SECRET: &str = "your_jwt_secret";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub username: String,
    pub password: String,
    pub from: String,
    pub server: String,
    pub port: u16,
    pub starttls: bool,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub otp_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl CloudinaryConfig {
    pub fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        )
    }
}

/// Process configuration, read once at startup from the environment
/// (after `.env` has been loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub auth: AuthConfig,
    pub cloudinary: CloudinaryConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unset and
    /// empty values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let cors_origins = match lookup("CORS_ORIGINS").filter(|v| !v.trim().is_empty()) {
            Some(list) => list
                .split(',')
                .map(|o| o.trim().trim_end_matches('/'))
                .filter(|o| !o.is_empty())
                .map(parse_origin)
                .collect::<Result<_, _>>()?,
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            server: ServerConfig {
                host: get("HOST", "127.0.0.1"),
                port: parse("PORT", get("PORT", "8000"))?,
                cors_origins,
            },
            database: DatabaseConfig {
                uri: get("MONGO_URI", "mongodb://localhost:27017"),
                name: get("DB_NAME", "studenthub_v2"),
            },
            mail: MailConfig {
                username: get("MAIL_USERNAME", "test@example.com"),
                password: get("MAIL_PASSWORD", "password"),
                from: get("MAIL_FROM", "test@example.com"),
                server: get("MAIL_SERVER", "smtp.example.com"),
                port: parse("MAIL_PORT", get("MAIL_PORT", "587"))?,
                starttls: parse_bool("MAIL_STARTTLS", get("MAIL_STARTTLS", "true"))?,
            },
            auth: AuthConfig {
                jwt_secret: get("JWT_SECRET", INSECURE_JWT_SECRET),
                jwt_algorithm: parse_hmac_algorithm(get("JWT_ALGORITHM", "HS256"))?,
                otp_ttl_minutes: parse("OTP_TTL_MINUTES", get("OTP_TTL_MINUTES", "10"))?,
                bcrypt_cost: parse("BCRYPT_COST", get("BCRYPT_COST", "12"))?,
            },
            cloudinary: CloudinaryConfig {
                cloud_name: get("CLOUDINARY_CLOUD_NAME", "dkdqyigl1"),
                upload_preset: get("CLOUDINARY_UPLOAD_PRESET", "studenthub_profile"),
            },
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

/// An exact `scheme://host[:port]` origin. Wildcards and paths are refused.
fn parse_origin(value: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "CORS_ORIGINS",
        value: value.to_string(),
    };
    let uri: Uri = value.parse().map_err(|_| invalid())?;

    let scheme_ok = matches!(uri.scheme_str(), Some("http") | Some("https"));
    let host_ok = uri.host().is_some_and(|h| !h.is_empty() && !h.contains('*'));
    let bare = uri.path() == "/" && uri.query().is_none();
    if scheme_ok && host_ok && bare {
        Ok(value.to_string())
    } else {
        Err(invalid())
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}

// Tokens are signed with a shared secret, so only the HMAC family applies.
fn parse_hmac_algorithm(value: String) -> Result<Algorithm, ConfigError> {
    match Algorithm::from_str(value.trim()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(ConfigError::Invalid {
            key: "JWT_ALGORITHM",
            value,
        }),
    }
}
