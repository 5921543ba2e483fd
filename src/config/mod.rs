use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Which of the two binaries is reading the configuration.
/// Only the defaults differ (port, database name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Service {
    Api,
    Auth,
}

impl Service {
    pub fn default_port(self) -> u16 {
        match self {
            Service::Api => 8000,
            Service::Auth => 8080,
        }
    }

    pub fn default_database(self) -> &'static str {
        match self {
            Service::Api => "portfolio",
            Service::Auth => "authdb",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Service::Api => "portfolio-api",
            Service::Auth => "portfolio-auth",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must not be empty")]
    MissingJwtSecret,

    #[error("invalid database url: {0}")]
    InvalidDatabaseUrl(String),

    #[error("JWT_EXPIRY_HOURS must be between 1 and {max}, got {value}")]
    InvalidJwtExpiry { value: u64, max: u64 },

    #[error("BCRYPT_COST must be between {min} and {max}, got {value}")]
    InvalidBcryptCost { value: u32, min: u32, max: u32 },
}

/// Longest token lifetime accepted from configuration (one year)
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

/// Cost range accepted by bcrypt
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: Service,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL. When unset the URL is assembled from the parts below.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub sslmode: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
    pub max_lifetime_secs: u64,
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub cors_permissive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl AppConfig {
    pub fn from_env(service: Service) -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(service),
            Environment::Staging => Self::staging(service),
            Environment::Development => Self::development(service),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DB_SSLMODE") {
            self.database.sslmode = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_MIN_CONNECTIONS") {
            self.database.min_connections = v.parse().unwrap_or(self.database.min_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_MAX_LIFETIME_SECS") {
            self.database.max_lifetime_secs = v.parse().unwrap_or(self.database.max_lifetime_secs);
        }
        if let Ok(v) = env::var("DATABASE_AUTO_MIGRATE") {
            self.database.auto_migrate = v.parse().unwrap_or(self.database.auto_migrate);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            self.security.cors_permissive = self.security.cors_origins.iter().any(|o| o == "*");
        }

        // Pagination overrides
        if let Ok(v) = env::var("PAGINATION_DEFAULT_LIMIT") {
            self.pagination.default_limit = v.parse().unwrap_or(self.pagination.default_limit);
        }
        if let Ok(v) = env::var("PAGINATION_MAX_LIMIT") {
            self.pagination.max_limit = v.parse().unwrap_or(self.pagination.max_limit);
        }

        // Logging overrides
        if let Ok(v) = env::var("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = env::var("LOG_FORMAT") {
            self.logging.format = match v.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                _ => self.logging.format,
            };
        }

        self
    }

    fn development(service: Service) -> Self {
        Self {
            service,
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: service.default_port(),
            },
            database: DatabaseConfig::defaults(service, 10, 30),
            security: SecurityConfig {
                jwt_secret: "your-secret-key".to_string(),
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins: vec!["*".to_string()],
                cors_permissive: true,
            },
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: 100,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }

    fn staging(service: Service) -> Self {
        Self {
            service,
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: service.default_port(),
            },
            database: DatabaseConfig::defaults(service, 50, 10),
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins: vec!["https://staging.example.com".to_string()],
                cors_permissive: false,
            },
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: 100,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }

    fn production(service: Service) -> Self {
        Self {
            service,
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: service.default_port(),
            },
            database: DatabaseConfig::defaults(service, 100, 5),
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins: vec!["https://app.example.com".to_string()],
                cors_permissive: false,
            },
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: 100,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }

    /// Startup checks that would otherwise surface as confusing request failures.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        let expiry = self.security.jwt_expiry_hours;
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&expiry) {
            return Err(ConfigError::InvalidJwtExpiry {
                value: expiry,
                max: MAX_JWT_EXPIRY_HOURS,
            });
        }
        let cost = self.security.bcrypt_cost;
        if !BCRYPT_COST_RANGE.contains(&cost) {
            return Err(ConfigError::InvalidBcryptCost {
                value: cost,
                min: *BCRYPT_COST_RANGE.start(),
                max: *BCRYPT_COST_RANGE.end(),
            });
        }
        self.database.connection_url()?;
        Ok(())
    }
}

impl DatabaseConfig {
    fn defaults(service: Service, max_connections: u32, connection_timeout: u64) -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "password".to_string(),
            name: service.default_database().to_string(),
            sslmode: "disable".to_string(),
            max_connections,
            min_connections: 0,
            connection_timeout,
            max_lifetime_secs: 3600,
            auto_migrate: true,
        }
    }

    /// Connection URL, either `DATABASE_URL` verbatim or assembled from the parts.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.url {
            url::Url::parse(url).map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
            return Ok(url.clone());
        }

        let mut url = url::Url::parse("postgres://localhost")
            .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
        url.set_host(Some(&self.host))
            .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
        url.set_port(Some(self.port))
            .map_err(|_| ConfigError::InvalidDatabaseUrl("cannot set port".to_string()))?;
        url.set_username(&self.user)
            .map_err(|_| ConfigError::InvalidDatabaseUrl("cannot set user".to_string()))?;
        url.set_password(Some(&self.password))
            .map_err(|_| ConfigError::InvalidDatabaseUrl("cannot set password".to_string()))?;
        url.set_path(&format!("/{}", self.name));
        url.query_pairs_mut().append_pair("sslmode", &self.sslmode);
        Ok(url.into())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl PaginationConfig {
    pub fn clamp(&self, page: Option<i64>, limit: Option<i64>) -> crate::types::Pagination {
        crate::types::Pagination::new(
            page.unwrap_or(1),
            limit.unwrap_or(i64::from(self.default_limit)),
            self.default_limit,
            self.max_limit,
        )
    }
}

// Process-wide config, set once by the binary at startup
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Build the config for `service` from the environment, let the caller adjust
/// it (CLI flags), and install it globally. Later calls return the first value.
pub fn init(service: Service, adjust: impl FnOnce(&mut AppConfig)) -> &'static AppConfig {
    CONFIG.get_or_init(|| {
        let mut config = AppConfig::from_env(service);
        adjust(&mut config);
        config
    })
}
