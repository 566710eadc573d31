use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connect_timeout_secs: 30,
            },
            security: SecurityConfig {
                // Local development fallback; JWT_SECRET overrides it
                jwt_secret: "learnhub-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connect_timeout_secs: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["https://staging.learnhub.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connect_timeout_secs: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                cors_origins: vec!["https://app.learnhub.example.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 10);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert_eq!(config.database.max_connections, 50);
    }
}
