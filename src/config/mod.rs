use serde::Deserialize;
use std::env;
use std::net::SocketAddr;

// Top-level configuration container, built once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub notification: NotificationConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

impl AppConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("HOST and PORT must form a valid socket address")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

// Mail gateway used for booking confirmations
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    pub gateway_url: String,
    pub from_address: String,
    pub enabled: bool,
}

// Where theatre images land on disk
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub image_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "movie_booking=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
                min_connections: env::var("DB_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .expect("DB_MIN_CONNECTIONS must be a valid number"),
                acquire_timeout_secs: env::var("DB_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("DB_ACQUIRE_TIMEOUT_SECS must be a valid number"),
            },
            notification: NotificationConfig {
                gateway_url: env::var("MAIL_GATEWAY_URL")
                    .unwrap_or_else(|_| "http://localhost:8025/api/send".to_string()),
                from_address: env::var("MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| "no-reply@moviemagic.local".to_string()),
                enabled: env::var("MAIL_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .expect("MAIL_ENABLED must be true or false"),
            },
            storage: StorageConfig {
                image_dir: env::var("IMAGE_DIR").unwrap_or_else(|_| "./images".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_uses_the_configured_host_and_port() {
        let app = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            environment: "test".to_string(),
            rust_log: "debug".to_string(),
        };

        assert_eq!(app.bind_addr(), "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
    }
}
