use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::models::event::EventStatus;

pub mod correlation;
pub mod cors;
pub mod security;

pub use correlation::CorrelationIdLayer;
pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Pagination bounds applied to every list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

pub struct Config {
    /// `None` runs the service against the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub paging: PagingConfig,
    pub event_initial_status: EventStatus,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let default_addr = SocketAddr::from(([0, 0, 0, 0], 3001));
        let mut paging = PagingConfig {
            default_size: env_or("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            max_size: env_or("MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE).max(1),
        };
        if paging.default_size == 0 || paging.default_size > paging.max_size {
            tracing::warn!(
                default_size = paging.default_size,
                max_size = paging.max_size,
                "Config: DEFAULT_PAGE_SIZE out of range, clamping"
            );
            paging.default_size = paging.default_size.clamp(1, paging.max_size);
        }

        let event_initial_status = match env::var("EVENT_INITIAL_STATUS") {
            Ok(raw) => match EventStatus::from_str(raw.trim()) {
                Ok(status @ (EventStatus::Draft | EventStatus::Active)) => status,
                _ => {
                    tracing::warn!(value = %raw, "Config: invalid EVENT_INITIAL_STATUS, using ACTIVE");
                    EventStatus::Active
                }
            },
            Err(_) => EventStatus::Active,
        };

        Self {
            database_url,
            max_connections: env_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
                .parse()
                .unwrap_or_else(|e| {
                    tracing::warn!("Config: invalid BIND_ADDR ({}), using {}", e, default_addr);
                    default_addr
                }),
            paging,
            event_initial_status,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Config: could not parse {}='{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("CONFIG_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("CONFIG_TEST_GARBAGE", 7u32), 7);
        std::env::remove_var("CONFIG_TEST_GARBAGE");
    }

    #[test]
    fn test_env_or_parses_value() {
        std::env::set_var("CONFIG_TEST_VALUE", " 42 ");
        assert_eq!(env_or("CONFIG_TEST_VALUE", 7u32), 42);
        std::env::remove_var("CONFIG_TEST_VALUE");
    }

    #[test]
    fn test_default_paging_is_consistent() {
        let paging = PagingConfig::default();
        assert!(paging.default_size >= 1);
        assert!(paging.default_size <= paging.max_size);
    }
}
