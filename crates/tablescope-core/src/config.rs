//! Core configuration.

use std::env;

/// Read-path configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of items fetched by a single scan or query.
    pub max_scan_items: usize,
}

impl Config {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_scan_items: env_usize("TABLESCOPE_MAX_SCAN_ITEMS", 1000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_scan_items: 1000,
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
