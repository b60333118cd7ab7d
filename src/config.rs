use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::game::constants::{sim, world};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_address: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Arena width in cells
    pub grid_width: usize,
    /// Arena height in cells
    pub grid_height: usize,
    /// How long a session may go without input before eviction
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 2222,
            grid_width: world::WIDTH,
            grid_height: world::HEIGHT,
            idle_timeout: sim::IDLE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            } else {
                tracing::warn!("Invalid BIND_ADDRESS '{}', using default", addr);
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.port = parsed;
                } else {
                    tracing::warn!("PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid PORT '{}', using default", port);
            }
        }

        if let Ok(width) = std::env::var("GRID_WIDTH") {
            if let Ok(parsed) = width.parse::<usize>() {
                if (16..=512).contains(&parsed) {
                    config.grid_width = parsed;
                } else {
                    tracing::warn!("GRID_WIDTH must be 16-512, using default");
                }
            } else {
                tracing::warn!("Invalid GRID_WIDTH '{}', using default", width);
            }
        }

        if let Ok(height) = std::env::var("GRID_HEIGHT") {
            if let Ok(parsed) = height.parse::<usize>() {
                if (8..=256).contains(&parsed) {
                    config.grid_height = parsed;
                } else {
                    tracing::warn!("GRID_HEIGHT must be 8-256, using default");
                }
            } else {
                tracing::warn!("Invalid GRID_HEIGHT '{}', using default", height);
            }
        }

        if let Ok(secs) = std::env::var("IDLE_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                if parsed > 0 {
                    config.idle_timeout = Duration::from_secs(parsed);
                } else {
                    tracing::warn!("IDLE_TIMEOUT_SECS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid IDLE_TIMEOUT_SECS '{}', using default", secs);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if self.grid_width < 16 {
            return Err("grid_width must be at least 16".to_string());
        }
        if self.grid_height < 8 {
            return Err("grid_height must be at least 8".to_string());
        }
        if self.idle_timeout.is_zero() {
            return Err("idle_timeout must be nonzero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 2222);
        assert_eq!(config.grid_width, 78);
        assert_eq!(config.grid_height, 22);
        assert_eq!(config.idle_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_default_validates() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tiny_grid() {
        let config = ServerConfig {
            grid_width: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
