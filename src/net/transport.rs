//! TCP listener and accept loop.
//!
//! Each accepted socket is handed to the arena manager, which owns the
//! session for the rest of its life. The listener itself stays thin so
//! the protocol can be exercised in tests over in-memory streams.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::metrics::Metrics;
use crate::net::manager::{self, ArenaManager, SharedManager};

/// TCP game server
pub struct GameServer {
    config: ServerConfig,
    manager: SharedManager,
}

impl GameServer {
    /// Create a new server with a fresh arena manager
    pub fn new(config: ServerConfig, metrics: Arc<Metrics>) -> Self {
        let manager = ArenaManager::new(config.clone(), metrics).into_shared();
        Self { config, manager }
    }

    /// Shared handle to the arena manager, for stats reporting
    pub fn manager(&self) -> SharedManager {
        self.manager.clone()
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.config.bind_address, self.config.port)
    }

    /// Run the accept loop
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.bind_addr()).await?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        loop {
            let (stream, peer) = listener.accept().await?;
            tracing::debug!("New connection from {}", peer);

            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!("set_nodelay failed for {}: {}", peer, e);
            }

            manager::handle_connection(self.manager.clone(), stream);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_addr() {
        let config = ServerConfig {
            bind_address: "127.0.0.1".parse().unwrap(),
            port: 4000,
            ..Default::default()
        };
        let server = GameServer::new(config, Arc::new(Metrics::new()));
        assert_eq!(server.bind_addr().to_string(), "127.0.0.1:4000");
    }

    #[tokio::test]
    async fn test_manager_starts_empty() {
        let server = GameServer::new(ServerConfig::default(), Arc::new(Metrics::new()));
        let manager = server.manager();
        assert_eq!(manager.read().await.arena_count(), 0);
    }
}
