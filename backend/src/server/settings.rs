//! Server settings loaded via OrthoConfig.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use records_backend::domain::RecordTables;
use records_backend::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Runtime settings for the records backend.
///
/// Every field may be supplied through `RECORDS_*` environment variables,
/// a configuration file, or command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECORDS")]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory adapters are used when absent.
    pub database_url: Option<String>,
    /// Comma-separated record tables a rollback may touch.
    pub record_tables: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl ServerSettings {
    /// Parse the configured bind address, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] with kind `InvalidInput` when the address
    /// does not parse.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw:?}: {err}"),
            )
        })
    }

    /// Record table allow-list.
    pub fn record_tables(&self) -> RecordTables {
        self.record_tables
            .as_deref()
            .map_or_else(RecordTables::default, RecordTables::parse_list)
    }

    /// Pool configuration when a database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_deref().map(|url| {
            PoolConfig::new(url).with_max_size(
                self.db_max_connections
                    .unwrap_or(PoolConfig::DEFAULT_MAX_SIZE),
            )
        })
    }
}
