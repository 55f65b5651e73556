//! PostgreSQL progress collector.
//!
//! Reads `pg_stat_progress_*` views over a single connection. The connection
//! is opened lazily and dropped when a query fails for a non-SQL reason, so
//! the next fetch reconnects.

mod progress;
mod queries;

use postgres::{Client, NoTls};
use postgres_native_tls::MakeTlsConnector;
use tracing::{debug, info};

/// Error type for PostgreSQL connection setup.
#[derive(Debug)]
pub enum PgCollectError {
    /// Environment variable not set.
    EnvNotSet(String),
    /// Connection failed.
    ConnectionError(String),
    /// TLS connector could not be built.
    TlsError(String),
}

impl std::fmt::Display for PgCollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PgCollectError::EnvNotSet(var) => write!(f, "PostgreSQL: {} not set", var),
            PgCollectError::ConnectionError(msg) => write!(f, "PostgreSQL: {}", msg),
            PgCollectError::TlsError(msg) => write!(f, "PostgreSQL TLS: {}", msg),
        }
    }
}

impl std::error::Error for PgCollectError {}

/// PostgreSQL progress collector.
///
/// Connects to PostgreSQL using standard environment variables:
/// - PGHOST (default: localhost)
/// - PGPORT (default: 5432)
/// - PGUSER (default: $USER)
/// - PGPASSWORD (default: empty)
/// - PGDATABASE (default: same as PGUSER)
pub struct PostgresCollector {
    connection_string: String,
    tls: bool,
    pub(crate) client: Option<Client>,
    pub(crate) last_error: Option<String>,
    pub(crate) server_version_num: Option<i32>,
}

impl PostgresCollector {
    /// Creates a new collector from environment variables.
    ///
    /// Uses $USER as default if PGUSER is not set.
    pub fn from_env() -> Result<Self, PgCollectError> {
        let user = std::env::var("PGUSER")
            .or_else(|_| std::env::var("USER"))
            .map_err(|_| PgCollectError::EnvNotSet("PGUSER or USER".to_string()))?;

        let host = std::env::var("PGHOST").unwrap_or_else(|_| "localhost".to_string());
        let port = std::env::var("PGPORT").unwrap_or_else(|_| "5432".to_string());
        let password = std::env::var("PGPASSWORD").unwrap_or_default();
        let database = std::env::var("PGDATABASE").unwrap_or_else(|_| user.clone());

        Ok(Self::with_connection_string(build_connection_string(
            &host, &port, &user, &password, &database,
        )))
    }

    /// Creates a collector with explicit connection string.
    pub fn with_connection_string(connection_string: String) -> Self {
        Self {
            connection_string,
            tls: false,
            client: None,
            last_error: None,
            server_version_num: None,
        }
    }

    /// Connects over TLS (system trust store) instead of plain TCP.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Attempts to connect to PostgreSQL.
    ///
    /// Useful for startup checks before launching the TUI.
    pub fn try_connect(&mut self) -> Result<(), PgCollectError> {
        self.ensure_connected()
    }

    /// Returns the last error message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Server version of the current connection (`server_version_num`).
    pub fn server_version_num(&self) -> Option<i32> {
        self.server_version_num
    }

    /// Ensures the connection is established, reconnecting if needed.
    pub(crate) fn ensure_connected(&mut self) -> Result<(), PgCollectError> {
        if self.client.is_some() {
            return Ok(());
        }

        let connected = if self.tls {
            let connector = native_tls::TlsConnector::new()
                .map_err(|e| PgCollectError::TlsError(e.to_string()))?;
            Client::connect(&self.connection_string, MakeTlsConnector::new(connector))
        } else {
            Client::connect(&self.connection_string, NoTls)
        };

        match connected {
            Ok(mut client) => {
                // Determine server version once per (re)connect.
                self.server_version_num = client
                    .query_one("SHOW server_version_num", &[])
                    .ok()
                    .and_then(|row| row.try_get::<_, String>(0).ok())
                    .and_then(|v| v.parse::<i32>().ok());
                info!(
                    server_version_num = ?self.server_version_num,
                    tls = self.tls,
                    "connected to PostgreSQL"
                );

                self.client = Some(client);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                let msg = format_postgres_error(&e);
                debug!(error = %msg, "connection attempt failed");
                self.last_error = Some(msg.clone());
                self.server_version_num = None;
                Err(PgCollectError::ConnectionError(msg))
            }
        }
    }

    /// Forgets the connection so the next fetch reconnects.
    fn disconnect(&mut self) {
        self.client = None;
        self.server_version_num = None;
    }
}

fn build_connection_string(
    host: &str,
    port: &str,
    user: &str,
    password: &str,
    database: &str,
) -> String {
    if password.is_empty() {
        format!(
            "host={} port={} user={} dbname={}",
            host, port, user, database
        )
    } else {
        format!(
            "host={} port={} user={} password={} dbname={}",
            host, port, user, password, database
        )
    }
}

/// Formats PostgreSQL error message for display.
pub(crate) fn format_postgres_error(e: &postgres::Error) -> String {
    if let Some(db_error) = e.as_db_error() {
        format!("{}: {}", db_error.severity(), db_error.message())
    } else {
        let msg = e.to_string();
        if msg.contains("Connection refused") {
            "connection refused".to_string()
        } else if msg.contains("password authentication failed") {
            "password authentication failed".to_string()
        } else if msg.contains("does not exist") {
            msg.split("FATAL:")
                .last()
                .unwrap_or(&msg)
                .trim()
                .to_string()
        } else {
            msg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_without_password() {
        assert_eq!(
            build_connection_string("db1", "5433", "app", "", "shop"),
            "host=db1 port=5433 user=app dbname=shop"
        );
    }

    #[test]
    fn connection_string_with_password() {
        assert_eq!(
            build_connection_string("localhost", "5432", "app", "s3cret", "app"),
            "host=localhost port=5432 user=app password=s3cret dbname=app"
        );
    }

    #[test]
    fn new_collector_is_disconnected() {
        let c = PostgresCollector::with_connection_string("host=localhost".into()).with_tls(true);
        assert!(c.client.is_none());
        assert!(c.tls);
        assert_eq!(c.last_error(), None);
        assert_eq!(c.server_version_num(), None);
    }
}
