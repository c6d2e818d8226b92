//! Driver configuration.

use serde::{Deserialize, Serialize};

/// TLS negotiation mode for the physical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    /// Never use TLS.
    Disable,
    /// Use TLS when the server offers it.
    #[default]
    Prefer,
    /// Require TLS, without certificate verification.
    Require,
    /// Require TLS and verify the server certificate.
    VerifyFull,
}

/// Connection parameters owned by a driver.
///
/// The transport crate interprets most of these; the driver itself uses
/// `schema`, `encoding`, `timezone` and `init` for session setup and
/// `database` for cache keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Server host name.
    pub host: String,
    /// Server port, where the backend uses one.
    pub port: Option<u16>,
    /// Login user name.
    pub username: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Database name, or file path for file-backed backends.
    pub database: String,
    /// Default schema / search path.
    pub schema: Option<String>,
    /// Client encoding set at connect time.
    pub encoding: Option<String>,
    /// Session timezone set at connect time.
    pub timezone: Option<String>,
    /// TLS mode.
    pub ssl_mode: SslMode,
    /// Statements run once after connecting, in order.
    pub init: Vec<String>,
    /// Whether the transport should keep the connection persistent.
    pub persistent: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: None,
            username: None,
            password: None,
            database: String::new(),
            schema: None,
            encoding: None,
            timezone: None,
            ssl_mode: SslMode::default(),
            init: Vec::new(),
            persistent: false,
        }
    }
}

impl DriverConfig {
    /// Creates a configuration for `database` with defaults elsewhere.
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Sets the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the credentials.
    #[must_use]
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the default schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the client encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Sets the session timezone.
    #[must_use]
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Sets the TLS mode.
    #[must_use]
    pub const fn ssl_mode(mut self, mode: SslMode) -> Self {
        self.ssl_mode = mode;
        self
    }

    /// Appends a post-connect init statement.
    #[must_use]
    pub fn init_statement(mut self, sql: impl Into<String>) -> Self {
        self.init.push(sql.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = DriverConfig::new("app")
            .host("db.internal")
            .port(5432)
            .credentials("app", "secret")
            .schema("public")
            .timezone("UTC")
            .init_statement("SET statement_timeout = 1000");

        assert_eq!(config.database, "app");
        assert_eq!(config.port, Some(5432));
        assert_eq!(config.schema.as_deref(), Some("public"));
        assert_eq!(config.init.len(), 1);
        assert_eq!(config.ssl_mode, SslMode::Prefer);
    }
}
