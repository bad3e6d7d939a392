//! Configuration types for the directory agent.

use crate::dn::DistinguishedName;
use ldapauth_core::{BindCredentials, Error, Result};
use std::time::Duration;

/// Default directory server port.
pub const DEFAULT_PORT: u16 = 389;
/// Default connection timeout (seconds).
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 10;
/// Default per-operation timeout (seconds).
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 10;

/// Network address of one directory server.
///
/// Construction validates shape only; reachability is discovered when a
/// session is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEndpoint {
    host: String,
    port: u16,
    use_tls: bool,
}

impl DirectoryEndpoint {
    /// Creates an endpoint for the given host and port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the host is empty or the port is 0.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(Error::ConfigError("endpoint host is empty".to_string()));
        }
        if port == 0 {
            return Err(Error::ConfigError(
                "endpoint port must be between 1 and 65535".to_string(),
            ));
        }
        Ok(Self {
            host,
            port,
            use_tls: false,
        })
    }

    /// Enables or disables TLS for the connection.
    #[must_use]
    pub const fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Returns the server host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether the connection uses TLS.
    #[must_use]
    pub const fn use_tls(&self) -> bool {
        self.use_tls
    }

    /// Returns the connection URL, `ldap://host:port` or `ldaps://host:port`.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.use_tls { "ldaps" } else { "ldap" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

/// Immutable configuration for a [`DirectoryAgent`](crate::DirectoryAgent).
///
/// Constructed once at process start and shared read-only for the process's
/// lifetime. The base DN is required for uid-addressed operations; the
/// administrative credentials are required for CRUD operations.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    endpoint: DirectoryEndpoint,
    base_dn: Option<DistinguishedName>,
    admin_credentials: Option<BindCredentials>,
    connection_timeout_secs: u64,
    operation_timeout_secs: u64,
}

impl DirectoryConfig {
    /// Creates a configuration with default timeouts and no naming context or
    /// administrative credentials.
    #[must_use]
    pub const fn new(endpoint: DirectoryEndpoint) -> Self {
        Self {
            endpoint,
            base_dn: None,
            admin_credentials: None,
            connection_timeout_secs: DEFAULT_CONNECTION_TIMEOUT_SECS,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }

    /// Sets the base DN under which user entries live.
    #[must_use]
    pub fn with_base_dn(mut self, base_dn: DistinguishedName) -> Self {
        self.base_dn = Some(base_dn);
        self
    }

    /// Sets the credentials used for administrative sessions.
    #[must_use]
    pub fn with_admin_credentials(mut self, credentials: BindCredentials) -> Self {
        self.admin_credentials = Some(credentials);
        self
    }

    /// Overrides the connection timeout in seconds.
    #[must_use]
    pub const fn with_connection_timeout_secs(mut self, seconds: u64) -> Self {
        self.connection_timeout_secs = seconds;
        self
    }

    /// Overrides the per-operation timeout in seconds.
    #[must_use]
    pub const fn with_operation_timeout_secs(mut self, seconds: u64) -> Self {
        self.operation_timeout_secs = seconds;
        self
    }

    /// Returns the server endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &DirectoryEndpoint {
        &self.endpoint
    }

    /// Returns the base DN, if configured.
    #[must_use]
    pub const fn base_dn(&self) -> Option<&DistinguishedName> {
        self.base_dn.as_ref()
    }

    /// Returns the administrative credentials, if configured.
    #[must_use]
    pub const fn admin_credentials(&self) -> Option<&BindCredentials> {
        self.admin_credentials.as_ref()
    }

    /// Returns the connection timeout duration.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Returns the per-operation timeout duration.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls() {
        let endpoint = DirectoryEndpoint::new("ldap.example.com", 389).unwrap();
        assert_eq!(endpoint.url(), "ldap://ldap.example.com:389");

        let endpoint = DirectoryEndpoint::new("ldap.example.com", 636)
            .unwrap()
            .with_tls(true);
        assert_eq!(endpoint.url(), "ldaps://ldap.example.com:636");
    }

    #[test]
    fn endpoint_rejects_invalid_shape() {
        assert!(matches!(
            DirectoryEndpoint::new("", 389).unwrap_err(),
            Error::ConfigError(_)
        ));
        assert!(matches!(
            DirectoryEndpoint::new("ldap.example.com", 0).unwrap_err(),
            Error::ConfigError(_)
        ));
    }

    #[test]
    fn config_defaults_and_overrides() {
        let endpoint = DirectoryEndpoint::new("ldap.example.com", 1389).unwrap();
        let config = DirectoryConfig::new(endpoint.clone());

        assert_eq!(config.endpoint(), &endpoint);
        assert!(config.base_dn().is_none());
        assert!(config.admin_credentials().is_none());
        assert_eq!(config.connection_timeout(), Duration::from_secs(10));
        assert_eq!(config.operation_timeout(), Duration::from_secs(10));

        let base_dn = DistinguishedName::parse("ou=people,dc=example,dc=com").unwrap();
        let config = config
            .with_base_dn(base_dn.clone())
            .with_admin_credentials(BindCredentials::new("cn=admin,dc=example,dc=com", "secret"))
            .with_connection_timeout_secs(5)
            .with_operation_timeout_secs(20);

        assert_eq!(config.base_dn(), Some(&base_dn));
        assert_eq!(
            config.admin_credentials().unwrap().bind_dn(),
            "cn=admin,dc=example,dc=com"
        );
        assert_eq!(config.connection_timeout(), Duration::from_secs(5));
        assert_eq!(config.operation_timeout(), Duration::from_secs(20));
    }
}
