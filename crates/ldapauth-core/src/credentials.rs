//! Bind credentials for directory sessions.

use secrecy::{ExposeSecret, SecretString};

/// Credentials used to open one authenticated directory session.
///
/// The secret is held in a [`SecretString`] so it is zeroized on drop and
/// redacted from `Debug` output. Credentials are used transiently to bind a
/// single session and are never persisted by the agent.
#[derive(Debug, Clone)]
pub struct BindCredentials {
    bind_dn: String,
    secret: SecretString,
}

impl BindCredentials {
    /// Create credentials for the given principal DN.
    #[must_use]
    pub fn new(bind_dn: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            bind_dn: bind_dn.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// The DN to bind as.
    #[must_use]
    pub fn bind_dn(&self) -> &str {
        &self.bind_dn
    }

    /// Exposes the bind secret for the duration of a bind request.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let creds = BindCredentials::new("cn=admin,dc=example,dc=com", "hunter2");
        assert_eq!(creds.bind_dn(), "cn=admin,dc=example,dc=com");
        assert_eq!(creds.secret(), "hunter2");
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = BindCredentials::new("cn=admin,dc=example,dc=com", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("cn=admin,dc=example,dc=com"));
        assert!(!rendered.contains("hunter2"));
    }
}
