//! Single-connection directory session management.
//!
//! A session wraps exactly one connection and lives for one operation: the
//! agent connects, binds, issues a request and unbinds. The seam between the
//! agent and the wire is a pair of traits so the protocol exchanges can be
//! mocked in tests.

use crate::config::DirectoryConfig;
use crate::entry::{DirectoryEntry, ReplaceAttribute};
use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings, Mod, Scope, SearchEntry};
use ldapauth_core::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// LDAP result code for a successful operation.
const RC_SUCCESS: u32 = 0;
/// LDAP result code for refused credentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Outcome of a bind attempt on an open connection.
///
/// A refused bind is an expected, frequent outcome and is kept apart from
/// transport failures, which surface as [`Error::Unreachable`] or
/// [`Error::Timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The session is authenticated and usable.
    Bound,
    /// The server refused the credentials.
    Rejected,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait DirectorySession: Send {
    /// Authenticates the connection as `dn`.
    async fn simple_bind(&mut self, dn: &str, secret: &str) -> Result<BindOutcome>;

    /// Subtree search under `base_dn`; decoded entries in server order.
    async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attributes: &[&'static str],
    ) -> Result<Vec<DirectoryEntry>>;

    /// Creates an entry; `Ok(false)` when the server rejects the write.
    async fn add(&mut self, dn: &str, attributes: Vec<(String, HashSet<String>)>) -> Result<bool>;

    /// Applies replace directives as one modify request; `Ok(false)` when the
    /// server rejects it.
    async fn replace(&mut self, dn: &str, changes: Vec<ReplaceAttribute>) -> Result<bool>;

    /// Removes an entry; `Ok(false)` when the server rejects the removal.
    async fn delete(&mut self, dn: &str) -> Result<bool>;

    /// Releases the session.
    async fn unbind(&mut self) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait SessionConnector: Send + Sync {
    /// Opens an unauthenticated connection to the configured endpoint.
    async fn connect(&self) -> Result<Box<dyn DirectorySession>>;
}

/// Connector backed by `ldap3`.
pub(crate) struct LdapConnector {
    config: Arc<DirectoryConfig>,
}

impl LdapConnector {
    pub(crate) fn new(config: Arc<DirectoryConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionConnector for LdapConnector {
    async fn connect(&self) -> Result<Box<dyn DirectorySession>> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.config.connection_timeout());
        let url = self.config.endpoint().url();
        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|err| Error::Unreachable(format!("{url}: {err}")))?;
        ldap3::drive!(conn);
        Ok(Box::new(LdapDirectorySession {
            inner: ldap,
            operation_timeout: self.config.operation_timeout(),
        }))
    }
}

struct LdapDirectorySession {
    inner: ldap3::Ldap,
    operation_timeout: Duration,
}

#[async_trait]
impl DirectorySession for LdapDirectorySession {
    async fn simple_bind(&mut self, dn: &str, secret: &str) -> Result<BindOutcome> {
        let result = timeout(self.operation_timeout, self.inner.simple_bind(dn, secret))
            .await
            .map_err(|_| Error::Timeout("bind timed out".to_string()))?
            .map_err(|err| map_ldap_error("bind", err))?;
        match result.rc {
            RC_SUCCESS => Ok(BindOutcome::Bound),
            RC_INVALID_CREDENTIALS => Ok(BindOutcome::Rejected),
            rc => Err(Error::Protocol(format!(
                "bind failed with result code {rc}: {}",
                result.text
            ))),
        }
    }

    async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attributes: &[&'static str],
    ) -> Result<Vec<DirectoryEntry>> {
        let result = timeout(
            self.operation_timeout,
            self.inner
                .search(base_dn, Scope::Subtree, filter, attributes.to_vec()),
        )
        .await
        .map_err(|_| Error::Timeout("search timed out".to_string()))?
        .map_err(|err| map_ldap_error("search", err))?;
        let (entries, _) = result.success().map_err(|err| map_ldap_error("search", err))?;
        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| DirectoryEntry {
                dn: entry.dn,
                attributes: entry.attrs,
            })
            .collect())
    }

    async fn add(&mut self, dn: &str, attributes: Vec<(String, HashSet<String>)>) -> Result<bool> {
        let result = timeout(self.operation_timeout, self.inner.add(dn, attributes))
            .await
            .map_err(|_| Error::Timeout("add timed out".to_string()))?
            .map_err(|err| map_ldap_error("add", err))?;
        Ok(write_accepted("add", dn, &result))
    }

    async fn replace(&mut self, dn: &str, changes: Vec<ReplaceAttribute>) -> Result<bool> {
        let mods = changes
            .into_iter()
            .map(|change| {
                Mod::Replace(
                    change.attribute,
                    change.values.into_iter().collect::<HashSet<_>>(),
                )
            })
            .collect::<Vec<_>>();
        let result = timeout(self.operation_timeout, self.inner.modify(dn, mods))
            .await
            .map_err(|_| Error::Timeout("modify timed out".to_string()))?
            .map_err(|err| map_ldap_error("modify", err))?;
        Ok(write_accepted("modify", dn, &result))
    }

    async fn delete(&mut self, dn: &str) -> Result<bool> {
        let result = timeout(self.operation_timeout, self.inner.delete(dn))
            .await
            .map_err(|_| Error::Timeout("delete timed out".to_string()))?
            .map_err(|err| map_ldap_error("delete", err))?;
        Ok(write_accepted("delete", dn, &result))
    }

    async fn unbind(&mut self) -> Result<()> {
        timeout(self.operation_timeout, self.inner.unbind())
            .await
            .map_err(|_| Error::Timeout("unbind timed out".to_string()))?
            .map_err(|err| map_ldap_error("unbind", err))?;
        Ok(())
    }
}

/// Classifies an `ldap3` error: connection-level failures become
/// [`Error::Unreachable`], everything else [`Error::Protocol`].
fn map_ldap_error(what: &str, err: ldap3::LdapError) -> Error {
    match err {
        ldap3::LdapError::Io { source } => Error::Unreachable(format!("{what}: {source}")),
        ldap3::LdapError::EndOfStream => {
            Error::Unreachable(format!("{what}: connection closed by server"))
        }
        other => Error::Protocol(format!("{what}: {other}")),
    }
}

/// Maps a write result to the boolean contract; a non-zero result code is a
/// server rejection, not an error.
fn write_accepted(what: &str, dn: &str, result: &ldap3::LdapResult) -> bool {
    if result.rc == RC_SUCCESS {
        true
    } else {
        debug!(%dn, rc = result.rc, text = %result.text, "directory rejected {what}");
        false
    }
}
