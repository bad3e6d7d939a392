//! The directory agent facade.

use crate::config::DirectoryConfig;
use crate::dn::{self, DistinguishedName};
use crate::entry::{self, DirectoryEntry};
use crate::session::{BindOutcome, DirectorySession, LdapConnector, SessionConnector};
use ldap3::ldap_escape;
use ldapauth_core::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Attribute selection for user lookups; `*` requests every user attribute.
const ALL_ATTRIBUTES: &[&str] = &["*"];

/// Facade over one directory server for credential verification and user
/// entry management.
///
/// End-user authentication needs no privileged setup. The CRUD operations
/// require a configured base DN and administrative credentials, and each
/// opens its own short-lived administrative session: connect, bind, one
/// request, unbind. Unbind runs on every exit path once a session is open.
pub struct DirectoryAgent {
    config: Arc<DirectoryConfig>,
    connector: Box<dyn SessionConnector>,
}

impl DirectoryAgent {
    /// Creates an agent that connects to the configured endpoint over LDAP.
    #[must_use]
    pub fn new(config: DirectoryConfig) -> Self {
        let config = Arc::new(config);
        let connector: Box<dyn SessionConnector> = Box::new(LdapConnector::new(config.clone()));
        Self { config, connector }
    }

    #[cfg(test)]
    pub(crate) fn with_connector(config: DirectoryConfig, connector: Box<dyn SessionConnector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
        }
    }

    /// Verifies credentials by binding as `dn`.
    ///
    /// Returns `true` iff the bind succeeds. A refused bind and an
    /// unreachable server are both reported as `false`: downstream login
    /// flows depend on a plain success/fail signal. The distinction is
    /// logged here before it is collapsed. An empty secret is reported as
    /// `false` without contacting the server.
    pub async fn authenticate(&self, dn: &str, secret: &str) -> bool {
        // A simple bind with a DN and an empty password is an unauthenticated
        // bind (RFC 4513), which permissive servers answer with success.
        if secret.is_empty() {
            debug!(%dn, "empty secret treated as rejected bind");
            return false;
        }
        let mut session = match self.connector.connect().await {
            Ok(session) => session,
            Err(err) => {
                debug!(%dn, %err, "authentication failed before bind");
                return false;
            }
        };
        let outcome = session.simple_bind(dn, secret).await;
        close(&mut *session).await;

        match outcome {
            Ok(BindOutcome::Bound) => true,
            Ok(BindOutcome::Rejected) => {
                debug!(%dn, "bind rejected");
                false
            }
            Err(err) => {
                debug!(%dn, %err, "bind did not complete");
                false
            }
        }
    }

    /// Verifies credentials for the user entry `uid=<uid>,<base_dn>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if no base DN is configured and
    /// [`Error::InvalidIdentifier`] if `uid` is malformed; both are caller
    /// defects, distinct from an authentication failure.
    pub async fn authenticate_user(&self, uid: &str, secret: &str) -> Result<bool> {
        let user_dn = dn::user_dn(uid, self.base_dn()?)?;
        Ok(self.authenticate(user_dn.as_str(), secret).await)
    }

    /// Creates a user entry at `uid=<uid>,<base_dn>`.
    ///
    /// The entry carries the default `inetOrgPerson` attribute set derived
    /// from `uid` and `secret`, overridden by any `extra` attributes.
    /// Returns `Ok(false)` when the server rejects the write (for example a
    /// duplicate entry).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the base DN or administrative
    /// credentials are missing, [`Error::InvalidIdentifier`] for a malformed
    /// `uid`, and a transport error if the server cannot be reached.
    pub async fn add_user(
        &self,
        uid: &str,
        secret: &str,
        extra: Option<&HashMap<String, Vec<String>>>,
    ) -> Result<bool> {
        let user_dn = dn::user_dn(uid, self.base_dn()?)?;
        let attributes = entry::new_user_attributes(uid, secret, extra);

        let mut session = self.admin_session().await?;
        let result = session.add(user_dn.as_str(), attributes).await;
        close(&mut *session).await;
        result
    }

    /// Fetches the first user entry matching `(uid=<uid>)` under the base DN,
    /// or `None` when nothing matches.
    ///
    /// When several entries match, the first one as returned by the server is
    /// used; ordering among duplicates is server-defined.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the base DN or administrative
    /// credentials are missing, and a transport error if the server cannot be
    /// reached.
    pub async fn get_user(&self, uid: &str) -> Result<Option<DirectoryEntry>> {
        let base_dn = self.base_dn()?.clone();
        let filter = format!("(uid={})", ldap_escape(uid));

        let mut session = self.admin_session().await?;
        let result = session
            .search(base_dn.as_str(), &filter, ALL_ATTRIBUTES)
            .await;
        close(&mut *session).await;

        let mut entries = result?;
        if entries.len() > 1 {
            debug!(uid, matches = entries.len(), "multiple entries matched; using the first");
        }
        if entries.is_empty() {
            Ok(None)
        } else {
            Ok(Some(entries.remove(0)))
        }
    }

    /// Replaces attribute values on the user entry at `uid=<uid>,<base_dn>`.
    ///
    /// Each supplied attribute is replaced in full by the single new value;
    /// the directives are sent as one modify request. Returns `Ok(false)`
    /// when the server rejects the modification.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DirectoryAgent::add_user`].
    pub async fn update_user(
        &self,
        uid: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<bool> {
        let user_dn = dn::user_dn(uid, self.base_dn()?)?;
        let changes = entry::replace_changes(attributes);

        let mut session = self.admin_session().await?;
        let result = session.replace(user_dn.as_str(), changes).await;
        close(&mut *session).await;
        result
    }

    /// Removes the user entry at `uid=<uid>,<base_dn>`.
    ///
    /// Returns `Ok(false)` when the server rejects the removal, including
    /// when the entry does not exist; the two cases are not distinguished at
    /// this layer.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DirectoryAgent::add_user`].
    pub async fn delete_user(&self, uid: &str) -> Result<bool> {
        let user_dn = dn::user_dn(uid, self.base_dn()?)?;

        let mut session = self.admin_session().await?;
        let result = session.delete(user_dn.as_str()).await;
        close(&mut *session).await;
        result
    }

    fn base_dn(&self) -> Result<&DistinguishedName> {
        self.config
            .base_dn()
            .ok_or_else(|| Error::ConfigError("base DN not configured".to_string()))
    }

    /// Opens a session bound with the configured administrative credentials.
    async fn admin_session(&self) -> Result<Box<dyn DirectorySession>> {
        let credentials = self.config.admin_credentials().ok_or_else(|| {
            Error::ConfigError("administrative bind credentials not configured".to_string())
        })?;

        let mut session = self.connector.connect().await?;
        match session
            .simple_bind(credentials.bind_dn(), credentials.secret())
            .await
        {
            Ok(BindOutcome::Bound) => Ok(session),
            Ok(BindOutcome::Rejected) => {
                close(&mut *session).await;
                Err(Error::BindRejected(credentials.bind_dn().to_string()))
            }
            Err(err) => {
                close(&mut *session).await;
                Err(err)
            }
        }
    }
}

/// Releases a session, tolerating unbind failures: by this point the
/// operation's outcome is already decided.
async fn close(session: &mut dyn DirectorySession) {
    if let Err(err) = session.unbind().await {
        debug!(%err, "unbind failed");
    }
}
