//! LDAP directory authentication and user management agent.
//!
//! This crate wraps a single-server LDAP directory behind a small facade:
//! credential verification by binding as the user, and administrative
//! create/read/update/delete of user entries through short-lived privileged
//! sessions. Every operation opens its own connection, binds, runs one
//! request and unbinds; no session or entry state survives a call.

#![deny(missing_docs)]

mod agent;
mod config;
mod dn;
mod entry;
mod session;

pub use agent::DirectoryAgent;
pub use config::{
    DirectoryConfig, DirectoryEndpoint, DEFAULT_CONNECTION_TIMEOUT_SECS,
    DEFAULT_OPERATION_TIMEOUT_SECS, DEFAULT_PORT,
};
pub use dn::{user_dn, validate_uid, DistinguishedName};
pub use entry::DirectoryEntry;

/// Convenient result alias that reuses the core error type.
pub type Result<T> = ldapauth_core::Result<T>;
