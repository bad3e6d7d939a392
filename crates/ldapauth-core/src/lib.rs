//! # ldapauth-core
//!
//! Shared foundation for the ldapauth directory agent: the error taxonomy
//! used across the workspace and the credential holder for bind operations.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod credentials;
pub mod error;

// Re-export commonly used types
pub use credentials::BindCredentials;
pub use error::{Error, Result};
