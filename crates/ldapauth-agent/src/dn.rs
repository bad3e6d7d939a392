//! Distinguished name handling and user identifier validation.

use ldapauth_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters with structural meaning in a DN. A user identifier containing
/// any of these is rejected outright rather than escaped, so an identifier
/// like `x,ou=admin` can never redirect an operation to another entry.
const DN_METACHARACTERS: &[char] = &[',', '+', '"', '\\', '<', '>', ';'];

/// A syntactically validated distinguished name.
///
/// Parsing checks shape only: the DN must consist of non-empty
/// `attribute=value` components separated by unescaped commas. Whether the
/// name addresses an existing entry is for the server to decide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistinguishedName {
    raw: String,
}

impl DistinguishedName {
    /// Parses a distinguished name from a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDn`] if the input is empty, a component lacks
    /// an attribute or value, or an escape sequence is left unterminated.
    pub fn parse(input: impl AsRef<str>) -> Result<Self> {
        let raw = input.as_ref().trim();
        if raw.is_empty() {
            return Err(Error::InvalidDn("empty distinguished name".to_string()));
        }

        for component in split_unescaped(raw)? {
            validate_component(&component)?;
        }

        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// Borrows the distinguished name string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DistinguishedName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DistinguishedName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<DistinguishedName> for String {
    fn from(value: DistinguishedName) -> Self {
        value.raw
    }
}

/// Checks that `uid` is safe to interpolate into a DN.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] if the identifier is empty, carries
/// leading or trailing whitespace, starts with `#`, or contains a DN
/// metacharacter or control character.
pub fn validate_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(Error::InvalidIdentifier("identifier is empty".to_string()));
    }
    if uid.trim() != uid {
        return Err(Error::InvalidIdentifier(format!(
            "`{uid}` has leading or trailing whitespace"
        )));
    }
    if uid.starts_with('#') {
        return Err(Error::InvalidIdentifier(format!(
            "`{uid}` starts with a reserved character"
        )));
    }
    if let Some(ch) = uid
        .chars()
        .find(|ch| DN_METACHARACTERS.contains(ch) || ch.is_control())
    {
        return Err(Error::InvalidIdentifier(format!(
            "`{uid}` contains reserved character `{}`",
            ch.escape_default()
        )));
    }
    Ok(())
}

/// Builds the DN of the user entry for `uid` under `base`, in the form
/// `uid=<uid>,<base>`.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] if `uid` fails [`validate_uid`].
pub fn user_dn(uid: &str, base: &DistinguishedName) -> Result<DistinguishedName> {
    validate_uid(uid)?;
    // The identifier is free of metacharacters, so plain interpolation keeps
    // the base DN's structure intact.
    Ok(DistinguishedName {
        raw: format!("uid={uid},{base}"),
    })
}

/// Splits a DN on unescaped commas.
fn split_unescaped(input: &str) -> Result<Vec<String>> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for ch in input.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            current.push(ch);
            escaped = true;
        } else if ch == ',' {
            components.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }

    if escaped {
        return Err(Error::InvalidDn(format!(
            "`{input}` ends with an unterminated escape sequence"
        )));
    }

    components.push(current);
    Ok(components)
}

/// Checks one `attribute=value` component.
fn validate_component(component: &str) -> Result<()> {
    let component = component.trim();
    let Some((attribute, value)) = component.split_once('=') else {
        return Err(Error::InvalidDn(format!(
            "component `{component}` is not of the form attribute=value"
        )));
    };
    if attribute.trim().is_empty() {
        return Err(Error::InvalidDn(format!(
            "component `{component}` is missing an attribute name"
        )));
    }
    if value.trim().is_empty() {
        return Err(Error::InvalidDn(format!(
            "component `{component}` is missing a value"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_dn() {
        let dn = DistinguishedName::parse("ou=people,dc=example,dc=com").unwrap();
        assert_eq!(dn.as_str(), "ou=people,dc=example,dc=com");
        assert_eq!(dn.to_string(), "ou=people,dc=example,dc=com");
    }

    #[test]
    fn parse_dn_with_escaped_comma() {
        let dn = DistinguishedName::parse("cn=Smith\\, John,ou=people,dc=example,dc=com").unwrap();
        assert_eq!(dn.as_str(), "cn=Smith\\, John,ou=people,dc=example,dc=com");
    }

    #[test]
    fn parse_rejects_empty_dn() {
        assert!(matches!(
            DistinguishedName::parse("  ").unwrap_err(),
            Error::InvalidDn(_)
        ));
    }

    #[test]
    fn parse_rejects_trailing_comma() {
        assert!(matches!(
            DistinguishedName::parse("ou=people,").unwrap_err(),
            Error::InvalidDn(_)
        ));
    }

    #[test]
    fn parse_rejects_missing_value() {
        assert!(matches!(
            DistinguishedName::parse("ou=,dc=example").unwrap_err(),
            Error::InvalidDn(_)
        ));
        assert!(matches!(
            DistinguishedName::parse("=people,dc=example").unwrap_err(),
            Error::InvalidDn(_)
        ));
        assert!(matches!(
            DistinguishedName::parse("people").unwrap_err(),
            Error::InvalidDn(_)
        ));
    }

    #[test]
    fn parse_rejects_unterminated_escape() {
        assert!(matches!(
            DistinguishedName::parse("cn=john\\").unwrap_err(),
            Error::InvalidDn(_)
        ));
    }

    #[test]
    fn user_dn_appends_base() {
        let base = DistinguishedName::parse("ou=people,dc=example,dc=com").unwrap();
        let dn = user_dn("alice", &base).unwrap();
        assert_eq!(dn.as_str(), "uid=alice,ou=people,dc=example,dc=com");
    }

    #[test]
    fn user_dn_rejects_injection() {
        let base = DistinguishedName::parse("ou=people,dc=example,dc=com").unwrap();
        let err = user_dn("x,ou=admin", &base).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier(_)));
    }

    #[test]
    fn validate_uid_accepts_common_identifiers() {
        for uid in ["alice", "j.doe", "user_01", "björn", "a-b"] {
            assert!(validate_uid(uid).is_ok(), "expected `{uid}` to be valid");
        }
    }

    #[test]
    fn validate_uid_rejects_metacharacters() {
        for uid in [
            "a,b", "a+b", "a\"b", "a\\b", "a<b", "a>b", "a;b", "#root", " alice", "alice ",
            "a\0b", "",
        ] {
            assert!(
                matches!(validate_uid(uid), Err(Error::InvalidIdentifier(_))),
                "expected `{}` to be rejected",
                uid.escape_default()
            );
        }
    }
}
