//! Directory entry representation and attribute wire mapping.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Object class assigned to entries created by the agent.
pub(crate) const NEW_USER_OBJECT_CLASS: &str = "inetOrgPerson";

/// A user entry as returned by the directory server.
///
/// Attribute values are kept exactly as the server provided them, without
/// further interpretation. The server remains the sole source of truth; the
/// agent never caches entries across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute map from name to one or more values.
    pub attributes: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// Returns the first value of the attribute if present.
    #[must_use]
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .get(attribute)
            .and_then(|values| values.first().map(String::as_str))
    }

    /// Returns all values for the attribute.
    #[must_use]
    pub fn values(&self, attribute: &str) -> Option<&[String]> {
        self.attributes
            .get(attribute)
            .map(|values| values.as_slice())
    }
}

/// One replace directive of a modify request. Existing values of the
/// attribute are discarded in full and replaced by `values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReplaceAttribute {
    pub(crate) attribute: String,
    pub(crate) values: Vec<String>,
}

/// Builds the full attribute set for a new user entry: the default
/// `inetOrgPerson` skeleton keyed off `uid`, overridden by any caller-supplied
/// attributes.
pub(crate) fn new_user_attributes(
    uid: &str,
    secret: &str,
    extra: Option<&HashMap<String, Vec<String>>>,
) -> Vec<(String, HashSet<String>)> {
    let mut attributes: HashMap<String, Vec<String>> = HashMap::from([
        (
            "objectClass".to_string(),
            vec![NEW_USER_OBJECT_CLASS.to_string()],
        ),
        ("uid".to_string(), vec![uid.to_string()]),
        ("sn".to_string(), vec![uid.to_string()]),
        ("cn".to_string(), vec![uid.to_string()]),
        ("userPassword".to_string(), vec![secret.to_string()]),
    ]);

    if let Some(extra) = extra {
        for (attribute, values) in extra {
            attributes.insert(attribute.clone(), values.clone());
        }
    }

    attributes
        .into_iter()
        .map(|(attribute, values)| (attribute, values.into_iter().collect()))
        .collect()
}

/// Encodes a flat attribute mapping as a replace-change list, one directive
/// per attribute, to be sent as a single modify request.
pub(crate) fn replace_changes(attributes: &HashMap<String, String>) -> Vec<ReplaceAttribute> {
    attributes
        .iter()
        .map(|(attribute, value)| ReplaceAttribute {
            attribute: attribute.clone(),
            values: vec![value.clone()],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(
        attributes: &'a [(String, HashSet<String>)],
        name: &str,
    ) -> Option<&'a HashSet<String>> {
        attributes
            .iter()
            .find(|(attribute, _)| attribute == name)
            .map(|(_, values)| values)
    }

    #[test]
    fn entry_accessors() {
        let entry = DirectoryEntry {
            dn: "uid=alice,ou=people,dc=example,dc=com".to_string(),
            attributes: HashMap::from([
                ("uid".to_string(), vec!["alice".to_string()]),
                (
                    "mail".to_string(),
                    vec!["a@example.com".to_string(), "alice@example.com".to_string()],
                ),
            ]),
        };

        assert_eq!(entry.first("uid"), Some("alice"));
        assert_eq!(entry.first("mail"), Some("a@example.com"));
        assert_eq!(entry.values("mail").unwrap().len(), 2);
        assert_eq!(entry.first("cn"), None);
        assert_eq!(entry.values("cn"), None);
    }

    #[test]
    fn new_user_defaults() {
        let attributes = new_user_attributes("alice", "pw1", None);

        assert_eq!(
            lookup(&attributes, "objectClass").unwrap(),
            &HashSet::from(["inetOrgPerson".to_string()])
        );
        assert_eq!(
            lookup(&attributes, "uid").unwrap(),
            &HashSet::from(["alice".to_string()])
        );
        assert_eq!(
            lookup(&attributes, "sn").unwrap(),
            &HashSet::from(["alice".to_string()])
        );
        assert_eq!(
            lookup(&attributes, "cn").unwrap(),
            &HashSet::from(["alice".to_string()])
        );
        assert_eq!(
            lookup(&attributes, "userPassword").unwrap(),
            &HashSet::from(["pw1".to_string()])
        );
        assert_eq!(attributes.len(), 5);
    }

    #[test]
    fn new_user_extras_override_defaults() {
        let extra = HashMap::from([
            ("sn".to_string(), vec!["Liddell".to_string()]),
            ("mail".to_string(), vec!["a@example.com".to_string()]),
        ]);
        let attributes = new_user_attributes("alice", "pw1", Some(&extra));

        assert_eq!(
            lookup(&attributes, "sn").unwrap(),
            &HashSet::from(["Liddell".to_string()])
        );
        assert_eq!(
            lookup(&attributes, "mail").unwrap(),
            &HashSet::from(["a@example.com".to_string()])
        );
        // untouched defaults survive the merge
        assert_eq!(
            lookup(&attributes, "cn").unwrap(),
            &HashSet::from(["alice".to_string()])
        );
        assert_eq!(attributes.len(), 6);
    }

    #[test]
    fn replace_changes_one_directive_per_attribute() {
        let requested = HashMap::from([
            ("userPassword".to_string(), "pw2".to_string()),
            ("mail".to_string(), "new@example.com".to_string()),
        ]);
        let mut changes = replace_changes(&requested);
        changes.sort_by(|a, b| a.attribute.cmp(&b.attribute));

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].attribute, "mail");
        assert_eq!(changes[0].values, vec!["new@example.com".to_string()]);
        assert_eq!(changes[1].attribute, "userPassword");
        assert_eq!(changes[1].values, vec!["pw2".to_string()]);
    }
}
