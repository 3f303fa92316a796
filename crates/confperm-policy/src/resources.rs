//! # Resources
//!
//! Defines the realms this policy understands and the resource handle
//! passed in by the host framework for each check.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category of the resource being authorized.
///
/// Only wiki pages and tickets are governed by rules. Every other realm is
/// carried through as [`Realm::Other`] and the policy abstains for it.
///
/// Serializes as its plain tag (`"wiki"`, `"ticket"`, `"milestone"`), the
/// same text [`Realm::as_str`] returns and [`Realm::parse`] reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Realm {
    /// Wiki pages, identified by page name.
    Wiki,
    /// Tickets, identified by ticket number.
    Ticket,
    /// Any realm without rules (changesets, milestones, ...).
    Other(String),
}

impl Realm {
    /// Get the string representation of the realm.
    pub fn as_str(&self) -> &str {
        match self {
            Realm::Wiki => "wiki",
            Realm::Ticket => "ticket",
            Realm::Other(name) => name,
        }
    }

    /// Parse a realm tag.
    ///
    /// Tags are exact: `"wiki"` and `"ticket"` map to their variants, anything
    /// else becomes [`Realm::Other`].
    ///
    /// # Example
    ///
    /// ```
    /// use confperm_policy::Realm;
    ///
    /// assert_eq!(Realm::parse("wiki"), Realm::Wiki);
    /// assert_eq!(Realm::parse("ticket"), Realm::Ticket);
    /// assert_eq!(Realm::parse("milestone"), Realm::Other("milestone".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "wiki" => Realm::Wiki,
            "ticket" => Realm::Ticket,
            other => Realm::Other(other.to_string()),
        }
    }

    /// Check if rules can target this realm.
    pub fn is_governed(&self) -> bool {
        matches!(self, Realm::Wiki | Realm::Ticket)
    }
}

impl std::fmt::Display for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Realm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Realm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Realm::parse(&tag))
    }
}

/// A resource under authorization: realm tag plus optional identifier.
///
/// A resource without an identifier denotes the realm as a whole (for
/// example "any ticket"). Ticket rules never apply to such a resource.
///
/// # Example
///
/// ```
/// use confperm_policy::{Realm, Resource};
///
/// let page = Resource::wiki("WikiStart");
/// assert_eq!(page.realm, Realm::Wiki);
/// assert_eq!(page.id.as_deref(), Some("WikiStart"));
///
/// let any_ticket = Resource::realm(Realm::Ticket);
/// assert!(any_ticket.id.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Resource {
    /// Realm the resource belongs to.
    pub realm: Realm,
    /// Identifier within the realm, if the check targets one instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Resource {
    /// Create a resource handle.
    pub fn new(realm: Realm, id: Option<String>) -> Self {
        Self { realm, id }
    }

    /// Create a handle for a realm as a whole.
    pub fn realm(realm: Realm) -> Self {
        Self { realm, id: None }
    }

    /// Create a handle for a wiki page.
    pub fn wiki(name: impl Into<String>) -> Self {
        Self {
            realm: Realm::Wiki,
            id: Some(name.into()),
        }
    }

    /// Create a handle for a ticket.
    pub fn ticket(id: impl ToString) -> Self {
        Self {
            realm: Realm::Ticket,
            id: Some(id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realm_parsing() {
        assert_eq!(Realm::parse("wiki"), Realm::Wiki);
        assert_eq!(Realm::parse("ticket"), Realm::Ticket);
        assert_eq!(
            Realm::parse("changeset"),
            Realm::Other("changeset".to_string())
        );
        // Realm tags are case-sensitive
        assert_eq!(Realm::parse("Wiki"), Realm::Other("Wiki".to_string()));
    }

    #[test]
    fn test_realm_as_str() {
        assert_eq!(Realm::Wiki.as_str(), "wiki");
        assert_eq!(Realm::Ticket.as_str(), "ticket");
        assert_eq!(Realm::Other("milestone".into()).as_str(), "milestone");
    }

    #[test]
    fn test_is_governed() {
        assert!(Realm::Wiki.is_governed());
        assert!(Realm::Ticket.is_governed());
        assert!(!Realm::Other("report".into()).is_governed());
    }

    #[test]
    fn test_realm_serializes_as_tag() {
        assert_eq!(serde_json::to_string(&Realm::Wiki).unwrap(), "\"wiki\"");
        assert_eq!(
            serde_json::to_string(&Realm::Other("milestone".into())).unwrap(),
            "\"milestone\""
        );

        let realm: Realm = serde_json::from_str("\"milestone\"").unwrap();
        assert_eq!(realm, Realm::Other("milestone".into()));
        let realm: Realm = serde_json::from_str("\"ticket\"").unwrap();
        assert_eq!(realm, Realm::Ticket);
    }

    #[test]
    fn test_resource_json_shape() {
        let json = serde_json::to_value(Resource::ticket(42)).unwrap();
        assert_eq!(json, serde_json::json!({"realm": "ticket", "id": "42"}));

        let whole: Resource = serde_json::from_str(r#"{"realm": "report"}"#).unwrap();
        assert_eq!(whole, Resource::realm(Realm::Other("report".into())));
    }

    #[test]
    fn test_resource_constructors() {
        let ticket = Resource::ticket(42);
        assert_eq!(ticket.realm, Realm::Ticket);
        assert_eq!(ticket.id.as_deref(), Some("42"));

        let page = Resource::wiki("GettingStarted");
        assert_eq!(page.id.as_deref(), Some("GettingStarted"));

        let whole = Resource::new(Realm::Wiki, None);
        assert_eq!(whole, Resource::realm(Realm::Wiki));
    }
}
