//! Policy configuration.
//!
//! The policy reads two flat sections of string options:
//!
//! - `configuratable-permission-rules`: one rule per key, in declaration order
//! - `configuratable-permission`: action names flagged `enabled` are claimed
//!   by this policy
//!
//! Those are the section names existing deployments use. The corrected
//! spellings (`configurable-permission-rules`, `configurable-permission`)
//! are accepted as aliases when deserializing.
//!
//! Reading raw configuration files is left to the host; sections can be
//! built from any ordered list of pairs or deserialized with serde (JSON
//! via [`PolicyConfig::from_json`]).

use std::collections::HashSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PolicyError, PolicyResult};

/// Name of the rule section.
pub const RULES_SECTION: &str = "configuratable-permission-rules";

/// Name of the action flag section.
pub const ACTIONS_SECTION: &str = "configuratable-permission";

/// Accepted alias for [`RULES_SECTION`].
pub const RULES_SECTION_ALIAS: &str = "configurable-permission-rules";

/// Accepted alias for [`ACTIONS_SECTION`].
pub const ACTIONS_SECTION_ALIAS: &str = "configurable-permission";

/// Flag value that marks an action as governed by this policy.
pub const ENABLED: &str = "enabled";

/// Ordered `(key, value)` options of one configuration section.
///
/// Declaration order is kept, including when deserializing from a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSection {
    entries: Vec<(String, String)>,
}

impl ConfigSection {
    /// Create an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Append an option, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Get the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the section has no options.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect the upper-cased keys whose value is exactly [`ENABLED`].
    ///
    /// # Example
    ///
    /// ```
    /// use confperm_policy::ConfigSection;
    ///
    /// let flags = ConfigSection::new()
    ///     .with("ticket_view", "enabled")
    ///     .with("wiki_view", "disabled");
    /// let actions = flags.enabled_keys();
    /// assert!(actions.contains("TICKET_VIEW"));
    /// assert_eq!(actions.len(), 1);
    /// ```
    pub fn enabled_keys(&self) -> HashSet<String> {
        self.iter()
            .filter(|(_, value)| *value == ENABLED)
            .map(|(key, _)| key.to_uppercase())
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigSection
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for ConfigSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

struct SectionVisitor;

impl<'de> Visitor<'de> for SectionVisitor {
    type Value = ConfigSection;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of string options")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut section = ConfigSection::new();
        while let Some((key, value)) = map.next_entry::<String, String>()? {
            section.push(key, value);
        }
        Ok(section)
    }
}

impl<'de> Deserialize<'de> for ConfigSection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SectionVisitor)
    }
}

/// Both sections read by the policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Rule definitions.
    #[serde(
        rename = "configuratable-permission-rules",
        alias = "configurable-permission-rules",
        default
    )]
    pub rules: ConfigSection,

    /// Action enablement flags.
    #[serde(
        rename = "configuratable-permission",
        alias = "configurable-permission",
        default
    )]
    pub actions: ConfigSection,
}

impl PolicyConfig {
    /// Create a configuration from its two sections.
    pub fn new(rules: ConfigSection, actions: ConfigSection) -> Self {
        Self { rules, actions }
    }

    /// Read a JSON document holding the two sections.
    ///
    /// Missing sections are empty. Other top-level keys are ignored. Each
    /// section may use either its name or its alias, but not both.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Config`] if the document is not valid JSON or a
    /// section is not an object of string values.
    ///
    /// # Example
    ///
    /// ```
    /// use confperm_policy::PolicyConfig;
    ///
    /// let config = PolicyConfig::from_json(r#"{
    ///     "configuratable-permission-rules": {
    ///         "secret": "ticket, *, component=secret, SECRET_VIEW, allow-only"
    ///     },
    ///     "configuratable-permission": { "secret_view": "enabled" }
    /// }"#).unwrap();
    ///
    /// assert_eq!(config.rules.len(), 1);
    /// assert_eq!(config.actions.get("secret_view"), Some("enabled"));
    /// ```
    pub fn from_json(document: &str) -> PolicyResult<Self> {
        serde_json::from_str(document).map_err(|e| PolicyError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_keeps_declaration_order() {
        let section: ConfigSection = [("z", "1"), ("a", "2"), ("m", "3")].into_iter().collect();
        let keys: Vec<&str> = section.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_json_keeps_document_order() {
        let config = PolicyConfig::from_json(
            r#"{
                "configuratable-permission-rules": {
                    "zeta": "wiki, *, *, *, deny",
                    "alpha": "wiki, *, *, *, allow",
                    "mid": "ticket, *, *, *, pass"
                }
            }"#,
        )
        .unwrap();

        let keys: Vec<&str> = config.rules.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert!(config.actions.is_empty());
    }

    #[test]
    fn test_json_reads_deployed_section_names() {
        let config = PolicyConfig::from_json(
            r#"{
                "configuratable-permission-rules": {
                    "r": "wiki, *, *, WIKI_ADMIN, allow-only"
                },
                "configuratable-permission": { "wiki_admin": "enabled" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules.get("r"), Some("wiki, *, *, WIKI_ADMIN, allow-only"));
        assert_eq!(config.actions.enabled_keys(), HashSet::from(["WIKI_ADMIN".to_string()]));
    }

    #[test]
    fn test_json_accepts_section_aliases() {
        let config = PolicyConfig::from_json(&format!(
            r#"{{"{}": {{"r": "wiki, *, *, *, deny"}}, "{}": {{"wiki_view": "enabled"}}}}"#,
            RULES_SECTION_ALIAS, ACTIONS_SECTION_ALIAS
        ))
        .unwrap();

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.actions.len(), 1);
    }

    #[test]
    fn test_json_rejects_name_and_alias_together() {
        let err = PolicyConfig::from_json(
            r#"{"configuratable-permission": {}, "configurable-permission": {}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::Config(_)));
    }

    #[test]
    fn test_serialize_uses_deployed_section_names() {
        let config = PolicyConfig::new(
            ConfigSection::new().with("r", "wiki, *, *, *, deny"),
            ConfigSection::new(),
        );
        let value = serde_json::to_value(&config).unwrap();
        assert!(value.get(RULES_SECTION).is_some());
        assert!(value.get(ACTIONS_SECTION).is_some());
        assert!(value.get(RULES_SECTION_ALIAS).is_none());
    }

    #[test]
    fn test_json_rejects_non_string_values() {
        let err = PolicyConfig::from_json(r#"{"configuratable-permission": {"x": true}}"#).unwrap_err();
        assert!(matches!(err, PolicyError::Config(_)));
    }

    #[test]
    fn test_json_rejects_invalid_document() {
        assert!(PolicyConfig::from_json("[1, 2]").is_err());
        assert!(PolicyConfig::from_json("{").is_err());
    }

    #[test]
    fn test_enabled_keys() {
        let flags = ConfigSection::new()
            .with("ticket_view", "enabled")
            .with("wiki_admin", "Enabled")
            .with("report_view", "disabled")
            .with("Milestone_View", "enabled");

        let actions = flags.enabled_keys();
        assert_eq!(
            actions,
            HashSet::from(["TICKET_VIEW".to_string(), "MILESTONE_VIEW".to_string()])
        );
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = PolicyConfig::new(
            ConfigSection::new().with("b", "wiki, *, *, *, deny").with("a", "wiki, *, *, *, allow"),
            ConfigSection::new().with("wiki_view", ENABLED),
        );
        let json = serde_json::to_string(&config).unwrap();
        let back = PolicyConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_get_returns_first_value() {
        let section = ConfigSection::new().with("k", "first").with("k", "second");
        assert_eq!(section.get("k"), Some("first"));
        assert_eq!(section.get("missing"), None);
    }
}
