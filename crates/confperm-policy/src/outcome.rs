//! # Outcomes
//!
//! Defines the outcome directive carried by every rule.
//! The outcome controls how a matched rule turns into a decision.

use serde::{Deserialize, Serialize};

/// Outcome directive of a rule.
///
/// Each outcome has a positive branch (the principal holds the rule's
/// permission, or the rule requires none) and a negative branch:
///
/// | Outcome      | positive | negative |
/// |--------------|----------|----------|
/// | `allow`      | allow    | abstain  |
/// | `allow-only` | allow    | deny     |
/// | `deny`       | deny     | abstain  |
/// | `pass`       | abstain  | abstain  |
/// | `pass-only`  | abstain  | deny     |
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Allow when the permission is held, otherwise no opinion.
    Allow,

    /// Allow when the permission is held, otherwise deny.
    AllowOnly,

    /// Deny when the permission is held, otherwise no opinion.
    Deny,

    /// No opinion either way.
    #[default]
    Pass,

    /// No opinion when the permission is held, otherwise deny.
    PassOnly,
}

impl Outcome {
    /// Get the configuration token of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Allow => "allow",
            Outcome::AllowOnly => "allow-only",
            Outcome::Deny => "deny",
            Outcome::Pass => "pass",
            Outcome::PassOnly => "pass-only",
        }
    }

    /// Parse an outcome from its configuration token.
    ///
    /// Matching is case-insensitive. Unknown tokens yield `None`; the rule
    /// store coerces those to [`Outcome::Pass`].
    ///
    /// # Example
    ///
    /// ```
    /// use confperm_policy::Outcome;
    ///
    /// assert_eq!(Outcome::parse("allow"), Some(Outcome::Allow));
    /// assert_eq!(Outcome::parse("Allow-Only"), Some(Outcome::AllowOnly));
    /// assert_eq!(Outcome::parse("PASS-ONLY"), Some(Outcome::PassOnly));
    /// assert_eq!(Outcome::parse("grant"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "allow" => Some(Outcome::Allow),
            "allow-only" => Some(Outcome::AllowOnly),
            "deny" => Some(Outcome::Deny),
            "pass" => Some(Outcome::Pass),
            "pass-only" => Some(Outcome::PassOnly),
            _ => None,
        }
    }

    /// Get all outcomes.
    pub fn all() -> Vec<Self> {
        vec![
            Outcome::Allow,
            Outcome::AllowOnly,
            Outcome::Deny,
            Outcome::Pass,
            Outcome::PassOnly,
        ]
    }

    /// Check if a missing permission forces an explicit deny.
    ///
    /// Only `allow-only` and `pass-only` are exclusive.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Outcome::AllowOnly | Outcome::PassOnly)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
