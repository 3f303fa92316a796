//! Decision resolution
//!
//! Turns a matched rule into a decision, given whether the principal holds
//! the rule's permission.

use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;
use crate::permissions::PermissionDirectory;
use crate::rules::Rule;

/// Result of a permission check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Access is granted.
    Allow,
    /// Access is refused.
    Deny,
    /// This policy has no opinion; the host consults other policies.
    Abstain,
}

impl Decision {
    /// Convert to a tri-state vote (`None` for abstain).
    ///
    /// # Example
    ///
    /// ```
    /// use confperm_policy::Decision;
    ///
    /// assert_eq!(Decision::Allow.as_vote(), Some(true));
    /// assert_eq!(Decision::Deny.as_vote(), Some(false));
    /// assert_eq!(Decision::Abstain.as_vote(), None);
    /// ```
    pub fn as_vote(&self) -> Option<bool> {
        match self {
            Decision::Allow => Some(true),
            Decision::Deny => Some(false),
            Decision::Abstain => None,
        }
    }

    /// Get the string representation of the decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
            Decision::Abstain => "abstain",
        }
    }

    /// Check if this decision expresses an opinion.
    pub fn is_final(&self) -> bool {
        !matches!(self, Decision::Abstain)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply the outcome table.
///
/// `satisfied` is true when the rule needs no permission or the principal
/// holds it. Only `allow-only` and `pass-only` deny on failure.
pub fn decide(outcome: Outcome, satisfied: bool) -> Decision {
    match (outcome, satisfied) {
        (Outcome::Allow | Outcome::AllowOnly, true) => Decision::Allow,
        (Outcome::Deny, true) => Decision::Deny,
        (Outcome::Pass | Outcome::PassOnly, true) => Decision::Abstain,
        (Outcome::AllowOnly | Outcome::PassOnly, false) => Decision::Deny,
        (Outcome::Allow | Outcome::Deny | Outcome::Pass, false) => Decision::Abstain,
    }
}

/// Resolve a matched rule for a principal whose membership is already known.
///
/// A wildcard permission counts as held regardless of `has_permission`.
pub fn resolve(rule: &Rule, has_permission: bool) -> Decision {
    decide(rule.outcome, rule.permission_is_wildcard() || has_permission)
}

/// Resolve a matched rule, looking up membership only when the rule names a
/// permission.
pub fn resolve_for(rule: &Rule, username: &str, directory: &dyn PermissionDirectory) -> Decision {
    let satisfied =
        rule.permission_is_wildcard() || directory.has_permission(username, &rule.permission);
    let decision = decide(rule.outcome, satisfied);

    tracing::debug!(
        rule = %rule.name,
        outcome = %rule.outcome,
        permission = %rule.permission,
        satisfied,
        decision = %decision,
        "Resolved permission rule"
    );

    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_decision_table() {
        let cases = [
            (Outcome::Allow, true, Decision::Allow),
            (Outcome::Allow, false, Decision::Abstain),
            (Outcome::AllowOnly, true, Decision::Allow),
            (Outcome::AllowOnly, false, Decision::Deny),
            (Outcome::Deny, true, Decision::Deny),
            (Outcome::Deny, false, Decision::Abstain),
            (Outcome::Pass, true, Decision::Abstain),
            (Outcome::Pass, false, Decision::Abstain),
            (Outcome::PassOnly, true, Decision::Abstain),
            (Outcome::PassOnly, false, Decision::Deny),
        ];

        for (outcome, satisfied, expected) in cases {
            assert_eq!(
                decide(outcome, satisfied),
                expected,
                "outcome {outcome} with satisfied={satisfied}"
            );
        }
    }

    #[test]
    fn test_wildcard_permission_is_always_satisfied() {
        for permission in ["", "*"] {
            let rule = Rule::wiki("w", "*", "*", permission, Outcome::AllowOnly);
            assert_eq!(resolve(&rule, false), Decision::Allow);
        }
    }

    #[test]
    fn test_named_permission_follows_membership() {
        let rule = Rule::wiki("w", "*", "*", "WIKI_MODIFY", Outcome::Deny);
        assert_eq!(resolve(&rule, true), Decision::Deny);
        assert_eq!(resolve(&rule, false), Decision::Abstain);
    }

    struct Counting {
        holders: HashSet<String>,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl PermissionDirectory for Counting {
        fn users_with_permission(&self, _permission: &str) -> HashSet<String> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.holders.clone()
        }
    }

    #[test]
    fn test_resolve_for_skips_lookup_on_wildcard() {
        let directory = Counting {
            holders: HashSet::from(["alice".to_string()]),
            calls: Default::default(),
        };

        let open = Rule::ticket("t", "*", "*", "*", Outcome::Allow);
        assert_eq!(resolve_for(&open, "bob", &directory), Decision::Allow);
        assert_eq!(directory.calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        let guarded = Rule::ticket("t", "*", "*", "TICKET_VIEW", Outcome::PassOnly);
        assert_eq!(resolve_for(&guarded, "alice", &directory), Decision::Abstain);
        assert_eq!(resolve_for(&guarded, "bob", &directory), Decision::Deny);
        assert_eq!(directory.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_decision_vote_and_display() {
        assert!(Decision::Allow.is_final());
        assert!(Decision::Deny.is_final());
        assert!(!Decision::Abstain.is_final());
        assert_eq!(Decision::Abstain.to_string(), "abstain");
    }
}
