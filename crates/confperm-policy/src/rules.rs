//! # Rules
//!
//! Typed authorization rules and the ordered store built from configuration.
//!
//! Each configuration entry is a `key = value` pair whose value holds five
//! comma-separated fields:
//!
//! ```text
//! type, action, selector, permission, outcome
//!
//! Examples:
//!   wiki, *, PrivateNotes, WIKI_ADMIN, deny
//!   ticket, TICKET_VIEW, component=secret, SECRET_VIEW, allow-only
//! ```
//!
//! Order is significant: the first matching rule of a realm decides.

use serde::{Deserialize, Serialize};

use crate::error::RuleIssue;
use crate::outcome::Outcome;

/// Check if a rule field is a wildcard (`""` or `"*"`).
///
/// Wildcard actions match every action, wildcard permissions are always
/// satisfied and wildcard selectors match every resource of the realm.
pub fn is_wildcard(value: &str) -> bool {
    value.is_empty() || value == "*"
}

/// Resource selector of a rule, one variant per governed realm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selector {
    /// Wiki page name, matched exactly against the resource id.
    Wiki {
        /// Page name, or a wildcard for every page
        page: String,
    },
    /// Ticket filter fragment, evaluated against the ticket dataset.
    Ticket {
        /// Filter expression, or a wildcard for every ticket
        filter: String,
    },
}

impl Selector {
    /// Raw selector text as configured.
    pub fn as_str(&self) -> &str {
        match self {
            Selector::Wiki { page } => page,
            Selector::Ticket { filter } => filter,
        }
    }

    /// Check if the selector matches every resource of its realm.
    pub fn is_wildcard(&self) -> bool {
        is_wildcard(self.as_str())
    }
}

/// One configured authorization rule.
///
/// Rules are immutable once built and owned by their [`RuleStore`].
///
/// # Example
///
/// ```
/// use confperm_policy::{Outcome, Rule};
///
/// let rule = Rule::ticket("secret", "TICKET_VIEW", "component=secret", "SECRET_VIEW", Outcome::AllowOnly);
/// assert!(rule.applies_to_action("TICKET_VIEW"));
/// assert!(!rule.applies_to_action("TICKET_MODIFY"));
/// assert!(!rule.permission_is_wildcard());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rule {
    /// Rule identifier (configuration key).
    pub name: String,
    /// Action the rule applies to, or a wildcard for every action.
    pub action: String,
    /// Resource selector.
    pub selector: Selector,
    /// Permission the principal must hold, or a wildcard for none.
    pub permission: String,
    /// How a match translates into a decision.
    pub outcome: Outcome,
}

impl Rule {
    /// Create a wiki rule.
    pub fn wiki(
        name: impl Into<String>,
        action: impl Into<String>,
        page: impl Into<String>,
        permission: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            selector: Selector::Wiki { page: page.into() },
            permission: permission.into(),
            outcome,
        }
    }

    /// Create a ticket rule.
    pub fn ticket(
        name: impl Into<String>,
        action: impl Into<String>,
        filter: impl Into<String>,
        permission: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            selector: Selector::Ticket {
                filter: filter.into(),
            },
            permission: permission.into(),
            outcome,
        }
    }

    /// Check if the rule applies to `action`.
    pub fn applies_to_action(&self, action: &str) -> bool {
        is_wildcard(&self.action) || self.action == action
    }

    /// Check if the rule requires no permission at all.
    pub fn permission_is_wildcard(&self) -> bool {
        is_wildcard(&self.permission)
    }
}

/// Ordered wiki and ticket rules built from one configuration section.
///
/// The store is never patched: reconfiguration builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStore {
    wiki: Vec<Rule>,
    ticket: Vec<Rule>,
}

impl RuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(key, value)` entries, logging any issues.
    ///
    /// # Example
    ///
    /// ```
    /// use confperm_policy::RuleStore;
    ///
    /// let store = RuleStore::build([
    ///     ("private", "wiki, *, Private, WIKI_ADMIN, allow-only"),
    ///     ("broken", "wiki, *, WIKI_ADMIN, deny"),
    /// ]);
    /// assert_eq!(store.wiki_rules().len(), 1);
    /// assert!(store.ticket_rules().is_empty());
    /// ```
    pub fn build<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::build_with_issues(entries).0
    }

    /// Build a store and also return the issues found along the way.
    ///
    /// Malformed entries and entries of an unsupported type are dropped;
    /// unknown outcomes are coerced to [`Outcome::Pass`]. Every issue is
    /// logged at warn level. Accepted rules keep their input order.
    pub fn build_with_issues<I, K, V>(entries: I) -> (Self, Vec<RuleIssue>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut store = Self::new();
        let mut issues = Vec::new();

        for (key, value) in entries {
            let name = key.as_ref();
            let fields: Vec<&str> = value.as_ref().split(',').map(str::trim).collect();

            let [kind, action, selector, permission, outcome] = fields[..] else {
                issues.push(RuleIssue::Malformed {
                    rule: name.to_string(),
                    fields: fields.len(),
                });
                continue;
            };

            let outcome = match Outcome::parse(outcome) {
                Some(outcome) => outcome,
                None => {
                    issues.push(RuleIssue::InvalidOutcome {
                        rule: name.to_string(),
                        token: outcome.to_string(),
                    });
                    Outcome::Pass
                }
            };

            match kind {
                "ticket" => store
                    .ticket
                    .push(Rule::ticket(name, action, selector, permission, outcome)),
                "wiki" => store
                    .wiki
                    .push(Rule::wiki(name, action, selector, permission, outcome)),
                other => issues.push(RuleIssue::UnsupportedType {
                    rule: name.to_string(),
                    kind: other.to_string(),
                }),
            }
        }

        for issue in &issues {
            tracing::warn!(rule = %issue.rule(), "ConfigurablePermissionPolicy: {}", issue);
        }

        tracing::debug!(
            wiki_rules = store.wiki.len(),
            ticket_rules = store.ticket.len(),
            issues = issues.len(),
            "Built permission rule store"
        );

        (store, issues)
    }

    /// Wiki rules in declaration order.
    pub fn wiki_rules(&self) -> &[Rule] {
        &self.wiki
    }

    /// Ticket rules in declaration order.
    pub fn ticket_rules(&self) -> &[Rule] {
        &self.ticket
    }

    /// Total number of rules.
    pub fn len(&self) -> usize {
        self.wiki.len() + self.ticket.len()
    }

    /// Check if the store holds no rules.
    pub fn is_empty(&self) -> bool {
        self.wiki.is_empty() && self.ticket.is_empty()
    }
}
