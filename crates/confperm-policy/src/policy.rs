//! Policy facade
//!
//! This module wires rule selection and decision resolution together for
//! each check, and owns the current rule snapshot.
//!
//! ## Reconfiguration
//!
//! A [`PolicySnapshot`] is immutable. [`ConfigurablePermissionPolicy::reload`]
//! builds a fresh snapshot and swaps the pointer; checks already running keep
//! the snapshot they started with.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::PolicyConfig;
use crate::error::{PolicyResult, RuleIssue};
use crate::matcher::ResourceMatcher;
use crate::permissions::PermissionDirectory;
use crate::query::TicketQuery;
use crate::resolver::{resolve_for, Decision};
use crate::resources::Resource;
use crate::rules::{Rule, RuleStore};

/// Immutable rules and governed actions built from one configuration.
#[derive(Debug, Clone, Default)]
pub struct PolicySnapshot {
    rules: RuleStore,
    actions: HashSet<String>,
    issues: Vec<RuleIssue>,
}

impl PolicySnapshot {
    /// Build a snapshot from configuration.
    pub fn build(config: &PolicyConfig) -> Self {
        let (rules, issues) = RuleStore::build_with_issues(config.rules.iter());
        Self {
            rules,
            actions: config.actions.enabled_keys(),
            issues,
        }
    }

    /// The ordered rules.
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Action names claimed by this policy (upper-cased).
    pub fn governed_actions(&self) -> &HashSet<String> {
        &self.actions
    }

    /// Issues reported while building the rules.
    pub fn issues(&self) -> &[RuleIssue] {
        &self.issues
    }

    /// Select the deciding rule for a check.
    ///
    /// # Errors
    ///
    /// Propagates ticket query faults.
    pub fn matching_rule<'a>(
        &'a self,
        query: &'a dyn TicketQuery,
        action: &str,
        resource: Option<&Resource>,
    ) -> PolicyResult<Option<&'a Rule>> {
        ResourceMatcher::new(&self.rules, query).find(action, resource)
    }

    /// Decide a check against this snapshot.
    ///
    /// # Errors
    ///
    /// Propagates ticket query faults.
    pub fn check_permission(
        &self,
        query: &dyn TicketQuery,
        action: &str,
        username: &str,
        resource: Option<&Resource>,
        permissions: &dyn PermissionDirectory,
    ) -> PolicyResult<Decision> {
        match self.matching_rule(query, action, resource)? {
            Some(rule) => Ok(resolve_for(rule, username, permissions)),
            None => Ok(Decision::Abstain),
        }
    }
}

/// Rule-based permission policy voting allow / deny / abstain.
///
/// Cheap to share: wrap it in an `Arc` and call it from any thread.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "memory")]
/// # {
/// use std::sync::Arc;
/// use confperm_policy::{
///     ConfigSection, ConfigurablePermissionPolicy, Decision, MemoryPermissionStore,
///     MemoryTicketStore, PolicyConfig, Resource, Ticket,
/// };
///
/// let tickets = Arc::new(MemoryTicketStore::new(["milestone"]));
/// tickets.insert(Ticket::new(42).with_field("milestone", "1.0"));
///
/// let config = PolicyConfig::new(
///     ConfigSection::new().with("release", "ticket, view, milestone=1.0, TICKET_VIEW, allow"),
///     ConfigSection::new().with("view", "enabled"),
/// );
/// let policy = ConfigurablePermissionPolicy::new(&config, tickets);
///
/// let perms = MemoryPermissionStore::from_grants([("alice", "TICKET_VIEW")]);
/// let ticket = Resource::ticket(42);
///
/// assert_eq!(policy.check_permission("view", "alice", Some(&ticket), &perms).unwrap(), Decision::Allow);
/// assert_eq!(policy.check_permission("view", "bob", Some(&ticket), &perms).unwrap(), Decision::Abstain);
/// assert!(policy.governed_actions().contains("VIEW"));
/// # }
/// ```
pub struct ConfigurablePermissionPolicy {
    snapshot: RwLock<Arc<PolicySnapshot>>,
    query: Arc<dyn TicketQuery>,
}

impl std::fmt::Debug for ConfigurablePermissionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurablePermissionPolicy")
            .field("snapshot", &*self.snapshot.read())
            .finish()
    }
}

impl ConfigurablePermissionPolicy {
    /// Create a policy from configuration and a ticket dataset.
    pub fn new(config: &PolicyConfig, query: Arc<dyn TicketQuery>) -> Self {
        let snapshot = PolicySnapshot::build(config);
        tracing::info!(
            rules = snapshot.rules.len(),
            governed_actions = snapshot.actions.len(),
            "ConfigurablePermissionPolicy initialized"
        );
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            query,
        }
    }

    /// Replace the rules with ones built from `config`.
    ///
    /// Returns the issues found in the new configuration.
    pub fn reload(&self, config: &PolicyConfig) -> Vec<RuleIssue> {
        let snapshot = PolicySnapshot::build(config);
        let issues = snapshot.issues.clone();
        tracing::info!(
            rules = snapshot.rules.len(),
            governed_actions = snapshot.actions.len(),
            issues = issues.len(),
            "ConfigurablePermissionPolicy reloaded"
        );
        *self.snapshot.write() = Arc::new(snapshot);
        issues
    }

    /// Get the current snapshot.
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Action names this policy claims authority over (upper-cased).
    ///
    /// Informational for the host: checks for other actions still run and
    /// simply abstain when no rule matches.
    pub fn governed_actions(&self) -> HashSet<String> {
        self.snapshot().actions.clone()
    }

    /// Decide whether `username` may perform `action` on `resource`.
    ///
    /// # Arguments
    ///
    /// * `action` - The action name being checked
    /// * `username` - The acting principal
    /// * `resource` - The target, or `None` for a global check
    /// * `permissions` - Principal-to-permission membership lookup
    ///
    /// # Errors
    ///
    /// Returns a query error if a ticket rule's filter is rejected by the
    /// ticket dataset. The check is aborted rather than defaulted.
    pub fn check_permission(
        &self,
        action: &str,
        username: &str,
        resource: Option<&Resource>,
        permissions: &dyn PermissionDirectory,
    ) -> PolicyResult<Decision> {
        let snapshot = self.snapshot();
        snapshot.check_permission(self.query.as_ref(), action, username, resource, permissions)
    }
}
