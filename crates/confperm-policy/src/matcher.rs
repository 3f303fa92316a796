//! Rule selection
//!
//! Finds the first rule of a resource's realm whose action and selector
//! match. Ticket selectors that are not wildcards are checked by asking the
//! ticket dataset whether the ticket satisfies the filter.

use crate::error::{PolicyError, PolicyResult};
use crate::query::TicketQuery;
use crate::resources::{Realm, Resource};
use crate::rules::{Rule, RuleStore};

/// Selects the deciding rule for a check.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "memory")]
/// # {
/// use confperm_policy::{MemoryTicketStore, Resource, ResourceMatcher, RuleStore};
///
/// let store = RuleStore::build([
///     ("front", "wiki, *, WikiStart, *, allow"),
///     ("rest", "wiki, *, *, WIKI_VIEW, pass"),
/// ]);
/// let tickets = MemoryTicketStore::default();
/// let matcher = ResourceMatcher::new(&store, &tickets);
///
/// let rule = matcher.find("WIKI_VIEW", Some(&Resource::wiki("WikiStart"))).unwrap();
/// assert_eq!(rule.map(|r| r.name.as_str()), Some("front"));
///
/// let rule = matcher.find("WIKI_VIEW", Some(&Resource::wiki("Other"))).unwrap();
/// assert_eq!(rule.map(|r| r.name.as_str()), Some("rest"));
/// # }
/// ```
pub struct ResourceMatcher<'a> {
    store: &'a RuleStore,
    query: &'a dyn TicketQuery,
}

impl<'a> ResourceMatcher<'a> {
    /// Create a matcher over `store`, resolving ticket filters with `query`.
    pub fn new(store: &'a RuleStore, query: &'a dyn TicketQuery) -> Self {
        Self { store, query }
    }

    /// Find the first rule matching `action` on `resource`.
    ///
    /// Returns `Ok(None)` when there is no resource, the realm has no rules,
    /// or no rule matches. Later rules are never consulted once one matches.
    ///
    /// # Errors
    ///
    /// Returns a query error if the ticket dataset rejects a rule's filter.
    /// Such errors are never treated as "no match".
    pub fn find(&self, action: &str, resource: Option<&Resource>) -> PolicyResult<Option<&'a Rule>> {
        let Some(resource) = resource else {
            return Ok(None);
        };

        match &resource.realm {
            Realm::Ticket => self.find_ticket_rule(action, resource.id.as_deref()),
            Realm::Wiki => Ok(self.find_wiki_rule(action, resource.id.as_deref())),
            Realm::Other(_) => Ok(None),
        }
    }

    fn find_wiki_rule(&self, action: &str, page: Option<&str>) -> Option<&'a Rule> {
        self.store.wiki_rules().iter().find(|rule| {
            rule.applies_to_action(action)
                && (rule.selector.is_wildcard() || Some(rule.selector.as_str()) == page)
        })
    }

    fn find_ticket_rule(&self, action: &str, id: Option<&str>) -> PolicyResult<Option<&'a Rule>> {
        // Ticket rules only apply to a concrete ticket.
        let Some(id) = id else {
            return Ok(None);
        };

        for rule in self.store.ticket_rules() {
            if !rule.applies_to_action(action) {
                continue;
            }
            if rule.selector.is_wildcard() || self.ticket_in_filter(rule, id)? {
                return Ok(Some(rule));
            }
        }

        Ok(None)
    }

    fn ticket_in_filter(&self, rule: &Rule, id: &str) -> PolicyResult<bool> {
        let filter = format!("id={}&{}", id, rule.selector.as_str());

        match self.query.count_matching(&filter) {
            Ok(count) => {
                tracing::trace!(rule = %rule.name, filter = %filter, count, "Evaluated ticket filter");
                Ok(count > 0)
            }
            Err(fault) => {
                tracing::error!(rule = %rule.name, filter = %filter, error = %fault, "Ticket filter failed");
                Err(PolicyError::from_query_fault(&rule.name, &filter, fault))
            }
        }
    }
}
