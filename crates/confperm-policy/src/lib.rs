//! # Configurable Permission Policy
//!
//! This crate provides a rule-based permission policy for wiki pages and
//! tickets. It is one voting policy among several in a host authorization
//! framework: for each check it answers allow, deny, or abstain.
//!
//! ## Overview
//!
//! The confperm-policy crate handles:
//! - **Rules**: Typed wiki and ticket rules parsed from a flat config section
//! - **Matching**: First matching rule per realm, ticket filters delegated to
//!   a ticket dataset
//! - **Decisions**: Five outcome directives mapped to allow / deny / abstain
//! - **Governed Actions**: Action names this policy claims, from a flag section
//!
//! ## Architecture
//!
//! ```text
//! check(action, user, resource)
//!   -> ResourceMatcher   first rule of the resource's realm that matches
//!   -> resolve_for       outcome x permission held -> Decision
//!   -> Decision::Abstain when nothing matched
//! ```
//!
//! ## Rule Syntax
//!
//! ```text
//! [configuratable-permission-rules]
//! private-wiki = wiki, *, Private, WIKI_ADMIN, allow-only
//! security     = ticket, TICKET_VIEW, component=security, SECURITY_VIEW, pass-only
//! release      = ticket, view, milestone=1.0, TICKET_VIEW, allow
//! ```
//!
//! Fields are `type, action, selector, permission, outcome`. An empty field
//! or `*` is a wildcard for action, selector and permission.
//!
//! ## Outcomes
//!
//! | Outcome      | permission held | permission missing |
//! |--------------|-----------------|--------------------|
//! | `allow`      | allow           | abstain            |
//! | `allow-only` | allow           | deny               |
//! | `deny`       | deny            | abstain            |
//! | `pass`       | abstain         | abstain            |
//! | `pass-only`  | abstain         | deny               |
//!
//! ## Features
//!
//! - `memory` (default): in-memory ticket dataset and permission store
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "memory")]
//! # {
//! use std::sync::Arc;
//! use confperm_policy::{
//!     ConfigSection, ConfigurablePermissionPolicy, Decision, MemoryPermissionStore,
//!     MemoryTicketStore, PolicyConfig, Resource,
//! };
//!
//! let config = PolicyConfig::new(
//!     ConfigSection::new().with("editors", "wiki, WIKI_MODIFY, *, EDITOR, allow-only"),
//!     ConfigSection::new(),
//! );
//! let policy = ConfigurablePermissionPolicy::new(&config, Arc::new(MemoryTicketStore::default()));
//!
//! let perms = MemoryPermissionStore::from_grants([("alice", "EDITOR")]);
//! let page = Resource::wiki("WikiStart");
//!
//! assert_eq!(policy.check_permission("WIKI_MODIFY", "alice", Some(&page), &perms).unwrap(), Decision::Allow);
//! assert_eq!(policy.check_permission("WIKI_MODIFY", "bob", Some(&page), &perms).unwrap(), Decision::Deny);
//! assert_eq!(policy.check_permission("WIKI_VIEW", "bob", Some(&page), &perms).unwrap(), Decision::Abstain);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod matcher;
pub mod outcome;
pub mod permissions;
pub mod policy;
pub mod query;
pub mod resolver;
pub mod resources;
pub mod rules;

// Re-export main types for convenience
pub use config::{
    ConfigSection, PolicyConfig, ACTIONS_SECTION, ACTIONS_SECTION_ALIAS, ENABLED, RULES_SECTION,
    RULES_SECTION_ALIAS,
};
pub use error::{PolicyError, PolicyResult, QueryFault, RuleIssue};
pub use matcher::ResourceMatcher;
pub use outcome::Outcome;
pub use permissions::PermissionDirectory;
pub use policy::{ConfigurablePermissionPolicy, PolicySnapshot};
pub use query::TicketQuery;
pub use resolver::{decide, resolve, resolve_for, Decision};
pub use resources::{Realm, Resource};
pub use rules::{is_wildcard, Rule, RuleStore, Selector};

#[cfg(feature = "memory")]
pub use permissions::MemoryPermissionStore;
#[cfg(feature = "memory")]
pub use query::{MemoryTicketStore, Ticket};
