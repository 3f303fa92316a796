//! Ticket dataset queries
//!
//! Ticket rules with a non-wildcard selector ask the ticket dataset whether
//! the ticket under check satisfies the rule's filter. The dataset is an
//! injected collaborator; the policy never interprets the filter itself.
//!
//! With the `memory` feature (default) this module also provides
//! [`MemoryTicketStore`], an in-memory dataset understanding a small filter
//! language:
//!
//! ```text
//! id=42&status!=closed&component=ui|backend&summary~=crash
//!
//! Operators:
//!   =     equals          !=    not equals
//!   ~=    contains        !~=   does not contain
//!   ^=    starts with     !^=   does not start with
//!   $=    ends with       !$=   does not end with
//! ```
//!
//! Constraints joined by `&` must all hold; values separated by `|` are
//! alternatives. The `id` field accepts ids and ranges (`1,3-5`).

use crate::error::QueryFault;

/// Ticket dataset query capability.
///
/// Implementations should bound their own execution time; the policy calls
/// this synchronously and imposes no timeout.
pub trait TicketQuery: Send + Sync {
    /// Count tickets matching `filter`.
    ///
    /// The filter always starts with an `id=<ticket>` constraint followed by
    /// the rule's own fragment.
    fn count_matching(&self, filter: &str) -> Result<usize, QueryFault>;
}

#[cfg(feature = "memory")]
pub use memory::{MemoryTicketStore, Ticket};

#[cfg(feature = "memory")]
mod memory {
    use std::collections::{BTreeMap, BTreeSet};

    use parking_lot::RwLock;
    use serde::{Deserialize, Serialize};

    use super::TicketQuery;
    use crate::error::QueryFault;

    /// A ticket record: numeric id plus string fields.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
    pub struct Ticket {
        /// Ticket number
        pub id: u64,
        /// Field values by field name
        #[serde(default)]
        pub fields: BTreeMap<String, String>,
    }

    impl Ticket {
        /// Create a ticket with no fields set.
        pub fn new(id: u64) -> Self {
            Self {
                id,
                fields: BTreeMap::new(),
            }
        }

        /// Set a field value.
        pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
            self.fields.insert(name.into(), value.into());
            self
        }

        /// Get a field value; unset fields read as empty.
        pub fn field(&self, name: &str) -> &str {
            self.fields.get(name).map(String::as_str).unwrap_or("")
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Exact,
        Contains,
        StartsWith,
        EndsWith,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Constraint {
        Ids(Vec<(u64, u64)>),
        Field {
            name: String,
            mode: Mode,
            negate: bool,
            values: Vec<String>,
        },
    }

    impl Constraint {
        fn matches(&self, ticket: &Ticket) -> bool {
            match self {
                Constraint::Ids(ranges) => ranges
                    .iter()
                    .any(|&(lo, hi)| (lo..=hi).contains(&ticket.id)),
                Constraint::Field {
                    name,
                    mode,
                    negate,
                    values,
                } => {
                    let actual = ticket.field(name);
                    let hit = values.iter().any(|v| match mode {
                        Mode::Exact => actual == v.as_str(),
                        Mode::Contains => actual.contains(v.as_str()),
                        Mode::StartsWith => actual.starts_with(v.as_str()),
                        Mode::EndsWith => actual.ends_with(v.as_str()),
                    });
                    hit != *negate
                }
            }
        }
    }

    /// In-memory ticket dataset.
    ///
    /// Suitable for tests and single-process hosts. The set of known field
    /// names is fixed at construction; filters naming any other field fail
    /// with a value fault.
    ///
    /// # Example
    ///
    /// ```
    /// use confperm_policy::{MemoryTicketStore, Ticket, TicketQuery};
    ///
    /// let store = MemoryTicketStore::new(["status", "milestone"]);
    /// store.insert(Ticket::new(1).with_field("status", "new"));
    /// store.insert(Ticket::new(2).with_field("status", "closed"));
    ///
    /// assert_eq!(store.count_matching("status!=closed").unwrap(), 1);
    /// assert_eq!(store.count_matching("id=1-2").unwrap(), 2);
    /// assert!(store.count_matching("owner=bob").is_err());
    /// ```
    #[derive(Debug, Default)]
    pub struct MemoryTicketStore {
        known_fields: BTreeSet<String>,
        tickets: RwLock<BTreeMap<u64, Ticket>>,
    }

    impl MemoryTicketStore {
        /// Create an empty store knowing the given field names.
        pub fn new<I, S>(fields: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                known_fields: fields.into_iter().map(Into::into).collect(),
                tickets: RwLock::new(BTreeMap::new()),
            }
        }

        /// Insert or replace a ticket, returning the previous record.
        ///
        /// Fields not declared at construction are still stored, but cannot
        /// be queried.
        pub fn insert(&self, ticket: Ticket) -> Option<Ticket> {
            self.tickets.write().insert(ticket.id, ticket)
        }

        /// Remove a ticket.
        pub fn remove(&self, id: u64) -> Option<Ticket> {
            self.tickets.write().remove(&id)
        }

        /// Get a copy of a ticket.
        pub fn get(&self, id: u64) -> Option<Ticket> {
            self.tickets.read().get(&id).cloned()
        }

        /// Number of tickets held.
        pub fn len(&self) -> usize {
            self.tickets.read().len()
        }

        /// Check if the store is empty.
        pub fn is_empty(&self) -> bool {
            self.tickets.read().is_empty()
        }

        fn parse(&self, filter: &str) -> Result<Vec<Constraint>, QueryFault> {
            filter
                .split('&')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| self.parse_constraint(part))
                .collect()
        }

        fn parse_constraint(&self, part: &str) -> Result<Constraint, QueryFault> {
            let Some((lhs, rhs)) = part.split_once('=') else {
                return Err(QueryFault::Syntax(format!(
                    "missing operator in constraint \"{}\"",
                    part
                )));
            };

            let mut name = lhs.trim();
            let mut mode = Mode::Exact;
            if let Some(stripped) = name.strip_suffix('~') {
                mode = Mode::Contains;
                name = stripped;
            } else if let Some(stripped) = name.strip_suffix('^') {
                mode = Mode::StartsWith;
                name = stripped;
            } else if let Some(stripped) = name.strip_suffix('$') {
                mode = Mode::EndsWith;
                name = stripped;
            }
            let negate = match name.strip_suffix('!') {
                Some(stripped) => {
                    name = stripped;
                    true
                }
                None => false,
            };
            let name = name.trim();

            if name.is_empty() {
                return Err(QueryFault::Syntax(format!(
                    "missing field name in constraint \"{}\"",
                    part
                )));
            }

            if name == "id" {
                if mode != Mode::Exact || negate {
                    return Err(QueryFault::Value(format!(
                        "unsupported operator for id in \"{}\"",
                        part
                    )));
                }
                return parse_ids(rhs).map(Constraint::Ids);
            }

            if !self.known_fields.contains(name) {
                return Err(QueryFault::Value(format!("unknown field \"{}\"", name)));
            }

            Ok(Constraint::Field {
                name: name.to_string(),
                mode,
                negate,
                values: rhs.split('|').map(|v| v.trim().to_string()).collect(),
            })
        }
    }

    fn parse_ids(list: &str) -> Result<Vec<(u64, u64)>, QueryFault> {
        let invalid = || QueryFault::Value(format!("invalid ticket id \"{}\"", list));

        list.split([',', '|'])
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| match item.split_once('-') {
                Some((lo, hi)) => {
                    let lo: u64 = lo.trim().parse().map_err(|_| invalid())?;
                    let hi: u64 = hi.trim().parse().map_err(|_| invalid())?;
                    Ok((lo.min(hi), lo.max(hi)))
                }
                None => {
                    let id: u64 = item.parse().map_err(|_| invalid())?;
                    Ok((id, id))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .and_then(|ranges| {
                if ranges.is_empty() {
                    Err(invalid())
                } else {
                    Ok(ranges)
                }
            })
    }

    impl TicketQuery for MemoryTicketStore {
        fn count_matching(&self, filter: &str) -> Result<usize, QueryFault> {
            let constraints = self.parse(filter)?;
            let tickets = self.tickets.read();
            Ok(tickets
                .values()
                .filter(|ticket| constraints.iter().all(|c| c.matches(ticket)))
                .count())
        }
    }

}
