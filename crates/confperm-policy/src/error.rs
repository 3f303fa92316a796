//! Error types for permission policy operations
//!
//! This module defines the errors that abort a permission check, the faults
//! reported by the ticket query collaborator, and the non-fatal issues
//! reported while building a rule store.

use thiserror::Error;

/// Fault reported by a [`TicketQuery`](crate::query::TicketQuery) backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryFault {
    /// The filter expression could not be parsed
    #[error("Query syntax error: {0}")]
    Syntax(String),

    /// The filter expression parsed but cannot be evaluated against the data
    #[error("Query value error: {0}")]
    Value(String),
}

/// Permission policy error types.
///
/// Query faults are fatal for the check that hit them: a broken ticket
/// rule must neither grant nor refuse access silently.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A ticket rule's filter expression is malformed
    #[error("Rule \"{rule}\": invalid filter \"{filter}\": {message}")]
    QuerySyntax {
        /// Name of the offending rule
        rule: String,
        /// Scoped filter that was submitted
        filter: String,
        /// Backend message
        message: String,
    },

    /// A ticket rule's filter expression cannot be evaluated
    #[error("Rule \"{rule}\": cannot evaluate filter \"{filter}\": {message}")]
    QueryValue {
        /// Name of the offending rule
        rule: String,
        /// Scoped filter that was submitted
        filter: String,
        /// Backend message
        message: String,
    },

    /// A configuration document could not be read
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for permission policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

impl PolicyError {
    /// Wrap a query fault raised while evaluating `rule`.
    pub fn from_query_fault(rule: &str, filter: &str, fault: QueryFault) -> Self {
        match fault {
            QueryFault::Syntax(message) => PolicyError::QuerySyntax {
                rule: rule.to_string(),
                filter: filter.to_string(),
                message,
            },
            QueryFault::Value(message) => PolicyError::QueryValue {
                rule: rule.to_string(),
                filter: filter.to_string(),
                message,
            },
        }
    }

    /// Check if this error came from the ticket query backend.
    pub fn is_query_fault(&self) -> bool {
        matches!(
            self,
            PolicyError::QuerySyntax { .. } | PolicyError::QueryValue { .. }
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            PolicyError::QuerySyntax { .. } => "QUERY_SYNTAX",
            PolicyError::QueryValue { .. } => "QUERY_VALUE",
            PolicyError::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Non-fatal problem found while building a rule store.
///
/// Issues are logged and collected; the offending entry is either dropped
/// or coerced, and the remaining rules are still built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleIssue {
    /// The entry does not split into exactly five fields; dropped
    #[error("invalid syntax for rule \"{rule}\": expected 5 fields, found {fields}")]
    Malformed {
        /// Configuration key of the entry
        rule: String,
        /// Number of comma-separated fields found
        fields: usize,
    },

    /// The outcome token is unknown; coerced to `pass`
    #[error("invalid outcome \"{token}\" for rule \"{rule}\", defaulting to pass")]
    InvalidOutcome {
        /// Configuration key of the entry
        rule: String,
        /// Token as written in the configuration
        token: String,
    },

    /// The rule type is neither `wiki` nor `ticket`; dropped
    #[error("unsupported type \"{kind}\" for rule \"{rule}\"")]
    UnsupportedType {
        /// Configuration key of the entry
        rule: String,
        /// Type token as written in the configuration
        kind: String,
    },
}

impl RuleIssue {
    /// Configuration key of the entry the issue refers to.
    pub fn rule(&self) -> &str {
        match self {
            RuleIssue::Malformed { rule, .. }
            | RuleIssue::InvalidOutcome { rule, .. }
            | RuleIssue::UnsupportedType { rule, .. } => rule,
        }
    }

    /// Check if the entry was dropped from the store.
    pub fn drops_rule(&self) -> bool {
        !matches!(self, RuleIssue::InvalidOutcome { .. })
    }
}
