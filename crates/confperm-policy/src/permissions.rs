//! # Permissions
//!
//! Permission membership lookup used when a matched rule names a required
//! permission. The lookup is an injected collaborator: the policy only asks
//! which principals hold a given permission.

use std::collections::HashSet;

/// Principal-to-permission membership capability.
pub trait PermissionDirectory: Send + Sync {
    /// Get every principal holding `permission`.
    fn users_with_permission(&self, permission: &str) -> HashSet<String>;

    /// Check if `username` holds `permission`.
    ///
    /// The default goes through [`users_with_permission`](Self::users_with_permission);
    /// implementations with a cheaper direct lookup should override it.
    fn has_permission(&self, username: &str, permission: &str) -> bool {
        self.users_with_permission(permission).contains(username)
    }
}

#[cfg(feature = "memory")]
pub use memory::MemoryPermissionStore;

#[cfg(feature = "memory")]
mod memory {
    use std::collections::{HashMap, HashSet};

    use parking_lot::RwLock;

    use super::PermissionDirectory;

    /// In-memory permission grants.
    ///
    /// Grants are stored per permission name, so membership lookups are a
    /// single map access.
    ///
    /// # Example
    ///
    /// ```
    /// use confperm_policy::{MemoryPermissionStore, PermissionDirectory};
    ///
    /// let perms = MemoryPermissionStore::new();
    /// perms.grant("alice", "TICKET_VIEW");
    ///
    /// assert!(perms.has_permission("alice", "TICKET_VIEW"));
    /// assert!(!perms.has_permission("bob", "TICKET_VIEW"));
    /// ```
    #[derive(Debug, Default)]
    pub struct MemoryPermissionStore {
        grants: RwLock<HashMap<String, HashSet<String>>>,
    }

    impl MemoryPermissionStore {
        /// Create an empty store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store from `(username, permission)` pairs.
        pub fn from_grants<I, U, P>(grants: I) -> Self
        where
            I: IntoIterator<Item = (U, P)>,
            U: Into<String>,
            P: Into<String>,
        {
            let store = Self::new();
            for (user, permission) in grants {
                store.grant(user, permission);
            }
            store
        }

        /// Grant `permission` to `username`.
        ///
        /// # Returns
        ///
        /// `true` if the grant is new, `false` if it already existed
        pub fn grant(&self, username: impl Into<String>, permission: impl Into<String>) -> bool {
            self.grants
                .write()
                .entry(permission.into())
                .or_default()
                .insert(username.into())
        }

        /// Revoke `permission` from `username`.
        ///
        /// # Returns
        ///
        /// `true` if the grant was present, `false` otherwise
        pub fn revoke(&self, username: &str, permission: &str) -> bool {
            let mut grants = self.grants.write();
            let Some(holders) = grants.get_mut(permission) else {
                return false;
            };
            let removed = holders.remove(username);
            if holders.is_empty() {
                grants.remove(permission);
            }
            removed
        }

        /// Get every permission held by `username`.
        pub fn permissions_of(&self, username: &str) -> HashSet<String> {
            self.grants
                .read()
                .iter()
                .filter(|(_, holders)| holders.contains(username))
                .map(|(permission, _)| permission.clone())
                .collect()
        }
    }

    impl PermissionDirectory for MemoryPermissionStore {
        fn users_with_permission(&self, permission: &str) -> HashSet<String> {
            self.grants
                .read()
                .get(permission)
                .cloned()
                .unwrap_or_default()
        }

        fn has_permission(&self, username: &str, permission: &str) -> bool {
            self.grants
                .read()
                .get(permission)
                .is_some_and(|holders| holders.contains(username))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_grant_and_lookup() {
            let store = MemoryPermissionStore::new();
            assert!(store.grant("alice", "WIKI_VIEW"));
            assert!(!store.grant("alice", "WIKI_VIEW"));
            store.grant("bob", "WIKI_VIEW");

            let holders = store.users_with_permission("WIKI_VIEW");
            assert_eq!(holders.len(), 2);
            assert!(holders.contains("alice"));
            assert!(holders.contains("bob"));
            assert!(store.users_with_permission("WIKI_ADMIN").is_empty());
        }

        #[test]
        fn test_revoke() {
            let store = MemoryPermissionStore::from_grants([("alice", "TICKET_VIEW")]);
            assert!(store.revoke("alice", "TICKET_VIEW"));
            assert!(!store.revoke("alice", "TICKET_VIEW"));
            assert!(!store.has_permission("alice", "TICKET_VIEW"));
        }

        #[test]
        fn test_permissions_of() {
            let store = MemoryPermissionStore::from_grants([
                ("alice", "TICKET_VIEW"),
                ("alice", "WIKI_MODIFY"),
                ("bob", "TICKET_VIEW"),
            ]);
            let perms = store.permissions_of("alice");
            assert_eq!(perms.len(), 2);
            assert!(perms.contains("WIKI_MODIFY"));
        }

        #[test]
        fn test_permission_names_are_case_sensitive() {
            let store = MemoryPermissionStore::from_grants([("alice", "TICKET_VIEW")]);
            assert!(!store.has_permission("alice", "ticket_view"));
        }
    }
}
