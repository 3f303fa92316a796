//! Concurrent checks while the policy is being reconfigured.

use std::sync::Arc;

use confperm_policy::{
    ConfigSection, ConfigurablePermissionPolicy, Decision, MemoryPermissionStore,
    MemoryTicketStore, PolicyConfig, Resource, Ticket,
};

fn config(outcome: &str) -> PolicyConfig {
    PolicyConfig::new(
        ConfigSection::new()
            .with("wiki", format!("wiki, *, *, *, {outcome}"))
            .with("ticket", format!("ticket, *, status=new, *, {outcome}")),
        ConfigSection::new(),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_checks_run_concurrently_during_reloads() {
    let tickets = Arc::new(MemoryTicketStore::new(["status"]));
    tickets.insert(Ticket::new(1).with_field("status", "new"));

    let policy = Arc::new(ConfigurablePermissionPolicy::new(&config("allow"), tickets));
    let perms = Arc::new(MemoryPermissionStore::new());

    let mut handles = Vec::new();
    for worker in 0..8 {
        let policy = Arc::clone(&policy);
        let perms = Arc::clone(&perms);
        handles.push(tokio::task::spawn_blocking(move || {
            let resource = if worker % 2 == 0 {
                Resource::wiki("Page")
            } else {
                Resource::ticket(1)
            };
            for _ in 0..200 {
                let decision = policy
                    .check_permission("VIEW", "bob", Some(&resource), perms.as_ref())
                    .unwrap();
                // Every snapshot is internally consistent: never a mix.
                assert!(matches!(decision, Decision::Allow | Decision::Deny));
            }
        }));
    }

    let reloader = {
        let policy = Arc::clone(&policy);
        tokio::task::spawn_blocking(move || {
            for round in 0..50 {
                let outcome = if round % 2 == 0 { "deny" } else { "allow" };
                assert!(policy.reload(&config(outcome)).is_empty());
            }
        })
    };

    for handle in handles {
        handle.await.unwrap();
    }
    reloader.await.unwrap();

    // 50 rounds end on "allow"
    let decision = policy
        .check_permission("VIEW", "bob", Some(&Resource::wiki("Page")), perms.as_ref())
        .unwrap();
    assert_eq!(decision, Decision::Allow);
}

#[tokio::test]
async fn test_snapshot_outlives_reload() {
    let policy = ConfigurablePermissionPolicy::new(
        &config("deny"),
        Arc::new(MemoryTicketStore::new(["status"])),
    );
    let held = policy.snapshot();

    policy.reload(&PolicyConfig::default());

    assert_eq!(held.rules().len(), 2);
    assert!(policy.snapshot().rules().is_empty());
}

#[test]
fn test_repeated_checks_are_idempotent() {
    let tickets = Arc::new(MemoryTicketStore::new(["status"]));
    tickets.insert(Ticket::new(1).with_field("status", "new"));
    let policy = ConfigurablePermissionPolicy::new(&config("deny"), tickets);
    let perms = MemoryPermissionStore::new();
    let ticket = Resource::ticket(1);

    let first = policy.check_permission("VIEW", "bob", Some(&ticket), &perms).unwrap();
    let second = policy.check_permission("VIEW", "bob", Some(&ticket), &perms).unwrap();
    assert_eq!(first, second);
    assert_eq!(policy.snapshot().rules().len(), 2);
}
