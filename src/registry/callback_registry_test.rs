use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::*;
use crate::CallbackError;
use crate::Error;

type RecipientSlot = Arc<Mutex<Vec<Arc<dyn DeathRecipient>>>>;

/// A live handle for `token` that accepts any death link.
fn live_handle(token: &str) -> MockSubscriberHandle {
    let id = HandleId::new(token);
    let mut handle = MockSubscriberHandle::new();
    handle.expect_identity().returning(move || Some(id.clone()));
    handle.expect_is_alive().returning(|| true);
    handle.expect_link_to_death().returning(|_| Ok(()));
    handle.expect_unlink_to_death().returning(|_| true);
    handle
}

/// A live handle that hands its linked death recipients to the test.
fn observed_handle(
    token: &str,
    slot: RecipientSlot,
) -> MockSubscriberHandle {
    let id = HandleId::new(token);
    let mut handle = MockSubscriberHandle::new();
    handle.expect_identity().returning(move || Some(id.clone()));
    handle.expect_is_alive().returning(|| true);
    handle.expect_link_to_death().returning(move |recipient| {
        slot.lock().push(recipient);
        Ok(())
    });
    handle.expect_unlink_to_death().returning(|_| true);
    handle
}

#[test]
fn test_register_same_handle_twice_is_idempotent() {
    let registry = CallbackRegistry::new();
    let handle: Arc<dyn SubscriberHandle> = Arc::new(live_handle("x"));

    assert_eq!(registry.register(handle.clone()).unwrap(), Registration::Registered);
    assert_eq!(registry.register(handle).unwrap(), Registration::AlreadyRegistered);
    assert_eq!(registry.count(), 1);
}

#[test]
fn test_register_remarshaled_proxy_is_deduplicated() {
    let registry = CallbackRegistry::new();

    registry.register(Arc::new(live_handle("x"))).unwrap();
    let second = registry.register(Arc::new(live_handle("x"))).unwrap();

    assert_eq!(second, Registration::AlreadyRegistered);
    assert_eq!(registry.count(), 1);
}

#[test]
fn test_register_then_unregister_leaves_registry_empty() {
    let registry = CallbackRegistry::new();
    let handle = Arc::new(live_handle("x"));

    registry.register(handle.clone()).unwrap();
    assert!(registry.unregister(handle.as_ref()));
    assert_eq!(registry.count(), 0);
}

#[test]
fn test_unregister_with_distinct_proxy_of_same_identity_removes_entry() {
    let registry = CallbackRegistry::new();
    let original = Arc::new(live_handle("client-a"));
    let remarshaled = live_handle("client-a");

    registry.register(original).unwrap();
    assert!(registry.unregister(&remarshaled));
    assert_eq!(registry.count(), 0);
}

#[test]
fn test_unregister_unknown_subscriber_is_noop() {
    let registry = CallbackRegistry::new();
    registry.register(Arc::new(live_handle("a"))).unwrap();

    assert!(!registry.unregister(&live_handle("b")));
    assert_eq!(registry.count(), 1);
}

#[test]
fn test_unregister_detaches_death_recipient() {
    let registry = CallbackRegistry::new();
    let id = HandleId::new("x");
    let mut handle = MockSubscriberHandle::new();
    handle.expect_identity().returning(move || Some(id.clone()));
    handle.expect_link_to_death().times(1).returning(|_| Ok(()));
    handle.expect_unlink_to_death().times(1).returning(|_| true);
    let handle = Arc::new(handle);

    registry.register(handle.clone()).unwrap();
    assert!(registry.unregister(handle.as_ref()));
}

#[test]
fn test_register_without_identity_is_rejected() {
    let registry = CallbackRegistry::new();
    let mut handle = MockSubscriberHandle::new();
    handle.expect_identity().returning(|| None);
    handle.expect_link_to_death().never();
    let handle = Arc::new(handle);

    let result = registry.register(handle.clone());

    assert!(matches!(
        result,
        Err(Error::Callback(CallbackError::MissingIdentity))
    ));
    assert!(!registry.unregister(handle.as_ref()));
    assert_eq!(registry.count(), 0);
}

#[test]
fn test_register_dead_subscriber_is_rejected() {
    let registry = CallbackRegistry::new();
    let id = HandleId::new("gone");
    let mut handle = MockSubscriberHandle::new();
    handle.expect_identity().returning(move || Some(id.clone()));
    handle
        .expect_link_to_death()
        .returning(|_| Err(CallbackError::SubscriberDead(HandleId::new("gone")).into()));

    let result = registry.register(Arc::new(handle));

    assert!(matches!(
        result,
        Err(Error::Callback(CallbackError::SubscriberDead(_)))
    ));
    assert_eq!(registry.count(), 0);
}

#[test]
fn test_death_signal_prunes_entry_without_unregister() {
    let registry = CallbackRegistry::new();
    let slot: RecipientSlot = Arc::new(Mutex::new(Vec::new()));

    registry.register(Arc::new(observed_handle("a", slot.clone()))).unwrap();
    registry.register(Arc::new(live_handle("b"))).unwrap();
    assert_eq!(registry.count(), 2);

    let recipient = slot.lock().pop().unwrap();
    recipient.subscriber_died();

    assert_eq!(registry.count(), 1);
    let snapshot = registry.begin_broadcast();
    assert_eq!(snapshot.identity(0), Some(&HandleId::new("b")));
}

#[test]
fn test_stale_death_signal_does_not_remove_new_registration() {
    let registry = CallbackRegistry::new();
    let slot: RecipientSlot = Arc::new(Mutex::new(Vec::new()));
    let handle = Arc::new(observed_handle("a", slot.clone()));

    registry.register(handle.clone()).unwrap();
    assert!(registry.unregister(handle.as_ref()));
    registry.register(handle).unwrap();

    let (first, second) = {
        let mut linked = slot.lock();
        assert_eq!(linked.len(), 2);
        let second = linked.pop().unwrap();
        let first = linked.pop().unwrap();
        (first, second)
    };

    first.subscriber_died();
    assert_eq!(registry.count(), 1);

    second.subscriber_died();
    assert_eq!(registry.count(), 0);
}

#[test]
fn test_death_signal_after_registry_dropped_is_ignored() {
    let slot: RecipientSlot = Arc::new(Mutex::new(Vec::new()));
    {
        let registry = CallbackRegistry::new();
        registry.register(Arc::new(observed_handle("a", slot.clone()))).unwrap();
    }

    let recipient = slot.lock().pop().unwrap();
    recipient.subscriber_died();
}

#[test]
fn test_snapshot_preserves_registration_order() {
    let registry = CallbackRegistry::new();
    for token in ["c", "a", "b"] {
        registry.register(Arc::new(live_handle(token))).unwrap();
    }

    let snapshot = registry.begin_broadcast();
    let order: Vec<&str> = (0..snapshot.len())
        .map(|i| snapshot.identity(i).unwrap().as_str())
        .collect();
    assert_eq!(order, vec!["c", "a", "b"]);
    snapshot.finish();
}

#[test]
fn test_snapshot_is_isolated_from_concurrent_mutation() {
    let registry = CallbackRegistry::new();
    let first = Arc::new(live_handle("a"));
    registry.register(first.clone()).unwrap();

    let snapshot = registry.begin_broadcast();
    registry.register(Arc::new(live_handle("b"))).unwrap();
    registry.unregister(first.as_ref());

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.identity(0), Some(&HandleId::new("a")));
    assert_eq!(registry.count(), 1);
    snapshot.finish();
}

#[test]
fn test_count_pairs_begin_and_finish() {
    let registry = CallbackRegistry::new();
    registry.register(Arc::new(live_handle("a"))).unwrap();

    assert_eq!(registry.count(), 1);
    assert_eq!(registry.active_broadcasts(), 0);
}

#[test]
fn test_kill_unlinks_entries_and_rejects_registration() {
    let registry = CallbackRegistry::new();
    let id = HandleId::new("a");
    let mut handle = MockSubscriberHandle::new();
    handle.expect_identity().returning(move || Some(id.clone()));
    handle.expect_link_to_death().returning(|_| Ok(()));
    handle.expect_unlink_to_death().times(1).returning(|_| true);
    registry.register(Arc::new(handle)).unwrap();

    let before_kill = registry.begin_broadcast();
    registry.kill();

    assert!(registry.is_closed());
    assert_eq!(registry.count(), 0);
    assert_eq!(before_kill.len(), 1);
    assert!(matches!(
        registry.register(Arc::new(live_handle("b"))),
        Err(Error::Callback(CallbackError::RegistryClosed))
    ));
}

#[test]
fn test_concurrent_registration_and_broadcasts() {
    let registry = CallbackRegistry::new();
    let mut workers = Vec::new();

    for worker in 0..4 {
        let registry = registry.clone();
        workers.push(thread::spawn(move || {
            for i in 0..25 {
                let token = format!("w{}-{}", worker, i);
                registry.register(Arc::new(live_handle(&token))).unwrap();
                // A second proxy of the same subscriber must not duplicate it
                registry.register(Arc::new(live_handle(&token))).unwrap();
                if i % 5 == 0 {
                    assert!(registry.unregister(&live_handle(&token)));
                }
            }
        }));
    }
    let reader = {
        let registry = registry.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                let snapshot = registry.begin_broadcast();
                let size = snapshot.len();
                assert_eq!(snapshot.iter().count(), size);
                snapshot.finish();
            }
        })
    };

    for w in workers {
        w.join().unwrap();
    }
    reader.join().unwrap();

    assert_eq!(registry.count(), 4 * 20);
    assert_eq!(registry.active_broadcasts(), 0);
}
