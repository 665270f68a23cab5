//! Synchronization tests: push, update (fetch + merge), rejection, conflicts.

mod support;
use support::*;

use keydir_admin::error::{Error, RepoError};
use keydir_admin::KeyAttributes;

#[test]
fn test_push_publishes_commit() {
    let t = Test::new();
    let mut admin = t.admin("alice");

    admin.add_key(key(KeyAttributes::owner("carol"), BLOBS[3]));
    let commit = admin.save(None).unwrap();
    admin.push().unwrap();

    assert_eq!(t.remote_head(), commit);
}

#[test]
fn test_save_and_push() {
    let t = Test::new();
    let mut admin = t.admin("alice");

    admin.add_key(key(KeyAttributes::owner("carol"), BLOBS[3]));
    let commit = admin.save_and_push(Some("Add carol")).unwrap();

    assert_eq!(t.remote_head(), commit);
}

#[test]
fn test_update_without_remote_changes_is_noop() {
    let t = Test::new();
    let mut admin = t.admin("alice");
    let head = admin.head().unwrap();

    assert_eq!(admin.update().unwrap(), head);
    assert_eq!(admin.head().unwrap(), head);
}

#[test]
fn test_update_keeps_unpushed_commits() {
    let t = Test::new();
    let mut admin = t.admin("alice");
    let upstream = t.remote_head();

    admin.add_key(key(KeyAttributes::owner("carol"), BLOBS[3]));
    let local = admin.save(None).unwrap();

    // The reset inside update moves to upstream; the prior head comes back
    assert_eq!(admin.update().unwrap(), local);
    assert_eq!(admin.head().unwrap(), local);
    assert_eq!(
        admin.git().branch_target(&admin.settings().tracking_ref()).unwrap(),
        upstream
    );
    assert!(admin.keys_for("carol").is_some());
}

#[test]
fn test_reset_moves_to_tracking_head() {
    let t = Test::new();
    let mut alice = t.admin("alice");
    let mut bob = t.admin("bob");

    alice.add_key(key(KeyAttributes::owner("dave"), BLOBS[2]));
    alice.save(None).unwrap();

    bob.add_key(key(KeyAttributes::owner("carol"), BLOBS[3]));
    bob.save_and_push(None).unwrap();

    // Without a fetch the tracking branch still names the seed commit
    let tracking = alice.git().branch_target(&alice.settings().tracking_ref()).unwrap();
    alice.reset().unwrap();
    assert_eq!(alice.head().unwrap(), tracking);
    assert!(alice.keys_for("dave").is_none());
    assert!(alice.keys_for("carol").is_none());
}

#[test]
fn test_update_merges_remote_changes() {
    let t = Test::new();
    let mut alice = t.admin("alice");
    let mut bob = t.admin("bob");

    bob.add_key(key(
        KeyAttributes::owner("carol").with_location("desktop"),
        BLOBS[3],
    ));
    let remote = bob.save_and_push(None).unwrap();

    alice.add_key(key(
        KeyAttributes::owner("dave").with_subfolders(["ops"]),
        BLOBS[2],
    ));
    let local = alice.save(None).unwrap();

    let merge = alice.update().unwrap();
    assert_eq!(alice.head().unwrap(), merge);
    assert_eq!(alice.git().parents_of(merge).unwrap(), vec![local, remote]);

    // Both sides' keys are on disk and in memory after the merge
    assert!(alice.keys_for("carol").is_some());
    assert!(alice.keys_for("dave").is_some());
    assert!(alice.keydir().join("desktop/carol.pub").exists());
    assert!(head_tree_has(&alice, "keydir/desktop/carol.pub"));
    assert!(head_tree_has(&alice, "keydir/ops/dave.pub"));

    // The merge can be pushed
    alice.push().unwrap();
    assert_eq!(t.remote_head(), merge);
}

#[test]
fn test_update_discards_uncommitted_changes() {
    let t = Test::new();
    let mut alice = t.admin("alice");

    alice.add_key(key(KeyAttributes::owner("carol"), BLOBS[3]));
    alice.update().unwrap();

    assert!(alice.keys_for("carol").is_none());
}

#[test]
fn test_push_rejected_when_behind() {
    let t = Test::new();
    let mut alice = t.admin("alice");
    let mut bob = t.admin("bob");

    bob.add_key(key(KeyAttributes::owner("carol"), BLOBS[3]));
    let remote = bob.save_and_push(None).unwrap();

    alice.add_key(key(KeyAttributes::owner("dave"), BLOBS[2]));
    alice.save(None).unwrap();

    let err = alice.push().unwrap_err();
    assert!(matches!(err, Error::Repo(RepoError::PushRejected(_))));
    assert_eq!(t.remote_head(), remote);

    // After merging, the push goes through
    alice.update().unwrap();
    alice.push().unwrap();
}

#[test]
fn test_update_conflict() {
    let t = Test::new();
    let mut alice = t.admin("alice");
    let mut bob = t.admin("bob");

    bob.add_key(key(KeyAttributes::owner("erin"), BLOBS[3]));
    bob.save_and_push(None).unwrap();

    alice.add_key(key(KeyAttributes::owner("erin"), BLOBS[2]));
    let local = alice.save(None).unwrap();

    let err = alice.update().unwrap_err();
    assert!(matches!(err, Error::Repo(RepoError::MergeConflict(_))));

    // The local branch is untouched
    assert_eq!(alice.head().unwrap(), local);
    assert_eq!(
        alice.keys_for("erin").unwrap().iter().next().unwrap().blob(),
        BLOBS[2]
    );
}
