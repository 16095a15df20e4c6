//! Resource tree synchronization: reconciliation, expand/collapse and
//! selection behavior against scripted listings.

mod common;

use std::rc::Rc;

use common::{collection_record, database_record, explorer, seeded_database};
use nimbus::telemetry::{Action, ActionModifier};
use nimbus::{Error, NodeRef};

/// Fresh database with no children: a first listing populates the child
/// set, sorted by display id.
#[tokio::test]
async fn expand_populates_children_sorted() {
    let bed = explorer();
    // Listing arrives out of display order on purpose.
    let database = seeded_database(&bed, ("d1", "inventory"), &[("c2", "Beta"), ("c1", "Alpha")])
        .await;

    database.expand().await.expect("expand failed");

    assert!(database.is_expanded());
    let ids: Vec<String> = database.collections().iter().map(|c| c.id()).collect();
    assert_eq!(ids, ["Alpha", "Beta"]);
    let rids: Vec<String> = database.collections().iter().map(|c| c.rid().to_string()).collect();
    assert_eq!(rids, ["c1", "c2"]);
}

/// Reconciliation keeps surviving nodes by identity, drops vanished ones
/// and instantiates new ones.
#[tokio::test]
async fn reconcile_preserves_identity_of_survivors() {
    let bed = explorer();
    let database =
        seeded_database(&bed, ("d1", "inventory"), &[("c1", "Alpha"), ("c2", "Beta")]).await;
    database.expand().await.expect("expand failed");

    let beta = database.find_collection_with_id("Beta").expect("Beta missing");

    bed.data.set_collections(
        "inventory",
        vec![collection_record("c2", "Beta"), collection_record("c3", "Gamma")],
    );
    database.load_collections().await.expect("reload failed");

    let collections = database.collections();
    let ids: Vec<String> = collections.iter().map(|c| c.id()).collect();
    assert_eq!(ids, ["Beta", "Gamma"]);
    assert!(Rc::ptr_eq(&collections[0], &beta), "surviving node must keep its instance");
    assert!(database.find_collection_with_id("Alpha").is_none());
}

/// Second expand after the first resolves is a fetch-free no-op.
#[tokio::test]
async fn expand_is_idempotent() {
    let bed = explorer();
    let database = seeded_database(&bed, ("d1", "inventory"), &[("c1", "Alpha")]).await;

    database.expand().await.expect("expand failed");
    database.expand().await.expect("second expand failed");

    assert_eq!(bed.data.list_collections_calls.get(), 1);
    assert_eq!(bed.data.read_database_offer_calls.get(), 1);
    assert!(database.is_expanded());
}

/// Two concurrent expands must not race a second child fetch; the final
/// flag is determined by the first call's outcome.
#[tokio::test]
async fn concurrent_expand_fetches_once() {
    let bed = explorer();
    let database = seeded_database(&bed, ("d1", "inventory"), &[("c1", "Alpha")]).await;
    bed.data.yield_before_reply.set(true);

    let (first, second) = futures::join!(database.expand(), database.expand());
    first.expect("first expand failed");
    second.expect("second expand failed");

    assert_eq!(bed.data.list_collections_calls.get(), 1);
    assert!(database.is_expanded());
}

/// A failed children fetch leaves the flag false and the child set exactly
/// as it was.
#[tokio::test]
async fn failed_expand_leaves_tree_untouched() {
    let bed = explorer();
    let database = seeded_database(&bed, ("d1", "inventory"), &[("c1", "Alpha")]).await;
    bed.data.fail_list_collections.set(true);

    let error = database.expand().await.expect_err("expand should fail");
    assert!(matches!(error, Error::Fetch(_)));
    assert!(!database.is_expanded());
    assert!(database.collections().is_empty());
    assert_eq!(bed.telemetry.count(Action::ExpandTreeNode, ActionModifier::Failed), 1);
    assert_eq!(bed.telemetry.count(Action::ExpandTreeNode, ActionModifier::Mark), 0);
}

/// A failed refresh of an already-loaded database keeps the previous children.
#[tokio::test]
async fn failed_reload_keeps_previous_children() {
    let bed = explorer();
    let database = seeded_database(&bed, ("d1", "inventory"), &[("c1", "Alpha")]).await;
    database.expand().await.expect("expand failed");

    bed.data.set_collections("inventory", vec![collection_record("c9", "Other")]);
    bed.data.fail_list_collections.set(true);
    database.load_collections().await.expect_err("reload should fail");

    let ids: Vec<String> = database.collections().iter().map(|c| c.id()).collect();
    assert_eq!(ids, ["Alpha"]);
}

/// Collapse is synchronous, fetch-free and keeps loaded children around.
#[tokio::test]
async fn collapse_keeps_children_and_skips_io() {
    let bed = explorer();
    let database = seeded_database(&bed, ("d1", "inventory"), &[("c1", "Alpha")]).await;
    database.expand().await.expect("expand failed");
    let alpha = database.find_collection_with_id("Alpha").expect("Alpha missing");
    let fetches_after_expand = bed.data.list_collections_calls.get();

    database.collapse();

    assert!(!database.is_expanded());
    assert_eq!(database.collections().len(), 1);
    assert_eq!(bed.data.list_collections_calls.get(), fetches_after_expand);

    // Collapsing again is a no-op, including telemetry.
    database.collapse();
    assert_eq!(bed.telemetry.count(Action::CollapseTreeNode, ActionModifier::Mark), 1);

    // Re-expanding reconciles but keeps the surviving instance.
    database.expand().await.expect("re-expand failed");
    let reloaded = database.find_collection_with_id("Alpha").expect("Alpha missing");
    assert!(Rc::ptr_eq(&alpha, &reloaded));
}

/// A record without an identifier aborts reconciliation with no partial
/// mutation.
#[tokio::test]
async fn malformed_record_aborts_reconciliation() {
    let bed = explorer();
    let database = seeded_database(&bed, ("d1", "inventory"), &[("c1", "Alpha")]).await;
    database.expand().await.expect("expand failed");

    bed.data.set_collections(
        "inventory",
        vec![collection_record("c2", "Beta"), collection_record("", "Broken")],
    );
    let error = database.load_collections().await.expect_err("reload should fail");
    assert!(matches!(error, Error::MalformedRecord(_)));

    let ids: Vec<String> = database.collections().iter().map(|c| c.id()).collect();
    assert_eq!(ids, ["Alpha"]);
}

/// The database list itself reconciles the same way the child lists do.
#[tokio::test]
async fn database_list_reconciles_and_preserves_identity() {
    let bed = explorer();
    bed.data.databases.borrow_mut().push(database_record("d2", "sales"));
    bed.data.databases.borrow_mut().push(database_record("d1", "inventory"));
    bed.explorer.load_databases().await.expect("load failed");

    let inventory = bed.explorer.find_database_with_id("inventory").expect("missing database");
    let ids: Vec<String> = bed.explorer.databases().iter().map(|d| d.id()).collect();
    assert_eq!(ids, ["inventory", "sales"]);

    *bed.data.databases.borrow_mut() =
        vec![database_record("d1", "inventory"), database_record("d3", "users")];
    bed.explorer.load_databases().await.expect("reload failed");

    let databases = bed.explorer.databases();
    let ids: Vec<String> = databases.iter().map(|d| d.id()).collect();
    assert_eq!(ids, ["inventory", "users"]);
    assert!(Rc::ptr_eq(&databases[0], &inventory));

    bed.data.fail_list_databases.set(true);
    bed.explorer.load_databases().await.expect_err("listing failure should propagate");
    assert_eq!(bed.explorer.databases().len(), 2);
}

/// Selection is a single process-wide slot; the last write wins.
#[tokio::test]
async fn selection_is_last_write_wins() {
    let bed = explorer();
    let database = seeded_database(&bed, ("d1", "inventory"), &[("c1", "Alpha")]).await;
    database.expand().await.expect("expand failed");
    let alpha = database.find_collection_with_id("Alpha").expect("Alpha missing");

    database.select();
    assert_eq!(bed.explorer.selected_node().map(|node| node.rid()), Some("d1".to_string()));

    alpha.select();
    assert_eq!(bed.explorer.selected_node().map(|node| node.rid()), Some("c1".to_string()));
    assert!(matches!(bed.explorer.selected_node(), Some(NodeRef::Collection(_))));

    assert_eq!(bed.telemetry.count(Action::SelectItem, ActionModifier::Mark), 2);
}

/// Script subtrees load on expand and only flip their flag on success.
#[tokio::test]
async fn script_subtree_expands_after_successful_load() {
    let bed = explorer();
    let database = seeded_database(&bed, ("d1", "inventory"), &[("c1", "Alpha")]).await;
    database.expand().await.expect("expand failed");
    let alpha = database.find_collection_with_id("Alpha").expect("Alpha missing");

    bed.data.scripts.borrow_mut().push(common::script_record("s1", "bulkImport"));
    alpha.expand_stored_procedures().await.expect("expand failed");

    assert!(alpha.is_stored_procedures_expanded());
    assert_eq!(alpha.stored_procedures().len(), 1);
    assert_eq!(alpha.stored_procedures()[0].id(), "bulkImport");
    assert!(alpha.triggers().is_empty());
}
