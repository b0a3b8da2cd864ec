//! Node creation, derived results, and listing order.

use super::open_store;
use calctree_engine::Operation;
use rust_decimal_macros::dec;

#[test]
fn root_result_equals_operand() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();

    let root = store.create_root(alice.id, dec!(10)).unwrap();
    assert!(root.is_root());
    assert_eq!(root.operand, dec!(10));
    assert_eq!(root.result, dec!(10));
    assert_eq!(root.depth, 0);
    assert!(root.operation.is_none());
    assert_eq!(root.username, "alice");
}

#[test]
fn root_operand_is_normalized_to_storage_scale() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();

    let root = store.create_root(alice.id, dec!(1.00000000005)).unwrap();
    assert_eq!(root.operand, dec!(1.0000000001));
    assert_eq!(root.result, dec!(1.0000000001));
}

#[test]
fn three_level_chain_derives_results_and_depths() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();
    let bob = store.create_user("bob").unwrap();

    // alice starts at 10, bob adds 5, alice multiplies by 2
    let root = store.create_root(alice.id, dec!(10)).unwrap();
    let child = store
        .create_child(bob.id, root.id, Operation::Add, dec!(5))
        .unwrap();
    let grandchild = store
        .create_child(alice.id, child.id, Operation::Multiply, dec!(2))
        .unwrap();

    assert_eq!(child.result, dec!(15));
    assert_eq!(child.depth, 1);
    assert_eq!(child.parent_id, Some(root.id));
    assert_eq!(child.operation, Some(Operation::Add));
    assert_eq!(child.username, "bob");

    assert_eq!(grandchild.result, dec!(30));
    assert_eq!(grandchild.depth, 2);
    assert_eq!(grandchild.parent_id, Some(child.id));
    assert_eq!(grandchild.username, "alice");

    // Reads agree with what creation returned.
    let fetched = store.find_by_id(grandchild.id).unwrap().unwrap();
    assert_eq!(fetched.result, dec!(30));
    assert_eq!(fetched.depth, 2);
}

#[test]
fn division_keeps_decimal_precision() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();

    let root = store.create_root(alice.id, dec!(10)).unwrap();
    let child = store
        .create_child(alice.id, root.id, Operation::Divide, dec!(3))
        .unwrap();
    assert_eq!(child.result, dec!(3.3333333333));
}

#[test]
fn find_by_id_returns_none_for_missing() {
    let (_dir, store) = open_store();
    assert!(store
        .find_by_id(crate::CalculationId(999))
        .unwrap()
        .is_none());
}

#[test]
fn list_roots_is_most_recent_first() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();

    let r1 = store.create_root(alice.id, dec!(1)).unwrap();
    let r2 = store.create_root(alice.id, dec!(2)).unwrap();
    let r3 = store.create_root(alice.id, dec!(3)).unwrap();

    let roots = store.list_roots().unwrap();
    let ids: Vec<_> = roots.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![r3.id, r2.id, r1.id]);
}

#[test]
fn list_children_is_creation_order() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();

    let root = store.create_root(alice.id, dec!(100)).unwrap();
    let c1 = store
        .create_child(alice.id, root.id, Operation::Add, dec!(1))
        .unwrap();
    let c2 = store
        .create_child(alice.id, root.id, Operation::Subtract, dec!(1))
        .unwrap();
    let c3 = store
        .create_child(alice.id, root.id, Operation::Divide, dec!(4))
        .unwrap();

    let children = store.list_children(root.id).unwrap();
    let ids: Vec<_> = children.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![c1.id, c2.id, c3.id]);

    // Children compute from the same immutable parent snapshot.
    assert_eq!(children[0].result, dec!(101));
    assert_eq!(children[1].result, dec!(99));
    assert_eq!(children[2].result, dec!(25));
}

#[test]
fn users_are_unique_by_username() {
    let (_dir, store) = open_store();
    store.create_user("alice").unwrap();
    assert!(store.create_user("alice").is_err());
}

#[test]
fn find_user_round_trips() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();

    let fetched = store.find_user(alice.id).unwrap().unwrap();
    assert_eq!(fetched.username, "alice");
    assert!(store.find_user(crate::UserId(999)).unwrap().is_none());
}
