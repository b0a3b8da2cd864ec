//! Ownership checks and cascade deletion.

use super::open_store;
use crate::CalculationId;
use calctree_engine::Operation;
use rust_decimal_macros::dec;

#[test]
fn wrong_owner_deletes_nothing() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();
    let bob = store.create_user("bob").unwrap();

    let root = store.create_root(alice.id, dec!(10)).unwrap();
    let child = store
        .create_child(bob.id, root.id, Operation::Add, dec!(1))
        .unwrap();

    // bob does not own the root, even though he contributed a child.
    assert!(!store.delete(root.id, bob.id).unwrap());
    assert!(store.find_by_id(root.id).unwrap().is_some());
    assert!(store.find_by_id(child.id).unwrap().is_some());
}

#[test]
fn missing_node_is_indistinguishable_from_unowned() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();

    assert!(!store.delete(CalculationId(999), alice.id).unwrap());
}

#[test]
fn owner_delete_cascades_to_all_descendants() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();
    let bob = store.create_user("bob").unwrap();

    let root = store.create_root(alice.id, dec!(10)).unwrap();
    let child = store
        .create_child(bob.id, root.id, Operation::Add, dec!(5))
        .unwrap();
    let grandchild = store
        .create_child(alice.id, child.id, Operation::Multiply, dec!(2))
        .unwrap();

    assert!(store.delete(root.id, alice.id).unwrap());

    for id in [root.id, child.id, grandchild.id] {
        assert!(store.find_by_id(id).unwrap().is_none());
    }
    assert!(store.get_forest(None).unwrap().is_empty());
}

#[test]
fn deleting_a_child_keeps_its_ancestors() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();

    let root = store.create_root(alice.id, dec!(10)).unwrap();
    let child = store
        .create_child(alice.id, root.id, Operation::Add, dec!(5))
        .unwrap();
    let grandchild = store
        .create_child(alice.id, child.id, Operation::Add, dec!(5))
        .unwrap();

    assert!(store.delete(child.id, alice.id).unwrap());

    assert!(store.find_by_id(root.id).unwrap().is_some());
    assert!(store.find_by_id(child.id).unwrap().is_none());
    assert!(store.find_by_id(grandchild.id).unwrap().is_none());
    assert!(store.list_children(root.id).unwrap().is_empty());
}

#[test]
fn second_delete_returns_false() {
    let (_dir, store) = open_store();
    let alice = store.create_user("alice").unwrap();
    let root = store.create_root(alice.id, dec!(1)).unwrap();

    assert!(store.delete(root.id, alice.id).unwrap());
    assert!(!store.delete(root.id, alice.id).unwrap());
}
