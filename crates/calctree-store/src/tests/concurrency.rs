//! Parallel writers. Parents are immutable after creation, so concurrent
//! children of one parent are independent and none may be lost.

use super::open_store;
use calctree_engine::Operation;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;

#[test]
fn parallel_children_of_one_parent_all_commit() {
    let (_dir, store) = open_store();
    let store = Arc::new(store);
    let alice = store.create_user("alice").unwrap();
    let root = store.create_root(alice.id, dec!(10)).unwrap();

    let handles: Vec<_> = (1..=8)
        .map(|i| {
            let store = Arc::clone(&store);
            let owner = alice.id;
            let parent = root.id;
            thread::spawn(move || {
                store
                    .create_child(owner, parent, Operation::Add, Decimal::from(i))
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        let child = handle.join().unwrap();
        // Every writer saw the same immutable parent snapshot.
        assert_eq!(child.result, dec!(10) + child.operand);
        assert_eq!(child.depth, 1);
    }

    assert_eq!(store.list_children(root.id).unwrap().len(), 8);
}

#[test]
fn parallel_root_creation() {
    let (_dir, store) = open_store();
    let store = Arc::new(store);
    let alice = store.create_user("alice").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            let owner = alice.id;
            thread::spawn(move || store.create_root(owner, Decimal::from(i)).unwrap())
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.list_roots().unwrap().len(), 4);
}
