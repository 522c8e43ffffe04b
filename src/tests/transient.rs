//! Transient sessions: in-place editing, return values, and isolation from
//! persistent handles.

use std::rc::Rc;

use crate::champ::ChampTree;
use crate::policy::Edit;
use crate::rrb::RrbTree;
use crate::{HashMap, HashSet, Vector};

// ---------------------------------------------------------------------------
// In-place reuse
// ---------------------------------------------------------------------------

/// Emptying an unshared tree keeps its nodes; a shared one gets fresh nodes.
#[test]
fn emptying_reuses_unshared_nodes() {
    let mut tree: RrbTree<u32> = (0..100).fold(RrbTree::new(), |t, i| t.push_back(i));
    let (root, tail) = (Rc::as_ptr(tree.root()), Rc::as_ptr(tree.tail()));
    tree.skip_mut(None, 100);
    tree.check().unwrap();
    assert!(tree.is_empty());
    assert_eq!(Rc::as_ptr(tree.root()), root);
    assert_eq!(Rc::as_ptr(tree.tail()), tail);

    let mut tree: RrbTree<u32> = (0..40).fold(tree, |t, i| t.push_back(i));
    let root = Rc::as_ptr(tree.root());
    tree.skip_mut(None, 35);
    assert_eq!(Rc::as_ptr(tree.root()), root);
    assert!(tree.iter().copied().eq(35..40));

    let shared: RrbTree<u32> = (0..100).fold(RrbTree::new(), |t, i| t.push_back(i));
    let mut emptied = shared.clone();
    emptied.take_mut(None, 0);
    emptied.check().unwrap();
    assert!(emptied.is_empty());
    assert!(!Rc::ptr_eq(emptied.tail(), shared.tail()));
    assert!(shared.iter().copied().eq(0..100));
}

#[test]
fn unshared_tail_is_edited_in_place() {
    let edit = Edit::new();
    let mut tree: RrbTree<u32> = RrbTree::new();
    tree.push_back_mut(Some(edit), 1);
    let tail = Rc::as_ptr(tree.tail());
    tree.push_back_mut(Some(edit), 2);
    tree.push_back_mut(Some(edit), 3);
    assert_eq!(Rc::as_ptr(tree.tail()), tail);
    assert_eq!(tree.tail().owner(), Some(edit));
}

#[test]
fn shared_tail_is_copied_before_editing() {
    let edit = Edit::new();
    let mut tree: RrbTree<u32> = (0..10).fold(RrbTree::new(), |t, i| t.push_back(i));
    let snapshot = tree.clone();
    tree.push_back_mut(Some(edit), 99);
    assert!(!Rc::ptr_eq(tree.tail(), snapshot.tail()));
    assert_eq!(snapshot.len(), 10);
    assert_eq!(snapshot.last(), Some(&9));
    assert_eq!(tree.last(), Some(&99));
}

#[test]
fn unshared_trie_root_is_edited_in_place() {
    let edit = Edit::new();
    let mut trie = ChampTree::<u32, u32>::new();
    trie.insert_mut(Some(edit), 1, 1);
    let root = Rc::as_ptr(trie.root());
    trie.insert_mut(Some(edit), 2, 2);
    trie.insert_mut(Some(edit), 1, 10);
    assert_eq!(Rc::as_ptr(trie.root()), root);
    assert_eq!(trie.root().owner(), Some(edit));
    assert_eq!(trie.get(&1), Some(&10));
}

#[test]
fn edit_tokens_are_distinct() {
    let a = Edit::new();
    let b = Edit::new();
    assert_ne!(a, b);
    assert_ne!(a.id(), b.id());
}

// ---------------------------------------------------------------------------
// Equivalence with persistent operations
// ---------------------------------------------------------------------------

#[test]
fn transient_vector_matches_persistent() {
    let mut persistent: Vector<u32> = Vector::new();
    let mut transient = Vector::<u32>::new().transient();
    for i in 0..2000 {
        if i % 5 == 0 {
            persistent = persistent.push_front(i);
            transient.push_front(i);
        } else {
            persistent = persistent.push_back(i);
            transient.push_back(i);
        }
        if i % 97 == 0 {
            let index = (i as usize * 7) % persistent.len();
            persistent = persistent.set(index, 0).unwrap();
            assert!(transient.set(index, 0));
        }
    }
    persistent = persistent.skip(13).take(1500);
    transient.skip(13);
    transient.take(1500);
    let other: Vector<u32> = (0..77).collect();
    persistent = persistent.append(&other);
    transient.append(&other);

    let transient = transient.persistent();
    transient.tree().check().unwrap();
    assert_eq!(transient, persistent);
}

#[test]
fn transient_map_matches_persistent() {
    let mut persistent: HashMap<u32, u32> = HashMap::new();
    let mut transient = HashMap::<u32, u32>::new().transient();
    for i in 0..3000_u32 {
        let key = i.wrapping_mul(2_654_435_761) % 1000;
        if i % 4 == 0 {
            persistent = persistent.remove(&key);
            transient.remove(&key);
        } else {
            persistent = persistent.insert(key, i);
            transient.insert(key, i);
        }
    }
    let transient = transient.persistent();
    transient.tree().check().unwrap();
    assert_eq!(transient, persistent);
}

// ---------------------------------------------------------------------------
// Return values
// ---------------------------------------------------------------------------

#[test]
fn map_insert_returns_displaced_value() {
    let mut map = HashMap::<&str, i32>::new().transient();
    assert_eq!(map.insert("k", 10), None);
    assert_eq!(map.insert("k", 20), Some(10));
    assert_eq!(map.insert("k", 30), Some(20));
    assert_eq!(map.get("k"), Some(&30));
    assert_eq!(map.len(), 1);
}

#[test]
fn map_remove_returns_value() {
    let mut map = HashMap::<u32, u32>::new().transient();
    for i in 0..100 {
        map.insert(i, i * 10);
    }
    assert_eq!(map.remove(&50), Some(500));
    assert_eq!(map.remove(&50), None);
    assert_eq!(map.remove(&1000), None);
    assert_eq!(map.len(), 99);
}

#[test]
fn map_update_counts() {
    let mut map = HashMap::<char, usize>::new().transient();
    for c in "mississippi".chars() {
        map.update(c, |n| n.map_or(1, |n| n + 1));
    }
    assert_eq!(map.get(&'s'), Some(&4));
    assert_eq!(map.get(&'m'), Some(&1));
    assert_eq!(map.len(), 4);
}

#[test]
fn set_insert_and_remove_report_membership() {
    let mut set = HashSet::<u32>::new().transient();
    assert!(set.insert(1));
    assert!(!set.insert(1));
    assert!(set.contains(&1));
    assert!(set.remove(&1));
    assert!(!set.remove(&1));
    assert!(set.is_empty());
}

#[test]
fn vector_set_out_of_bounds_is_rejected() {
    let mut v = Vector::<u32>::new().transient();
    v.push_back(1);
    assert!(!v.set(1, 5));
    assert!(!v.update(7, |x| x + 1));
    assert!(v.update(0, |x| x + 1));
    assert_eq!(v.get(0), Some(&2));
}

// ---------------------------------------------------------------------------
// Checkpoints
// ---------------------------------------------------------------------------

#[test]
fn checkpoint_is_isolated_from_later_edits() {
    let mut v = (0..100).collect::<Vector<u32>>().transient();
    let snapshot = v.checkpoint();
    for (i, value) in (0..50).zip(0_u32..) {
        v.set(i, 0);
        v.push_back(value);
    }
    v.skip(10);
    assert_eq!(snapshot.len(), 100);
    assert!(snapshot.iter().copied().eq(0..100));
    assert_eq!(v.len(), 140);
}

#[test]
fn rollback_restores_checkpoint() {
    let mut map = HashMap::<u32, u32>::new().transient();
    for i in 0..20 {
        map.insert(i, i);
    }
    let snapshot = map.checkpoint();
    for i in 0..20 {
        map.remove(&i);
    }
    map.insert(100, 100);
    assert_eq!(map.len(), 1);

    map.rollback(snapshot.clone());
    assert_eq!(map.len(), 20);
    assert_eq!(map.get(&100), None);
    map.insert(5, 50);
    assert_eq!(snapshot.get(&5), Some(&5));

    let mut v = Vector::<u32>::new().transient();
    v.push_back(1);
    let before = v.checkpoint();
    v.push_back(2);
    v.rollback(before);
    assert_eq!(v.persistent().iter().copied().collect::<Vec<u32>>(), [1]);
}

#[test]
fn source_of_transient_is_untouched() {
    let source: HashSet<u32> = (0..500).collect();
    let mut t = source.transient();
    for i in 0..500 {
        t.remove(&i);
    }
    assert!(t.is_empty());
    assert_eq!(source.len(), 500);
    assert!((0..500).all(|i| source.contains(&i)));
}
