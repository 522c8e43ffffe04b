use std::rc::Rc;

use crate::policy::{Policy, RcPolicy};
use crate::rrb::{Node, RrbTree};
use crate::{HashMap, HashSet, Vector};

/// Every intermediate version keeps its contents after later edits.
#[test]
fn vector_versions_are_independent() {
    let mut versions = vec![Vector::<usize>::new()];
    for i in 0..300 {
        let next = versions[i].push_back(i);
        versions.push(next);
    }
    for (len, version) in versions.iter().enumerate() {
        assert_eq!(version.len(), len);
        assert!(version.iter().copied().eq(0..len));
    }
}

/// Updating one slot copies only the path to it.
#[test]
fn update_shares_untouched_subtrees() {
    let tree: RrbTree<u32> = (0..5000).fold(RrbTree::new(), |t, i| t.push_back(i));
    let updated = tree.set(0, 99).unwrap();

    assert!(!Rc::ptr_eq(tree.root(), updated.root()));
    assert!(Rc::ptr_eq(tree.tail(), updated.tail()));
    let (old, new) = (tree.root().children(), updated.root().children());
    assert!(!Rc::ptr_eq(&old[0], &new[0]));
    for (a, b) in old.iter().zip(new).skip(1) {
        assert!(Rc::ptr_eq(a, b));
    }
    assert_eq!(tree.first(), Some(&0));
    assert_eq!(updated.first(), Some(&99));
}

/// Pushing to a full tail shares every existing leaf.
#[test]
fn push_shares_existing_leaves() {
    let tree: RrbTree<u32> = (0..64).fold(RrbTree::new(), |t, i| t.push_back(i));
    let pushed = tree.push_back(64);
    assert!(Rc::ptr_eq(&tree.root().children()[0], &pushed.root().children()[0]));
    assert!(Rc::ptr_eq(tree.tail(), &pushed.root().children()[1]));
}

#[test]
fn map_versions_are_independent() {
    let v1: HashMap<&str, i32> = HashMap::new().insert("a", 1).insert("b", 2);
    let v2 = v1.insert("c", 3);
    let v3 = v2.remove("a");
    let v4 = v3.insert("b", 20);

    assert_eq!(v1.len(), 2);
    assert_eq!(v1.get("c"), None);
    assert_eq!(v2.get("a"), Some(&1));
    assert_eq!(v3.get("a"), None);
    assert_eq!(v3.get("b"), Some(&2));
    assert_eq!(v4.get("b"), Some(&20));
}

/// Rebuilding the same entries reaches an equal map, whatever the path.
#[test]
fn equal_contents_compare_equal() {
    let direct: HashMap<u32, u32> = (0..100).map(|i| (i, i)).collect();
    let roundabout = (0..150)
        .fold(HashMap::<u32, u32>::new(), |m, i| m.insert(i, 0))
        .update(7, |_| 7);
    let roundabout = (0..150).fold(roundabout, |m, i| if i < 100 { m.insert(i, i) } else { m.remove(&i) });
    assert_eq!(direct, roundabout);
}

#[test]
fn set_versions_are_independent() {
    let empty = HashSet::<String>::new();
    let one = empty.insert("x".to_owned());
    let two = one.insert("y".to_owned());
    assert!(empty.is_empty());
    assert_eq!(one.len(), 1);
    assert!(!one.contains("y"));
    assert!(two.contains("x") && two.contains("y"));
}

/// Dropping the newer version leaves the shared nodes owned by the older one.
#[test]
fn dropping_a_version_releases_only_its_nodes() {
    let tree: RrbTree<u32> = (0..100).fold(RrbTree::new(), |t, i| t.push_back(i));
    let leaf = tree.root().children()[0].clone();
    assert_eq!(Rc::strong_count(&leaf), 2);
    let copy = tree.push_back(100).set(50, 0).unwrap();
    assert_eq!(Rc::strong_count(&leaf), 3);
    drop(copy);
    assert_eq!(Rc::strong_count(&leaf), 2);
    drop(tree);
    assert_eq!(RcPolicy::ref_count::<Node<u32, RcPolicy>>(&leaf), 1);
    assert!(RcPolicy::is_unique::<Node<u32, RcPolicy>>(&leaf));
}
