use std::hash::{Hash, Hasher};

use crate::champ::{ChampTree, NodePtr};
use crate::policy::RcPolicy;

/// A key type with a controllable hash value for testing hash collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CollidingKey {
    id: u32,
    forced_hash: u64,
}

impl CollidingKey {
    const fn new(id: u32, hash: u64) -> Self {
        Self {
            id,
            forced_hash: hash,
        }
    }
}

impl Hash for CollidingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.forced_hash.hash(state);
    }
}

fn count_collision_nodes<V>(ptr: &NodePtr<CollidingKey, V, RcPolicy>) -> usize {
    usize::from(ptr.is_collision())
        + ptr
            .children()
            .iter()
            .map(count_collision_nodes::<V>)
            .sum::<usize>()
}

/// Two keys with the same 64-bit hash create a collision node.
#[test]
fn two_colliding_keys() {
    let k1 = CollidingKey::new(1, 0xDEAD_BEEF);
    let k2 = CollidingKey::new(2, 0xDEAD_BEEF);

    let trie = ChampTree::<CollidingKey, &str>::new()
        .insert(k1.clone(), "first")
        .insert(k2.clone(), "second");

    assert_eq!(trie.len(), 2);
    assert_eq!(trie.get(&k1), Some(&"first"));
    assert_eq!(trie.get(&k2), Some(&"second"));
    assert_eq!(count_collision_nodes(trie.root()), 1);
    trie.check().unwrap();
}

/// Three keys with the same hash.
#[test]
fn three_colliding_keys() {
    let keys: Vec<CollidingKey> = (0..3).map(|i| CollidingKey::new(i, 0xCAFE)).collect();

    let trie = keys
        .iter()
        .enumerate()
        .fold(ChampTree::<CollidingKey, usize>::new(), |t, (i, k)| t.insert(k.clone(), i));

    assert_eq!(trie.len(), 3);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(trie.get(k), Some(&i));
    }
    trie.check().unwrap();
}

/// Remove from collision node.
#[test]
fn remove_from_collision() {
    let k1 = CollidingKey::new(1, 0xAAAA);
    let k2 = CollidingKey::new(2, 0xAAAA);
    let k3 = CollidingKey::new(3, 0xAAAA);

    let mut map = crate::HashMap::<CollidingKey, i32>::new().transient();
    map.insert(k1.clone(), 10);
    map.insert(k2.clone(), 20);
    map.insert(k3.clone(), 30);

    assert_eq!(map.remove(&k2), Some(20));
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&k1), Some(&10));
    assert_eq!(map.get(&k2), None);
    assert_eq!(map.get(&k3), Some(&30));
}

/// Overwrite in collision node.
#[test]
fn overwrite_in_collision() {
    let k1 = CollidingKey::new(1, 0xBBBB);
    let k2 = CollidingKey::new(2, 0xBBBB);

    let mut map = crate::HashMap::<CollidingKey, &str>::new().transient();
    map.insert(k1.clone(), "old");
    map.insert(k2, "val2");
    assert_eq!(map.insert(k1.clone(), "new"), Some("old"));

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&k1), Some(&"new"));
}

/// Shrinking a collision node to one entry inlines it back up to the root.
#[test]
fn collision_collapses_on_remove() {
    let k1 = CollidingKey::new(1, 0xCCCC);
    let k2 = CollidingKey::new(2, 0xCCCC);

    let trie = ChampTree::<CollidingKey, i32>::new()
        .insert(k1.clone(), 1)
        .insert(k2.clone(), 2);
    let single = trie.remove(&k1);

    assert_eq!(single.len(), 1);
    assert_eq!(count_collision_nodes(single.root()), 0);
    assert_eq!(single.root().data_len(), 1);
    assert_eq!(single.get(&k2), Some(&2));
    single.check().unwrap();

    let empty = single.remove(&k2);
    assert!(empty.is_empty());
}

/// Mixed: some keys collide, some don't.
#[test]
fn mixed_collisions_and_normal() {
    let collide_a = CollidingKey::new(1, 0xDDDD);
    let collide_b = CollidingKey::new(2, 0xDDDD);
    let normal = CollidingKey::new(3, 0xEEEE);

    let trie = ChampTree::<CollidingKey, &str>::new()
        .insert(collide_a.clone(), "a")
        .insert(collide_b.clone(), "b")
        .insert(normal.clone(), "c");

    assert_eq!(trie.len(), 3);
    assert_eq!(trie.get(&collide_a), Some(&"a"));
    assert_eq!(trie.get(&collide_b), Some(&"b"));
    assert_eq!(trie.get(&normal), Some(&"c"));
    trie.check().unwrap();
}

/// Colliding keys are reported individually by diff.
#[test]
fn diff_inside_collision_node() {
    let k1 = CollidingKey::new(1, 0xFEED);
    let k2 = CollidingKey::new(2, 0xFEED);
    let k3 = CollidingKey::new(3, 0xFEED);

    let old = ChampTree::<CollidingKey, i32>::new()
        .insert(k1, 1)
        .insert(k2.clone(), 2);
    let new = old.insert(k2, 20).insert(k3, 3);

    let mut added = Vec::new();
    let mut changed = Vec::new();
    old.diff(&new, |change| match change {
        crate::champ::Change::Added(k, _) => added.push(k.id),
        crate::champ::Change::Changed { key, old, new } => changed.push((key.id, *old, *new)),
        crate::champ::Change::Removed(..) => panic!("nothing was removed"),
    });
    assert_eq!(added, [3]);
    assert_eq!(changed, [(2, 2, 20)]);
}
