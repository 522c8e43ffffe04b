use crate::{HashMap, HashSet, Vector};

#[test]
fn default_is_empty() {
    assert!(Vector::<i32>::default().is_empty());
    assert!(HashMap::<i32, i32>::default().is_empty());
    assert!(HashSet::<i32>::default().is_empty());
}

#[test]
fn debug_format() {
    let v: Vector<i32> = (1..=3).collect();
    assert_eq!(format!("{v:?}"), "[1, 2, 3]");

    let m: HashMap<i32, &str> = HashMap::new().insert(1, "one");
    assert_eq!(format!("{m:?}"), r#"{1: "one"}"#);

    let s: HashSet<i32> = HashSet::new().insert(7);
    assert_eq!(format!("{s:?}"), "{7}");

    let t = v.transient();
    let dbg = format!("{t:?}");
    assert!(dbg.contains("TransientVector"));
    assert!(dbg.contains("[1, 2, 3]"));
}

#[test]
fn from_iterator() {
    let map: HashMap<i32, i32> = vec![(1, 10), (2, 20), (3, 30)].into_iter().collect();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&1), Some(&10));

    let v: Vector<char> = "hello".chars().collect();
    assert_eq!(v.len(), 5);
    assert_eq!(v.last(), Some(&'o'));

    let s: HashSet<char> = "hello".chars().collect();
    assert_eq!(s.len(), 4);
}

#[test]
fn extend_trait() {
    let mut map: HashMap<i32, i32> = HashMap::new().insert(1, 10);
    map.extend(vec![(2, 20), (3, 30), (1, 11)]);
    assert_eq!(map.len(), 3);
    assert_eq!(map[&1], 11);

    let mut v: Vector<i32> = Vector::new().push_back(0);
    v.extend(1..40);
    assert!(v.iter().copied().eq(0..40));

    let mut s: HashSet<i32> = HashSet::new().insert(1);
    s.extend([1, 2, 3]);
    assert_eq!(s.len(), 3);
}

#[test]
fn extend_leaves_clones_untouched() {
    let original: Vector<i32> = (0..10).collect();
    let mut grown = original.clone();
    grown.extend(10..100);
    assert_eq!(original.len(), 10);
    assert_eq!(grown.len(), 100);
}

#[test]
fn index_existing() {
    let map: HashMap<&str, i32> = HashMap::new().insert("key", 42);
    assert_eq!(map["key"], 42);
    let v: Vector<i32> = (0..50).collect();
    assert_eq!(v[49], 49);
}

#[test]
#[should_panic(expected = "key not found")]
fn index_missing_panics() {
    let map: HashMap<i32, i32> = HashMap::new();
    let _ = map[&999];
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn index_past_end_panics() {
    let v: Vector<i32> = (0..3).collect();
    let _ = v[3];
}

#[test]
fn equality() {
    let a: Vector<i32> = (0..100).collect();
    let b = (0..100).fold(Vector::<i32>::new(), |v, i| v.push_front(99 - i));
    assert_eq!(a, b);
    assert_ne!(a, b.take(99));

    let s1: HashSet<i32> = [1, 2, 3].into_iter().collect();
    let s2: HashSet<i32> = [3, 2, 1].into_iter().collect();
    assert_eq!(s1, s2);
    assert_ne!(s1, s2.remove(&2));
}

#[test]
fn borrowed_iteration() {
    let v: Vector<i32> = (0..10).collect();
    let mut sum = 0;
    for x in &v {
        sum += x;
    }
    assert_eq!(sum, 45);

    let m: HashMap<i32, i32> = (0..10).map(|i| (i, i)).collect();
    assert_eq!((&m).into_iter().map(|(_, v)| v).sum::<i32>(), 45);
    let mut keys: Vec<i32> = m.keys().copied().collect();
    keys.sort_unstable();
    assert_eq!(keys, (0..10).collect::<Vec<i32>>());
    assert_eq!(m.values().len(), 10);

    let s: HashSet<i32> = (0..10).collect();
    assert_eq!((&s).into_iter().count(), 10);
}
