use std::sync::Arc;
use std::thread;

use crate::{ArcPolicy, HashMapSync, HashSetSync, VectorSync};

#[test]
fn sync_handles_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<VectorSync<String>>();
    assert_send_sync::<HashMapSync<String, i32>>();
    assert_send_sync::<HashSetSync<u64>>();
    assert_send_sync::<crate::rrb::RrbTree<u8, ArcPolicy>>();
}

#[test]
fn sync_vector_basics() {
    let v: VectorSync<u64> = (0..1000).collect();
    assert_eq!(v.len(), 1000);
    assert_eq!(v.get(999), Some(&999));
    let sliced = v.skip(100).take(10);
    assert!(sliced.iter().copied().eq(100..110));
    v.tree().check().unwrap();
}

#[test]
fn sync_map_canonical_order() {
    let m1 = HashMapSync::<u32, u32>::new().insert(1, 10).insert(2, 20).insert(3, 30);
    let m2 = HashMapSync::<u32, u32>::new().insert(3, 30).insert(1, 10).insert(2, 20);
    assert_eq!(m1, m2);
    let mut diffs = 0;
    m1.diff(&m2, |_| diffs += 1);
    assert_eq!(diffs, 0);
}

/// Readers on other threads see the version they were handed, while the
/// owner keeps editing.
#[test]
fn versions_shared_across_threads() {
    let base: HashMapSync<u64, u64> = (0..1000).map(|i| (i, i * 5)).collect();
    let mut handles = Vec::new();
    for t in 0..4 {
        let snapshot = base.clone();
        handles.push(thread::spawn(move || {
            let edited = (0..250).fold(snapshot.clone(), |m, i| m.insert(t * 250 + i, 0));
            assert!((0..1000).all(|i| snapshot.get(&i) == Some(&(i * 5))));
            edited
        }));
    }

    for (t, handle) in (0_u64..).zip(handles) {
        let edited = handle.join().unwrap();
        assert_eq!(edited.len(), 1000);
        assert_eq!(edited.get(&(t * 250)), Some(&0));
        edited.tree().check().unwrap();
    }
    assert!((0..1000).all(|i| base.get(&i) == Some(&(i * 5))));
}

#[test]
fn transient_moves_between_threads() {
    let v: VectorSync<u32> = (0..100).collect();
    let mut t = v.transient();
    let t = thread::spawn(move || {
        for i in 0..100 {
            t.push_front(i);
        }
        t
    })
    .join()
    .unwrap();
    let grown = t.persistent();
    assert_eq!(grown.len(), 200);
    assert_eq!(grown.first(), Some(&99));
    assert_eq!(v.len(), 100);
}

#[test]
fn shared_set_read_concurrently() {
    let set = Arc::new((0..10_000_u64).collect::<HashSetSync<u64>>());
    let mut handles = Vec::new();
    for t in 0..4 {
        let set = Arc::clone(&set);
        handles.push(thread::spawn(move || (t..10_000).step_by(4).filter(|i| set.contains(i)).count()));
    }
    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 10_000);
}
