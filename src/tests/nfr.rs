//! Non-functional requirement tests: asymptotic complexity and structural
//! sharing.
//!
//! Timing bounds carry generous headroom for CI noise; the sharing checks are
//! exact.

use std::hint::black_box;
use std::rc::Rc;
use std::time::Instant;

use crate::champ::ChampTree;
use crate::rrb::RrbTree;

/// Measures wall-clock time of a closure in nanoseconds.
fn measure_ns<F: FnMut()>(mut f: F) -> u128 {
    let start = Instant::now();
    f();
    start.elapsed().as_nanos()
}

/// Runs `f` multiple times and returns median time in nanoseconds.
fn median_ns<F: FnMut()>(iterations: u32, mut f: F) -> u128 {
    let mut times: Vec<u128> = (0..iterations).map(|_| measure_ns(&mut f)).collect();
    times.sort_unstable();
    times[times.len() / 2].max(1)
}

fn ratio(large: u128, small: u128) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let ratio = large as f64 / small as f64;
    ratio
}

fn build_vector(n: u64) -> RrbTree<u64> {
    let mut tree = RrbTree::new();
    let edit = crate::Edit::new();
    for i in 0..n {
        tree.push_back_mut(Some(edit), i);
    }
    tree
}

fn build_map(n: u64) -> ChampTree<u64, u64> {
    let mut trie = ChampTree::new();
    let edit = crate::Edit::new();
    for i in 0..n {
        trie.insert_mut(Some(edit), i, i);
    }
    trie
}

// ---------------------------------------------------------------------------
// Asymptotic: O(log n) operations
// ---------------------------------------------------------------------------

/// Indexed reads stay near-constant: `log₃₂(1_000) ≈ 2`, `log₃₂(100_000) ≈ 3.3`.
#[test]
fn vector_get_sublinear() {
    let small = build_vector(1_000);
    let large = build_vector(100_000);
    let t_small = median_ns(7, || {
        for i in 0..1_000 {
            black_box(small.get(i));
        }
    });
    let t_large = median_ns(7, || {
        for i in (0..100_000).step_by(100) {
            black_box(large.get(i));
        }
    });
    let r = ratio(t_large, t_small);
    assert!(r < 8.0, "get ratio {r:.2}x (small={t_small}ns, large={t_large}ns)");
}

#[test]
fn map_get_sublinear() {
    let small = build_map(1_000);
    let large = build_map(100_000);
    let t_small = median_ns(7, || {
        for i in 0_u64..1_000 {
            black_box(small.get(&i));
        }
    });
    let t_large = median_ns(7, || {
        for i in 0_u64..1_000 {
            black_box(large.get(&i));
        }
    });
    let r = ratio(t_large, t_small);
    assert!(r < 10.0, "get ratio {r:.2}x (small={t_small}ns, large={t_large}ns)");
}

/// Concatenation cost is logarithmic, not proportional to the operands.
#[test]
fn concat_sublinear() {
    let small = build_vector(1_000);
    let large = build_vector(200_000);
    let t_small = median_ns(7, || {
        black_box(small.concat(&small));
    });
    let t_large = median_ns(7, || {
        black_box(large.concat(&large));
    });
    let r = ratio(t_large, t_small);
    assert!(r < 20.0, "concat ratio {r:.2}x (small={t_small}ns, large={t_large}ns)");
}

// ---------------------------------------------------------------------------
// Structural sharing
// ---------------------------------------------------------------------------

/// A persistent push onto a large tree allocates only the path to the tail.
#[test]
fn push_copies_only_the_spine() {
    let tree = build_vector(100_000);
    let pushed = tree.push_back(0);
    let shared = tree
        .root()
        .children()
        .iter()
        .zip(pushed.root().children())
        .filter(|(a, b)| Rc::ptr_eq(a, b))
        .count();
    assert!(shared + 1 >= tree.root().count());
}

/// Slicing shares every subtree strictly inside the kept range.
#[test]
fn take_shares_interior_subtrees() {
    let tree = build_vector(100_000);
    let half = tree.take(50_000);
    let first = &tree.root().children()[0];
    assert!(Rc::ptr_eq(first, &half.root().children()[0]));
    assert!(Rc::strong_count(first) >= 2);
}

/// Inserting one key copies at most one node per level.
#[test]
fn insert_copies_one_path() {
    let trie = build_map(50_000);
    let inserted = trie.insert(1_000_000, 0);
    let shared = trie
        .root()
        .children()
        .iter()
        .zip(inserted.root().children())
        .filter(|(a, b)| Rc::ptr_eq(a, b))
        .count();
    assert!(shared + 1 >= trie.root().children_len());
}

/// A cloned handle adds exactly one reference to the root and nothing below.
#[test]
fn clone_is_constant_time() {
    let trie = build_map(10_000);
    let child = &trie.root().children()[0];
    let before = (Rc::strong_count(trie.root()), Rc::strong_count(child));
    let copy = trie.clone();
    assert_eq!(Rc::strong_count(trie.root()), before.0 + 1);
    assert_eq!(Rc::strong_count(child), before.1);
    drop(copy);
    assert_eq!(Rc::strong_count(trie.root()), before.0);
}

/// Iteration visits each element once: O(n).
#[test]
fn iteration_linear() {
    let small = build_vector(10_000);
    let large = build_vector(100_000);
    let t_small = median_ns(5, || {
        black_box(small.iter().sum::<u64>());
    });
    let t_large = median_ns(5, || {
        black_box(large.iter().sum::<u64>());
    });
    let r = ratio(t_large, t_small);
    assert!(r < 30.0, "iteration ratio {r:.2}x (small={t_small}ns, large={t_large}ns)");
}
