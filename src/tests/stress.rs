use std::collections::{HashMap as StdHashMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{HashMap, Vector};

/// 1000 entries: insert all, verify all, remove all.
#[test]
fn thousand_entries() {
    let mut map = HashMap::<u64, u64>::new().transient();
    for i in 0_u64..1000 {
        map.insert(i, i * 3);
    }
    assert_eq!(map.len(), 1000);

    for i in 0_u64..1000 {
        assert_eq!(map.get(&i), Some(&(i * 3)), "missing key {i}");
    }

    for i in 0_u64..1000 {
        assert!(map.remove(&i).is_some(), "failed to remove key {i}");
    }
    assert!(map.is_empty());
    map.persistent().tree().check().unwrap();
}

/// Insert + overwrite + remove interleaved.
#[test]
fn interleaved_operations() {
    let mut map = HashMap::<u64, u64>::new();
    for i in 0_u64..200 {
        map = map.insert(i, i);
    }
    for i in (0_u64..200).step_by(2) {
        map = map.insert(i, i + 1000);
    }
    for i in (1_u64..200).step_by(2) {
        map = map.remove(&i);
    }
    assert_eq!(map.len(), 100);
    for i in (0_u64..200).step_by(2) {
        assert_eq!(map.get(&i), Some(&(i + 1000)));
    }
}

/// Random edits at both ends, random slicing and concatenation, checked
/// against a `VecDeque`.
#[test]
fn random_vector_operations() {
    let mut rng = StdRng::seed_from_u64(0x00C0_FFEE);
    let mut vector: Vector<u32> = Vector::new();
    let mut model: VecDeque<u32> = VecDeque::new();

    for step in 0..5000_u32 {
        match rng.gen_range(0..10) {
            0..=3 => {
                vector = vector.push_back(step);
                model.push_back(step);
            }
            4 | 5 => {
                vector = vector.push_front(step);
                model.push_front(step);
            }
            6 if !model.is_empty() => {
                let index = rng.gen_range(0..model.len());
                vector = vector.set(index, step).unwrap();
                model[index] = step;
            }
            7 => {
                let n = rng.gen_range(0..=model.len());
                vector = vector.take(model.len() - n / 4);
                model.truncate(model.len() - n / 4);
            }
            8 => {
                let n = rng.gen_range(0..=model.len()) / 4;
                vector = vector.skip(n);
                model.drain(..n);
            }
            9 => {
                let copy = vector.clone();
                vector = vector.append(&copy);
                let doubled: Vec<u32> = model.iter().copied().collect();
                model.extend(doubled);
                if model.len() > 20_000 {
                    vector = vector.take(1000);
                    model.truncate(1000);
                }
            }
            _ => {}
        }
        assert_eq!(vector.len(), model.len(), "step {step}");
        if step % 250 == 0 {
            vector.tree().check().unwrap();
            assert!(vector.iter().eq(model.iter()), "step {step}");
        }
    }
    vector.tree().check().unwrap();
    assert!(vector.iter().eq(model.iter()));
}

/// Random map edits checked against `std::collections::HashMap`.
#[test]
fn random_map_operations() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut map = HashMap::<u16, u32>::new();
    let mut model = StdHashMap::new();

    for step in 0..20_000_u32 {
        let key: u16 = rng.gen_range(0..2048);
        if rng.gen_bool(0.6) {
            map = map.insert(key, step);
            model.insert(key, step);
        } else {
            map = map.remove(&key);
            model.remove(&key);
        }
        assert_eq!(map.len(), model.len());
    }
    map.tree().check().unwrap();
    assert!(model.iter().all(|(k, v)| map.get(k) == Some(v)));
}
