use std::collections::{BTreeMap, BTreeSet};

use ordered_forest::{NodePool, OrderedMap, OrderedSet};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8),
    Erase(u8),
    Find(u8),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    // A narrow key range keeps duplicates and hits on erase frequent.
    let key = 0u8..64;
    let op = prop_oneof![
        50 => key.clone().prop_map(Op::Insert),
        30 => key.clone().prop_map(Op::Erase),
        20 => key.prop_map(Op::Find),
    ];
    prop::collection::vec(op, 0..=400)
}

/// Multiset model: key -> number of live copies.
fn model_keys(model: &BTreeMap<u8, usize>) -> BTreeSet<u8> {
    model.keys().copied().collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_set_matches_multiset_model(ops in ops_strategy(), chunk_size in 1usize..9) {
        let pool = NodePool::with_chunk_size(chunk_size).unwrap();
        let mut set = OrderedSet::with_pool(&pool);
        let mut model: BTreeMap<u8, usize> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k) => {
                    set.insert(k).unwrap();
                    *model.entry(k).or_default() += 1;
                }
                Op::Erase(k) => {
                    let removed = set.erase(&k).unwrap();
                    let expected = match model.get_mut(&k) {
                        Some(count) => {
                            *count -= 1;
                            if *count == 0 {
                                model.remove(&k);
                            }
                            true
                        }
                        None => false,
                    };
                    prop_assert_eq!(removed, expected);
                }
                Op::Find(k) => {
                    prop_assert_eq!(set.contains(&k).unwrap(), model.contains_key(&k));
                }
            }
            prop_assert!(set.assert_valid().is_ok(), "{:?}", set.assert_valid());
        }

        let total: usize = model.values().sum();
        prop_assert_eq!(set.len(), total);
        prop_assert_eq!(set.to_set().unwrap(), model_keys(&model));

        let stats = pool.stats().unwrap();
        prop_assert_eq!(stats.live, total);
        prop_assert!(stats.capacity >= stats.obtained);
    }

    #[test]
    fn prop_map_visits_duplicates_in_insertion_order(
        keys in prop::collection::vec(0u8..16, 0..=200),
    ) {
        let mut map = OrderedMap::new();
        for (seq, k) in keys.iter().enumerate() {
            map.insert(*k, seq).unwrap();
        }
        map.assert_valid().unwrap();

        let mut visited = Vec::new();
        map.for_each(|k, seq| visited.push((*k, *seq))).unwrap();

        // Ties go right on insert, so equal keys come out in insertion order.
        let mut expected: Vec<(u8, usize)> = keys.iter().copied().zip(0..).collect();
        expected.sort_by_key(|(k, _)| *k);
        prop_assert_eq!(visited, expected);
    }
}

#[test]
fn shuffled_insert_erase_stress() {
    let mut rng = StdRng::seed_from_u64(0x5eed_f0e5);
    let pool = NodePool::with_chunk_size(32).unwrap();
    let mut set = OrderedSet::with_pool(&pool);

    let mut values: Vec<u32> = (0..2_000).collect();
    values.shuffle(&mut rng);
    for v in &values {
        set.insert(*v).unwrap();
    }
    set.assert_valid().unwrap();
    assert_eq!(set.len(), values.len());

    values.shuffle(&mut rng);
    let (gone, kept) = values.split_at(values.len() / 2);
    for v in gone {
        assert!(set.erase(v).unwrap());
    }
    set.assert_valid().unwrap();

    for v in gone {
        assert!(!set.contains(v).unwrap());
    }
    for v in kept {
        assert!(set.contains(v).unwrap());
    }

    // Freed slots are reused before the pool grows again.
    let before = pool.stats().unwrap();
    for v in gone {
        set.insert(*v).unwrap();
    }
    let after = pool.stats().unwrap();
    assert_eq!(after.chunks, before.chunks);
    assert_eq!(after.free, 0);
    assert_eq!(set.len(), values.len());
    set.assert_valid().unwrap();
}
