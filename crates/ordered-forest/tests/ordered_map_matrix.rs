use ordered_forest::{ForestError, MapNode, NodePool, OrderedMap, OrderedSet, SetNode};

fn entries<K: Ord + Clone, V: Clone>(map: &OrderedMap<'_, K, V>) -> Vec<(K, V)> {
    let mut out = Vec::new();
    map.for_each(|k, v| out.push((k.clone(), v.clone()))).unwrap();
    out
}

#[test]
fn ordered_map_duplicate_keys_keep_first_on_lookup_matrix() {
    let mut map = OrderedMap::new();
    let first = map.insert(1, "a").unwrap();
    let second = map.insert(1, "b").unwrap();

    assert_ne!(first, second);
    assert_eq!(map.len(), 2);
    assert_eq!(map.find(&1).unwrap(), Some(first));
    assert_eq!(*map.get(&1).unwrap().unwrap(), "a");
    assert_eq!(*map.value(second).unwrap(), "b");
    assert_eq!(entries(&map), vec![(1, "a"), (1, "b")]);
    map.assert_valid().unwrap();
}

#[test]
fn ordered_map_at_inserts_default_once_matrix() {
    let mut map = OrderedMap::<i32, String>::new();
    assert!(map.at(7).unwrap().is_empty());
    assert_eq!(map.len(), 1);
    assert!(map.find(&7).unwrap().is_some());

    map.at(7).unwrap().push_str("seven");
    assert_eq!(map.len(), 1);
    assert_eq!(entries(&map), vec![(7, "seven".to_string())]);
}

#[test]
fn ordered_map_keys_stay_sorted_and_balanced_matrix() {
    let pool = NodePool::with_chunk_size(16).unwrap();
    let mut map = OrderedMap::with_pool(&pool);
    for i in (0..200).rev() {
        map.insert(i, i * 10).unwrap();
        map.assert_valid().unwrap();
    }
    let keys: Vec<i32> = entries(&map).into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, (0..200).collect::<Vec<_>>());
    assert_eq!(*map.get(&42).unwrap().unwrap(), 420);
    assert!(map.get(&200).unwrap().is_none());
}

#[test]
fn ordered_map_assign_from_is_deep_copy_matrix() {
    let mut source = OrderedMap::new();
    for (k, v) in [(5, 50), (2, 20), (8, 80), (1, 10), (9, 90), (3, 30)] {
        source.insert(k, v).unwrap();
    }
    let source_print = source.print().unwrap();

    let pool = NodePool::with_chunk_size(4).unwrap();
    let mut copy = OrderedMap::with_pool(&pool);
    copy.insert(100, 0).unwrap();
    copy.assign_from(&source).unwrap();

    assert_eq!(entries(&copy), entries(&source));
    copy.assert_valid().unwrap();
    assert_eq!(copy.len(), source.len());

    *copy.at(5).unwrap() = -1;
    assert_eq!(*source.get(&5).unwrap().unwrap(), 50);
    assert_eq!(*copy.get(&5).unwrap().unwrap(), -1);
    assert!(copy.get(&100).unwrap().is_none());

    // Same shape and colors: the dumps only differ in node handles and the
    // mutated value.
    let strip = |s: &str| {
        s.lines()
            .map(|l| l.split_once("] ").map_or(l, |(_, rest)| rest).to_string())
            .collect::<Vec<_>>()
    };
    let copy_print = copy.print().unwrap().replace("5 = -1", "5 = 50");
    assert_eq!(strip(&copy_print), strip(&source_print));
}

#[test]
fn ordered_map_assign_from_empty_clears_matrix() {
    let mut map = OrderedMap::new();
    map.insert(1, 1).unwrap();
    let empty = OrderedMap::new();
    map.assign_from(&empty).unwrap();
    assert!(map.is_empty());
    map.assert_valid().unwrap();
}

#[test]
fn ordered_map_assign_from_same_pool_matrix() {
    let pool = NodePool::with_chunk_size(2).unwrap();
    let mut a = OrderedMap::with_pool(&pool);
    let mut b = OrderedMap::with_pool(&pool);
    for i in 0..5 {
        a.insert(i, i).unwrap();
    }
    b.assign_from(&a).unwrap();
    assert_eq!(entries(&a), entries(&b));
    assert_eq!(pool.stats().unwrap().live, 10);
}

#[test]
fn ordered_map_clear_modes_matrix() {
    let mut owned = OrderedMap::new();
    for i in 0..8 {
        owned.insert(i, i.to_string()).unwrap();
    }
    owned.clear();
    assert!(owned.is_empty());
    assert_eq!(owned.find(&1).unwrap(), None);
    owned.insert(1, "again".to_string()).unwrap();
    owned.assert_valid().unwrap();

    let pool = NodePool::with_chunk_size(4).unwrap();
    let mut pooled = OrderedMap::with_pool(&pool);
    for i in 0..8 {
        pooled.insert(i, i).unwrap();
    }
    pooled.clear();
    assert!(pooled.is_empty());
    assert_eq!(pool.stats().unwrap().live, 8);
}

#[test]
fn ordered_map_of_sets_with_two_pools_matrix() {
    let set_pool = NodePool::<SetNode<i32>>::with_chunk_size(10).unwrap();
    let map_pool = NodePool::<MapNode<i32, OrderedSet<i32>>>::with_chunk_size(10).unwrap();

    let mut connections = OrderedMap::with_pool(&map_pool);
    connections.at(0).unwrap().insert_with(0, &set_pool).unwrap();
    connections.at(0).unwrap().insert(4).unwrap();
    connections.at(3).unwrap().insert_with(1, &set_pool).unwrap();

    assert_eq!(connections.len(), 2);
    {
        let zero = connections.get(&0).unwrap().unwrap();
        assert!(zero.uses_pool(&set_pool));
        assert_eq!(zero.to_set().unwrap().into_iter().collect::<Vec<_>>(), vec![0, 4]);
    }
    assert_eq!(set_pool.stats().unwrap().live, 3);
    assert_eq!(map_pool.stats().unwrap().live, 2);

    set_pool.release().unwrap();
    assert_eq!(
        connections.at(0).unwrap().find(&0),
        Err(ForestError::PoolReleased)
    );

    map_pool.release().unwrap();
    assert_eq!(connections.find(&0), Err(ForestError::PoolReleased));
    connections.clear();
    assert!(connections.is_empty());
}
