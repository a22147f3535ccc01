//! Model-based property tests: collections against std containers

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use corral::{MemoryStore, Order, RemoteSet, RemoteSortedSet, ScoreRange};

fn remote(items: &[String]) -> RemoteSet<String, MemoryStore> {
    let set = RemoteSet::new(Arc::new(MemoryStore::new()), "model");
    set.insert_all(items).unwrap();
    set
}

fn elems() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-e]{1,3}", 0..24)
}

proptest! {
    #[test]
    fn union_matches_hashset_model(a in elems(), b in elems()) {
        let set = remote(&a);
        set.union_with(&b).unwrap();

        let model: HashSet<String> = a.iter().chain(b.iter()).cloned().collect();
        let mut actual: Vec<String> = set.iter().collect::<Result<_, _>>().unwrap();
        actual.sort();
        let mut expected: Vec<String> = model.into_iter().collect();
        expected.sort();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn intersect_matches_hashset_model(a in elems(), b in elems()) {
        let set = remote(&a);
        set.intersect_with(&b).unwrap();

        let b_model: HashSet<String> = b.iter().cloned().collect();
        let model: HashSet<String> =
            a.iter().filter(|x| b_model.contains(*x)).cloned().collect();
        let actual: HashSet<String> = set.iter().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(actual, model);
    }

    #[test]
    fn except_matches_hashset_model(a in elems(), b in elems()) {
        let set = remote(&a);
        set.except_with(&b).unwrap();

        let b_model: HashSet<String> = b.iter().cloned().collect();
        let model: HashSet<String> =
            a.iter().filter(|x| !b_model.contains(*x)).cloned().collect();
        let actual: HashSet<String> = set.iter().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(actual, model);
        prop_assert!(!set.overlaps(&b).unwrap());
    }

    #[test]
    fn subset_superset_agree_with_model(a in elems(), b in elems()) {
        let set = remote(&a);
        let a_model: HashSet<String> = a.iter().cloned().collect();
        let b_model: HashSet<String> = b.iter().cloned().collect();

        prop_assert_eq!(set.is_subset_of(&b).unwrap(), a_model.is_subset(&b_model));
        prop_assert_eq!(set.is_superset_of(&b).unwrap(), a_model.is_superset(&b_model));
        prop_assert_eq!(
            set.is_proper_subset_of(&b).unwrap(),
            a_model.is_subset(&b_model) && a_model.len() < b_model.len()
        );
        prop_assert_eq!(
            set.is_proper_superset_of(&b).unwrap(),
            a_model.is_superset(&b_model) && a_model.len() > b_model.len()
        );
        prop_assert_eq!(set.set_equals(&b).unwrap(), a_model == b_model);
        prop_assert_eq!(set.overlaps(&b).unwrap(), !a_model.is_disjoint(&b_model));
    }

    #[test]
    fn symmetric_except_matches_model(a in elems(), b in elems()) {
        let set = remote(&a);
        // Dedupe b: the operation toggles per occurrence
        let b_model: HashSet<String> = b.iter().cloned().collect();
        let b_unique: Vec<String> = b_model.iter().cloned().collect();
        set.symmetric_except_with(&b_unique).unwrap();

        let a_model: HashSet<String> = a.iter().cloned().collect();
        let model: HashSet<String> =
            a_model.symmetric_difference(&b_model).cloned().collect();
        let actual: HashSet<String> = set.iter().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(actual, model);
    }

    #[test]
    fn score_range_matches_sorted_vec_model(
        entries in prop::collection::btree_map("[a-h]{1,3}", -50i32..50, 0..24),
        lo in -50i32..50,
        hi in -50i32..50,
    ) {
        let z: RemoteSortedSet<String, MemoryStore> =
            RemoteSortedSet::new(Arc::new(MemoryStore::new()), "model");
        for (value, score) in &entries {
            z.insert(*score as f64, value).unwrap();
        }

        let range = ScoreRange::new(lo as f64, hi as f64);
        let actual: Vec<(f64, String)> = z
            .range_by_score(range, Order::Ascending, 0, None)
            .map(|m| m.map(|m| (m.score, m.value)))
            .collect::<Result<_, _>>()
            .unwrap();

        let mut model: Vec<(f64, String)> = entries
            .iter()
            .filter(|(_, score)| lo <= **score && **score <= hi)
            .map(|(value, score)| (*score as f64, value.clone()))
            .collect();
        model.sort_by(|x, y| x.0.total_cmp(&y.0));

        prop_assert_eq!(actual.len(), model.len());
        prop_assert_eq!(z.count_by_score(range).unwrap(), model.len() as u64);
        // Scores agree in order; payload tie-break keeps equal scores adjacent
        for (got, want) in actual.iter().zip(model.iter()) {
            prop_assert_eq!(got.0, want.0);
        }
    }

    #[test]
    fn rank_of_matches_sorted_position(
        entries in prop::collection::btree_map("[a-h]{1,3}", -50i32..50, 1..16),
    ) {
        let z: RemoteSortedSet<String, MemoryStore> =
            RemoteSortedSet::new(Arc::new(MemoryStore::new()), "model");
        for (value, score) in &entries {
            z.insert(*score as f64, value).unwrap();
        }

        let n = entries.len() as u64;
        for (value, _) in &entries {
            let asc = z.rank_of(value, Order::Ascending).unwrap().unwrap();
            let desc = z.rank_of(value, Order::Descending).unwrap().unwrap();
            prop_assert_eq!(asc + desc, n - 1);
        }
    }
}
