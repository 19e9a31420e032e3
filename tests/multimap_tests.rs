//! Unit tests for MultiMap.
//!
//! Covers construction, the duplicate-key operations, handle navigation and
//! the worked fruit-basket scenarios.

use multikey::MultiMap;
use multikey::MultiMapError;
use multikey::store::{Handle, RedBlackStore, SortedVecStore};
use rstest::{fixture, rstest};

type Fruits = MultiMap<i32, String>;

fn entries<S>(map: &MultiMap<i32, String, S>) -> Vec<(i32, &str)>
where
    S: multikey::store::OrderedStore<i32, String>,
{
    map.iter().map(|(key, value)| (*key, value.as_str())).collect()
}

#[fixture]
fn basket() -> Fruits {
    let mut map = Fruits::new();
    map.insert(1, "apple".to_string());
    map.insert(1, "avocado".to_string());
    map.insert(2, "banana".to_string());
    map.emplace(3, "cherry");
    map.emplace(2, "blueberry");
    map
}

// =============================================================================
// Basic Construction Tests
// =============================================================================

#[rstest]
fn test_new_creates_empty_map() {
    let map: MultiMap<i32, String> = MultiMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.first_handle(), None);
}

#[rstest]
fn test_default_creates_empty_map() {
    let map: MultiMap<i32, String> = MultiMap::default();
    assert!(map.is_empty());
}

#[rstest]
fn test_from_array_keeps_every_entry() {
    let map: MultiMap<i32, &str> = [(2, "b"), (1, "a"), (2, "c")].into();
    let collected: Vec<(&i32, &&str)> = map.iter().collect();
    assert_eq!(collected, vec![(&1, &"a"), (&2, &"b"), (&2, &"c")]);
}

#[rstest]
fn test_from_iterator_keeps_every_entry() {
    let map: MultiMap<char, usize> = "banana".chars().zip(0..).collect();
    assert_eq!(map.len(), 6);
    assert_eq!(map.count(&'a'), 3);
    let positions: Vec<usize> = map.get_all(&'a').map(|(_, v)| *v).collect();
    assert_eq!(positions, vec![1, 3, 5]);
}

#[rstest]
fn test_clone_is_independent(basket: Fruits) {
    let mut copy = basket.clone();
    copy.erase(&1);
    assert_eq!(basket.len(), 5);
    assert_eq!(copy.len(), 3);
    assert_ne!(basket, copy);
}

#[rstest]
fn test_from_store_keeps_existing_entries() {
    use multikey::store::OrderedStore;
    let mut store: RedBlackStore<i32, &str> = RedBlackStore::new();
    store.insert(7, "seven");
    let map = MultiMap::from_store(store);
    assert_eq!(map.at(&7), Ok(&"seven"));
    assert_eq!(map.store().len(), 1);
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[rstest]
fn test_scenario_insert_and_emplace_sort_by_key(basket: Fruits) {
    assert_eq!(basket.len(), 5);
    assert_eq!(basket.count(&1), 2);
    assert_eq!(basket.count(&2), 2);
    assert_eq!(
        entries(&basket),
        vec![
            (1, "apple"),
            (1, "avocado"),
            (2, "banana"),
            (2, "blueberry"),
            (3, "cherry"),
        ]
    );
}

#[rstest]
fn test_scenario_find_and_equal_range(basket: Fruits) {
    let handle = basket.find(&2).unwrap();
    let (key, value) = basket.get(handle).unwrap();
    assert_eq!(*key, 2);
    assert!(["banana", "blueberry"].contains(&value.as_str()));

    let (start, end) = basket.equal_range(&2);
    let range: Vec<&str> = basket.range(start, end).map(|(_, v)| v.as_str()).collect();
    assert_eq!(range, vec!["banana", "blueberry"]);
}

#[rstest]
fn test_scenario_erase_first_key_one_by_handle(mut basket: Fruits) {
    let handle = basket.find(&1).unwrap();
    let next = basket.erase_at(handle).unwrap();

    assert_eq!(basket.count(&1), 1);
    assert_eq!(basket.len(), 4);
    assert_eq!(basket.get(next.unwrap()), Some((&1, &"avocado".to_string())));
}

#[rstest]
fn test_scenario_erase_key_two(mut basket: Fruits) {
    let handle = basket.find(&1).unwrap();
    basket.erase_at(handle).unwrap();

    assert_eq!(basket.erase(&2), 2);
    assert_eq!(basket.count(&2), 0);
    assert_eq!(basket.len(), 2);
    assert_eq!(entries(&basket), vec![(1, "avocado"), (3, "cherry")]);
}

#[rstest]
fn test_scenario_merge_second_basket(mut basket: Fruits) {
    let handle = basket.find(&1).unwrap();
    basket.erase_at(handle).unwrap();
    basket.erase(&2);

    let mut other = Fruits::new();
    other.emplace(4, "date");
    other.emplace(4, "dragonfruit");
    other.emplace(5, "elderberry");

    basket.merge(&mut other);

    assert!(other.is_empty());
    assert_eq!(basket.len(), 5);
    assert_eq!(
        entries(&basket),
        vec![
            (1, "avocado"),
            (3, "cherry"),
            (4, "date"),
            (4, "dragonfruit"),
            (5, "elderberry"),
        ]
    );
}

#[rstest]
fn test_scenario_at_with_duplicates_and_missing_key() {
    let mut map = Fruits::new();
    map.emplace(10, "ten");
    map.emplace(20, "twenty");
    map.emplace(10, "ten-duplicate");

    let ten = map.at(&10).unwrap();
    assert!(ten == "ten" || ten == "ten-duplicate");
    assert_eq!(map.at(&20).map(String::as_str), Ok("twenty"));
    assert_eq!(map.at(&30), Err(MultiMapError::KeyNotFound));
}

// =============================================================================
// Lookup Tests
// =============================================================================

#[rstest]
fn test_find_resolves_to_first_duplicate(basket: Fruits) {
    assert_eq!(basket.find(&2), basket.lower_bound(&2));
    assert_eq!(basket.at(&2).map(String::as_str), Ok("banana"));
}

#[rstest]
#[case(0, Some(1), Some(1))]
#[case(1, Some(1), Some(2))]
#[case(2, Some(2), Some(3))]
#[case(3, Some(3), None)]
#[case(4, None, None)]
fn test_bounds(
    basket: Fruits,
    #[case] key: i32,
    #[case] lower_key: Option<i32>,
    #[case] upper_key: Option<i32>,
) {
    let key_of = |handle: Option<Handle>| handle.and_then(|h| basket.get(h)).map(|(k, _)| *k);
    assert_eq!(key_of(basket.lower_bound(&key)), lower_key);
    assert_eq!(key_of(basket.upper_bound(&key)), upper_key);
}

#[rstest]
fn test_missing_key_has_empty_equal_range(basket: Fruits) {
    let (start, end) = basket.equal_range(&42);
    assert_eq!(start, end);
    assert_eq!(basket.count(&42), 0);
    assert!(!basket.contains_key(&42));
    assert_eq!(basket.get_all(&42).next(), None);
}

#[rstest]
fn test_at_mut_updates_first_duplicate(mut basket: Fruits) {
    basket.at_mut(&1).unwrap().push_str(" pie");
    assert_eq!(basket.at(&1).map(String::as_str), Ok("apple pie"));
    assert_eq!(basket.at_mut(&9), Err(MultiMapError::KeyNotFound));
}

#[rstest]
fn test_get_all_mut_touches_only_the_equal_range(mut basket: Fruits) {
    for (_, value) in basket.get_all_mut(&2) {
        *value = value.to_uppercase();
    }
    assert_eq!(
        entries(&basket),
        vec![
            (1, "apple"),
            (1, "avocado"),
            (2, "BANANA"),
            (2, "BLUEBERRY"),
            (3, "cherry"),
        ]
    );
}

// =============================================================================
// Removal Tests
// =============================================================================

#[rstest]
fn test_erase_missing_key_returns_zero(mut basket: Fruits) {
    assert_eq!(basket.erase(&99), 0);
    assert_eq!(basket.len(), 5);
}

#[rstest]
fn test_erase_at_last_entry_returns_end(mut basket: Fruits) {
    let last = basket.last_handle().unwrap();
    assert_eq!(basket.erase_at(last), Ok(None));
}

#[rstest]
fn test_erase_at_stale_handle_is_rejected(mut basket: Fruits) {
    let handle = basket.find(&3).unwrap();
    basket.erase_at(handle).unwrap();
    assert_eq!(basket.erase_at(handle), Err(MultiMapError::InvalidHandle));
    assert_eq!(basket.get(handle), None);
    assert_eq!(basket.len(), 4);
}

#[rstest]
fn test_erase_range_to_end(mut basket: Fruits) {
    let first = basket.find(&2).unwrap();
    assert_eq!(basket.erase_range(first, None), Ok(None));
    assert_eq!(entries(&basket), vec![(1, "apple"), (1, "avocado")]);
}

#[rstest]
fn test_erase_range_empty_when_first_equals_last(mut basket: Fruits) {
    let first = basket.find(&2).unwrap();
    assert_eq!(basket.erase_range(first, Some(first)), Ok(Some(first)));
    assert_eq!(basket.len(), 5);
}

#[rstest]
fn test_erase_range_rejects_stale_last(mut basket: Fruits) {
    let first = basket.first_handle().unwrap();
    let stale = basket.find(&3).unwrap();
    basket.remove_at(stale);
    assert_eq!(
        basket.erase_range(first, Some(stale)),
        Err(MultiMapError::InvalidHandle)
    );
    assert_eq!(basket.len(), 4);
}

#[rstest]
fn test_remove_at_returns_entry(mut basket: Fruits) {
    let handle = basket.find(&3).unwrap();
    assert_eq!(basket.remove_at(handle), Some((3, "cherry".to_string())));
    assert_eq!(basket.remove_at(handle), None);
}

#[rstest]
fn test_clear_empties_and_invalidates_handles(mut basket: Fruits) {
    let handle = basket.first_handle().unwrap();
    basket.clear();
    assert!(basket.is_empty());
    assert_eq!(basket.iter().count(), 0);
    assert_eq!(basket.get(handle), None);

    let fresh = basket.emplace(1, "again");
    assert_ne!(fresh, handle);
}

// =============================================================================
// Merge and Swap Tests
// =============================================================================

#[rstest]
fn test_merge_places_incoming_after_existing_duplicates(mut basket: Fruits) {
    let mut other = Fruits::new();
    other.emplace(1, "apricot");
    basket.merge(&mut other);
    let ones: Vec<&str> = basket.get_all(&1).map(|(_, v)| v.as_str()).collect();
    assert_eq!(ones, vec!["apple", "avocado", "apricot"]);
}

#[rstest]
fn test_merge_from_empty_is_noop(mut basket: Fruits) {
    let mut other = Fruits::new();
    basket.merge(&mut other);
    assert_eq!(basket.len(), 5);
}

#[rstest]
fn test_swap_exchanges_contents_and_handles_follow(mut basket: Fruits) {
    let cherry = basket.find(&3).unwrap();
    let mut other: Fruits = [(9, "fig".to_string())].into();

    basket.swap(&mut other);

    assert_eq!(basket.len(), 1);
    assert_eq!(other.len(), 5);
    assert_eq!(other.get(cherry), Some((&3, &"cherry".to_string())));
}

// =============================================================================
// Traversal Tests
// =============================================================================

#[rstest]
fn test_reverse_traversal(basket: Fruits) {
    let keys: Vec<i32> = basket.iter().rev().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![3, 2, 2, 1, 1]);
}

#[rstest]
fn test_equal_range_walks_backwards(basket: Fruits) {
    let twos: Vec<&str> = basket.get_all(&2).rev().map(|(_, v)| v.as_str()).collect();
    assert_eq!(twos, vec!["blueberry", "banana"]);

    let ones: Vec<&str> = basket.get_all(&1).rev().map(|(_, v)| v.as_str()).collect();
    assert_eq!(ones, vec!["avocado", "apple"]);
}

#[rstest]
fn test_bounded_range_back_cursor_stops_before_end(basket: Fruits) {
    let start = basket.lower_bound(&1);
    let end = basket.find(&3);
    assert!(end.is_some());

    let mut range = basket.range(start, end);
    assert_eq!(range.next_back(), Some((&2, &"blueberry".to_string())));
    assert_eq!(range.next(), Some((&1, &"apple".to_string())));
    let middle: Vec<&str> = range.by_ref().map(|(_, v)| v.as_str()).collect();
    assert_eq!(middle, vec!["avocado", "banana"]);
    assert_eq!(range.next_back(), None);
}

#[rstest]
fn test_range_meeting_in_the_middle_yields_each_entry_once(basket: Fruits) {
    let (start, end) = basket.equal_range(&2);
    let mut range = basket.range(start, end);
    assert_eq!(range.next().map(|(_, v)| v.as_str()), Some("banana"));
    assert_eq!(range.next_back().map(|(_, v)| v.as_str()), Some("blueberry"));
    assert_eq!(range.next(), None);
    assert_eq!(range.next_back(), None);
}

#[rstest]
fn test_iter_is_exact_size_from_both_ends(basket: Fruits) {
    let mut iter = basket.iter();
    assert_eq!(iter.len(), 5);
    iter.next();
    iter.next_back();
    assert_eq!(iter.len(), 3);
    let middle: Vec<i32> = iter.map(|(k, _)| *k).collect();
    assert_eq!(middle, vec![1, 2, 2]);
}

#[rstest]
fn test_handle_navigation_matches_iteration(basket: Fruits) {
    let mut keys = Vec::new();
    let mut cursor = basket.first_handle();
    while let Some(handle) = cursor {
        keys.push(*basket.get(handle).unwrap().0);
        cursor = basket.next(handle);
    }
    assert_eq!(keys, vec![1, 1, 2, 2, 3]);
    assert_eq!(basket.prev(None), basket.last_handle());
    assert_eq!(basket.prev(basket.first_handle()), None);
}

#[rstest]
fn test_values_mut_and_iter_mut(mut basket: Fruits) {
    for value in basket.values_mut() {
        value.truncate(1);
    }
    for (key, value) in &mut basket {
        value.push_str(&key.to_string());
    }
    let values: Vec<&str> = basket.values().map(String::as_str).collect();
    assert_eq!(values, vec!["a1", "a1", "b2", "b2", "c3"]);
}

#[rstest]
fn test_into_iter_drains_in_order_from_both_ends(basket: Fruits) {
    let mut iter = basket.into_iter();
    assert_eq!(iter.len(), 5);
    assert_eq!(iter.next_back(), Some((3, "cherry".to_string())));
    let rest: Vec<(i32, String)> = iter.collect();
    assert_eq!(rest.len(), 4);
    assert_eq!(rest[0], (1, "apple".to_string()));
}

#[rstest]
fn test_first_and_last_key_value(basket: Fruits) {
    assert_eq!(basket.first_key_value(), Some((&1, &"apple".to_string())));
    assert_eq!(basket.last_key_value(), Some((&3, &"cherry".to_string())));
}

// =============================================================================
// Equality Tests
// =============================================================================

#[rstest]
fn test_equality_is_order_sensitive_for_duplicates() {
    let first: MultiMap<i32, &str> = [(1, "x"), (1, "y")].into();
    let second: MultiMap<i32, &str> = [(1, "y"), (1, "x")].into();
    let third: MultiMap<i32, &str> = [(1, "x"), (1, "y")].into();
    assert_ne!(first, second);
    assert_eq!(first, third);
}

#[rstest]
fn test_equality_ignores_store_engine() {
    let tree: MultiMap<i32, &str> = [(2, "b"), (1, "a")].into();
    let vector: MultiMap<i32, &str, SortedVecStore<i32, &str>> = [(1, "a"), (2, "b")].into();
    assert_eq!(tree, vector);
}

#[rstest]
fn test_equal_maps_hash_equally() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let hash_of = |map: &MultiMap<i32, &str>| {
        let mut hasher = DefaultHasher::new();
        map.hash(&mut hasher);
        hasher.finish()
    };
    let first: MultiMap<i32, &str> = [(1, "a"), (2, "b")].into();
    let second: MultiMap<i32, &str> = [(2, "b"), (1, "a")].into();
    assert_eq!(hash_of(&first), hash_of(&second));
}
