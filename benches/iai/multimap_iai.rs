//! IAI-Callgrind benchmark for MultiMap storage engines.
//!
//! Measures instruction counts for insertion with heavy key duplication and
//! for bulk erase by key, on both engines.

use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use multikey::MultiMap;
use multikey::store::SortedVecStore;
use std::hint::black_box;

type TreeMultiMap = MultiMap<i32, i32>;
type VecMultiMap = MultiMap<i32, i32, SortedVecStore<i32, i32>>;

// Setup functions: every key appears eight times
fn setup_entries_1000() -> Vec<(i32, i32)> {
    (0..1000).map(|index| ((index / 8) * 7919 % 10007, index)).collect()
}

fn setup_entries_10000() -> Vec<(i32, i32)> {
    (0..10000).map(|index| ((index / 8) * 7919 % 10007, index)).collect()
}

fn setup_tree_10000() -> TreeMultiMap {
    setup_entries_10000().into_iter().collect()
}

fn setup_vec_10000() -> VecMultiMap {
    setup_entries_10000().into_iter().collect()
}

// insert benchmarks
#[library_benchmark]
#[bench::with_setup(setup_entries_1000())]
fn red_black_insert_1000(entries: Vec<(i32, i32)>) -> TreeMultiMap {
    black_box(black_box(entries).into_iter().collect())
}

#[library_benchmark]
#[bench::with_setup(setup_entries_10000())]
fn red_black_insert_10000(entries: Vec<(i32, i32)>) -> TreeMultiMap {
    black_box(black_box(entries).into_iter().collect())
}

#[library_benchmark]
#[bench::with_setup(setup_entries_1000())]
fn sorted_vec_insert_1000(entries: Vec<(i32, i32)>) -> VecMultiMap {
    black_box(black_box(entries).into_iter().collect())
}

#[library_benchmark]
#[bench::with_setup(setup_entries_10000())]
fn sorted_vec_insert_10000(entries: Vec<(i32, i32)>) -> VecMultiMap {
    black_box(black_box(entries).into_iter().collect())
}

// erase-by-key benchmarks: drop every distinct key once
#[library_benchmark]
#[bench::with_setup(setup_tree_10000())]
fn red_black_erase_all_keys_10000(mut map: TreeMultiMap) -> usize {
    let mut removed = 0;
    for group in 0..1250 {
        removed += map.erase(black_box(&(group * 7919 % 10007)));
    }
    black_box(removed)
}

#[library_benchmark]
#[bench::with_setup(setup_vec_10000())]
fn sorted_vec_erase_all_keys_10000(mut map: VecMultiMap) -> usize {
    let mut removed = 0;
    for group in 0..1250 {
        removed += map.erase(black_box(&(group * 7919 % 10007)));
    }
    black_box(removed)
}

library_benchmark_group!(
    name = multimap_group;
    benchmarks =
        red_black_insert_1000, red_black_insert_10000,
        sorted_vec_insert_1000, sorted_vec_insert_10000,
        red_black_erase_all_keys_10000, sorted_vec_erase_all_keys_10000
);

main!(library_benchmark_groups = multimap_group);
