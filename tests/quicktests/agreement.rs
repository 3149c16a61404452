use spliced_bst::{boxed, linked};

use crate::{init_logging, Op};

/// Applies a set of operations to both trees and to a sorted `Vec`.
/// This way we can ensure that after a random smattering of inserts,
/// removals and rebalances all three hold the same values and that
/// both trees ended up with the same shape.
fn do_ops<T>(
    ops: &[Op<T>],
    linked: &mut linked::Tree<T>,
    boxed: &mut boxed::Tree<T>,
    sorted: &mut Vec<T>,
) -> bool
where
    T: Ord + Clone + std::fmt::Debug,
{
    for op in ops {
        match op {
            Op::Insert(x) => {
                linked.insert(x.clone());
                boxed.insert(x.clone());
                let at = sorted.partition_point(|y| y <= x);
                sorted.insert(at, x.clone());
            }
            Op::Remove(x) => {
                let expected = sorted
                    .binary_search(x)
                    .ok()
                    .map(|at| sorted.remove(at));
                if linked.remove(x) != expected || boxed.remove(x) != expected {
                    return false;
                }
            }
            Op::Rebalance => {
                linked.rebalance();
                boxed.rebalance();
            }
        }

        if linked.height() != boxed.height() {
            return false;
        }
    }

    linked.len() == sorted.len()
        && boxed.len() == sorted.len()
        && linked.iter().eq(sorted.iter())
        && boxed.iter().eq(sorted.iter())
        && linked.check_invariants().is_ok()
        && boxed.check_invariants().is_ok()
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    init_logging();
    let mut linked = linked::Tree::new();
    let mut boxed = boxed::Tree::new();
    let mut sorted = Vec::new();

    do_ops(&ops, &mut linked, &mut boxed, &mut sorted)
}

#[quickcheck]
fn find_agrees(xs: Vec<i8>, probes: Vec<i8>) -> bool {
    let linked: linked::Tree<_> = xs.iter().copied().collect();
    let boxed: boxed::Tree<_> = xs.iter().copied().collect();

    probes
        .iter()
        .chain(&xs)
        .all(|x| linked.find(x) == boxed.find(x) && linked.find(x).is_some() == xs.contains(x))
}

#[quickcheck]
fn remove_decrements_exactly_once(xs: Vec<u8>, x: u8) -> bool {
    let mut tree: linked::Tree<_> = xs.iter().copied().collect();
    let occurrences = |tree: &linked::Tree<u8>| tree.iter().filter(|y| **y == x).count();
    let (before_len, before_count) = (tree.len(), occurrences(&tree));

    let removed = tree.remove(&x);

    match removed {
        Some(_) => tree.len() == before_len - 1 && occurrences(&tree) == before_count - 1,
        None => tree.len() == before_len && before_count == 0,
    }
}

#[quickcheck]
fn rebalance_bounds_height(xs: Vec<i32>) -> bool {
    let mut tree: boxed::Tree<_> = xs.iter().copied().collect();
    let before = tree.to_vec();

    tree.rebalance();

    let n = xs.len() as f64;
    tree.to_vec() == before && tree.height() as f64 <= (n + 1.0).log2().ceil()
}
