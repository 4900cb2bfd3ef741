use quickcheck_macros::quickcheck;
use sorted_bst::{Error, Tree};

use std::collections::{BTreeSet, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a `BTreeSet`.
/// This way we can ensure that after a random smattering of adds
/// and removes we have the same values in both.
fn do_ops<T>(ops: &[Op<T>], tree: &mut Tree<T>, set: &mut BTreeSet<T>) -> bool
where
    T: Ord + Clone,
{
    ops.iter().all(|op| match op {
        Op::Add(x) => tree.add(x.clone()) == set.insert(x.clone()),
        Op::Remove(x) => tree.remove(x) == set.remove(x),
    })
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = Tree::new();
    let mut set = BTreeSet::new();

    do_ops(&ops, &mut tree, &mut set)
        && tree.len() == set.len()
        && tree.to_ordered_list() == set.into_iter().collect::<Vec<_>>()
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree: Tree<i8> = xs.iter().copied().collect();

    xs.iter().all(|x| tree.contains(x)) && tree.contains_all(&xs)
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: Tree<i8> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| !tree.contains(x))
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: Tree<i8> = xs.iter().copied().collect();
    let any_present = deletes.iter().any(|x| tree.contains(x));
    let changed = tree.remove_all(&deletes);

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    changed == any_present
        && deletes.iter().all(|x| !tree.contains(x))
        && tree.contains_all(&still_present)
}

#[quickcheck]
fn adding_twice_changes_nothing(xs: Vec<i8>) -> bool {
    let mut tree: Tree<i8> = xs.iter().copied().collect();
    let before = tree.to_ordered_list();
    let height = tree.height();

    !tree.add_all(xs) && tree.to_ordered_list() == before && tree.height() == height
}

#[quickcheck]
fn extremes(xs: Vec<i8>) -> bool {
    let tree: Tree<i8> = xs.iter().copied().collect();

    match (xs.iter().min(), xs.iter().max()) {
        (Some(min), Some(max)) => tree.first() == Ok(min) && tree.last() == Ok(max),
        _ => {
            tree.first() == Err(Error::EmptyCollection)
                && tree.last() == Err(Error::EmptyCollection)
                && tree.height() == Err(Error::EmptyCollection)
        }
    }
}

#[quickcheck]
fn height_is_bounded_by_size(xs: Vec<i8>) -> bool {
    let tree: Tree<i8> = xs.iter().copied().collect();

    match tree.height() {
        Ok(height) => {
            height < tree.len()
                && 1usize
                    .checked_shl(height as u32 + 1)
                    .map_or(true, |full| full > tree.len())
        }
        Err(_) => tree.is_empty(),
    }
}
