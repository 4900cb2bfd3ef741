//! An unbalanced sorted set. Each node keeps a pointer to its parent so removal can rewire the
//! tree around the removed node without recursing back up from the root.
//!
//! # Examples
//!
//! ```
//! use sorted_bst::{Error, Tree};
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert!(!tree.contains(&1));
//! assert_eq!(tree.first(), Err(Error::EmptyCollection));
//!
//! assert!(tree.add(1));
//! assert!(tree.contains(&1));
//!
//! // Sets don't hold duplicates.
//! assert!(!tree.add(1));
//! assert_eq!(tree.len(), 1);
//!
//! assert!(tree.remove(&1));
//! assert!(!tree.contains(&1));
//! assert!(tree.is_empty());
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use tracing::{instrument, trace};

use crate::error::{Error, Result};
use crate::node::{Children, Link, Node};

/// A set of ordered values stored in a Binary Search Tree. The tree is never rebalanced, so every
/// operation costs `O(height)` and inserting sorted input degrades it into a list.
pub struct Tree<T> {
    root: Link<T>,
    len: usize,
    _owns: PhantomData<Box<Node<T>>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        let root = std::mem::replace(&mut self.root, Link::none());
        // SAFETY: The root was just detached from the tree so nothing can reach these nodes
        // anymore.
        unsafe { free_subtree(root) };
    }
}

/// Frees every node reachable from `root` without recursing.
///
/// # Safety
///
/// No link outside this subtree may point into it afterwards.
unsafe fn free_subtree<T>(root: Link<T>) {
    let mut stack = vec![root];
    while let Some(link) = stack.pop() {
        let Some(node) = link.node() else {
            continue;
        };
        stack.push(node.left);
        stack.push(node.right);
        drop(link.free());
    }
}

/// Where the node being removed sits. This decides how its neighbours get rewired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Removal {
    /// The root is the only node.
    RootLeaf,
    /// The root has children and one of them (or the root's in-order successor) takes its place.
    RootWithChildren,
    /// A non-root node without children.
    Leaf,
    /// A non-root node with exactly one child, which is promoted into its place.
    OneChild,
    /// A non-root node with two children, replaced by its in-order successor.
    TwoChildren,
}

impl Removal {
    fn classify<T>(node: &Node<T>) -> Self {
        match (node.parent.is_some(), node.children()) {
            (false, Children::None) => Self::RootLeaf,
            (false, Children::One | Children::Two) => Self::RootWithChildren,
            (true, Children::None) => Self::Leaf,
            (true, Children::One) => Self::OneChild,
            (true, Children::Two) => Self::TwoChildren,
        }
    }
}

impl<T> Tree<T> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            root: Link::none(),
            len: 0,
            _owns: PhantomData,
        }
    }

    /// The number of values in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every value from the set.
    #[instrument(level = "trace", skip_all)]
    pub fn clear(&mut self) {
        let root = std::mem::replace(&mut self.root, Link::none());
        self.len = 0;
        // SAFETY: The root was just detached from the tree so nothing can reach these nodes
        // anymore.
        unsafe { free_subtree(root) };
    }

    /// The smallest value in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use sorted_bst::{Error, Tree};
    ///
    /// let mut tree = Tree::new();
    /// assert_eq!(tree.first(), Err(Error::EmptyCollection));
    ///
    /// tree.add_all([5, 3, 8]);
    /// assert_eq!(tree.first(), Ok(&3));
    /// ```
    pub fn first(&self) -> Result<&T> {
        self.root
            .node()
            .map(|root| &root.leftmost().value)
            .ok_or(Error::EmptyCollection)
    }

    /// The largest value in the set.
    pub fn last(&self) -> Result<&T> {
        self.root
            .node()
            .map(|root| &root.rightmost().value)
            .ok_or(Error::EmptyCollection)
    }

    /// The number of edges on the longest path from the root to a leaf. A tree holding a single
    /// value has a height of 0 and an empty tree has no height at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use sorted_bst::{Error, Tree};
    ///
    /// let mut tree = Tree::new();
    /// assert_eq!(tree.height(), Err(Error::EmptyCollection));
    ///
    /// tree.add_all([2, 1, 3]);
    /// assert_eq!(tree.height(), Ok(1));
    ///
    /// // Nothing keeps sorted input from producing a list.
    /// let list: Tree<_> = (0..10).collect();
    /// assert_eq!(list.height(), Ok(9));
    /// ```
    pub fn height(&self) -> Result<usize> {
        self.root
            .node()
            .map(Node::height)
            .ok_or(Error::EmptyCollection)
    }

    /// Copies every value out of the set in ascending order. The returned `Vec` shares nothing
    /// with the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use sorted_bst::Tree;
    ///
    /// let tree: Tree<_> = [5, 3, 8, 1, 4, 7, 9].into_iter().collect();
    /// assert_eq!(tree.to_ordered_list(), vec![1, 3, 4, 5, 7, 8, 9]);
    /// ```
    pub fn to_ordered_list(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.in_order().into_iter().cloned().collect()
    }

    fn in_order(&self) -> Vec<&T> {
        let mut values = Vec::with_capacity(self.len);
        if let Some(root) = self.root.node() {
            root.collect_in_order(&mut values);
        }
        values
    }
}

impl<T> Tree<T>
where
    T: Ord,
{
    /// Inserts `item` unless an equal value is already present. Returns whether the set changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sorted_bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert!(tree.add(3));
    /// assert!(!tree.add(3));
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[instrument(level = "trace", skip_all)]
    pub fn add(&mut self, item: T) -> bool {
        let Some(mut current) = self.root.0 else {
            self.root = Link::from_box(Node::new_boxed(item, Link::none()));
            self.len += 1;
            return true;
        };

        loop {
            // SAFETY: `current` came out of the root or a child link so it is a live node of this
            // tree, and `&mut self` guarantees nothing else is borrowing it.
            let node = unsafe { current.as_mut() };
            let slot = match item.cmp(&node.value) {
                Ordering::Less => &mut node.left,
                Ordering::Equal => return false,
                Ordering::Greater => &mut node.right,
            };
            match slot.0 {
                Some(next) => current = next,
                None => {
                    *slot = Link::from_box(Node::new_boxed(item, Link(Some(current))));
                    self.len += 1;
                    if cfg!(debug_assertions) {
                        node.assert_local_invariants();
                    }
                    return true;
                }
            }
        }
    }

    /// Adds every item, returning whether at least one of them was new. Every item is attempted
    /// even after one succeeds.
    pub fn add_all<I>(&mut self, items: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        items
            .into_iter()
            .fold(false, |changed, item| self.add(item) | changed)
    }

    /// Whether a value equal to `item` is in the set.
    pub fn contains(&self, item: &T) -> bool {
        self.find(item).is_some()
    }

    /// Whether every item is in the set. Stops looking at the first one that isn't.
    pub fn contains_all<I>(&self, items: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        items.into_iter().all(|item| self.contains(item.borrow()))
    }

    /// Removes the value equal to `item` if there is one. Returns whether the set changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sorted_bst::Tree;
    ///
    /// let mut tree: Tree<_> = [5, 3, 8, 1, 4, 7, 9].into_iter().collect();
    ///
    /// // The root is replaced by its in-order successor.
    /// assert!(tree.remove(&5));
    /// assert_eq!(tree.to_ordered_list(), vec![1, 3, 4, 7, 8, 9]);
    ///
    /// assert!(!tree.remove(&5));
    /// assert_eq!(tree.len(), 6);
    /// ```
    #[instrument(level = "trace", skip_all)]
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(target) = self.find(item).0 else {
            return false;
        };
        // SAFETY: `find` only returns links to live nodes of this tree.
        let removal = Removal::classify(unsafe { target.as_ref() });
        trace!(?removal, "removing node");

        // SAFETY: `&mut self` means no references into the tree are alive. The handlers only
        // dereference `target` and nodes linked to it, and leave `target` unreachable from the
        // rest of the tree so it is freed exactly once here.
        let touched = unsafe {
            let touched = match removal {
                Removal::RootLeaf => {
                    self.root = Link::none();
                    Link::none()
                }
                Removal::RootWithChildren => self.remove_root_with_children(target),
                Removal::Leaf => Self::remove_leaf(target),
                Removal::OneChild => Self::remove_with_one_child(target),
                Removal::TwoChildren => Self::remove_with_two_children(target),
            };
            drop(Link(Some(target)).free());
            touched
        };
        self.len -= 1;

        if cfg!(debug_assertions) {
            self.assert_rewired(touched);
        }
        true
    }

    /// Removes every item, returning whether at least one of them was present. Every item is
    /// attempted even after one succeeds.
    pub fn remove_all<I>(&mut self, items: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        items
            .into_iter()
            .fold(false, |changed, item| self.remove(item.borrow()) | changed)
    }

    fn find(&self, item: &T) -> Link<T> {
        let mut current = self.root;
        while let Some(node) = current.node() {
            current = match item.cmp(&node.value) {
                Ordering::Less => node.left,
                Ordering::Equal => return current,
                Ordering::Greater => node.right,
            };
        }
        current
    }

    /// Replaces the root with its left child when it has no right child, otherwise with its
    /// in-order successor. Returns the new root.
    ///
    /// # Safety
    ///
    /// `target` must be the root of this tree and have at least one child.
    unsafe fn remove_root_with_children(&mut self, target: NonNull<Node<T>>) -> Link<T> {
        let replacement = match (*target.as_ptr()).right.0 {
            None => (*target.as_ptr())
                .left
                .0
                .expect("a root with children but no right child has a left child"),
            Some(_) => {
                let successor = (*target.as_ptr())
                    .in_order_successor()
                    .0
                    .expect("a right subtree implies a successor");
                Self::adopt_children(target, successor);
                successor
            }
        };

        (*replacement.as_ptr()).parent = Link::none();
        self.root = Link(Some(replacement));
        trace!("promoted a new root");
        self.root
    }

    /// Unhooks a childless `target` from its parent. Returns the parent.
    ///
    /// # Safety
    ///
    /// `target` must be a live, non-root leaf of this tree.
    unsafe fn remove_leaf(target: NonNull<Node<T>>) -> Link<T> {
        debug_assert!((*target.as_ptr()).is_leaf());
        *Self::parent_slot(target) = Link::none();
        (*target.as_ptr()).parent
    }

    /// Moves `target`'s only child into `target`'s slot in its parent. Returns the child.
    ///
    /// # Safety
    ///
    /// `target` must be a live, non-root node of this tree with exactly one child.
    unsafe fn remove_with_one_child(target: NonNull<Node<T>>) -> Link<T> {
        debug_assert!((*target.as_ptr()).has_one_child());
        let child = (*target.as_ptr()).only_child();
        *Self::parent_slot(target) = child;
        child.set_parent((*target.as_ptr()).parent);
        child
    }

    /// Moves `target`'s in-order successor into `target`'s slot, handing it both of `target`'s
    /// subtrees. Returns the successor.
    ///
    /// # Safety
    ///
    /// `target` must be a live, non-root node of this tree with two children.
    unsafe fn remove_with_two_children(target: NonNull<Node<T>>) -> Link<T> {
        debug_assert!((*target.as_ptr()).has_two_children());
        let successor = (*target.as_ptr())
            .in_order_successor()
            .0
            .expect("a right subtree implies a successor");
        Self::adopt_children(target, successor);

        *Self::parent_slot(target) = Link(Some(successor));
        (*successor.as_ptr()).parent = (*target.as_ptr()).parent;
        Link(Some(successor))
    }

    /// Detaches `successor` from its current position and gives it `target`'s subtrees. The
    /// successor's own right subtree takes its old place under its former parent. Putting
    /// `successor` into `target`'s slot is left to the caller.
    ///
    /// # Diagram
    ///
    /// ```text
    ///      target                 successor
    ///      /    \                  /     \
    ///     a      r                a       r
    ///           /                        /
    ///         ...        ->            ...
    ///         /                        /
    ///     successor                   x
    ///          \
    ///           x
    /// ```
    ///
    /// When `successor` is `target`'s right child it simply keeps its right subtree.
    ///
    /// # Safety
    ///
    /// `target` must be a live node of this tree with a right child and `successor` the leftmost
    /// node of that right subtree.
    unsafe fn adopt_children(target: NonNull<Node<T>>, successor: NonNull<Node<T>>) {
        let successor_link = Link(Some(successor));
        let target = target.as_ptr();

        if !(*target).right.is(successor) {
            let successor = successor.as_ptr();
            let former_parent = (*successor).parent;
            let former_parent_node = former_parent
                .0
                .expect("a successor below the right child has a parent")
                .as_ptr();
            (*former_parent_node).left = (*successor).right;
            (*successor).right.set_parent(former_parent);

            (*successor).right = (*target).right;
            (*successor).right.set_parent(successor_link);
        }

        (*successor.as_ptr()).left = (*target).left;
        (*successor.as_ptr()).left.set_parent(successor_link);
    }

    /// The link in `node`'s parent that owns `node`.
    ///
    /// # Safety
    ///
    /// `node` must be a live, non-root node of this tree and its parent must not be borrowed
    /// elsewhere for the returned lifetime.
    unsafe fn parent_slot<'a>(node: NonNull<Node<T>>) -> &'a mut Link<T> {
        let parent = (*node.as_ptr())
            .parent
            .0
            .expect("only the root has no parent")
            .as_ptr();
        if (*parent).left.is(node) {
            &mut (*parent).left
        } else {
            &mut (*parent).right
        }
    }

    /// Checks the neighbourhood of the node that took the removed node's place.
    fn assert_rewired(&self, touched: Link<T>) {
        if let Some(root) = self.root.node() {
            assert!(root.parent.0.is_none(), "the root has a parent");
        }
        if let Some(node) = touched.node() {
            node.assert_local_invariants();
            if let Some(parent) = node.parent.node() {
                parent.assert_local_invariants();
            }
        }
    }
}

impl<T> Clone for Tree<T>
where
    T: Ord + Clone,
{
    fn clone(&self) -> Self {
        // Adding parents before their descendants rebuilds the exact same shape.
        let mut tree = Self::new();
        let mut stack: Vec<&Node<T>> = self.root.node().into_iter().collect();
        while let Some(node) = stack.pop() {
            tree.add(node.value.clone());
            stack.extend(node.right());
            stack.extend(node.left());
        }
        tree
    }
}

impl<T> fmt::Debug for Tree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.in_order()).finish()
    }
}

impl<T> PartialEq for Tree<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.in_order() == other.in_order()
    }
}

impl<T> Eq for Tree<T> where T: Eq {}

impl<T> FromIterator<T> for Tree<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.add_all(iter);
        tree
    }
}

impl<T> Extend<T> for Tree<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

#[cfg(test)]
impl<T> Tree<T>
where
    T: Ord + fmt::Debug,
{
    /// Walks the whole tree checking ordering, parent links, and the size counter.
    pub(crate) fn assert_invariants(&self) {
        let mut count = 0;
        if let Some(root) = self.root.node() {
            assert!(root.parent.0.is_none(), "the root has a parent");
        }

        let mut stack: Vec<(&Node<T>, Option<&T>, Option<&T>)> =
            self.root.node().map(|root| (root, None, None)).into_iter().collect();
        while let Some((node, lower, upper)) = stack.pop() {
            count += 1;
            if let Some(lower) = lower {
                assert!(lower < &node.value, "{:?} is left of {:?}", node.value, lower);
            }
            if let Some(upper) = upper {
                assert!(&node.value < upper, "{:?} is right of {:?}", node.value, upper);
            }

            let this = NonNull::from(node);
            if let Some(left) = node.left() {
                assert!(left.parent.is(this), "{:?} lost its parent", left.value);
                stack.push((left, lower, Some(&node.value)));
            }
            if let Some(right) = node.right() {
                assert!(right.parent.is(this), "{:?} lost its parent", right.value);
                stack.push((right, Some(&node.value), upper));
            }
        }

        assert_eq!(count, self.len, "size doesn't match the reachable nodes");
    }

    fn root_value(&self) -> Option<&T> {
        self.root.node().map(|root| &root.value)
    }

    fn children_of(&self, item: &T) -> (Option<&T>, Option<&T>) {
        let mut current = self.root.node();
        while let Some(node) = current {
            current = match item.cmp(&node.value) {
                Ordering::Less => node.left(),
                Ordering::Equal => {
                    return (
                        node.left().map(|left| &left.value),
                        node.right().map(|right| &right.value),
                    )
                }
                Ordering::Greater => node.right(),
            };
        }
        panic!("{:?} is not in the tree", item);
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test::quick::Op;

    /// Applies every operation to both the tree and a `BTreeSet`, checking that they agree and
    /// that the tree's invariants hold after each step.
    fn do_ops<T>(ops: &[Op<T>], tree: &mut Tree<T>, set: &mut BTreeSet<T>) -> bool
    where
        T: Ord + Clone + fmt::Debug,
    {
        for op in ops {
            let agrees = match op {
                Op::Add(x) => tree.add(x.clone()) == set.insert(x.clone()),
                Op::Remove(x) => tree.remove(x) == set.remove(x),
                Op::Contains(x) => tree.contains(x) == set.contains(x),
                Op::Extremes => {
                    tree.first().ok() == set.iter().next()
                        && tree.last().ok() == set.iter().next_back()
                }
                Op::Clear => {
                    tree.clear();
                    set.clear();
                    true
                }
            };
            if !agrees {
                return false;
            }
            tree.assert_invariants();
        }
        tree.to_ordered_list() == set.iter().cloned().collect::<Vec<_>>()
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut set = BTreeSet::new();

            do_ops(&ops, &mut tree, &mut set)
        }
    }

    quickcheck::quickcheck! {
        fn removing_shrinks_by_one(xs: Vec<i8>, x: i8) -> bool {
            let mut tree: Tree<i8> = xs.iter().copied().collect();
            if !tree.contains(&x) {
                return !tree.remove(&x);
            }

            let len = tree.len();
            let mut expected = tree.to_ordered_list();
            expected.retain(|&y| y != x);

            tree.remove(&x);
            tree.assert_invariants();
            tree.len() == len - 1 && !tree.contains(&x) && tree.to_ordered_list() == expected
        }
    }

    quickcheck::quickcheck! {
        fn ordered_list_is_sorted_and_distinct(xs: Vec<i32>) -> bool {
            let tree: Tree<i32> = xs.iter().copied().collect();
            let distinct: BTreeSet<i32> = xs.into_iter().collect();

            tree.len() == distinct.len()
                && tree.to_ordered_list() == distinct.into_iter().collect::<Vec<_>>()
        }
    }
}
