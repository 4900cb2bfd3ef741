//! A sorted set backed by an unbalanced Binary Search Tree (BST) whose nodes point back at their
//! parents.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a value and
//! will sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching, inserting, and removing all take `O(height)` (where `height` is the longest path
//! from the root `Node` to a leaf `Node`). This tree never rebalances itself, so inserting values
//! in sorted order produces a tree as tall as it is large.
//!
//! ## Parent links
//!
//! Besides its children every `Node` remembers its parent. The parent link never owns anything,
//! it only lets removal reach the node above the one being removed. Every structural change
//! keeps both directions in agreement: if `P.left` or `P.right` is `N` then `N.parent` is `P`.
//!
//! # Examples
//!
//! ```
//! use sorted_bst::Tree;
//!
//! let mut tree: Tree<_> = [5, 3, 8, 1, 4, 7, 9].into_iter().collect();
//!
//! assert_eq!(tree.first(), Ok(&1));
//! assert_eq!(tree.last(), Ok(&9));
//! assert_eq!(tree.height(), Ok(2));
//!
//! assert!(tree.remove(&5));
//! assert_eq!(tree.to_ordered_list(), vec![1, 3, 4, 7, 8, 9]);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod error;
mod node;
pub mod tree;

pub use error::{Error, Result};
pub use tree::Tree;
