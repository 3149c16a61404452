//! This crate exposes an ordered, mutable Binary Search Tree (BST) that keeps
//! duplicate values, removes by splicing subtrees together and can be rebuilt
//! into a tree of minimum height on demand. It comes in two flavours with the
//! same behaviour: [`linked`], whose nodes point back at their parents, and
//! [`boxed`], which is built from `Box`es without any `unsafe`.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a value and
//! will sometimes have child `Node`s. The most important invariants of the
//! BSTs here are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than or equal to its own value. Inserting a value equal to
//!    one already present always sends it right.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is defined
//! as the longest path from the root `Node` to a leaf `Node`). Nothing here keeps
//! the height down while inserting: feeding in sorted values builds a chain as
//! tall as the tree is big. [`rebalance`][linked::Tree::rebalance] rebuilds the
//! tree from its sorted values, rooting every range at its middle value, which
//! brings the height down to `⌈lg(N + 1)⌉` for `N` values.
//!
//! > A rebalanced tree may hold a value in the left subtree of an equal one. Searches,
//! > insertions and removals only rely on "left <= node <= right" and keep working.
//!
//! ## Removal
//!
//! Removing a value does not copy the in-order successor's value into the removed
//! node. Instead the removed node's right subtree takes its place and the smallest
//! node of that subtree adopts the removed node's left subtree.
//!
//! ```
//! use spliced_bst::linked::Tree;
//!
//! let mut tree: Tree<_> = [5, 3, 8, 1, 4].into_iter().collect();
//! assert_eq!(tree.to_vec(), [1, 3, 4, 5, 8]);
//!
//! // 4 moves up into 3's place and 1 becomes its left child.
//! tree.remove(&3);
//! assert_eq!(tree.to_vec(), [1, 4, 5, 8]);
//! assert_eq!(tree.len(), 4);
//! ```
//!
//! ## Features
//!
//! - `serde`: (de)serialize trees as the sequence of their values.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod boxed;
mod error;
pub mod linked;
#[cfg(feature = "serde")]
mod serde_impls;
mod util;


pub use error::InvariantError;
