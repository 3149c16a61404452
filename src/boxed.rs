//! A BST made of `Box`ed nodes and no `unsafe`. Nodes don't know their parents, so `remove` keeps
//! hold of the slot that owns the node it is looking for while it walks down from the root.
//!
//! It behaves exactly like [`linked::Tree`][crate::linked::Tree]: the same operations on either
//! tree leave them with the same shape.
//!
//! # Examples
//!
//! ```
//! use spliced_bst::boxed::Tree;
//!
//! let mut tree = Tree::new();
//! assert!(tree.is_empty());
//!
//! tree.extend([5, 3, 8, 1, 4]);
//! assert_eq!(tree.to_vec(), [1, 3, 4, 5, 8]);
//!
//! assert_eq!(tree.remove(&3), Some(3));
//! assert_eq!(tree.to_vec(), [1, 4, 5, 8]);
//! assert_eq!(tree.len(), 4);
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::vec;

use log::{debug, trace};

use crate::util::balanced_height;
use crate::InvariantError;

type Link<T> = Option<Box<Node<T>>>;

/// An ordered Binary Search Tree that keeps duplicates and only changes shape when asked to with
/// [`Tree::rebalance`].
pub struct Tree<T> {
    root: Link<T>,
    count: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
    // The derived drop would recurse once per level, which a lopsided tree can have a lot of.
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> fmt::Debug for Tree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for Tree<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T> Extend<T> for Tree<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for Tree<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_sorted_vec().into_iter()
    }
}

impl<T> Tree<T> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            root: None,
            count: 0,
        }
    }

    /// Generates a `Tree` holding just `value`.
    pub fn with_value(value: T) -> Self {
        Self {
            root: Some(Box::new(Node::new(value))),
            count: 1,
        }
    }

    /// The number of values in the tree, duplicates included.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Potentially finds a value equal to `value` in this tree, preferring the one closest to the
    /// root when there are several.
    ///
    /// # Examples
    ///
    /// ```
    /// use spliced_bst::boxed::Tree;
    ///
    /// let tree = Tree::with_value(1);
    ///
    /// assert_eq!(tree.find(&1), Some(&1));
    /// assert_eq!(tree.find(&42), None);
    /// ```
    pub fn find(&self, value: &T) -> Option<&T>
    where
        T: Ord,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            if *value == node.value {
                return Some(&node.value);
            }
            current = node.child(value).as_deref();
        }
        None
    }

    /// Inserts `value` below the last node it compares with: smaller values go left, the rest
    /// (equal ones included) go right.
    pub fn insert(&mut self, value: T)
    where
        T: Ord,
    {
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = node.child_mut(&value);
        }
        *slot = Some(Box::new(Node::new(value)));
        self.count += 1;
    }

    /// Removes a single value equal to `value` and returns it, or does nothing if there is none.
    ///
    /// The removed node's slot is handed to its right subtree, whose smallest node adopts the
    /// removed node's left subtree. Without a right subtree the left one takes the slot.
    pub fn remove(&mut self, value: &T) -> Option<T>
    where
        T: Ord,
    {
        let slot = self.slot_of(value);
        let Some(mut removed) = slot.take() else {
            trace!("remove: no matching value, leaving the tree untouched");
            return None;
        };

        let left = removed.left.take();
        *slot = match removed.right.take() {
            Some(mut right) => {
                let successor = right.leftmost_mut();
                debug_assert!(successor.left.is_none());
                successor.left = left;
                trace!("remove: grafted left subtree onto the in-order successor");
                Some(right)
            }
            None => left,
        };
        self.count -= 1;
        Some(removed.value)
    }

    /// The smallest value in the tree.
    pub fn first(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.value)
    }

    /// The largest value in the tree.
    pub fn last(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.value)
    }

    /// Iterates the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Copies the values out in ascending order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Consumes the tree, returning its values in ascending order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        self.take_sorted()
    }

    /// Rebuilds the tree into one of minimum height over the same values, rooting every range of
    /// values at its middle one (rounding down).
    ///
    /// # Examples
    ///
    /// ```
    /// use spliced_bst::boxed::Tree;
    ///
    /// let mut tree: Tree<_> = (1..=7).collect();
    /// tree.rebalance();
    ///
    /// assert_eq!(tree.height(), 3);
    /// ```
    pub fn rebalance(&mut self)
    where
        T: Ord,
    {
        let count = self.count;
        let sorted = self.take_sorted();
        debug_assert_eq!(sorted.len(), count, "count disagrees with reachable nodes");

        let len = sorted.len();
        let mut values: Vec<_> = sorted.into_iter().map(Some).collect();
        self.root = Self::build(&mut values, 0, len);
        self.count = len;

        if cfg!(debug_assertions) {
            if let Err(err) = self.check_invariants() {
                panic!("rebalance produced an invalid tree: {err}");
            }
            debug_assert_eq!(self.height(), balanced_height(len), "rebuilt tree is too tall");
        }
        debug!(
            "rebalanced {} values into a tree of height {}",
            len,
            self.height()
        );
    }

    /// Drops every value, leaving the tree empty.
    pub fn clear(&mut self) {
        let mut pending: Vec<_> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
        self.count = 0;
    }

    /// The number of nodes on the longest path from the root to a leaf, or 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut pending: Vec<_> = self.root.as_deref().map(|root| (root, 1)).into_iter().collect();
        while let Some((node, depth)) = pending.pop() {
            height = height.max(depth);
            pending.extend(node.left.as_deref().map(|left| (left, depth + 1)));
            pending.extend(node.right.as_deref().map(|right| (right, depth + 1)));
        }
        height
    }

    /// Checks that an in-order walk yields ascending values and that the recorded count matches
    /// the number of nodes.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        T: Ord,
    {
        let mut reachable = 0;
        let mut pending: Vec<_> = self.root.as_deref().into_iter().collect();
        while let Some(node) = pending.pop() {
            reachable += 1;
            pending.extend(node.left.as_deref());
            pending.extend(node.right.as_deref());
        }
        if reachable != self.count {
            return Err(InvariantError::CountMismatch {
                recorded: self.count,
                reachable,
            });
        }

        let mut previous = None;
        for (position, value) in self.iter().enumerate() {
            if previous.is_some_and(|previous| value < previous) {
                return Err(InvariantError::Unordered { position });
            }
            previous = Some(value);
        }
        Ok(())
    }

    /// The slot holding the node closest to the root with a value equal to `value`, or the empty
    /// slot where the search for it ended.
    fn slot_of(&mut self, value: &T) -> &mut Link<T>
    where
        T: Ord,
    {
        let mut slot = &mut self.root;
        while slot.as_ref().is_some_and(|node| node.value != *value) {
            if let Some(node) = slot {
                slot = node.child_mut(value);
            }
        }
        slot
    }

    /// Drops every node in ascending order of value, keeping the values.
    fn take_sorted(&mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.count);
        let mut pending: Vec<Box<Node<T>>> = Vec::new();
        let mut current = self.root.take();
        self.count = 0;

        loop {
            while let Some(mut node) = current {
                current = node.left.take();
                pending.push(node);
            }
            let Some(mut node) = pending.pop() else {
                break;
            };
            current = node.right.take();
            sorted.push(node.value);
        }
        sorted
    }

    /// Builds a minimum height subtree out of `values[lo..hi]`, which must be in ascending order.
    fn build(values: &mut [Option<T>], lo: usize, hi: usize) -> Link<T> {
        if lo >= hi {
            return None;
        }
        let mid = lo + (hi - lo) / 2;
        let value = values[mid].take()?;
        let left = Self::build(values, lo, mid);
        let right = Self::build(values, mid + 1, hi);
        Some(Box::new(Node { value, left, right }))
    }
}

/// An iterator over the values of a [`Tree`] in ascending order. See [`Tree::iter`].
pub struct Iter<'a, T> {
    pending: Vec<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn new(tree: &'a Tree<T>) -> Self {
        let mut iter = Self {
            pending: Vec::new(),
            remaining: tree.count,
        };
        iter.push_left_spine(tree.root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(n) = node {
            self.pending.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    /// The child a search for `value` continues into.
    fn child(&self, value: &T) -> &Link<T>
    where
        T: Ord,
    {
        if *value < self.value {
            &self.left
        } else {
            &self.right
        }
    }

    fn child_mut(&mut self, value: &T) -> &mut Link<T>
    where
        T: Ord,
    {
        if *value < self.value {
            &mut self.left
        } else {
            &mut self.right
        }
    }

    /// The node reached by following left children until there are none.
    fn leftmost_mut(&mut self) -> &mut Self {
        let mut node = self;
        loop {
            match node.left {
                Some(ref mut left) => node = &mut **left,
                None => return node,
            }
        }
    }
}
