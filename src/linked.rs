//! A BST whose nodes point back at their parents. Every node is its own heap allocation, owns its
//! two children and keeps a non-owning pointer to its parent so that `remove` can rewrite the slot
//! holding a node without walking down from the root a second time.
//!
//! # Examples
//!
//! ```
//! use spliced_bst::linked::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.find(&1), None);
//!
//! tree.insert(5);
//! tree.insert(3);
//! tree.insert(8);
//! assert_eq!(tree.find(&3), Some(&3));
//!
//! // Equal values are kept. They go to the right of the ones already there.
//! tree.insert(5);
//! assert_eq!(tree.to_vec(), [3, 5, 5, 8]);
//!
//! // Removing takes out a single instance and returns it.
//! assert_eq!(tree.remove(&5), Some(5));
//! assert_eq!(tree.to_vec(), [3, 5, 8]);
//! assert_eq!(tree.remove(&42), None);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::vec;

use log::{debug, trace};

use crate::util::balanced_height;
use crate::InvariantError;

/// An ordered Binary Search Tree that keeps duplicates. Nothing rebalances it implicitly: the
/// tree takes whatever shape the insertion order gives it until [`Tree::rebalance`] is called.
pub struct Tree<T> {
    // This is a `Link` instead of an `Option<Box<Node>>` so that the `Tree` can be moved around
    // without moving the root, which its children point back at.
    root: Link<T>,
    count: usize,
    marker: PhantomData<Box<Node<T>>>,
}

// SAFETY: The tree exclusively owns every node reachable from `root` (parent pointers never
// escape it), so sending or sharing it is the same as sending or sharing a `Box<T>` per value.
unsafe impl<T: Send> Send for Tree<T> {}
// SAFETY: See above. `&Tree` only ever hands out `&T`.
unsafe impl<T: Sync> Sync for Tree<T> {}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
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
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            root: Link::EMPTY,
            count: 0,
            marker: PhantomData,
        }
    }

    /// Generate a `Tree` holding just `value`.
    pub fn with_value(value: T) -> Self {
        Self {
            root: Link(Some(Node::new_leaked(value, Link::EMPTY))),
            count: 1,
            marker: PhantomData,
        }
    }

    /// The number of values in the tree, duplicates included.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.root.0.is_none()
    }

    /// Potentially finds a value equal to `value` in this tree. When the tree holds several equal
    /// values, the one closest to the root is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use spliced_bst::linked::Tree;
    ///
    /// let tree: Tree<_> = [5, 3, 8].into_iter().collect();
    ///
    /// assert_eq!(tree.find(&8), Some(&8));
    /// assert_eq!(tree.find(&99), None);
    /// ```
    pub fn find(&self, value: &T) -> Option<&T>
    where
        T: Ord,
    {
        let mut current = self.root.node();
        while let Some(node) = current {
            current = match value.cmp(&node.value) {
                Ordering::Equal => return Some(&node.value),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
        }
        None
    }

    /// Inserts `value` into the tree. Values smaller than a node go to its left and every other
    /// value, including an equal one, goes to its right.
    ///
    /// # Examples
    ///
    /// ```
    /// use spliced_bst::linked::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(2);
    /// tree.insert(1);
    /// tree.insert(2);
    ///
    /// assert_eq!(tree.len(), 3);
    /// assert_eq!(tree.to_vec(), [1, 2, 2]);
    /// ```
    pub fn insert(&mut self, value: T)
    where
        T: Ord,
    {
        let Some(mut current) = self.root.0 else {
            self.root = Link(Some(Node::new_leaked(value, Link::EMPTY)));
            self.count += 1;
            return;
        };

        loop {
            // SAFETY: `current` is reachable from the root so it's a live node. We have `&mut self`
            // so nothing else borrows it.
            let node = unsafe { current.as_mut() };
            let slot = if value < node.value {
                &mut node.left
            } else {
                &mut node.right
            };
            match slot.0 {
                Some(child) => current = child,
                None => {
                    *slot = Link(Some(Node::new_leaked(value, Link(Some(current)))));
                    self.count += 1;
                    return;
                }
            }
        }
    }

    /// Removes a single value equal to `value` from the tree and returns it. If the tree holds no
    /// such value, nothing happens.
    ///
    /// The removed node is replaced by its right subtree, and its left subtree becomes the left
    /// child of the smallest node in that right subtree. Without a right subtree, the left subtree
    /// takes the removed node's place directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use spliced_bst::linked::Tree;
    ///
    /// let mut tree: Tree<_> = [5, 3, 8, 1, 4].into_iter().collect();
    ///
    /// assert_eq!(tree.remove(&3), Some(3));
    /// assert_eq!(tree.to_vec(), [1, 4, 5, 8]);
    /// assert_eq!(tree.remove(&3), None);
    /// ```
    pub fn remove(&mut self, value: &T) -> Option<T>
    where
        T: Ord,
    {
        let Some(removed) = self.locate(value) else {
            trace!("remove: no matching value, leaving the tree untouched");
            return None;
        };

        // SAFETY: `removed` is reachable from the root and we have `&mut self`.
        let (parent, left, right) = unsafe {
            let node = removed.as_ref();
            (node.parent, node.left, node.right)
        };

        let replacement = match right.0 {
            Some(right_root) => {
                // SAFETY: The right subtree belongs to this tree and no references into it are
                // held while its leftmost node adopts the left subtree.
                unsafe {
                    let successor = Node::leftmost(right_root);
                    debug_assert!(successor.as_ref().left.0.is_none());
                    Node::set_left(successor, left);
                }
                trace!("remove: grafted left subtree onto the in-order successor");
                right
            }
            None => left,
        };

        // SAFETY: `parent` is the back-reference stored in `removed`, and `replacement` is one of
        // its subtrees which nothing else references anymore.
        unsafe { self.replace_child(parent, removed, replacement) };
        self.count -= 1;

        // SAFETY: No slot in the tree references `removed` anymore and its children now hang off
        // other nodes, so this is the last pointer to it.
        Some(unsafe { Node::into_value(removed) })
    }

    /// The smallest value in the tree.
    pub fn first(&self) -> Option<&T> {
        let mut node = self.root.node()?;
        while let Some(left) = node.left() {
            node = left;
        }
        Some(&node.value)
    }

    /// The largest value in the tree.
    pub fn last(&self) -> Option<&T> {
        let mut node = self.root.node()?;
        while let Some(right) = node.right() {
            node = right;
        }
        Some(&node.value)
    }

    /// Iterates the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Copies the values out in ascending order. Every call takes a fresh snapshot.
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

    /// Rebuilds the tree into one of minimum height over the same values. For a range of values
    /// the middle one (rounding down for even lengths) becomes the root, and each half is built
    /// the same way.
    ///
    /// # Examples
    ///
    /// ```
    /// use spliced_bst::linked::Tree;
    ///
    /// let mut tree: Tree<_> = (1..=7).collect();
    /// assert_eq!(tree.height(), 7);
    ///
    /// tree.rebalance();
    /// assert_eq!(tree.height(), 3);
    /// assert_eq!(tree.to_vec(), [1, 2, 3, 4, 5, 6, 7]);
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

    /// Frees every node, leaving the tree empty.
    pub fn clear(&mut self) {
        let mut pending: Vec<_> = self.root.take().0.into_iter().collect();
        while let Some(node) = pending.pop() {
            // SAFETY: Each pointer is pushed exactly once, by the slot that owned it, and the
            // root was detached above so nothing can reach these nodes anymore.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            pending.extend(node.left.0);
            pending.extend(node.right.0);
        }
        self.count = 0;
    }

    /// The number of nodes on the longest path from the root to a leaf. An empty tree has a
    /// height of 0.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut pending: Vec<_> = self.root.node().map(|root| (root, 1)).into_iter().collect();
        while let Some((node, depth)) = pending.pop() {
            height = height.max(depth);
            pending.extend(node.left().map(|left| (left, depth + 1)));
            pending.extend(node.right().map(|right| (right, depth + 1)));
        }
        height
    }

    /// Walks the whole tree checking that values are in order, that every parent pointer names the
    /// node owning it, and that the recorded count matches the nodes actually reachable.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        T: Ord,
    {
        let mut reachable = 0;
        let mut pending: Vec<_> = self
            .root
            .0
            .map(|root| (root, Link::EMPTY, 1))
            .into_iter()
            .collect();
        while let Some((ptr, expected_parent, depth)) = pending.pop() {
            // SAFETY: `ptr` is reachable from the root and `&self` rules out mutation.
            let node = unsafe { ptr.as_ref() };
            if node.parent.0 != expected_parent.0 {
                return Err(InvariantError::ParentMismatch { depth });
            }
            reachable += 1;
            let owner = Link(Some(ptr));
            pending.extend(node.left.0.map(|left| (left, owner, depth + 1)));
            pending.extend(node.right.0.map(|right| (right, owner, depth + 1)));
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

    /// Finds the node closest to the root holding a value equal to `value`.
    fn locate(&self, value: &T) -> Option<NonNull<Node<T>>>
    where
        T: Ord,
    {
        let mut current = self.root.0;
        while let Some(ptr) = current {
            // SAFETY: `ptr` is reachable from the root and `&self` rules out mutation.
            let node = unsafe { ptr.as_ref() };
            current = match value.cmp(&node.value) {
                Ordering::Equal => return Some(ptr),
                Ordering::Less => node.left.0,
                Ordering::Greater => node.right.0,
            };
        }
        None
    }

    /// Points whichever slot owns `child` (the root, or one of `parent`'s children) at
    /// `replacement` instead, and points `replacement` back at `parent`.
    ///
    /// # Safety
    ///
    /// `parent` must be `child`'s parent pointer and `replacement` must be empty or a node of this
    /// tree that no other slot references. No references into the tree may be held.
    unsafe fn replace_child(
        &mut self,
        parent: Link<T>,
        child: NonNull<Node<T>>,
        replacement: Link<T>,
    ) {
        if let Some(node) = replacement.0 {
            (*node.as_ptr()).parent = parent;
        }

        let slot = match parent.0 {
            None => {
                debug_assert!(self.root.points_to(child), "parentless node is not the root");
                &mut self.root
            }
            Some(parent) => {
                let parent = &mut *parent.as_ptr();
                if parent.left.points_to(child) {
                    &mut parent.left
                } else {
                    debug_assert!(
                        parent.right.points_to(child),
                        "parent pointer names a node that does not own its child"
                    );
                    &mut parent.right
                }
            }
        };
        *slot = replacement;
    }

    /// Frees every node in ascending order of value, keeping the values. Leaves the tree empty.
    fn take_sorted(&mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.count);
        let mut pending = Vec::new();
        let mut current = self.root.take().0;
        self.count = 0;

        loop {
            while let Some(node) = current {
                pending.push(node);
                // SAFETY: Nodes are only freed once popped off `pending` below.
                current = unsafe { node.as_ref() }.left.0;
            }
            let Some(node) = pending.pop() else {
                break;
            };
            // SAFETY: `node`'s left subtree has been freed already and its right subtree is read
            // before `node` itself is freed. The root was detached so nothing else reaches it.
            unsafe {
                current = node.as_ref().right.0;
                sorted.push(Node::into_value(node));
            }
        }
        sorted
    }

    /// Builds a minimum height subtree out of `values[lo..hi]`, which must be in ascending order.
    /// The middle value (rounding down) becomes the subtree's root and is taken out of `values`.
    fn build(values: &mut [Option<T>], lo: usize, hi: usize) -> Link<T> {
        if lo >= hi {
            return Link::EMPTY;
        }
        let mid = lo + (hi - lo) / 2;
        // Every index is the middle of exactly one range, so the value is still there.
        let Some(value) = values[mid].take() else {
            return Link::EMPTY;
        };
        let node = Node::new_leaked(value, Link::EMPTY);
        let left = Self::build(values, lo, mid);
        let right = Self::build(values, mid + 1, hi);

        // SAFETY: `node` was just allocated and both subtrees were just built, so nothing else
        // references any of them.
        unsafe {
            Node::set_left(node, left);
            Node::set_right(node, right);
        }
        Link(Some(node))
    }
}

/// An iterator over the values of a [`Tree`] in ascending order. See [`Tree::iter`].
pub struct Iter<'a, T> {
    // The nodes whose value and right subtree are still to be visited, the next one on top.
    pending: Vec<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn new(tree: &'a Tree<T>) -> Self {
        let mut iter = Self {
            pending: Vec::new(),
            remaining: tree.count,
        };
        iter.push_left_spine(tree.root.node());
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(n) = node {
            self.pending.push(n);
            node = n.left();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop()?;
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

struct Link<T>(Option<NonNull<Node<T>>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Link<T> {}

impl<T> Link<T> {
    const EMPTY: Self = Link(None);

    fn node(&self) -> Option<&Node<T>> {
        // SAFETY: A non-empty link always points at a live node of the tree it belongs to. The
        // returned reference borrows the link, and the tree only mutates nodes through
        // `&mut Tree`, so the node can't change or be freed while the reference lives.
        unsafe { self.0.as_ref().map(|ptr| ptr.as_ref()) }
    }

    fn take(&mut self) -> Self {
        Link(self.0.take())
    }

    fn points_to(&self, node: NonNull<Node<T>>) -> bool {
        self.0 == Some(node)
    }
}

struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
    parent: Link<T>,
}

impl<T> Node<T> {
    /// Allocates a node without children. Whoever stores the returned pointer owns the node.
    fn new_leaked(value: T, parent: Link<T>) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(Node {
            value,
            left: Link::EMPTY,
            right: Link::EMPTY,
            parent,
        })))
    }

    fn left(&self) -> Option<&Self> {
        self.left.node()
    }

    fn right(&self) -> Option<&Self> {
        self.right.node()
    }

    /// Makes `child` the left subtree of `node`, pointing it back at `node`.
    ///
    /// # Safety
    ///
    /// Both must be live nodes of the same tree and no references into either may be held.
    unsafe fn set_left(node: NonNull<Self>, child: Link<T>) {
        (*node.as_ptr()).left = child;
        if let Some(child) = child.0 {
            (*child.as_ptr()).parent = Link(Some(node));
        }
    }

    /// Makes `child` the right subtree of `node`, pointing it back at `node`.
    ///
    /// # Safety
    ///
    /// Same as [`Node::set_left`].
    unsafe fn set_right(node: NonNull<Self>, child: Link<T>) {
        (*node.as_ptr()).right = child;
        if let Some(child) = child.0 {
            (*child.as_ptr()).parent = Link(Some(node));
        }
    }

    /// Follows left children from `node` until reaching one without a left child.
    ///
    /// # Safety
    ///
    /// `node` must be a live node and no mutable references into its subtree may be held.
    unsafe fn leftmost(mut node: NonNull<Self>) -> NonNull<Self> {
        while let Some(left) = (*node.as_ptr()).left.0 {
            node = left;
        }
        node
    }

    /// Frees `node` and hands back its value. Its links are discarded without being followed.
    ///
    /// # Safety
    ///
    /// `node` must have been allocated by [`Node::new_leaked`] and must not be referenced again.
    unsafe fn into_value(node: NonNull<Self>) -> T {
        let node = *Box::from_raw(node.as_ptr());
        node.value
    }
}
