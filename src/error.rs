//! Errors describing a tree whose structure no longer upholds its invariants.

/// A broken structural invariant, as reported by `check_invariants` on either tree.
///
/// These never arise from normal use of a tree. They indicate a bug in the tree itself, which is
/// why the mutating operations panic with this error's message in debug builds instead of
/// returning it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InvariantError {
    /// An in-order walk produced a value smaller than the one before it.
    #[error("value at in-order position {position} is smaller than its predecessor")]
    Unordered {
        /// Zero-based position of the offending value in the in-order sequence.
        position: usize,
    },
    /// A node's parent back-reference does not name the node that owns it.
    #[error("node at depth {depth} has a parent back-reference that does not own it")]
    ParentMismatch {
        /// Depth of the offending node, the root being at depth 1.
        depth: usize,
    },
    /// The recorded element count differs from the number of reachable nodes.
    #[error("tree records {recorded} values but {reachable} nodes are reachable")]
    CountMismatch {
        /// The count kept by the tree.
        recorded: usize,
        /// The number of nodes actually reachable from the root.
        reachable: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = InvariantError::CountMismatch {
            recorded: 3,
            reachable: 2,
        };
        assert_eq!(
            err.to_string(),
            "tree records 3 values but 2 nodes are reachable"
        );
    }
}
