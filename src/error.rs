use thiserror::Error;

use crate::Handle;

/// A broken structural invariant, reported by [`Iwbt::verify`](crate::Iwbt::verify)
/// and [`Multimap::verify`](crate::Multimap::verify).
///
/// These never occur through the public API unless a precondition was
/// violated, for example a handle linked into two trees through one link or a
/// key mutated while its value was linked.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum InvariantViolation {
    /// The root link records a parent.
    #[error("root {root:?} has parent {parent:?}")]
    RootHasParent { root: Handle, parent: Handle },

    /// A reachable link is marked as not being in any tree.
    #[error("node {node:?} is reachable but unlinked")]
    Unlinked { node: Handle },

    /// A weight differs from the sum of its children's weights.
    #[error("node {node:?} has weight {actual}, expected {expected}")]
    WeightMismatch { node: Handle, actual: u64, expected: u64 },

    /// One side of a node weighs more than three times the other.
    #[error("node {node:?} is unbalanced: first child weighs {first}, last child weighs {last}")]
    Unbalanced { node: Handle, first: u64, last: u64 },

    /// A child does not point back at the node that holds it.
    #[error("child {child:?} of {node:?} names {recorded:?} as its parent")]
    BrokenParentLink {
        node: Handle,
        child: Handle,
        recorded: Option<Handle>,
    },

    /// Two neighbouring values are out of key order.
    #[error("key of {previous:?} sorts after key of {next:?}")]
    KeysOutOfOrder { previous: Handle, next: Handle },
}
