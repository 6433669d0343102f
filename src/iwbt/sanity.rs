use core::fmt;

use smallvec::SmallVec;

use super::Iwbt;
use crate::error::InvariantViolation;
use crate::raw::{Arena, Handle};
use crate::Adapter;

impl<A: Adapter> Iwbt<A> {
    /// Walks the whole tree and checks every structural invariant: weights add
    /// up, each node is balanced, and every child points back at its parent.
    ///
    /// This is a diagnostic. With the `sanity-checks` feature enabled it runs
    /// after every mutating operation.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn verify(&self, arena: &Arena<A::Value>) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return Ok(());
        };
        if let Some(parent) = Self::link(arena, root).parent() {
            return Err(InvariantViolation::RootHasParent { root, parent });
        }

        let mut stack: SmallVec<[Handle; 64]> = SmallVec::new();
        stack.push(root);
        while let Some(node) = stack.pop() {
            let link = Self::link(arena, node);
            if !link.is_linked() {
                return Err(InvariantViolation::Unlinked { node });
            }

            let first = Self::weight_of(arena, link.first_child());
            let last = Self::weight_of(arena, link.last_child());
            let expected = first.get() + last.get();
            if link.weight().get() != expected {
                return Err(InvariantViolation::WeightMismatch {
                    node,
                    actual: link.weight().get(),
                    expected,
                });
            }
            if !first.supports(last) || !last.supports(first) {
                return Err(InvariantViolation::Unbalanced {
                    node,
                    first: first.get(),
                    last: last.get(),
                });
            }

            for child in [link.first_child(), link.last_child()].into_iter().flatten() {
                let recorded = Self::link(arena, child).parent();
                if recorded != Some(node) {
                    return Err(InvariantViolation::BrokenParentLink { node, child, recorded });
                }
                stack.push(child);
            }
        }
        Ok(())
    }

    /// Panics if the tree is broken. Does nothing unless `sanity-checks` is enabled.
    #[inline]
    pub(crate) fn sanity_check(&self, arena: &Arena<A::Value>) {
        if cfg!(feature = "sanity-checks") {
            if let Err(violation) = self.verify(arena) {
                panic!("`Iwbt` sanity check failed: {violation}");
            }
        }
    }

    /// Returns a printable picture of the tree's shape.
    ///
    /// The picture is rotated a quarter turn counter-clockwise: last children
    /// above their parent, first children below, one indent per level.
    #[must_use]
    pub fn dump<'a>(&'a self, arena: &'a Arena<A::Value>) -> Dump<'a, A> {
        Dump { tree: self, arena }
    }
}

/// The shape of an [`Iwbt`], created by [`Iwbt::dump`].
pub struct Dump<'a, A: Adapter> {
    tree: &'a Iwbt<A>,
    arena: &'a Arena<A::Value>,
}

impl<A: Adapter> Dump<'_, A> {
    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: Handle, depth: usize) -> fmt::Result {
        let link = Iwbt::<A>::link(self.arena, node);
        if let Some(last) = link.last_child() {
            self.write_node(f, last, depth + 1)?;
        }
        for _ in 0..depth {
            f.write_str("    ")?;
        }
        writeln!(f, "{node:?}  weight:{}", link.weight().get())?;
        if let Some(first) = link.first_child() {
            self.write_node(f, first, depth + 1)?;
        }
        Ok(())
    }
}

impl<A: Adapter> fmt::Display for Dump<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.root {
            None => writeln!(f, "tree is empty."),
            Some(root) => self.write_node(f, root, 0),
        }
    }
}
