use super::handle::Handle;
use super::weight::Weight;

/// The tree metadata embedded in a caller's value.
///
/// Add one `Link` field per structure a value should be able to join, and
/// expose it through an [`Adapter`](crate::Adapter). The fields are owned by
/// whichever tree the value is linked into; callers only create links with
/// [`Link::new`] and may ask whether they are in use.
///
/// The parent is a weak back-reference: it is a plain handle and never keeps
/// anything alive. Children are reachable only through their parent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Link {
    parent: Option<Handle>,
    first_child: Option<Handle>,
    last_child: Option<Handle>,
    weight: Weight,
}

impl Link {
    /// Creates a link that is not part of any tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parent: None,
            first_child: None,
            last_child: None,
            weight: Weight::UNLINKED,
        }
    }

    /// Returns `true` if this link is currently part of a tree.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        !matches!(self.weight, Weight::UNLINKED)
    }

    /// Returns the number of values in the subtree rooted at this link, or 0 if unlinked.
    #[must_use]
    pub const fn subtree_len(&self) -> usize {
        if self.is_linked() { self.weight.count() } else { 0 }
    }

    /// Returns the parent handle, or `None` at the root.
    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn first_child(&self) -> Option<Handle> {
        self.first_child
    }

    #[inline]
    pub(crate) fn set_first_child(&mut self, child: Option<Handle>) {
        self.first_child = child;
    }

    #[inline]
    pub(crate) const fn last_child(&self) -> Option<Handle> {
        self.last_child
    }

    #[inline]
    pub(crate) fn set_last_child(&mut self, child: Option<Handle>) {
        self.last_child = child;
    }

    #[inline]
    pub(crate) const fn weight(&self) -> Weight {
        self.weight
    }

    #[inline]
    pub(crate) fn set_weight(&mut self, weight: Weight) {
        self.weight = weight;
    }

    #[inline]
    pub(crate) fn weight_mut(&mut self) -> &mut Weight {
        &mut self.weight
    }

    /// Turns this link into a detached leaf below `parent`.
    pub(crate) fn reset_as_leaf(&mut self, parent: Option<Handle>) {
        self.parent = parent;
        self.first_child = None;
        self.last_child = None;
        self.weight = Weight::LEAF;
    }

    /// Returns this link to the unlinked state.
    pub(crate) fn unlink(&mut self) {
        *self = Self::new();
    }
}
