use std::hash::Hash;

/// An abstraction for a generic labeled tree node.
pub trait Node {
    /// The type of this [Node]'s [label][Node::label].
    ///
    /// [Node]s with equal labels can be mapped onto each other without paying the relabel cost.
    type Label<'l>: Eq + Hash
    where
        Self: 'l;

    /// Returns this [Node]'s label.
    fn label(&self) -> Self::Label<'_>;
}

/// An abstraction for a recursive ordered tree.
pub trait Tree: Node {
    /// A type that can iterate over this [Tree]'s [children][Tree::children], in order.
    type Children<'c>: IntoIterator<Item = &'c Self>
    where
        Self: 'c;

    /// Returns this [Tree]'s immediate children.
    fn children(&self) -> Self::Children<'_>;
}


#[cfg(test)]
pub(crate) use tests::{Letter, MockTree, Size};
