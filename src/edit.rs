/// A single entry of an edit mapping between two trees.
///
/// Nodes are identified by their 0-based postorder number in their respective tree.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Edit {
    /// Map a node of the first tree onto a node of the second, relabeling it if the labels
    /// differ.
    Replace(usize, usize),

    /// Remove a node of the first tree.
    Remove(usize),

    /// Insert a node of the second tree.
    Insert(usize),
}

impl Edit {
    /// The nodes this edit touches, `None` standing for the empty node.
    pub fn pair(&self) -> (Option<usize>, Option<usize>) {
        match *self {
            Edit::Replace(i, j) => (Some(i), Some(j)),
            Edit::Remove(i) => (Some(i), None),
            Edit::Insert(j) => (None, Some(j)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn pairs_preserve_the_touched_nodes(i: usize, j: usize) {
        assert_eq!(Edit::Replace(i, j).pair(), (Some(i), Some(j)));
        assert_eq!(Edit::Remove(i).pair(), (Some(i), None));
        assert_eq!(Edit::Insert(j).pair(), (None, Some(j)));
    }
}
