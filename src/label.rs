use std::collections::HashMap;
use std::hash::Hash;

/// Interns labels into dense ids shared by both trees of a comparison.
#[derive(Debug)]
pub(crate) struct Labels<L> {
    ids: HashMap<L, usize>,
}

impl<L> Default for Labels<L> {
    fn default() -> Self {
        Labels {
            ids: HashMap::new(),
        }
    }
}

impl<L: Eq + Hash> Labels<L> {
    /// Returns the id of `label`, assigning the next free one if it was never seen.
    pub(crate) fn intern(&mut self, label: L) -> usize {
        let next = self.ids.len();
        *self.ids.entry(label).or_insert(next)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}
