use crate::Error;

/// The price of each edit operation.
///
/// All costs are finite and non-negative. The [default][Costs::default] is unit cost for every
/// operation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Costs {
    delete: f64,
    insert: f64,
    relabel: f64,
}

impl Default for Costs {
    fn default() -> Self {
        Costs {
            delete: 1.,
            insert: 1.,
            relabel: 1.,
        }
    }
}

impl Costs {
    /// Validates and bundles the cost of deleting a node from the first tree, inserting a node
    /// of the second tree and relabeling a node whose label differs from its counterpart.
    pub fn new(delete: f64, insert: f64, relabel: f64) -> Result<Self, Error> {
        for (operation, value) in [("delete", delete), ("insert", insert), ("relabel", relabel)] {
            if !value.is_finite() || value < 0. {
                return Err(Error::InvalidCost { operation, value });
            }
        }

        Ok(Costs {
            delete,
            insert,
            relabel,
        })
    }

    /// The cost of deleting a node of the first tree.
    #[inline]
    pub fn delete(&self) -> f64 {
        self.delete
    }

    /// The cost of inserting a node of the second tree.
    #[inline]
    pub fn insert(&self) -> f64 {
        self.insert
    }

    /// The cost of mapping two nodes with different labels.
    #[inline]
    pub fn relabel(&self) -> f64 {
        self.relabel
    }

    /// The same costs seen from the second tree: deletions become insertions and vice versa.
    #[inline]
    pub fn flipped(self) -> Self {
        Costs {
            delete: self.insert,
            insert: self.delete,
            relabel: self.relabel,
        }
    }
}
