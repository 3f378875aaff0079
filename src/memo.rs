use crate::{Costs, Decoration};
use pathfinding::matrix::Matrix;

/// Tree distances between every pair of subtrees, indexed by postorder in the first and the
/// second tree respectively.
///
/// Each cell holds a value and a flag; the tree distance is the value, plus the relabel cost if
/// the flag is set. The flag is set only where mapping the two roots onto each other is optimal
/// and their labels differ, in which case the value is the distance between the forests below
/// them.
#[derive(Debug, Clone)]
pub(crate) struct Memo {
    delta: Matrix<f64>,
    bit: Matrix<bool>,
    relabel: f64,
}

impl Memo {
    /// Seeds every pair that involves a leaf.
    pub(crate) fn new(t1: &Decoration, t2: &Decoration, costs: &Costs) -> Self {
        let (m, n) = (t1.len(), t2.len());
        let mut delta = Matrix::new(m, n, 0.);
        let mut bit = Matrix::new(m, n, false);

        for x in 0..m {
            for y in 0..n {
                bit[(x, y)] = t1.label(x) != t2.label(y);
                delta[(x, y)] = match (t1.size(x), t2.size(y)) {
                    (1, s) => (s - 1) as f64 * costs.insert(),
                    (s, _) => (s - 1) as f64 * costs.delete(),
                };
            }
        }

        Memo {
            delta,
            bit,
            relabel: costs.relabel(),
        }
    }

    /// The distance between the subtrees rooted at `x` and `y`.
    #[inline]
    pub(crate) fn tree(&self, x: usize, y: usize) -> f64 {
        if self.bit[(x, y)] {
            self.delta[(x, y)] + self.relabel
        } else {
            self.delta[(x, y)]
        }
    }

    /// Records the distance between the subtrees rooted at `x` and `y`, given the distance
    /// `below` between the forests of their children.
    #[inline]
    pub(crate) fn store(&mut self, x: usize, y: usize, below: f64, distance: f64, differ: bool) {
        let relabeled = differ && below + self.relabel == distance;
        self.bit[(x, y)] = relabeled;
        self.delta[(x, y)] = if relabeled { below } else { distance };
    }
}

/// Two decorated subtrees seen from the tree whose path drives the decomposition.
///
/// `f` always plays the row role and `g` the column role: deleting is removing a node of `f` and
/// inserting is adding a node of `g`, whichever of the two input trees they are.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Pair<'a> {
    pub(crate) f: &'a Decoration,
    pub(crate) g: &'a Decoration,
    pub(crate) costs: Costs,
    flipped: bool,
}

impl<'a> Pair<'a> {
    pub(crate) fn new(t1: &'a Decoration, t2: &'a Decoration, costs: Costs, flipped: bool) -> Self {
        if flipped {
            Pair {
                f: t2,
                g: t1,
                costs: costs.flipped(),
                flipped,
            }
        } else {
            Pair {
                f: t1,
                g: t2,
                costs,
                flipped,
            }
        }
    }

    #[inline]
    fn key(&self, a: usize, b: usize) -> (usize, usize) {
        if self.flipped {
            (b, a)
        } else {
            (a, b)
        }
    }

    #[inline]
    pub(crate) fn differ(&self, a: usize, b: usize) -> bool {
        self.f.label(a) != self.g.label(b)
    }

    /// The cost of mapping node `a` of `f` onto node `b` of `g`.
    #[inline]
    pub(crate) fn relabel(&self, a: usize, b: usize) -> f64 {
        if self.differ(a, b) {
            self.costs.relabel()
        } else {
            0.
        }
    }

    #[inline]
    pub(crate) fn tree(&self, memo: &Memo, a: usize, b: usize) -> f64 {
        let (x, y) = self.key(a, b);
        memo.tree(x, y)
    }

    #[inline]
    pub(crate) fn store(&self, memo: &mut Memo, a: usize, b: usize, below: f64, distance: f64) {
        let (x, y) = self.key(a, b);
        memo.store(x, y, below, distance, self.differ(a, b));
    }
}
