use crate::{Costs, Decoration, Edit, Memo};
use pathfinding::matrix::Matrix;
use tracing::debug;

/// Tables indexed by 1-based postorder, row 0 and column 0 standing for the empty forest.
struct Backtrace<'a> {
    t1: &'a Decoration,
    t2: &'a Decoration,
    costs: &'a Costs,
    tree: Matrix<f64>,
    forest: Matrix<f64>,
}

impl Backtrace<'_> {
    #[inline]
    fn first(&self, row: usize, column: usize) -> (usize, usize) {
        (
            self.t1.leftmost_leaf(row - 1),
            self.t2.leftmost_leaf(column - 1),
        )
    }

    /// Fills the forest distances between the subtrees ending at `row` and `column`.
    fn fill(&mut self, row: usize, column: usize) {
        let (del, ins) = (self.costs.delete(), self.costs.insert());
        let (fr, fc) = self.first(row, column);

        self.forest[(fr, fc)] = 0.;
        for i in fr + 1..=row {
            self.forest[(i, fc)] = self.forest[(i - 1, fc)] + del;
        }

        for j in fc + 1..=column {
            self.forest[(fr, j)] = self.forest[(fr, j - 1)] + ins;
        }

        for i in fr + 1..=row {
            for j in fc + 1..=column {
                let skip = f64::min(
                    self.forest[(i - 1, j)] + del,
                    self.forest[(i, j - 1)] + ins,
                );

                let (li, lj) = self.first(i, j);
                if li == fr && lj == fc {
                    let relabel = if self.t1.label(i - 1) != self.t2.label(j - 1) {
                        self.costs.relabel()
                    } else {
                        0.
                    };

                    self.forest[(i, j)] = skip.min(self.forest[(i - 1, j - 1)] + relabel);
                    self.tree[(i, j)] = self.forest[(i, j)];
                } else {
                    self.forest[(i, j)] = skip.min(self.forest[(li, lj)] + self.tree[(i, j)]);
                }
            }
        }
    }
}

/// Recovers one minimal edit mapping from the tree distances in `memo`.
///
/// Among equally cheap alternatives, removals are preferred over insertions, and insertions
/// over replacements.
pub(crate) fn mapping(t1: &Decoration, t2: &Decoration, costs: &Costs, memo: &Memo) -> Box<[Edit]> {
    let (m, n) = (t1.len(), t2.len());
    let (del, ins) = (costs.delete(), costs.insert());

    let mut tree = Matrix::new(m + 1, n + 1, 0.);
    for i in 0..=m {
        tree[(i, 0)] = i as f64 * del;
    }

    for j in 0..=n {
        tree[(0, j)] = j as f64 * ins;
    }

    for i in 1..=m {
        for j in 1..=n {
            tree[(i, j)] = memo.tree(i - 1, j - 1);
        }
    }

    let mut backtrace = Backtrace {
        t1,
        t2,
        costs,
        tree,
        forest: Matrix::new(m + 1, n + 1, 0.),
    };

    let mut edits = Vec::with_capacity(m + n);
    let mut pairs = vec![(m, n)];
    while let Some((last_row, last_column)) = pairs.pop() {
        backtrace.fill(last_row, last_column);

        let (first_row, first_column) = backtrace.first(last_row, last_column);
        let (mut row, mut column) = (last_row, last_column);
        let forest = &backtrace.forest;

        while row > first_row || column > first_column {
            if row > first_row && forest[(row - 1, column)] + del == forest[(row, column)] {
                edits.push(Edit::Remove(row - 1));
                row -= 1;
            } else if column > first_column
                && forest[(row, column - 1)] + ins == forest[(row, column)]
            {
                edits.push(Edit::Insert(column - 1));
                column -= 1;
            } else if backtrace.first(row, column) == (first_row, first_column) {
                edits.push(Edit::Replace(row - 1, column - 1));
                row -= 1;
                column -= 1;
            } else {
                pairs.push((row, column));
                (row, column) = backtrace.first(row, column);
            }
        }
    }

    debug!(edits = edits.len(), "computed edit mapping");

    edits.into()
}
