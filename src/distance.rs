//! Strategy-driven recursion and the Zhang-Shasha single-path functions.

use crate::{Costs, Decoration, Direction, Memo, Metrics, Pair, Path, StrategyMatrix};
use pathfinding::matrix::Matrix;
use tracing::{debug, trace};

/// Computes the distance between two decorated trees following a fixed [StrategyMatrix].
pub(crate) struct Engine<'a, M> {
    t1: &'a Decoration,
    t2: &'a Decoration,
    costs: Costs,
    strategy: &'a StrategyMatrix,
    memo: Memo,
    metrics: M,
}

impl<'a, M: Metrics> Engine<'a, M> {
    pub(crate) fn new(
        t1: &'a Decoration,
        t2: &'a Decoration,
        costs: Costs,
        strategy: &'a StrategyMatrix,
        metrics: M,
    ) -> Self {
        Engine {
            t1,
            t2,
            costs,
            strategy,
            memo: Memo::new(t1, t2, &costs),
            metrics,
        }
    }

    /// Returns the distance between the two whole trees, along with the populated memo.
    pub(crate) fn run(mut self) -> (f64, Memo) {
        let distance = self.solve(self.t1.root(), self.t2.root());
        debug!(
            distance,
            rows = self.t1.len(),
            columns = self.t2.len(),
            "computed tree edit distance"
        );
        (distance, self.memo)
    }

    fn solve(&mut self, v: usize, w: usize) -> f64 {
        let strategy = self.strategy.get(v, w);
        let path = strategy.path();
        let reversed = strategy.is_reversed();

        let (tree, mut node) = if reversed { (self.t2, w) } else { (self.t1, v) };
        while let Some(next) = tree.path_child(path, node) {
            for &r in tree.relevant(path, node) {
                if reversed {
                    self.solve(v, r);
                } else {
                    self.solve(r, w);
                }
            }

            node = next;
        }

        trace!(v, w, ?strategy, "single-path function");
        self.metrics.path(path);

        let pair = Pair::new(self.t1, self.t2, self.costs, reversed);
        let (f, g) = if reversed { (w, v) } else { (v, w) };
        let metrics = &mut self.metrics;
        match path {
            Path::Left => pair.left(&mut self.memo, metrics, f, g),
            Path::Right => pair.right(&mut self.memo, metrics, f, g),
            Path::Heavy => pair.heavy(&mut self.memo, metrics, f, g),
        }
    }
}

impl Pair<'_> {
    /// Decomposes `f` along its left path, visiting every left key root of `g` in turn.
    pub(crate) fn left<M: Metrics>(&self, memo: &mut Memo, metrics: &mut M, f: usize, g: usize) -> f64 {
        let key_roots = self.g.key_roots();
        if let Some(first) = self.g.min_key_root(g) {
            for &k in key_roots[first..].iter().take_while(|&&k| k < g) {
                self.forest(memo, metrics, Direction::Left, f, k);
            }
        }

        self.forest(memo, metrics, Direction::Left, f, g)
    }

    /// Decomposes `f` along its right path, the mirror image of [left][Self::left].
    pub(crate) fn right<M: Metrics>(&self, memo: &mut Memo, metrics: &mut M, f: usize, g: usize) -> f64 {
        let (f, g) = (self.f.reversed(f), self.g.reversed(g));
        let key_roots = self.g.rev_key_roots();
        if let Some(first) = self.g.min_rev_key_root(g) {
            for &k in key_roots[first..].iter().take_while(|&&k| k < g) {
                self.forest(memo, metrics, Direction::Right, f, k);
            }
        }

        self.forest(memo, metrics, Direction::Right, f, g)
    }

    /// Fills the forest distance table between the subtree of `i` and that of `j`, recording the
    /// distance of every pair of subtrees that share their first leaf with `i` and `j`.
    ///
    /// `i` and `j` are postorder numbers for [Direction::Left] and reversed postorder numbers
    /// for [Direction::Right].
    fn forest<M: Metrics>(
        &self,
        memo: &mut Memo,
        metrics: &mut M,
        direction: Direction,
        i: usize,
        j: usize,
    ) -> f64 {
        let (f, g) = (self.f, self.g);
        let (del, ins) = (self.costs.delete(), self.costs.insert());

        let li = f.first_leaf(direction, i);
        let lj = g.first_leaf(direction, j);
        let (rows, columns) = (i + 1 - li, j + 1 - lj);

        let mut fd = Matrix::new(rows + 1, columns + 1, 0.);
        for x in 1..=rows {
            fd[(x, 0)] = fd[(x - 1, 0)] + del;
        }

        for y in 1..=columns {
            fd[(0, y)] = fd[(0, y - 1)] + ins;
        }

        for x in 1..=rows {
            let a = li + x - 1;
            let la = f.first_leaf(direction, a);
            let pa = f.node(direction, a);

            for y in 1..=columns {
                let b = lj + y - 1;
                let lb = g.first_leaf(direction, b);
                let pb = g.node(direction, b);

                let skip = f64::min(fd[(x - 1, y)] + del, fd[(x, y - 1)] + ins);
                fd[(x, y)] = if la == li && lb == lj {
                    let below = fd[(x - 1, y - 1)];
                    let distance = skip.min(below + self.relabel(pa, pb));
                    self.store(memo, pa, pb, below, distance);
                    distance
                } else {
                    skip.min(fd[(la - li, lb - lj)] + self.tree(memo, pa, pb))
                };
            }
        }

        metrics.subproblems((rows * columns) as u64);

        fd[(rows, columns)]
    }
}
