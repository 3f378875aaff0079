//! The Klein-Demaine single-path function along a heavy path.
//!
//! The subtree of `g` is indexed by pairs `(i, j)`: `G(i, j)` is the forest left after removing
//! `i` roots from the far side and then `j` roots from the near side, where the near side is the
//! left for [Direction::Left] and the right for [Direction::Right]. Every `G(i, j)` with
//! `j <= j_of(i)` still contains a whole tree on its far side.
//!
//! The subtree of `f` is consumed period by period, one heavy-path node at a time, from the leaf
//! up. Within a period, `F(k')` is the forest left after removing `k - k'` roots from the near
//! side of the current heavy-path node, so `F(0)` is whatever the previous period left over.

use crate::{Direction, Memo, Metrics, Pair, Path, Sweep};
use pathfinding::matrix::Matrix;
use std::cmp::Ordering;
use std::iter::successors;
use std::mem::swap;

struct Heavy<'p, 'a> {
    pair: &'p Pair<'a>,
    w: usize,
    size: usize,
    t: Matrix<f64>,
    t_copy: Matrix<f64>,
    s: Matrix<f64>,
    q: Box<[f64]>,
    ij: Matrix<usize>,
    below: Box<[f64]>,
    previous: Direction,
}

impl<'p, 'a> Heavy<'p, 'a> {
    fn new(pair: &'p Pair<'a>, v: usize, w: usize) -> Self {
        let (m, n) = (pair.f.size(v), pair.g.size(w));
        Heavy {
            pair,
            w,
            size: n,
            t: Matrix::new(n, n, 0.),
            t_copy: Matrix::new(n, n, 0.),
            s: Matrix::new(m, n, 0.),
            q: vec![0.; m].into(),
            ij: Matrix::new(n, n, 0),
            below: vec![0.; n].into(),
            previous: Direction::Left,
        }
    }

    /// The `i`-th root removed from the far side.
    #[inline]
    fn far(&self, direction: Direction, i: usize) -> usize {
        let g = self.pair.g;
        match direction {
            Direction::Left => self.w - i,
            Direction::Right => g.pre_to_post(g.preorder(self.w) + i),
        }
    }

    /// The inverse of [far][Self::far].
    #[inline]
    fn far_index(&self, direction: Direction, y: usize) -> usize {
        let g = self.pair.g;
        match direction {
            Direction::Left => self.w - y,
            Direction::Right => g.preorder(y) - g.preorder(self.w),
        }
    }

    /// The position of `y` in the order roots are removed from the near side of the whole tree.
    #[inline]
    fn near(&self, direction: Direction, y: usize) -> usize {
        let g = self.pair.g;
        match direction {
            Direction::Left => g.preorder(y),
            Direction::Right => g.len() - 1 - y,
        }
    }

    /// The inverse of [near][Self::near].
    #[inline]
    fn from_near(&self, direction: Direction, x: usize) -> usize {
        let g = self.pair.g;
        match direction {
            Direction::Left => g.pre_to_post(x),
            Direction::Right => g.len() - 1 - x,
        }
    }

    #[inline]
    fn j_of(&self, direction: Direction, i: usize) -> usize {
        self.size - i - self.pair.g.size(self.far(direction, i))
    }

    /// Tabulates the near-side root of every `G(i, j)`, as a position in the near-side order.
    fn compute_ij(&mut self, direction: Direction) {
        let origin = self.near(direction, self.w);
        for z in 0..self.size {
            self.ij[(0, z)] = origin + z;
        }

        for x in 1..self.size {
            let change = self.near(direction, self.far(direction, x - 1));
            for z in 0..self.size {
                let p = self.ij[(x - 1, z)];
                self.ij[(x, z)] = if p >= change { p + 1 } else { p };
            }
        }
    }

    /// Distances between the empty forest and every `G(i, j)`.
    fn reset(&mut self, direction: Direction) {
        let ins = self.pair.costs.insert();
        for i in 0..self.size {
            for j in 0..=self.j_of(direction, i) {
                self.t[(i, j)] = (self.size - i - j) as f64 * ins;
            }
        }

        self.previous = direction;
    }

    /// The distance between `F(0)` and `G(i, j)`, as left by the previous period.
    #[inline]
    fn previous_at(&self, direction: Direction, i: usize, j: usize) -> f64 {
        if direction == self.previous {
            self.t_copy[(i, j)]
        } else {
            // the previous period swept the other way, so its i counts this period's near side
            let p = self.ij[(i, j)] - self.near(direction, self.w);
            self.t_copy[(p, i + j - p)]
        }
    }

    /// Extends the distances from `F(0)` to `F(k)`, where `F(k)` is the subtree of `vp` unless
    /// `partial`, in which case it lacks `vp` itself.
    fn period<M: Metrics>(
        &mut self,
        memo: &mut Memo,
        metrics: &mut M,
        vp: usize,
        next: Option<usize>,
        direction: Direction,
        partial: bool,
    ) {
        let pair = self.pair;
        let (f, g) = (pair.f, pair.g);
        let (del, ins) = (pair.costs.delete(), pair.costs.insert());
        let n = self.size;
        let vp_size = f.size(vp);

        let k = match next {
            Some(next) => {
                if direction != self.previous {
                    self.compute_ij(direction);
                }

                match direction {
                    Direction::Left => f.preorder(next) - f.preorder(vp),
                    Direction::Right => vp - next,
                }
            }

            None => {
                self.compute_ij(direction);
                1
            }
        };

        let base = match direction {
            Direction::Left => next.map_or(0, |x| f.size(x)),
            Direction::Right => vp_size - k,
        };

        let root = |kp: usize| match direction {
            Direction::Left => f.pre_to_post(f.preorder(vp) + k - kp),
            Direction::Right => vp - (k - kp),
        };

        swap(&mut self.t, &mut self.t_copy);

        for i in 0..n {
            if g.size(self.far(direction, i)) == 1 {
                self.below[i] = (vp_size - 1) as f64 * del;
            }
        }

        for i in (0..n).rev() {
            let j_of_i = self.j_of(direction, i);
            let rows = if partial { k - 1 } else { k };
            metrics.subproblems((rows * (j_of_i + 1)) as u64);

            for kp in 1..=k {
                let fk = root(kp);
                let kb = kp as isize - f.size(fk) as isize;

                for j in (0..=j_of_i).rev() {
                    let y = self.from_near(direction, self.ij[(i, j)]);

                    let delete = del
                        + if kp == 1 {
                            self.previous_at(direction, i, j)
                        } else {
                            self.s[(kp - 2, j)]
                        };

                    let insert = ins
                        + if j < j_of_i {
                            self.s[(kp - 1, j + 1)]
                        } else if i + j_of_i == n - 1 {
                            (base + kp) as f64 * del
                        } else {
                            self.q[kp - 1]
                        };

                    let mapped = if fk == vp {
                        self.below[self.far_index(direction, y)] + pair.relabel(vp, y)
                    } else {
                        pair.tree(memo, fk, y)
                    };

                    let rest = if j == j_of_i {
                        (base as isize + kb).max(0) as f64 * del
                    } else {
                        let jp = j + g.size(y);
                        match kb.cmp(&0) {
                            Ordering::Equal => self.previous_at(direction, i, jp),
                            Ordering::Greater => self.s[(kb as usize - 1, jp)],
                            Ordering::Less => (n - i - jp) as f64 * ins,
                        }
                    };

                    self.s[(kp - 1, j)] = delete.min(insert).min(mapped + rest);
                }
            }

            let row = if partial { k - 2 } else { k - 1 };
            for j in 0..=j_of_i {
                self.t[(i, j)] = self.s[(row, j)];
            }

            if i > 0 {
                let jm = self.j_of(direction, i - 1);
                if jm <= j_of_i {
                    for x in 0..k {
                        self.q[x] = self.s[(x, jm)];
                    }
                }

                // the far root removed last is not a leaf
                if i + jm < n {
                    self.below[i - 1] = if k == 1 {
                        self.previous_at(direction, i, jm)
                    } else {
                        self.s[(k - 2, jm)]
                    };
                }
            }

            if !partial {
                let y = self.far(direction, i);
                pair.store(memo, vp, y, self.below[i], self.t[(i, j_of_i)]);
            }
        }

        self.previous = direction;
    }
}

impl Pair<'_> {
    /// Decomposes `f` along its heavy path.
    pub(crate) fn heavy<M: Metrics>(&self, memo: &mut Memo, metrics: &mut M, f: usize, g: usize) -> f64 {
        let path: Vec<_> = successors(Some(f), |&v| self.f.path_child(Path::Heavy, v)).collect();
        let mut heavy = Heavy::new(self, f, g);

        let mut next = None;
        for &vp in path.iter().rev() {
            let passes: &[_] = match self.f.sweep(vp) {
                Sweep::Left => &[(Direction::Left, false)],
                Sweep::Right => &[(Direction::Right, false)],
                Sweep::Both => &[(Direction::Left, true), (Direction::Right, false)],
            };

            for &(direction, partial) in passes {
                if self.f.size(vp) == 1 {
                    heavy.reset(direction);
                }

                heavy.period(memo, metrics, vp, next, direction, partial);
            }

            next = Some(vp);
        }

        heavy.t[(0, 0)]
    }
}

#[cfg(test)]
mod tests {
    use crate::{Costs, Counters, Decoration, Engine, LabeledTree, Labels, Strategy, StrategyMatrix};

    fn run(a: &str, b: &str, costs: Costs, strategy: Strategy) -> (f64, Counters) {
        let mut labels = Labels::default();
        let a: LabeledTree<String> = a.parse().unwrap();
        let b: LabeledTree<String> = b.parse().unwrap();
        let t1 = Decoration::new(&a, &mut labels);
        let t2 = Decoration::new(&b, &mut labels);
        let strategy = StrategyMatrix::filled(t1.len(), t2.len(), strategy);

        let mut counters = Counters::default();
        let (distance, _) = Engine::new(&t1, &t2, costs, &strategy, &mut counters).run();
        (distance, counters)
    }

    #[test]
    fn a_heavy_child_in_the_middle_sweeps_both_ways() {
        let (d, c) = run("{a{b}{c{d}}{e}}", "{c}", Costs::default(), Strategy::Heavy);
        assert_eq!(d, 4.);
        assert_eq!(c.heavy, 3);
    }

    #[test]
    fn deletions_are_priced_on_the_path_tree() {
        let costs = Costs::new(1., 10., 100.).unwrap();
        assert_eq!(run("{a{b}{c}{d}}", "{a}", costs, Strategy::Heavy).0, 3.);
        assert_eq!(run("{a}", "{a{b}{c}{d}}", costs, Strategy::ReverseHeavy).0, 30.);
    }

    #[test]
    fn single_children_are_chained() {
        let (d, _) = run("{a{b{c{d}}}}", "{b{d}{c}}", Costs::default(), Strategy::Heavy);
        assert_eq!(d, 3.);
    }

    #[test]
    fn heavy_paths_agree_with_zhang_shasha() {
        let pairs = [
            ("{a{b{c}{d}}{e}}", "{a{c}{b{e}}}"),
            ("{f{d{a}{c{b}}}{e}}", "{f{c{d{a}{b}}}{e}}"),
            ("{a{b}{c}{d{e}{f}}{g}}", "{a{c{d}{e}}{b}{x{f}{g}}}"),
            ("{r{a{b}{c}}{d{e}{f{g}}}{h}}", "{r{d{e}}{a{c}{b{x}}}{h{g}}}"),
        ];

        for (a, b) in pairs {
            let (expected, _) = run(a, b, Costs::default(), Strategy::Left);
            for s in [Strategy::Heavy, Strategy::ReverseHeavy] {
                assert_eq!(run(a, b, Costs::default(), s).0, expected, "{a} {b} {s:?}");
            }
        }
    }
}
