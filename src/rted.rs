use crate::{mapping, Costs, Decoration, Edit, Engine, Error, Labels, Memo, Metrics, Path};
use crate::{StrategyMatrix, Tree};
use tracing::debug;

fn decorate<'t, T: Tree>(a: &'t T, b: &'t T) -> (Decoration, Decoration) {
    let mut labels = Labels::default();
    let t1 = Decoration::new(a, &mut labels);
    let t2 = Decoration::new(b, &mut labels);
    (t1, t2)
}

/// The tree edit distance engine.
///
/// Both trees are flattened once, after which distances can be computed repeatedly under
/// different [Costs] or decomposition strategies.
///
/// ```rust
/// use rted::{Costs, Edit, LabeledTree, Rted};
///
/// let a: LabeledTree<String> = "{a{b}{c}}".parse()?;
/// let b: LabeledTree<String> = "{a{b}{d}}".parse()?;
///
/// let mut rted = Rted::new(&a, &b);
/// assert_eq!(rted.distance(Costs::default()), 1.);
///
/// let mut edits = rted.compute_edit_mapping()?.into_vec();
/// edits.sort();
/// assert_eq!(edits, [Edit::Replace(0, 0), Edit::Replace(1, 1), Edit::Replace(2, 2)]);
/// # Ok::<(), rted::Error>(())
/// ```
#[derive(Debug)]
pub struct Rted<M = ()> {
    t1: Decoration,
    t2: Decoration,
    strategy: Option<StrategyMatrix>,
    solution: Option<(Memo, Costs)>,
    metrics: M,
}

impl Rted {
    /// Flattens both trees, ready for a distance computation.
    pub fn new<'t, T: Tree>(a: &'t T, b: &'t T) -> Self {
        Self::with_metrics(a, b, ())
    }
}

impl<M: Metrics> Rted<M> {
    /// Reports the work done by every distance computation to `metrics`.
    pub fn with_metrics<'t, T: Tree>(a: &'t T, b: &'t T, metrics: M) -> Self {
        let (t1, t2) = decorate(a, b);
        Rted {
            t1,
            t2,
            strategy: None,
            solution: None,
            metrics,
        }
    }

    /// The number of nodes of each tree.
    pub fn sizes(&self) -> (usize, usize) {
        (self.t1.len(), self.t2.len())
    }

    /// The sink every computation so far has reported to.
    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Consumes the engine, returning its metrics sink.
    pub fn into_metrics(self) -> M {
        self.metrics
    }

    /// The strategy the next [rescore][Self::rescore] follows, if any.
    pub fn strategy(&self) -> Option<&StrategyMatrix> {
        self.strategy.as_ref()
    }

    /// Computes and stores the strategy that minimizes the number of relevant subproblems.
    pub fn compute_optimal_strategy(&mut self) -> &StrategyMatrix {
        self.strategy
            .insert(StrategyMatrix::optimal(&self.t1, &self.t2))
    }

    /// Replaces the stored strategy, which must have one row per node of the first tree and one
    /// column per node of the second.
    pub fn set_custom_strategy(&mut self, strategy: StrategyMatrix) -> Result<(), Error> {
        let (rows, columns) = self.sizes();
        if (strategy.rows(), strategy.columns()) != (rows, columns) {
            return Err(Error::StrategyShape {
                expected_rows: rows,
                expected_columns: columns,
                rows: strategy.rows(),
                columns: strategy.columns(),
            });
        }

        self.strategy = Some(strategy);
        Ok(())
    }

    /// Uses the same `path` for every pair of subtrees; if `switch_by_size`, the path is walked in
    /// the larger subtree of each pair.
    pub fn set_uniform_strategy(&mut self, path: Path, switch_by_size: bool) {
        self.strategy = Some(StrategyMatrix::uniform(
            &self.t1,
            &self.t2,
            path,
            switch_by_size,
        ));
    }

    /// Computes the optimal strategy, then the distance under `costs`.
    pub fn distance(&mut self, costs: Costs) -> f64 {
        let strategy = self
            .strategy
            .insert(StrategyMatrix::optimal(&self.t1, &self.t2));

        let engine = Engine::new(&self.t1, &self.t2, costs, strategy, &mut self.metrics);
        let (distance, memo) = engine.run();
        self.solution = Some((memo, costs));
        distance
    }

    /// Computes the distance under `costs` following the stored strategy.
    pub fn rescore(&mut self, costs: Costs) -> Result<f64, Error> {
        let strategy = self.strategy.as_ref().ok_or(Error::NoStrategy)?;
        let engine = Engine::new(&self.t1, &self.t2, costs, strategy, &mut self.metrics);
        let (distance, memo) = engine.run();
        self.solution = Some((memo, costs));
        Ok(distance)
    }

    /// Recovers one minimal edit mapping under the costs of the last distance computation.
    pub fn compute_edit_mapping(&self) -> Result<Box<[Edit]>, Error> {
        let (memo, costs) = self.solution.as_ref().ok_or(Error::NoDistance)?;
        Ok(mapping(&self.t1, &self.t2, costs, memo))
    }
}

/// The tree edit distance between `a` and `b`.
pub fn distance<T: Tree>(a: &T, b: &T, costs: Costs) -> f64 {
    Rted::new(a, b).distance(costs)
}

/// Finds one minimal edit mapping that transforms `a` into `b`, along with its cost.
pub fn diff<T: Tree>(a: &T, b: &T, costs: Costs) -> (Box<[Edit]>, f64) {
    let (t1, t2) = decorate(a, b);
    let strategy = StrategyMatrix::optimal(&t1, &t2);
    let (distance, memo) = Engine::new(&t1, &t2, costs, &strategy, ()).run();
    let edits = mapping(&t1, &t2, &costs, &memo);
    debug!(distance, edits = edits.len(), "diffed trees");
    (edits, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Counters, Fold, LabeledTree, Letter, MockTree, Size, Strategy};
    use assert_matches::assert_matches;
    use proptest::collection::vec;
    use std::collections::HashMap;
    use test_strategy::proptest;

    fn costs(d: u8, i: u8, r: u8) -> Costs {
        Costs::new(d.into(), i.into(), r.into()).unwrap()
    }

    fn parse(s: &str) -> LabeledTree<String> {
        s.parse().unwrap()
    }

    /// Reads bracket notation whose labels are single letters.
    fn parse_mock(s: &str) -> MockTree<Letter> {
        fn convert(t: &LabeledTree<String>) -> MockTree<Letter> {
            let label = match t.label.as_str() {
                "A" => Letter::A,
                "B" => Letter::B,
                _ => Letter::C,
            };

            MockTree {
                label,
                children: t.children.iter().map(convert).collect(),
            }
        }

        convert(&parse(s))
    }

    /// Labels and leftmost leaves in postorder.
    #[derive(Debug, Default)]
    struct Flat {
        labels: Vec<Letter>,
        leftmost: Vec<usize>,
    }

    impl Flat {
        fn new(t: &MockTree<Letter>) -> Self {
            let mut flat = Flat::default();
            flat.push(t);
            flat
        }

        fn push(&mut self, t: &MockTree<Letter>) {
            let first = self.labels.len();
            for c in &t.children {
                self.push(c);
            }

            self.labels.push(t.label);
            self.leftmost.push(first);
        }

        fn is_ancestor(&self, a: usize, d: usize) -> bool {
            self.leftmost[a] <= d && d < a
        }
    }

    type Key = (usize, usize, usize, usize);

    /// The textbook recursion on forests, each one a half-open range of postorder numbers.
    fn reference(
        a: &Flat,
        b: &Flat,
        (l1, r1): (usize, usize),
        (l2, r2): (usize, usize),
        costs: &Costs,
        memo: &mut HashMap<Key, f64>,
    ) -> f64 {
        if l1 == r1 {
            return (r2 - l2) as f64 * costs.insert();
        }

        if l2 == r2 {
            return (r1 - l1) as f64 * costs.delete();
        }

        if let Some(&d) = memo.get(&(l1, r1, l2, r2)) {
            return d;
        }

        let (v, w) = (r1 - 1, r2 - 1);
        let (lv, lw) = (a.leftmost[v], b.leftmost[w]);
        let relabel = if a.labels[v] != b.labels[w] {
            costs.relabel()
        } else {
            0.
        };

        let delete = reference(a, b, (l1, v), (l2, r2), costs, memo) + costs.delete();
        let insert = reference(a, b, (l1, r1), (l2, w), costs, memo) + costs.insert();
        let map = reference(a, b, (lv, v), (lw, w), costs, memo)
            + relabel
            + reference(a, b, (l1, lv), (l2, lw), costs, memo);

        let d = delete.min(insert).min(map);
        memo.insert((l1, r1, l2, r2), d);
        d
    }

    fn brute_force(a: &MockTree<Letter>, b: &MockTree<Letter>, costs: &Costs) -> f64 {
        let (a, b) = (Flat::new(a), Flat::new(b));
        let (m, n) = (a.labels.len(), b.labels.len());
        reference(&a, &b, (0, m), (0, n), costs, &mut HashMap::new())
    }

    #[test]
    fn replacing_a_leaf_costs_one_relabel() {
        let a = parse("{a{b}{c}}");
        let b = parse("{a{b}{d}}");

        let (mut edits, d) = diff(&a, &b, Costs::default());
        edits.sort();

        assert_eq!(d, 1.);
        assert_eq!(
            &edits[..],
            [Edit::Replace(0, 0), Edit::Replace(1, 1), Edit::Replace(2, 2)]
        );
    }

    #[test]
    fn a_chain_collapses_into_its_root() {
        let (mut edits, d) = diff(&parse("{a{b{c}}}"), &parse("{a}"), Costs::default());
        edits.sort();

        assert_eq!(d, 2.);
        assert_eq!(
            &edits[..],
            [Edit::Replace(2, 0), Edit::Remove(0), Edit::Remove(1)]
        );
    }

    #[test]
    fn expensive_relabels_are_avoided() {
        let (a, b) = (parse("{a}"), parse("{b}"));

        let (edits, d) = diff(&a, &b, Costs::new(3., 3., 5.).unwrap());
        assert_eq!(d, 5.);
        assert_eq!(&edits[..], [Edit::Replace(0, 0)]);

        let (mut edits, d) = diff(&a, &b, Costs::new(1., 1., 5.).unwrap());
        edits.sort();
        assert_eq!(d, 2.);
        assert_eq!(&edits[..], [Edit::Remove(0), Edit::Insert(0)]);
    }

    #[test]
    fn rescoring_requires_a_strategy() {
        let (a, b) = (parse("{a}"), parse("{b}"));
        let mut rted = Rted::new(&a, &b);
        assert_matches!(rted.rescore(Costs::default()), Err(Error::NoStrategy));

        rted.compute_optimal_strategy();
        assert_matches!(rted.rescore(Costs::default()), Ok(d) if d == 1.);
    }

    #[test]
    fn mapping_requires_a_distance() {
        let (a, b) = (parse("{a}"), parse("{b}"));
        let mut rted = Rted::new(&a, &b);
        assert_matches!(rted.compute_edit_mapping(), Err(Error::NoDistance));

        rted.set_uniform_strategy(Path::Heavy, true);
        rted.rescore(Costs::default()).unwrap();
        assert_matches!(rted.compute_edit_mapping(), Ok(e) if e.len() == 1);
    }

    #[test]
    fn custom_strategies_must_match_both_trees() {
        let (a, b) = (parse("{a{b}}"), parse("{c}"));
        let mut rted = Rted::new(&a, &b);

        assert_matches!(
            rted.set_custom_strategy(StrategyMatrix::filled(1, 2, Strategy::Left)),
            Err(Error::StrategyShape {
                expected_rows: 2,
                expected_columns: 1,
                rows: 1,
                columns: 2,
            })
        );

        assert_matches!(rted.strategy(), None);
        assert_matches!(
            rted.set_custom_strategy(StrategyMatrix::filled(2, 1, Strategy::Right)),
            Ok(())
        );
    }

    #[test]
    fn metrics_accumulate_across_runs() {
        let (a, b) = (parse("{a}"), parse("{b}"));
        let mut rted = Rted::with_metrics(&a, &b, Counters::default());
        rted.distance(Costs::default());
        rted.rescore(Costs::default()).unwrap();

        let counters = rted.into_metrics();
        assert_eq!(counters.paths(), 2);
        assert_eq!(counters.subproblems, 2);
    }

    #[proptest]
    fn the_distance_between_identical_trees_is_zero(a: MockTree<Letter>) {
        let (edits, d) = diff(&a, &a, Costs::default());
        assert_eq!(d, 0.);
        assert_eq!(edits.len(), a.count());
        assert!(edits.iter().all(|e| matches!(e, Edit::Replace(x, y) if x == y)));
    }

    #[proptest]
    fn only_identical_trees_are_zero_apart(a: MockTree<Letter>, b: MockTree<Letter>) {
        assert_eq!(distance(&a, &b, Costs::default()) == 0., a == b);
    }

    #[proptest]
    fn the_distance_is_at_most_removing_everything_and_inserting_everything(
        a: MockTree<Letter>,
        b: MockTree<Letter>,
        #[strategy(0u8..4)] d: u8,
        #[strategy(0u8..4)] i: u8,
        #[strategy(0u8..4)] r: u8,
    ) {
        let costs = costs(d, i, r);
        let bound = a.count() as f64 * costs.delete() + b.count() as f64 * costs.insert();
        assert_matches!(distance(&a, &b, costs), x if x <= bound);
    }

    #[proptest]
    fn swapping_trees_swaps_deletions_and_insertions(
        a: MockTree<Letter>,
        b: MockTree<Letter>,
        #[strategy(0u8..4)] d: u8,
        #[strategy(0u8..4)] i: u8,
        #[strategy(0u8..4)] r: u8,
    ) {
        assert_eq!(
            distance(&a, &b, costs(d, i, r)),
            distance(&b, &a, costs(i, d, r))
        );
    }

    #[proptest]
    fn unit_costs_satisfy_the_triangle_inequality(
        a: MockTree<Letter>,
        b: MockTree<Letter>,
        c: MockTree<Letter>,
    ) {
        let ab = distance(&a, &b, Costs::default());
        let bc = distance(&b, &c, Costs::default());
        let ac = distance(&a, &c, Costs::default());
        assert_matches!(ac, x if x <= ab + bc);
    }

    #[proptest]
    fn the_distance_is_minimal(
        #[any(Size::from((3, 2)))] a: MockTree<Letter>,
        #[any(Size::from((3, 2)))] b: MockTree<Letter>,
        #[strategy(0u8..4)] d: u8,
        #[strategy(0u8..4)] i: u8,
        #[strategy(0u8..4)] r: u8,
    ) {
        let costs = costs(d, i, r);
        assert_eq!(distance(&a, &b, costs), brute_force(&a, &b, &costs));
    }

    #[proptest]
    fn every_strategy_is_minimal_on_wide_trees_with_fractional_costs(
        #[any(Size::from((2, 4)))] a: MockTree<Letter>,
        #[any(Size::from((2, 4)))] b: MockTree<Letter>,
        #[strategy(0u8..24)] d: u8,
        #[strategy(0u8..24)] i: u8,
        #[strategy(0u8..24)] r: u8,
    ) {
        // eighths add up exactly
        let costs = Costs::new(f64::from(d) / 8., f64::from(i) / 8., f64::from(r) / 8.).unwrap();
        let expected = brute_force(&a, &b, &costs);

        let mut rted = Rted::new(&a, &b);
        assert_eq!(rted.distance(costs), expected);

        for path in [Path::Left, Path::Right, Path::Heavy] {
            for switch_by_size in [false, true] {
                rted.set_uniform_strategy(path, switch_by_size);
                assert_eq!(rted.rescore(costs).unwrap(), expected);
            }
        }
    }

    #[test]
    fn heavy_children_between_siblings_are_minimal() {
        // the heavy child {C{A}{B}} has siblings on both sides
        let a: MockTree<Letter> = parse_mock("{A{B}{C{A}{B}}{C}}");
        let b: MockTree<Letter> = parse_mock("{A{C{B}}{A}{B{C}{A}}}");
        let costs = Costs::new(0.375, 0.625, 0.5).unwrap();
        let expected = brute_force(&a, &b, &costs);

        for s in Strategy::ALL {
            let mut rted = Rted::new(&a, &b);
            let (rows, columns) = rted.sizes();
            rted.set_custom_strategy(StrategyMatrix::filled(rows, columns, s))
                .unwrap();
            assert_eq!(rted.rescore(costs).unwrap(), expected, "{s:?}");
        }
    }

    #[proptest]
    fn every_uniform_strategy_finds_the_same_distance(
        a: MockTree<Letter>,
        b: MockTree<Letter>,
        #[strategy(0u8..4)] d: u8,
        #[strategy(0u8..4)] i: u8,
        #[strategy(0u8..4)] r: u8,
    ) {
        let costs = costs(d, i, r);
        let mut rted = Rted::new(&a, &b);
        let expected = rted.distance(costs);

        for path in [Path::Left, Path::Right, Path::Heavy] {
            for switch_by_size in [false, true] {
                rted.set_uniform_strategy(path, switch_by_size);
                assert_eq!(rted.rescore(costs).unwrap(), expected);
            }
        }
    }

    #[proptest]
    fn mixed_strategies_find_the_same_distance(
        a: MockTree<Letter>,
        b: MockTree<Letter>,
        #[strategy(vec(0usize..6, 1..32))] picks: Vec<usize>,
        #[strategy(0u8..4)] d: u8,
        #[strategy(0u8..4)] i: u8,
        #[strategy(0u8..4)] r: u8,
    ) {
        let costs = costs(d, i, r);
        let mut rted = Rted::new(&a, &b);
        let expected = rted.distance(costs);

        let (rows, columns) = rted.sizes();
        let mut strategy = StrategyMatrix::filled(rows, columns, Strategy::Left);
        for v in 0..rows {
            for w in 0..columns {
                let pick = picks[(v * columns + w) % picks.len()];
                strategy.set(v, w, Strategy::ALL[pick]);
            }
        }

        rted.set_custom_strategy(strategy).unwrap();
        assert_eq!(rted.rescore(costs).unwrap(), expected);
    }

    #[proptest]
    fn edit_mappings_are_valid_and_minimal(
        a: MockTree<Letter>,
        b: MockTree<Letter>,
        #[strategy(0u8..4)] d: u8,
        #[strategy(0u8..4)] i: u8,
        #[strategy(0u8..4)] r: u8,
    ) {
        let costs = costs(d, i, r);
        let (edits, distance) = diff(&a, &b, costs);
        let (fa, fb) = (Flat::new(&a), Flat::new(&b));

        let mut left = vec![0; fa.labels.len()];
        let mut right = vec![0; fb.labels.len()];
        let mut cost = 0.;
        for e in edits.iter() {
            match e.pair() {
                (Some(x), Some(y)) => {
                    if fa.labels[x] != fb.labels[y] {
                        cost += costs.relabel();
                    }
                }
                (Some(_), None) => cost += costs.delete(),
                (None, Some(_)) => cost += costs.insert(),
                (None, None) => unreachable!(),
            }

            let (x, y) = e.pair();
            x.into_iter().for_each(|x| left[x] += 1);
            y.into_iter().for_each(|y| right[y] += 1);
        }

        assert!(left.iter().chain(&right).all(|&n| n == 1));
        assert_eq!(cost, distance);

        let replaced: Vec<_> = edits
            .iter()
            .filter_map(|e| match *e {
                Edit::Replace(x, y) => Some((x, y)),
                _ => None,
            })
            .collect();

        for &(x1, y1) in &replaced {
            for &(x2, y2) in &replaced {
                assert_eq!(fa.is_ancestor(x1, x2), fb.is_ancestor(y1, y2));
                assert_eq!(x1 < x2, y1 < y2);
            }
        }
    }
}
