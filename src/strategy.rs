use crate::{Decoration, Error};
use arrayvec::ArrayVec;
use itertools::Itertools;
use pathfinding::matrix::Matrix;
use tracing::debug;

/// A root-to-leaf path along which a pair of subtrees is decomposed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Path {
    /// The chain of leftmost children (Zhang-Shasha).
    Left,

    /// The chain of rightmost children (mirrored Zhang-Shasha).
    Right,

    /// The chain of largest children (Klein-Demaine).
    Heavy,
}

/// How a single pair of subtrees is decomposed.
///
/// The plain variants walk a path in the first tree, the reverse variants walk it in the second.
/// Variants are declared in tie-break order: when two strategies cost the same, the one declared
/// first is chosen.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Strategy {
    /// [Path::Left] in the first tree.
    Left,
    /// [Path::Right] in the first tree.
    Right,
    /// [Path::Heavy] in the first tree.
    Heavy,
    /// [Path::Left] in the second tree.
    ReverseLeft,
    /// [Path::Right] in the second tree.
    ReverseRight,
    /// [Path::Heavy] in the second tree.
    ReverseHeavy,
}

impl Strategy {
    /// Every strategy, in tie-break order.
    pub const ALL: [Strategy; 6] = [
        Strategy::Left,
        Strategy::Right,
        Strategy::Heavy,
        Strategy::ReverseLeft,
        Strategy::ReverseRight,
        Strategy::ReverseHeavy,
    ];

    /// Walks `path` in the first tree, or in the second if `reversed`.
    pub fn new(path: Path, reversed: bool) -> Self {
        match (path, reversed) {
            (Path::Left, false) => Strategy::Left,
            (Path::Right, false) => Strategy::Right,
            (Path::Heavy, false) => Strategy::Heavy,
            (Path::Left, true) => Strategy::ReverseLeft,
            (Path::Right, true) => Strategy::ReverseRight,
            (Path::Heavy, true) => Strategy::ReverseHeavy,
        }
    }

    /// The path this strategy walks.
    pub fn path(self) -> Path {
        match self {
            Strategy::Left | Strategy::ReverseLeft => Path::Left,
            Strategy::Right | Strategy::ReverseRight => Path::Right,
            Strategy::Heavy | Strategy::ReverseHeavy => Path::Heavy,
        }
    }

    /// Whether the path is walked in the second tree.
    pub fn is_reversed(self) -> bool {
        matches!(
            self,
            Strategy::ReverseLeft | Strategy::ReverseRight | Strategy::ReverseHeavy
        )
    }

    /// The classical numeric code of this strategy.
    pub fn code(self) -> u8 {
        match self {
            Strategy::Left => 0,
            Strategy::Right => 1,
            Strategy::Heavy => 2,
            Strategy::ReverseLeft => 4,
            Strategy::ReverseRight => 5,
            Strategy::ReverseHeavy => 6,
        }
    }
}

impl TryFrom<u8> for Strategy {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Strategy::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(Error::InvalidStrategy { code })
    }
}

/// One [Strategy] per pair of nodes, indexed by their postorder numbers in the first and the
/// second tree respectively.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StrategyMatrix(Matrix<Strategy>);

impl StrategyMatrix {
    /// A matrix that uses the same `strategy` everywhere.
    pub fn filled(rows: usize, columns: usize, strategy: Strategy) -> Self {
        StrategyMatrix(Matrix::new(rows, columns, strategy))
    }

    /// Parses row-major classical codes.
    pub fn from_codes(rows: usize, columns: usize, codes: &[u8]) -> Result<Self, Error> {
        if codes.len() != rows * columns {
            return Err(Error::StrategyShape {
                expected_rows: rows,
                expected_columns: columns,
                rows: codes.len() / columns.max(1),
                columns,
            });
        }

        let mut matrix = StrategyMatrix::filled(rows, columns, Strategy::Left);
        for (i, &code) in codes.iter().enumerate() {
            matrix.0[(i / columns, i % columns)] = code.try_into()?;
        }

        Ok(matrix)
    }

    /// The number of nodes of the first tree.
    #[inline]
    pub fn rows(&self) -> usize {
        self.0.rows
    }

    /// The number of nodes of the second tree.
    #[inline]
    pub fn columns(&self) -> usize {
        self.0.columns
    }

    /// The strategy for node `v` of the first tree and node `w` of the second.
    #[inline]
    pub fn get(&self, v: usize, w: usize) -> Strategy {
        self.0[(v, w)]
    }

    /// Overrides the strategy for node `v` of the first tree and node `w` of the second.
    #[inline]
    pub fn set(&mut self, v: usize, w: usize, strategy: Strategy) {
        self.0[(v, w)] = strategy;
    }

    /// Uses `path` for every pair; if `switch_by_size`, the path is walked in whichever subtree
    /// of the pair is larger.
    pub(crate) fn uniform(f: &Decoration, g: &Decoration, path: Path, switch_by_size: bool) -> Self {
        let mut matrix = StrategyMatrix::filled(f.len(), g.len(), Strategy::new(path, false));
        if switch_by_size {
            for v in 0..f.len() {
                for w in 0..g.len() {
                    let reversed = f.size(v) < g.size(w);
                    matrix.set(v, w, Strategy::new(path, reversed));
                }
            }
        }

        matrix
    }

    /// Picks, for every pair of subtrees, the strategy that minimizes the number of relevant
    /// subproblems of the whole decomposition below it.
    pub(crate) fn optimal(f: &Decoration, g: &Decoration) -> Self {
        const PATHS: [Path; 3] = [Path::Left, Path::Right, Path::Heavy];

        let (m, n) = (f.len(), g.len());
        let mut matrix = StrategyMatrix::filled(m, n, Strategy::Left);

        // cost of the subproblems hanging off the path, accumulated bottom-up from the children
        let mut below_v: [Matrix<u64>; 3] = std::array::from_fn(|_| Matrix::new(m, n, 0));
        let mut below_w: [Vec<u64>; 3] = std::array::from_fn(|_| vec![0; n]);

        for v in 0..m {
            below_w.iter_mut().for_each(|c| c.fill(0));

            for w in 0..n {
                let (size_v, size_w) = (f.size(v) as u64, g.size(w) as u64);

                let mut candidates = ArrayVec::<u64, 6>::new();
                candidates.push(size_v * g.key_root_sum(w) + below_v[0][(v, w)]);
                candidates.push(size_v * g.rev_key_root_sum(w) + below_v[1][(v, w)]);
                candidates.push(size_v * g.descendant_sum(w) + below_v[2][(v, w)]);
                candidates.push(size_w * f.key_root_sum(v) + below_w[0][w]);
                candidates.push(size_w * f.rev_key_root_sum(v) + below_w[1][w]);
                candidates.push(size_w * f.descendant_sum(v) + below_w[2][w]);

                // the first minimum wins ties
                let best = candidates.iter().position_min().unwrap_or(0);
                let min = candidates[best];
                matrix.set(v, w, Strategy::ALL[best]);

                if let Some(p) = f.parent(v) {
                    for (i, &path) in PATHS.iter().enumerate() {
                        let inherited = if f.on_path(path, v) { below_v[i][(v, w)] } else { min };
                        below_v[i][(p, w)] += inherited;
                    }
                }

                if let Some(p) = g.parent(w) {
                    for (i, &path) in PATHS.iter().enumerate() {
                        let inherited = if g.on_path(path, w) { below_w[i][w] } else { min };
                        below_w[i][p] += inherited;
                    }
                }
            }
        }

        debug!(rows = m, columns = n, "computed optimal strategy");

        matrix
    }
}
