//! Per-node structural arrays, indexed by postorder, that drive every path decomposition.

use crate::{Fold, Labels, Path, Tree};
use tracing::debug;

/// One of the two Zhang-Shasha directions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum Direction {
    Left,
    Right,
}

/// How a heavy path sweeps across a node: from the left, from the right, or both ways when the
/// heavy child has siblings on either side.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum Sweep {
    Left,
    Right,
    Both,
}

#[derive(Debug, Copy, Clone)]
struct Summary {
    postorder: usize,
    size: usize,
    descendants: u64,
    key_roots: u64,
    rev_key_roots: u64,
}

/// A tree flattened into the arrays the strategy and distance computations read.
///
/// "Reversed postorder" of a node is `len - 1 - preorder`, the postorder of the mirrored tree.
#[derive(Debug, Clone)]
pub(crate) struct Decoration {
    sizes: Box<[usize]>,
    key_root_sums: Box<[u64]>,
    rev_key_root_sums: Box<[u64]>,
    descendant_sums: Box<[u64]>,
    preorder: Box<[usize]>,
    parents: Box<[Option<usize>]>,
    labels: Box<[usize]>,
    leftmost_leaves: Box<[usize]>,
    key_roots: Box<[usize]>,
    min_key_roots: Box<[Option<usize>]>,
    rightmost_leaves: Box<[usize]>,
    rev_key_roots: Box<[usize]>,
    min_rev_key_roots: Box<[Option<usize>]>,
    rev_to_post: Box<[usize]>,
    pre_to_post: Box<[usize]>,
    sweeps: Box<[Sweep]>,
    on_path: [Box<[bool]>; 3],
    path_children: [Box<[Option<usize>]>; 3],
    relevant: [Box<[Box<[usize]>]>; 3],
}

#[inline]
fn slot(path: Path) -> usize {
    match path {
        Path::Left => 0,
        Path::Right => 1,
        Path::Heavy => 2,
    }
}

impl Decoration {
    /// Flattens `tree`, interning its labels into `labels`.
    pub(crate) fn new<'t, T: Tree>(tree: &'t T, labels: &mut Labels<T::Label<'t>>) -> Self {
        let mut builder = Builder::new(tree.count(), labels);
        builder.gather(tree);
        let decoration = builder.finish();

        debug!(
            nodes = decoration.len(),
            leaves = decoration.key_roots.len(),
            "decorated tree"
        );

        decoration
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub(crate) fn root(&self) -> usize {
        self.len() - 1
    }

    #[inline]
    pub(crate) fn size(&self, v: usize) -> usize {
        self.sizes[v]
    }

    /// Sum of the sizes of the left key-root subtrees of `v`, i.e. the cost of a left path.
    #[inline]
    pub(crate) fn key_root_sum(&self, v: usize) -> u64 {
        self.key_root_sums[v]
    }

    #[inline]
    pub(crate) fn rev_key_root_sum(&self, v: usize) -> u64 {
        self.rev_key_root_sums[v]
    }

    /// Number of subforests in the full decomposition of `v`.
    #[inline]
    pub(crate) fn descendant_sum(&self, v: usize) -> u64 {
        self.descendant_sums[v]
    }

    #[inline]
    pub(crate) fn preorder(&self, v: usize) -> usize {
        self.preorder[v]
    }

    #[inline]
    pub(crate) fn parent(&self, v: usize) -> Option<usize> {
        self.parents[v]
    }

    #[inline]
    pub(crate) fn label(&self, v: usize) -> usize {
        self.labels[v]
    }

    #[inline]
    pub(crate) fn leftmost_leaf(&self, v: usize) -> usize {
        self.leftmost_leaves[v]
    }

    /// Left key roots in increasing postorder.
    #[inline]
    pub(crate) fn key_roots(&self) -> &[usize] {
        &self.key_roots
    }

    /// Index into [key_roots][Self::key_roots] of the first key root within the subtree of `v`.
    #[inline]
    pub(crate) fn min_key_root(&self, v: usize) -> Option<usize> {
        self.min_key_roots[v]
    }

    /// Right key roots in increasing reversed postorder.
    #[inline]
    pub(crate) fn rev_key_roots(&self) -> &[usize] {
        &self.rev_key_roots
    }

    /// Takes and returns a reversed postorder.
    #[inline]
    pub(crate) fn min_rev_key_root(&self, r: usize) -> Option<usize> {
        self.min_rev_key_roots[r]
    }

    /// Takes and returns a reversed postorder.
    #[inline]
    pub(crate) fn rightmost_leaf(&self, r: usize) -> usize {
        self.rightmost_leaves[r]
    }

    #[inline]
    pub(crate) fn reversed(&self, v: usize) -> usize {
        self.len() - 1 - self.preorder[v]
    }

    #[inline]
    pub(crate) fn rev_to_post(&self, r: usize) -> usize {
        self.rev_to_post[r]
    }

    #[inline]
    pub(crate) fn pre_to_post(&self, p: usize) -> usize {
        self.pre_to_post[p]
    }

    #[inline]
    pub(crate) fn sweep(&self, v: usize) -> Sweep {
        self.sweeps[v]
    }

    /// Whether `v` continues its parent's path in the given direction.
    #[inline]
    pub(crate) fn on_path(&self, path: Path, v: usize) -> bool {
        self.on_path[slot(path)][v]
    }

    /// The next node along `path` below `v`, if `v` is not a leaf.
    #[inline]
    pub(crate) fn path_child(&self, path: Path, v: usize) -> Option<usize> {
        self.path_children[slot(path)][v]
    }

    /// The children of `v` that hang off `path`.
    #[inline]
    pub(crate) fn relevant(&self, path: Path, v: usize) -> &[usize] {
        &self.relevant[slot(path)][v]
    }

    /// The leaf that starts the forest of `x` in the given direction, `x` being a postorder for
    /// [Direction::Left] and a reversed postorder for [Direction::Right].
    #[inline]
    pub(crate) fn first_leaf(&self, direction: Direction, x: usize) -> usize {
        match direction {
            Direction::Left => self.leftmost_leaf(x),
            Direction::Right => self.rightmost_leaf(x),
        }
    }

    /// The postorder of `x`, `x` being indexed as in [first_leaf][Self::first_leaf].
    #[inline]
    pub(crate) fn node(&self, direction: Direction, x: usize) -> usize {
        match direction {
            Direction::Left => x,
            Direction::Right => self.rev_to_post(x),
        }
    }
}

struct Builder<'l, L> {
    labels: &'l mut Labels<L>,
    preorder_counter: usize,
    postorder_counter: usize,
    sizes: Vec<usize>,
    key_root_sums: Vec<u64>,
    rev_key_root_sums: Vec<u64>,
    descendant_sums: Vec<u64>,
    preorder: Vec<usize>,
    parents: Vec<Option<usize>>,
    label_ids: Vec<usize>,
    rev_to_post: Vec<usize>,
    pre_to_post: Vec<usize>,
    sweeps: Vec<Sweep>,
    on_path: [Vec<bool>; 3],
    path_children: [Vec<Option<usize>>; 3],
    relevant: [Vec<Box<[usize]>>; 3],
}

impl<'l, L: Eq + std::hash::Hash> Builder<'l, L> {
    fn new(n: usize, labels: &'l mut Labels<L>) -> Self {
        Builder {
            labels,
            preorder_counter: 0,
            postorder_counter: 0,
            sizes: vec![0; n],
            key_root_sums: vec![0; n],
            rev_key_root_sums: vec![0; n],
            descendant_sums: vec![0; n],
            preorder: vec![0; n],
            parents: vec![None; n],
            label_ids: vec![0; n],
            rev_to_post: vec![0; n],
            pre_to_post: vec![0; n],
            sweeps: vec![Sweep::Right; n],
            on_path: [vec![false; n], vec![false; n], vec![false; n]],
            path_children: [vec![None; n], vec![None; n], vec![None; n]],
            relevant: [
                vec![Box::default(); n],
                vec![Box::default(); n],
                vec![Box::default(); n],
            ],
        }
    }

    fn gather<'t, T>(&mut self, node: &'t T) -> Summary
    where
        T: Tree<Label<'t> = L>,
    {
        let n = self.sizes.len();
        let preorder = self.preorder_counter;
        self.preorder_counter += 1;

        let mut size = 1;
        let mut descendants = 0;
        let mut key_roots = 0;
        let mut rev_key_roots = 0;

        let mut left = None;
        let mut right = None;
        let mut heavy: Option<usize> = None;
        let mut heaviest = 0;
        let mut relevant: [Vec<usize>; 3] = Default::default();
        let mut children = Vec::new();

        let mut iter = node.children().into_iter().peekable();
        while let Some(child) = iter.next() {
            let c = self.gather(child);
            children.push(c.postorder);

            // ties go to the rightmost child
            if c.size >= heaviest {
                heaviest = c.size;
                if let Some(previous) = heavy.replace(c.postorder) {
                    relevant[slot(Path::Heavy)].push(previous);
                }
            } else {
                relevant[slot(Path::Heavy)].push(c.postorder);
            }

            if left.is_none() {
                left = Some(c.postorder);
                self.on_path[slot(Path::Left)][c.postorder] = true;
                key_roots += c.key_roots;
            } else {
                relevant[slot(Path::Left)].push(c.postorder);
                key_roots += c.key_roots + c.size as u64;
            }

            if iter.peek().is_none() {
                right = Some(c.postorder);
                self.on_path[slot(Path::Right)][c.postorder] = true;
                rev_key_roots += c.rev_key_roots;
            } else {
                relevant[slot(Path::Right)].push(c.postorder);
                rev_key_roots += c.rev_key_roots + c.size as u64;
            }

            size += c.size;
            descendants += c.descendants;
        }

        let v = self.postorder_counter;
        self.postorder_counter += 1;

        let descendants = descendants + size as u64;
        let s = size as u64;
        self.descendant_sums[v] = s * (s + 3) / 2 - descendants;
        self.key_root_sums[v] = key_roots + s;
        self.rev_key_root_sums[v] = rev_key_roots + s;

        self.label_ids[v] = self.labels.intern(node.label());
        for c in children {
            self.parents[c] = Some(v);
        }

        self.sizes[v] = size;
        self.preorder[v] = preorder;
        self.pre_to_post[preorder] = v;
        self.rev_to_post[n - 1 - preorder] = v;

        if let Some(h) = heavy {
            self.path_children[slot(Path::Heavy)][v] = Some(h);
            self.on_path[slot(Path::Heavy)][h] = true;
            self.sweeps[v] = match (left, right) {
                (Some(l), Some(r)) if l < h && h < r => Sweep::Both,
                (Some(l), _) if l == h => Sweep::Right,
                _ => Sweep::Left,
            };
        }

        self.path_children[slot(Path::Left)][v] = left;
        self.path_children[slot(Path::Right)][v] = right;

        for (i, nodes) in relevant.into_iter().enumerate() {
            self.relevant[i][v] = nodes.into();
        }

        Summary {
            postorder: v,
            size,
            descendants,
            key_roots,
            rev_key_roots,
        }
    }

    fn finish(self) -> Decoration {
        let n = self.sizes.len();
        let left_children = &self.path_children[slot(Path::Left)];
        let right_children = &self.path_children[slot(Path::Right)];

        let mut leftmost_leaves = vec![0; n];
        let mut rightmost_leaves = vec![0; n];
        for v in 0..n {
            leftmost_leaves[v] = left_children[v].map_or(v, |c| leftmost_leaves[c]);
            let r = n - 1 - self.preorder[v];
            rightmost_leaves[r] =
                right_children[v].map_or(r, |c| rightmost_leaves[n - 1 - self.preorder[c]]);
        }

        let leaves = self.sizes.iter().filter(|&&s| s == 1).count();
        let mut key_roots = vec![0; leaves];
        let mut rev_key_roots = vec![0; leaves];
        let mut visited = vec![false; n];
        let mut visited_rev = vec![false; n];
        let (mut k, mut k_rev) = (leaves, leaves);
        for x in (0..n).rev() {
            if !visited[leftmost_leaves[x]] {
                visited[leftmost_leaves[x]] = true;
                k -= 1;
                key_roots[k] = x;
            }
            if !visited_rev[rightmost_leaves[x]] {
                visited_rev[rightmost_leaves[x]] = true;
                k_rev -= 1;
                rev_key_roots[k_rev] = x;
            }
        }

        let mut min_key_roots = vec![None; n];
        let mut min_rev_key_roots = vec![None; n];
        for i in 0..leaves {
            let mut next = Some(key_roots[i]);
            while let Some(v) = next.filter(|&v| min_key_roots[v].is_none()) {
                min_key_roots[v] = Some(i);
                next = self.parents[v];
            }

            let mut next = Some(rev_key_roots[i]);
            while let Some(r) = next.filter(|&r| min_rev_key_roots[r].is_none()) {
                min_rev_key_roots[r] = Some(i);
                next = self.parents[self.rev_to_post[r]].map(|p| n - 1 - self.preorder[p]);
            }
        }

        let [l, r, h] = self.on_path;
        let [pl, pr, ph] = self.path_children;
        let [rl, rr, rh] = self.relevant;

        Decoration {
            sizes: self.sizes.into(),
            key_root_sums: self.key_root_sums.into(),
            rev_key_root_sums: self.rev_key_root_sums.into(),
            descendant_sums: self.descendant_sums.into(),
            preorder: self.preorder.into(),
            parents: self.parents.into(),
            labels: self.label_ids.into(),
            leftmost_leaves: leftmost_leaves.into(),
            key_roots: key_roots.into(),
            min_key_roots: min_key_roots.into(),
            rightmost_leaves: rightmost_leaves.into(),
            rev_key_roots: rev_key_roots.into(),
            min_rev_key_roots: min_rev_key_roots.into(),
            rev_to_post: self.rev_to_post.into(),
            pre_to_post: self.pre_to_post.into(),
            sweeps: self.sweeps.into(),
            on_path: [l.into(), r.into(), h.into()],
            path_children: [pl.into(), pr.into(), ph.into()],
            relevant: [rl.into(), rr.into(), rh.into()],
        }
    }
}
