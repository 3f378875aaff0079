use crate::Tree;

/// Preorder folding over every node of a [Tree].
pub(crate) trait Fold {
    fn fold<R, Fn: FnMut(R, &Self) -> R>(&self, init: R, f: &mut Fn) -> R;

    #[inline]
    fn count(&self) -> usize {
        self.fold(0, &mut |n, _| n + 1)
    }
}

impl<T: Tree> Fold for T {
    fn fold<R, Fn: FnMut(R, &Self) -> R>(&self, init: R, f: &mut Fn) -> R {
        let init = f(init, self);
        self.children()
            .into_iter()
            .fold(init, |r, c| Fold::fold(c, r, f))
    }
}
