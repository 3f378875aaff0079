use crate::Path;
use derive_more::Add;

/// A sink for the work done by a distance computation.
pub trait Metrics {
    /// Called with the number of relevant subproblems a single-path function evaluated.
    fn subproblems(&mut self, _count: u64) {}

    /// Called once per single-path function invocation.
    fn path(&mut self, _path: Path) {}
}

impl Metrics for () {}

impl<M: Metrics + ?Sized> Metrics for &mut M {
    fn subproblems(&mut self, count: u64) {
        (**self).subproblems(count)
    }

    fn path(&mut self, path: Path) {
        (**self).path(path)
    }
}

/// Tallies relevant subproblems and single-path function usage.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Add)]
pub struct Counters {
    /// Relevant subproblems evaluated.
    pub subproblems: u64,
    /// Invocations of the left single-path function.
    pub left: u64,
    /// Invocations of the right single-path function.
    pub right: u64,
    /// Invocations of the heavy single-path function.
    pub heavy: u64,
}

impl Counters {
    /// Total number of single-path function invocations.
    pub fn paths(&self) -> u64 {
        self.left + self.right + self.heavy
    }
}

impl Metrics for Counters {
    fn subproblems(&mut self, count: u64) {
        self.subproblems += count;
    }

    fn path(&mut self, path: Path) {
        match path {
            Path::Left => self.left += 1,
            Path::Right => self.right += 1,
            Path::Heavy => self.heavy += 1,
        }
    }
}
