use derive_more::{Display, Error};

/// Everything that can go wrong when configuring or querying an [Rted][crate::Rted] engine.
#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum Error {
    /// A distance was requested without a strategy to drive it.
    #[display(fmt = "no strategy has been computed or set")]
    NoStrategy,

    /// An edit mapping was requested before any distance was computed.
    #[display(fmt = "no distance has been computed yet")]
    NoDistance,

    /// A custom strategy matrix does not match the sizes of the trees.
    #[display(
        fmt = "expected a {}x{} strategy matrix, found {}x{}",
        expected_rows,
        expected_columns,
        rows,
        columns
    )]
    StrategyShape {
        expected_rows: usize,
        expected_columns: usize,
        rows: usize,
        columns: usize,
    },

    /// A strategy code outside of the six valid values.
    #[display(fmt = "invalid strategy code {}", code)]
    InvalidStrategy { code: u8 },

    /// An operation cost that is negative or not finite.
    #[display(fmt = "invalid {} cost {}", operation, value)]
    InvalidCost { operation: &'static str, value: f64 },

    /// Malformed bracket notation.
    #[display(fmt = "syntax error at offset {}: {}", offset, reason)]
    Syntax { offset: usize, reason: &'static str },
}
