//! # Overview
//!
//! This crate provides an implementation of RTED, the robust algorithm for the
//! [tree edit distance][ted] between ordered labeled trees. The distance is the cheapest sequence
//! of node deletions, insertions and relabelings that transforms one tree into the other,
//! according to user-defined [Costs].
//!
//! Every subproblem pair of subtrees is decomposed along a left, right or heavy path of either
//! tree, as chosen by a [StrategyMatrix]. The optimal strategy minimizes the number of relevant
//! subproblems, which keeps the running time within `O(n³)` for any pair of tree shapes.
//!
//! [ted]:  https://en.wikipedia.org/wiki/Tree_edit_distance
//!
//! # Example
//!
//! ```rust
//! use rted::*;
//! use std::mem::{discriminant, Discriminant};
//! use std::iter::empty;
//!
//! enum Json {
//!     Null,
//!     Bool(bool),
//!     Number(f64),
//!     String(String),
//!     Array(Vec<Json>),
//!     Map(Vec<(String, Json)>),
//! }
//!
//! impl Node for Json {
//!     type Label<'l> = Discriminant<Json>
//!     where
//!         Self: 'l;
//!
//!     fn label(&self) -> Self::Label<'_> {
//!         discriminant(self)
//!     }
//! }
//!
//! impl Tree for Json {
//!     type Children<'c> = Box<dyn Iterator<Item = &'c Self> + 'c>
//!     where
//!         Self: 'c;
//!
//!     fn children(&self) -> Self::Children<'_> {
//!         match self {
//!             Json::Array(a) => Box::new(a.iter()),
//!             Json::Map(m) => Box::new(m.iter().map(|(_, v)| v)),
//!             _ => Box::new(empty()),
//!         }
//!     }
//! }
//! #
//! # impl From<serde_json::Value> for Json {
//! #     fn from(obj: serde_json::Value) -> Self {
//! #         use serde_json::Value::*;
//! #         match obj {
//! #             Null => Json::Null,
//! #             Bool(b) => Json::Bool(b),
//! #             Number(n) => Json::Number(n.as_i64().unwrap() as f64),
//! #             String(s) => Json::String(s),
//! #             Array(a) => Json::Array(a.into_iter().map(Into::into).collect()),
//! #             Object(m) => Json::Map(
//! #                 m.into_iter()
//! #                     .map(|(k, v)| (k, v.into()))
//! #                     .collect(),
//! #             ),
//! #         }
//! #     }
//! # }
//!
//! macro_rules! json {
//!     ($( $tokens:tt )*) => {
//!         // ...
//! #         Json::from(::serde_json::json!({$($tokens)*}))
//!     };
//! }
//!
//! let john = json! {
//!     "name": "John Doe",
//!     "age": 43,
//!     "phones": [
//!         "+44 1234567",
//!         "+44 2345678"
//!     ]
//! };
//!
//! let jane = json! {
//!     "name": "Jane Doe",
//!     "maiden name": "Smith",
//!     "age": 40,
//!     "phones": [
//!         "+44 7654321",
//!     ]
//! };
//!
//! let (edits, cost) = diff(&john, &jane, Costs::default());
//!
//! assert_eq!(cost, 2.);
//!
//! // "maiden name" is inserted, one of John's phones is removed
//! let changes = edits.iter().filter(|e| !matches!(e, Edit::Replace(..)));
//! assert_eq!(changes.count(), 2);
//! ```

mod bracket;
mod cost;
mod edit;
mod error;
mod metrics;
mod rted;
mod strategy;
mod tree;

pub use crate::rted::*;
pub use bracket::*;
pub use cost::*;
pub use edit::*;
pub use error::*;
pub use metrics::*;
pub use strategy::*;
pub use tree::*;

mod decoration;
mod distance;
mod fold;
mod heavy;
mod label;
mod mapping;
mod memo;

pub(crate) use decoration::*;
pub(crate) use distance::*;
pub(crate) use fold::*;
pub(crate) use label::*;
pub(crate) use mapping::*;
pub(crate) use memo::*;
