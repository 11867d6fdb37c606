//! Layer-graph data model for convolution/batch-norm folding.
//!
//! An in-memory, tree-shaped representation of a sequential network:
//! ordered, uniquely named containers whose leaves are convolution,
//! batch-norm, activation, or identity layers, plus a reference forward
//! evaluation used to validate graph rewrites numerically.

mod conv;
mod display;
mod error;
mod graph;
mod layer;
mod norm;
pub mod tensor;

pub use conv::{Conv2d, PaddingMode};
pub use display::dump_graph;
pub use error::GraphError;
pub use graph::Container;
pub use layer::{Layer, LayerKind};
pub use norm::BatchNorm2d;
pub use tensor::{max_abs_diff, Tensor4};
