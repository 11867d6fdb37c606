//! Error types for the bnfold layer graph.

use crate::conv::PaddingMode;

/// Errors from constructing or evaluating a layer graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A sibling with the same name already exists in the container.
    #[error("container already has a child named '{0}'")]
    DuplicateChild(String),

    /// No child with the given name exists in the container.
    #[error("container has no child named '{0}'")]
    NoSuchChild(String),

    /// An input tensor is incompatible with a layer's parameters.
    #[error("{layer}: expected {expected}, found {found}")]
    ShapeMismatch {
        layer: String,
        expected: String,
        found: String,
    },

    /// Forward evaluation does not implement the requested padding mode.
    #[error("padding mode {0:?} is not supported by forward evaluation")]
    UnsupportedPaddingMode(PaddingMode),
}
