//! The closed set of layer kinds a graph can hold.

use crate::conv::Conv2d;
use crate::error::GraphError;
use crate::graph::Container;
use crate::norm::BatchNorm2d;
use crate::tensor::Tensor4;

/// Discriminant for [`Layer`], letting graph rewrites dispatch on the kind
/// without borrowing the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Conv2d,
    BatchNorm2d,
    Relu,
    Identity,
    Container,
}

/// A single layer in a model graph.
#[derive(Clone, Debug)]
pub enum Layer {
    /// Learned 2D convolution.
    Conv2d(Conv2d),
    /// Batch normalization over channel planes.
    BatchNorm2d(BatchNorm2d),
    /// Elementwise `max(x, 0)`.
    Relu,
    /// Pass-through placeholder left behind by graph rewrites.
    Identity,
    /// An ordered, named group of sub-layers applied sequentially.
    Container(Container),
}

impl Layer {
    /// The kind discriminant of this layer.
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Conv2d(_) => LayerKind::Conv2d,
            Self::BatchNorm2d(_) => LayerKind::BatchNorm2d,
            Self::Relu => LayerKind::Relu,
            Self::Identity => LayerKind::Identity,
            Self::Container(_) => LayerKind::Container,
        }
    }

    /// Evaluates the layer on an NCHW input.
    pub fn forward(&self, input: &Tensor4) -> Result<Tensor4, GraphError> {
        match self {
            Self::Conv2d(conv) => conv.forward(input),
            Self::BatchNorm2d(bn) => bn.forward(input),
            Self::Relu => Ok(input.mapv(|x| x.max(0.0))),
            Self::Identity => Ok(input.clone()),
            Self::Container(container) => container.forward(input),
        }
    }
}
