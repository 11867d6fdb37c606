//! Batch-norm folding pass.
//!
//! Folds each batch-norm layer into the convolution immediately preceding it
//! at the same nesting level, then replaces the batch norm with an identity
//! pass-through so sibling layout is undisturbed.
//!
//! For each output channel `c`, with `std = sqrt(var + eps)` and
//! `scale = gamma / std`, the folded convolution has weight `w * scale`
//! (broadcast over the in-channel and kernel dimensions) and bias
//! `(b - mean) * scale + beta`, where `b` is zero when the convolution had
//! no bias.

use ndarray::{Array1, Axis};

use bnfold_nn::{BatchNorm2d, Container, Conv2d, Layer, LayerKind};

use crate::{FuseError, Pass};

/// Folds sibling-adjacent (convolution, batch norm) pairs in place.
#[derive(Debug)]
pub struct BatchNormFusion;

impl Pass for BatchNormFusion {
    fn name(&self) -> &str {
        "batchnorm-fold"
    }

    fn run(&self, root: &mut Container) -> Result<bool, FuseError> {
        fuse_graph(root)
    }
}

/// Folds a batch norm into the convolution that feeds it.
///
/// Pure: allocates a new descriptor and leaves both inputs untouched. The
/// result always carries a bias, and the convolution's structural
/// parameters are copied verbatim.
pub fn fuse_conv_bn(conv: &Conv2d, bn: &BatchNorm2d) -> Result<Conv2d, FuseError> {
    let channels = conv.out_channels();
    if bn.num_features() != channels {
        return Err(FuseError::ChannelMismatch {
            conv_channels: channels,
            norm_channels: bn.num_features(),
        });
    }
    for (channel, &var) in bn.running_var.iter().enumerate() {
        let value = var + bn.eps;
        if value <= 0.0 {
            return Err(FuseError::NonPositiveVariance { channel, value });
        }
    }

    let mut fused = conv.clone();
    let mut bias = match &conv.bias {
        Some(bias) => bias.clone(),
        None => Array1::zeros(channels),
    };

    for c in 0..channels {
        let std = (bn.running_var[c] + bn.eps).sqrt();
        let scale = bn.weight[c] / std;
        fused
            .weight
            .index_axis_mut(Axis(0), c)
            .mapv_inplace(|w| w * scale);
        bias[c] = (bias[c] - bn.running_mean[c]) * scale + bn.bias[c];
    }
    fused.bias = Some(bias);
    Ok(fused)
}

/// Rewrites `root` in place, folding sibling-adjacent (convolution,
/// batch norm) pairs at every nesting level. Returns `true` if anything
/// was folded.
///
/// Only immediate siblings pair up: a convolution in one container is never
/// matched with a batch norm in another. Any fold error aborts the whole
/// traversal.
pub fn fuse_graph(root: &mut Container) -> Result<bool, FuseError> {
    let names = root.child_names();

    let mut changed = false;
    // Name of the last convolution seen at this level that is still
    // unpaired. Cleared by any child that is not a batch norm.
    let mut pending: Option<String> = None;

    for name in names {
        let Some(kind) = root.child(&name).map(Layer::kind) else {
            continue;
        };

        match kind {
            LayerKind::BatchNorm2d => {
                // A batch norm with no pending convolution is left alone.
                if let Some(conv_name) = pending.take() {
                    if let (Some(Layer::Conv2d(conv)), Some(Layer::BatchNorm2d(bn))) =
                        (root.child(&conv_name), root.child(&name))
                    {
                        let fused = fuse_conv_bn(conv, bn).map_err(|err| {
                            log::warn!("cannot fold '{name}' into '{conv_name}': {err}");
                            err
                        })?;
                        root.replace(&conv_name, Layer::Conv2d(fused))?;
                        root.replace(&name, Layer::Identity)?;
                        log::debug!("folded batch norm '{name}' into conv '{conv_name}'");
                        changed = true;
                    }
                }
            }
            LayerKind::Conv2d => {
                // A second convolution displaces the previous candidate,
                // which stays in the graph unfolded.
                pending = Some(name);
            }
            LayerKind::Container => {
                pending = None;
                if let Some(Layer::Container(child)) = root.child_mut(&name) {
                    changed |= fuse_graph(child)?;
                }
            }
            LayerKind::Relu | LayerKind::Identity => {
                pending = None;
            }
        }
    }

    Ok(changed)
}
