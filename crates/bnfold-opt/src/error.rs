//! Error types for graph rewrites.

/// Errors raised while folding batch norms into convolutions.
///
/// Any error aborts the traversal that raised it. The graph may already
/// hold earlier folded pairs; callers that need the original graph back
/// should rewrite a clone.
#[derive(Debug, thiserror::Error)]
pub enum FuseError {
    /// Batch-norm channel count does not match the convolution's output
    /// channels.
    #[error(
        "channel mismatch: conv has {conv_channels} output channels, \
         batch norm normalizes {norm_channels}"
    )]
    ChannelMismatch {
        conv_channels: usize,
        norm_channels: usize,
    },

    /// `running_var + eps` is not positive for some channel, so no valid
    /// folded convolution exists.
    #[error("non-positive variance in channel {channel}: var + eps = {value}")]
    NonPositiveVariance { channel: usize, value: f32 },

    /// An underlying graph operation failed.
    #[error(transparent)]
    Graph(#[from] bnfold_nn::GraphError),
}
