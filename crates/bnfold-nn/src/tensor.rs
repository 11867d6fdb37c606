//! NCHW activation tensors and small numeric helpers.

use ndarray::Array4;

/// A dense f32 activation tensor in NCHW layout (batch, channel, height, width).
pub type Tensor4 = Array4<f32>;

/// Maximum absolute elementwise difference between two tensors of equal shape.
pub fn max_abs_diff(a: &Tensor4, b: &Tensor4) -> f32 {
    debug_assert_eq!(a.shape(), b.shape());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}
