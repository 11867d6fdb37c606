//! Batch-normalization descriptor (inference statistics) and forward evaluation.

use ndarray::{Array1, Axis};

use crate::error::GraphError;
use crate::tensor::Tensor4;

/// A 2D batch-normalization layer in inference mode.
///
/// Carries frozen running statistics plus the learned affine transform.
/// Each vector has one entry per channel.
#[derive(Clone, Debug)]
pub struct BatchNorm2d {
    pub running_mean: Array1<f32>,
    pub running_var: Array1<f32>,
    pub weight: Array1<f32>,
    pub bias: Array1<f32>,
    pub eps: f32,
}

impl BatchNorm2d {
    /// Identity-initialized statistics for `num_features` channels.
    pub fn new(num_features: usize) -> Self {
        Self {
            running_mean: Array1::zeros(num_features),
            running_var: Array1::ones(num_features),
            weight: Array1::ones(num_features),
            bias: Array1::zeros(num_features),
            eps: 1e-5,
        }
    }

    /// Number of channels this layer normalizes.
    pub fn num_features(&self) -> usize {
        self.running_mean.len()
    }

    /// Per-channel `(x - mean) / sqrt(var + eps) * weight + bias`.
    pub fn forward(&self, input: &Tensor4) -> Result<Tensor4, GraphError> {
        let channels = input.dim().1;
        if channels != self.num_features() {
            return Err(GraphError::ShapeMismatch {
                layer: "batch_norm2d".into(),
                expected: format!("{} channels", self.num_features()),
                found: format!("{channels} channels"),
            });
        }

        let mut output = input.clone();
        for (ch, mut plane) in output.axis_iter_mut(Axis(1)).enumerate() {
            let scale = self.weight[ch] / (self.running_var[ch] + self.eps).sqrt();
            let shift = self.bias[ch] - self.running_mean[ch] * scale;
            plane.mapv_inplace(|x| x * scale + shift);
        }
        Ok(output)
    }
}
