//! 2D convolution descriptor and reference forward evaluation.

use ndarray::{Array1, Array4};

use crate::error::GraphError;
use crate::tensor::Tensor4;

/// How input borders are extended before convolution.
///
/// Only [`Zeros`](Self::Zeros) is evaluable by [`Conv2d::forward`]; the
/// other modes are carried through graph rewrites untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaddingMode {
    /// Pad with zeros.
    #[default]
    Zeros,
    /// Mirror the input across its border.
    Reflect,
    /// Repeat the border element.
    Replicate,
    /// Wrap around to the opposite border.
    Circular,
}

/// A 2D convolution layer.
///
/// Weight layout is `(out_channels, in_channels / groups, kh, kw)`. The
/// structural parameters mirror the usual framework hyperparameters; graph
/// rewrites copy them verbatim and never reinterpret them.
#[derive(Clone, Debug)]
pub struct Conv2d {
    pub weight: Array4<f32>,
    pub bias: Option<Array1<f32>>,
    pub stride: (usize, usize),
    pub padding: (usize, usize),
    pub dilation: (usize, usize),
    pub groups: usize,
    pub padding_mode: PaddingMode,
}

impl Conv2d {
    /// Creates a convolution with unit stride/dilation, no padding, one group.
    pub fn new(weight: Array4<f32>, bias: Option<Array1<f32>>) -> Self {
        Self {
            weight,
            bias,
            stride: (1, 1),
            padding: (0, 0),
            dilation: (1, 1),
            groups: 1,
            padding_mode: PaddingMode::Zeros,
        }
    }

    /// Number of output channels.
    pub fn out_channels(&self) -> usize {
        self.weight.shape()[0]
    }

    /// Input channel count expected by this layer (accounts for grouping).
    pub fn in_channels(&self) -> usize {
        self.weight.shape()[1] * self.groups
    }

    /// Kernel height and width.
    pub fn kernel_size(&self) -> (usize, usize) {
        (self.weight.shape()[2], self.weight.shape()[3])
    }

    /// Direct convolution over an NCHW input.
    ///
    /// This is a reference evaluation used to validate graph rewrites, not
    /// a performance kernel.
    pub fn forward(&self, input: &Tensor4) -> Result<Tensor4, GraphError> {
        if self.padding_mode != PaddingMode::Zeros {
            return Err(GraphError::UnsupportedPaddingMode(self.padding_mode));
        }

        let (batch, c_in, h_in, w_in) = input.dim();
        if c_in != self.in_channels() {
            return Err(GraphError::ShapeMismatch {
                layer: "conv2d".into(),
                expected: format!("{} input channels", self.in_channels()),
                found: format!("{c_in} input channels"),
            });
        }

        let c_out = self.out_channels();
        if self.groups == 0 || c_out % self.groups != 0 {
            return Err(GraphError::ShapeMismatch {
                layer: "conv2d".into(),
                expected: format!("output channels divisible by {} groups", self.groups),
                found: format!("{c_out} output channels"),
            });
        }

        let (kh, kw) = self.kernel_size();
        let (sh, sw) = self.stride;
        let (ph, pw) = self.padding;
        let (dh, dw) = self.dilation;
        let c_in_per_group = self.weight.shape()[1];
        let c_out_per_group = c_out / self.groups;

        // Spatial extent of the dilated kernel.
        let span_h = (kh - 1) * dh + 1;
        let span_w = (kw - 1) * dw + 1;
        if h_in + 2 * ph < span_h || w_in + 2 * pw < span_w {
            return Err(GraphError::ShapeMismatch {
                layer: "conv2d".into(),
                expected: format!("padded input of at least {span_h}x{span_w}"),
                found: format!("{}x{}", h_in + 2 * ph, w_in + 2 * pw),
            });
        }
        let h_out = (h_in + 2 * ph - span_h) / sh + 1;
        let w_out = (w_in + 2 * pw - span_w) / sw + 1;

        let mut output = Tensor4::zeros((batch, c_out, h_out, w_out));
        for b in 0..batch {
            for oc in 0..c_out {
                let group = oc / c_out_per_group;
                let base = match &self.bias {
                    Some(bias) => bias[oc],
                    None => 0.0,
                };
                for oy in 0..h_out {
                    for ox in 0..w_out {
                        let mut acc = base;
                        for ic in 0..c_in_per_group {
                            let channel = group * c_in_per_group + ic;
                            for ky in 0..kh {
                                let iy = (oy * sh + ky * dh) as isize - ph as isize;
                                if iy < 0 || iy >= h_in as isize {
                                    continue;
                                }
                                for kx in 0..kw {
                                    let ix = (ox * sw + kx * dw) as isize - pw as isize;
                                    if ix < 0 || ix >= w_in as isize {
                                        continue;
                                    }
                                    acc += self.weight[[oc, ic, ky, kx]]
                                        * input[[b, channel, iy as usize, ix as usize]];
                                }
                            }
                        }
                        output[[b, oc, oy, ox]] = acc;
                    }
                }
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn sum_kernel_no_padding() {
        // 2x2 all-ones kernel over a 2x2 input collapses to the element sum.
        let weight = Array4::from_elem((1, 1, 2, 2), 1.0);
        let conv = Conv2d::new(weight, None);
        let input = array![[[[1.0, 2.0], [3.0, 4.0]]]];

        let out = conv.forward(&input).unwrap();
        assert_eq!(out.dim(), (1, 1, 1, 1));
        assert_eq!(out[[0, 0, 0, 0]], 10.0);
    }

    #[test]
    fn bias_is_added_once_per_output_element() {
        let weight = Array4::from_elem((1, 1, 2, 2), 1.0);
        let conv = Conv2d::new(weight, Some(array![0.5]));
        let input = array![[[[1.0, 2.0], [3.0, 4.0]]]];

        let out = conv.forward(&input).unwrap();
        assert_eq!(out[[0, 0, 0, 0]], 10.5);
    }

    #[test]
    fn zero_padding_extends_output() {
        let weight = Array4::from_elem((1, 1, 2, 2), 1.0);
        let mut conv = Conv2d::new(weight, None);
        conv.padding = (1, 1);
        let input = array![[[[1.0, 2.0], [3.0, 4.0]]]];

        let out = conv.forward(&input).unwrap();
        assert_eq!(out.dim(), (1, 1, 3, 3));
        // Top-left window covers only input[0][0].
        assert_eq!(out[[0, 0, 0, 0]], 1.0);
        // Central window covers the whole input.
        assert_eq!(out[[0, 0, 1, 1]], 10.0);
        // Bottom-right window covers only input[1][1].
        assert_eq!(out[[0, 0, 2, 2]], 4.0);
    }

    #[test]
    fn stride_subsamples_output() {
        let weight = Array4::from_elem((1, 1, 1, 1), 1.0);
        let mut conv = Conv2d::new(weight, None);
        conv.stride = (2, 2);
        let input = array![[[
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0]
        ]]];

        let out = conv.forward(&input).unwrap();
        assert_eq!(out.dim(), (1, 1, 2, 2));
        assert_eq!(out[[0, 0, 0, 0]], 1.0);
        assert_eq!(out[[0, 0, 0, 1]], 3.0);
        assert_eq!(out[[0, 0, 1, 1]], 11.0);
    }

    #[test]
    fn grouped_convolution_splits_channels() {
        // Two groups, each a 1x1 identity on its own input channel.
        let weight = Array4::from_elem((2, 1, 1, 1), 1.0);
        let mut conv = Conv2d::new(weight, None);
        conv.groups = 2;
        assert_eq!(conv.in_channels(), 2);

        let input = array![[[[3.0]], [[7.0]]]];
        let out = conv.forward(&input).unwrap();
        assert_eq!(out[[0, 0, 0, 0]], 3.0);
        assert_eq!(out[[0, 1, 0, 0]], 7.0);
    }

    #[test]
    fn channel_mismatch_is_an_error() {
        let weight = Array4::from_elem((1, 3, 1, 1), 1.0);
        let conv = Conv2d::new(weight, None);
        let input = Tensor4::zeros((1, 2, 4, 4));

        let err = conv.forward(&input).unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    }

    #[test]
    fn non_zero_padding_mode_is_rejected() {
        let weight = Array4::from_elem((1, 1, 1, 1), 1.0);
        let mut conv = Conv2d::new(weight, None);
        conv.padding_mode = PaddingMode::Reflect;
        let input = Tensor4::zeros((1, 1, 4, 4));

        let err = conv.forward(&input).unwrap_err();
        assert!(matches!(err, GraphError::UnsupportedPaddingMode(_)));
    }
}
