//! Numerical-equivalence check for the folding rewrite.
//!
//! Runs a graph before and after batch-norm folding on the same input and
//! reports the worst-case elementwise drift. The folded graph must be
//! indistinguishable from the original up to floating-point noise; this is
//! the acceptance check for the whole rewrite.

use bnfold_nn::{max_abs_diff, Container, Tensor4};

use crate::{fuse_graph, FuseError};

/// Acceptance threshold for the folded graph's output drift.
pub const TOLERANCE: f32 = 1e-4;

/// Folds `root` in place and returns the maximum absolute difference
/// between the original and folded graph outputs, evaluated on `input`.
pub fn check_equivalence(root: &mut Container, input: &Tensor4) -> Result<f32, FuseError> {
    let before = root.forward(input)?;
    fuse_graph(root)?;
    let after = root.forward(input)?;

    let diff = max_abs_diff(&before, &after);
    if diff > TOLERANCE {
        log::warn!("folded graph diverges from original: max abs diff {diff}");
    }
    Ok(diff)
}
