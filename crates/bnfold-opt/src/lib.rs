//! Graph rewrite passes for bnfold.
//!
//! Provides a [`Pass`] trait, a [`PassManager`] with fixed-point iteration,
//! the built-in batch-norm folding pass, and a numerical-equivalence
//! validation helper.

mod error;
mod fusion;
pub mod validation;

pub use error::FuseError;
pub use fusion::{fuse_conv_bn, fuse_graph, BatchNormFusion};
pub use validation::{check_equivalence, TOLERANCE};

use std::fmt::Debug;

use bnfold_nn::Container;

/// A graph rewrite that transforms a layer tree in place.
pub trait Pass: Debug {
    /// Human-readable name of the pass.
    fn name(&self) -> &str;

    /// Run the pass on a graph. Returns `true` if anything was modified.
    fn run(&self, root: &mut Container) -> Result<bool, FuseError>;
}

/// Maximum number of fixed-point iterations before giving up.
const MAX_ITERATIONS: usize = 10;

/// Runs passes in sequence with fixed-point iteration.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PassManager {
    /// Creates an empty pass manager with no passes.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Adds a pass to the pipeline.
    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Runs all passes until a fixed point is reached or the iteration limit.
    pub fn run(&self, root: &mut Container) -> Result<(), FuseError> {
        for _ in 0..MAX_ITERATIONS {
            let mut changed = false;
            for pass in &self.passes {
                changed |= pass.run(root)?;
            }
            if !changed {
                break;
            }
        }
        Ok(())
    }
}

/// Convenience function: folds batch norms into their preceding convolutions.
pub fn optimize(root: &mut Container) -> Result<(), FuseError> {
    let mut pm = PassManager::new();
    pm.add_pass(Box::new(BatchNormFusion));
    pm.run(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimize_empty_graph() {
        let mut root = Container::new();
        optimize(&mut root).unwrap();
        assert!(root.is_empty());
    }

    #[test]
    fn empty_pass_manager_is_noop() {
        let pm = PassManager::new();
        let mut root = Container::new();
        pm.run(&mut root).unwrap();
        assert!(root.is_empty());
    }
}
