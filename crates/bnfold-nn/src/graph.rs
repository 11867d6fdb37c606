//! Ordered, named containers of layers.

use crate::error::GraphError;
use crate::layer::Layer;
use crate::tensor::Tensor4;

/// An ordered collection of uniquely named child layers.
///
/// Children are applied sequentially by [`forward`](Self::forward). Rewrites
/// replace children in place by name, so sibling order is stable across
/// graph transformations and positional consumers see the same layout
/// before and after a rewrite.
#[derive(Clone, Debug, Default)]
pub struct Container {
    children: Vec<(String, Layer)>,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a child. Sibling names must be unique.
    pub fn push(&mut self, name: impl Into<String>, layer: Layer) -> Result<(), GraphError> {
        let name = name.into();
        if self.children.iter().any(|(n, _)| *n == name) {
            return Err(GraphError::DuplicateChild(name));
        }
        self.children.push((name, layer));
        Ok(())
    }

    /// Number of immediate children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Looks up a child by name.
    pub fn child(&self, name: &str) -> Option<&Layer> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, layer)| layer)
    }

    /// Looks up a child by name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.children
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, layer)| layer)
    }

    /// Replaces the child named `name` in place, preserving sibling order.
    pub fn replace(&mut self, name: &str, layer: Layer) -> Result<(), GraphError> {
        match self.children.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => {
                *slot = layer;
                Ok(())
            }
            None => Err(GraphError::NoSuchChild(name.into())),
        }
    }

    /// Iterates `(name, layer)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Layer)> {
        self.children.iter().map(|(n, layer)| (n.as_str(), layer))
    }

    /// Child names in definition order.
    pub fn child_names(&self) -> Vec<String> {
        self.children.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Applies children sequentially to an NCHW input.
    pub fn forward(&self, input: &Tensor4) -> Result<Tensor4, GraphError> {
        let mut x = input.clone();
        for (_, layer) in &self.children {
            x = layer.forward(&x)?;
        }
        Ok(x)
    }
}
