//! Text dump of a layer tree for debugging.

use std::fmt::Write;

use crate::graph::Container;
use crate::layer::Layer;

/// Renders a container tree as an indented listing, one child per line.
pub fn dump_graph(root: &Container) -> String {
    let mut out = String::new();
    write_container(root, 0, &mut out);
    out
}

fn write_container(container: &Container, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (name, layer) in container.iter() {
        match layer {
            Layer::Conv2d(conv) => {
                let (kh, kw) = conv.kernel_size();
                let _ = writeln!(
                    out,
                    "{indent}{name}: Conv2d({} -> {}, kernel {kh}x{kw}, bias={})",
                    conv.in_channels(),
                    conv.out_channels(),
                    conv.bias.is_some(),
                );
            }
            Layer::BatchNorm2d(bn) => {
                let _ = writeln!(out, "{indent}{name}: BatchNorm2d({})", bn.num_features());
            }
            Layer::Relu => {
                let _ = writeln!(out, "{indent}{name}: Relu");
            }
            Layer::Identity => {
                let _ = writeln!(out, "{indent}{name}: Identity");
            }
            Layer::Container(child) => {
                let _ = writeln!(out, "{indent}{name}: Container({} children)", child.len());
                write_container(child, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::Conv2d;
    use ndarray::Array4;

    #[test]
    fn dump_nested_tree() {
        let mut block = Container::new();
        block
            .push(
                "conv",
                Layer::Conv2d(Conv2d::new(Array4::from_elem((4, 2, 3, 3), 0.0), None)),
            )
            .unwrap();
        block.push("act", Layer::Relu).unwrap();

        let mut root = Container::new();
        root.push("block", Layer::Container(block)).unwrap();
        root.push("tail", Layer::Identity).unwrap();

        let dump = dump_graph(&root);
        assert!(dump.contains("block: Container(2 children)"));
        assert!(dump.contains("  conv: Conv2d(2 -> 4, kernel 3x3, bias=false)"));
        assert!(dump.contains("tail: Identity"));
    }
}
