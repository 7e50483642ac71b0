//! Outline printer for a parsed tree.
//!
//! One line per node, indented by nesting depth with two spaces:
//!
//! ```text
//! file main.txt (/abs/main.txt) at main.txt:1:1
//!   text 12 bytes at main.txt:1:1
//!   file lib.txt (/abs/lib.txt) at main.txt:2:1
//!     comment 9 bytes at lib.txt:1:1
//! ```

use std::fmt::Write;

use crate::ast::{FileNode, Node};

/// Format `root` and its descendants as an indented outline.
#[must_use]
pub fn format_tree(root: &FileNode) -> String {
    let mut out = String::new();
    format_file(&mut out, root, 0);
    out
}

fn format_file(out: &mut String, file: &FileNode, depth: usize) {
    indent(out, depth);
    let _ = writeln!(
        out,
        "file {} ({}) at {}",
        file.name,
        file.path.display(),
        file.pos
    );
    for node in &file.nodes {
        format_node(out, node, depth + 1);
    }
}

fn format_node(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::File(file) => format_file(out, file, depth),
        Node::Text(text) => {
            indent(out, depth);
            let _ = writeln!(out, "text {} bytes at {}", text.text.len(), text.pos);
        }
        Node::Comment(comment) => {
            indent(out, depth);
            let _ = writeln!(
                out,
                "comment {} bytes at {}",
                comment.text.len(),
                comment.pos
            );
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
