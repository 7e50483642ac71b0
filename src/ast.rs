//! Preprocessed content tree.
//!
//! Rendering a [`FileNode`] concatenates all of its descendants in
//! order. Every node remembers where it came from, so any byte of the
//! rendered output can be traced back to the file that contributed it.

use std::fmt;
use std::path::PathBuf;

use crate::token::PosInfo;

/// Plain text copied to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub pos: PosInfo,
    pub text: String,
}

/// Comment kept in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub pos: PosInfo,
    pub text: String,
}

/// A parsed file: the root of a parse, or the target of an
/// `include`/`require` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Where the file was pulled in; the file's own start for a root.
    pub pos: PosInfo,
    /// Name used in positions of this file's content.
    pub name: String,
    /// Canonical path, or the best approximation of one.
    pub path: PathBuf,
    pub nodes: Vec<Node>,
}

/// Any node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(TextNode),
    Comment(CommentNode),
    File(FileNode),
}

impl Node {
    #[must_use]
    pub const fn pos(&self) -> &PosInfo {
        match self {
            Self::Text(n) => &n.pos,
            Self::Comment(n) => &n.pos,
            Self::File(n) => &n.pos,
        }
    }

    /// Rendered length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(n) => n.text.len(),
            Self::Comment(n) => n.text.len(),
            Self::File(n) => n.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text of a leaf node; `None` for files.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(n) => Some(&n.text),
            Self::Comment(n) => Some(&n.text),
            Self::File(_) => None,
        }
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Self::Text(n) => out.push_str(&n.text),
            Self::Comment(n) => out.push_str(&n.text),
            Self::File(n) => n.render_into(out),
        }
    }

    /// Original position of rendered byte `offset` of this node.
    #[must_use]
    pub fn position(&self, offset: usize) -> Option<PosInfo> {
        match self {
            Self::Text(n) => n.pos.offset_in(&n.text, offset),
            Self::Comment(n) => n.pos.offset_in(&n.text, offset),
            Self::File(n) => n.position(offset),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(n) => f.write_str(&n.text),
            Self::Comment(n) => f.write_str(&n.text),
            Self::File(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl FileNode {
    /// Empty file node whose content starts at `pos`.
    #[must_use]
    pub fn new(pos: PosInfo, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            pos,
            name: name.into(),
            path: path.into(),
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Rendered length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().map(Node::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(Node::is_empty)
    }

    /// Concatenated text of the whole subtree.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.len());
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        for node in &self.nodes {
            node.render_into(out);
        }
    }

    /// Original position of rendered byte `offset`.
    ///
    /// Returns `None` when `offset` is at or past the end of the
    /// rendered output.
    #[must_use]
    pub fn position(&self, mut offset: usize) -> Option<PosInfo> {
        for node in &self.nodes {
            let len = node.len();
            if offset < len {
                return node.position(offset);
            }
            offset -= len;
        }
        None
    }

    /// Original position of the rendered output at `line` and
    /// `column`, both 1-based, the column counted in bytes.
    ///
    /// The newline ending a line is addressable as the column just
    /// past the line's last character.
    #[must_use]
    pub fn position_at(&self, line: usize, column: usize) -> Option<PosInfo> {
        if line == 0 || column == 0 {
            return None;
        }

        let mut cur_line = 1;
        let mut cur_col = 1;
        for leaf in self.leaves() {
            let Some(text) = leaf.text() else { continue };
            let mut offset = 0;
            for segment in text.split_inclusive('\n') {
                if cur_line == line && column >= cur_col && column - cur_col < segment.len() {
                    return leaf.position(offset + column - cur_col);
                }
                offset += segment.len();
                if segment.ends_with('\n') {
                    cur_line += 1;
                    cur_col = 1;
                } else {
                    cur_col += segment.len();
                }
                if cur_line > line {
                    return None;
                }
            }
        }
        None
    }

    /// Text and comment nodes of the whole subtree in output order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Node>) {
        for node in &self.nodes {
            match node {
                Node::File(file) => file.collect_leaves(out),
                leaf => out.push(leaf),
            }
        }
    }

    /// This file and every file below it, depth first.
    #[must_use]
    pub fn files(&self) -> Vec<&Self> {
        let mut out = vec![self];
        for node in &self.nodes {
            if let Node::File(file) = node {
                out.extend(file.files());
            }
        }
        out
    }
}

impl fmt::Display for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}
