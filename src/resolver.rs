//! Include resolution: path lookup, depth limiting and `require`
//! deduplication, with one [`Session`] per top-level parse.

use std::collections::HashSet;
use std::mem;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::Error;
use crate::ast::{FileNode, Node};
use crate::config::Config;
use crate::lexer::Scanner;
use crate::loader::Loader;
use crate::parser::{ParseError, ParseErrorKind, parse_tokens};
use crate::token::PosInfo;

/// How a directive pulls in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// Always parse the file again.
    Include,
    /// Parse the file only the first time its canonical path is seen.
    Require,
}

/// A file under construction and the directory its relative
/// includes resolve against.
struct Frame {
    file: FileNode,
    dir: PathBuf,
}

impl Frame {
    fn new(file: FileNode, source: &Path) -> Self {
        let dir = source.parent().map(Path::to_path_buf).unwrap_or_default();
        Self { file, dir }
    }
}

/// Mutable state of one top-level parse.
///
/// `current` is the file receiving nodes; `enclosing` holds the files
/// suspended while an include is being parsed, innermost last.
pub struct Session<'p, L> {
    config: &'p Config,
    loader: &'p L,
    current: Frame,
    enclosing: Vec<Frame>,
    visited: HashSet<PathBuf>,
}

/// Parse the file at `path` as a root.
pub fn parse_file<L: Loader>(
    config: &Config,
    loader: &L,
    path: &Path,
) -> Result<FileNode, Error> {
    let name = path.display().to_string();
    let pos = PosInfo::start(&name);
    let content = read(loader, path, &pos)?;
    let identity = identity(loader, path);
    let root = Frame::new(FileNode::new(pos, name, identity), path);
    Session::new(config, loader, root).finish(&content)
}

/// Parse in-memory `content` as a root named `name`.
pub fn parse_source<L: Loader>(
    config: &Config,
    loader: &L,
    name: &str,
    content: &str,
) -> Result<FileNode, Error> {
    let path = Path::new(name);
    let identity = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let root = Frame::new(FileNode::new(PosInfo::start(name), name, identity), path);
    Session::new(config, loader, root).finish(content)
}

impl<'p, L: Loader> Session<'p, L> {
    fn new(config: &'p Config, loader: &'p L, root: Frame) -> Self {
        Self {
            config,
            loader,
            current: root,
            enclosing: Vec::new(),
            visited: HashSet::new(),
        }
    }

    fn finish(mut self, content: &str) -> Result<FileNode, Error> {
        self.run(content)?;
        Ok(self.current.file)
    }

    /// Number of includes between the root and the current file.
    const fn depth(&self) -> usize {
        self.enclosing.len()
    }

    pub fn push(&mut self, node: Node) {
        self.current.file.push(node);
    }

    fn run(&mut self, content: &str) -> Result<(), Error> {
        let config = self.config;
        let name = self.current.file.name.clone();
        debug!(file = %name, depth = self.depth(), "parsing");
        let tokens = Scanner::new(&name, content, &config.trigger, &config.commenters);
        parse_tokens(self, tokens)
    }

    /// Pull `request` into the current file at `pos`.
    ///
    /// A `require` of an already visited file succeeds without adding
    /// anything.
    pub fn include(
        &mut self,
        request: &str,
        mode: Inclusion,
        pos: PosInfo,
    ) -> Result<(), Error> {
        // `..` is left to the loader, it may follow a symlinked directory
        let path = self.current.dir.join(request);
        let identity = identity(self.loader, &path);

        if self.depth() >= self.config.max_include_depth {
            return Err(ParseError::new(
                ParseErrorKind::IncludeDepthExceeded {
                    max: self.config.max_include_depth,
                },
                pos,
            )
            .into());
        }

        if mode == Inclusion::Require && !self.visited.insert(identity.clone()) {
            debug!(path = %identity.display(), "already required, skipping");
            return Ok(());
        }

        let content = read(self.loader, &path, &pos)?;
        let file = FileNode::new(pos, path.display().to_string(), identity);
        self.enter(Frame::new(file, &path));
        let result = self.run(&content);
        let child = self.leave();
        result?;
        if let Some(child) = child {
            self.push(Node::File(child.file));
        }
        Ok(())
    }

    fn enter(&mut self, frame: Frame) {
        let parent = mem::replace(&mut self.current, frame);
        self.enclosing.push(parent);
    }

    fn leave(&mut self) -> Option<Frame> {
        let parent = self.enclosing.pop()?;
        Some(mem::replace(&mut self.current, parent))
    }
}

/// Canonical identity of `path`, degrading to the absolute literal
/// path when the loader cannot resolve it.
fn identity<L: Loader>(loader: &L, path: &Path) -> PathBuf {
    match loader.canonicalize(path) {
        Ok(canonical) => canonical,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot canonicalize, using literal path");
            std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
        }
    }
}

fn read<L: Loader>(loader: &L, path: &Path, pos: &PosInfo) -> Result<String, Error> {
    let bytes = loader.read(path).map_err(|e| {
        ParseError::new(
            ParseErrorKind::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
            pos.clone(),
        )
    })?;
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}
