//! Line-oriented text preprocessor.
//!
//! Lines starting with a trigger (default `#`) are directives:
//!
//! - `# include "path"` splices in another file, every time;
//! - `# require "path"` splices in a file only once per parse;
//! - `# error "message"` aborts the parse with `message`.
//!
//! Relative paths resolve against the directory of the including
//! file. Configured comment styles shield their content from
//! directive processing and can be stripped from the output. The
//! result is a tree whose rendering is the processed text and whose
//! every byte maps back to its original file, line, and column.
//!
//! # Quick start
//!
//! ```
//! use pre_rs::{Commenter, Config, MemoryLoader, Parser};
//!
//! let loader = MemoryLoader::new()
//!     .file("main.txt", "// banner\nhello\n# include \"name.txt\"\n")
//!     .file("name.txt", "world\n");
//! let config = Config::new().with_commenter(Commenter::cpp().strip(true));
//! let root = Parser::with_loader(config, loader).parse("main.txt").unwrap();
//!
//! assert_eq!(root.render(), "\nhello\nworld\n");
//! let pos = root.position(7).unwrap();
//! assert_eq!(pos.to_string(), "name.txt:1:1");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod commenter;
pub mod config;
pub mod formatter;
pub mod lexer;
pub mod loader;
pub mod parser;
mod resolver;
pub mod token;

use std::path::Path;

pub use ast::{CommentNode, FileNode, Node, TextNode};
pub use commenter::{Commenter, Commenters};
pub use config::{Config, DEFAULT_MAX_INCLUDE_DEPTH, DEFAULT_TRIGGER};
pub use formatter::format_tree;
pub use lexer::{LexError, LexErrorKind, Scanner, tokenize};
pub use loader::{FsLoader, Loader, MemoryLoader};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{PosInfo, Token, TokenKind};

/// Unified error type covering both lexing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser, include, or read error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Where the error was detected.
    #[must_use]
    pub const fn pos(&self) -> &PosInfo {
        match self {
            Self::Lex(e) => &e.pos,
            Self::Parse(e) => &e.pos,
        }
    }
}

/// Parse a file with the default configuration.
pub fn parse_file(path: impl AsRef<Path>) -> Result<FileNode, Error> {
    Parser::new(Config::default()).parse(path)
}

/// Parse in-memory content with the default configuration.
pub fn parse_str(name: &str, content: &str) -> Result<FileNode, Error> {
    Parser::new(Config::default()).parse_str(name, content)
}
