use std::fmt;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::Error;
use crate::ast::{CommentNode, FileNode, Node, TextNode};
use crate::config::Config;
use crate::lexer::Scanner;
use crate::loader::{FsLoader, Loader};
use crate::resolver::{self, Inclusion, Session};
use crate::token::{PosInfo, Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The trigger was not followed by a command name.
    ExpectedCommand { found: TokenKind },
    /// Command name other than `include`, `require` or `error`.
    UnknownCommand(String),
    /// Command given without its string argument.
    MissingArgument { command: String },
    /// Wrong kind of argument, or more than one.
    UnexpectedArgument { command: String, found: TokenKind },
    /// Token that cannot appear outside a directive.
    UnexpectedToken(TokenKind),
    /// Includes nested deeper than the configured limit.
    IncludeDepthExceeded { max: usize },
    /// An `error` directive was reached; carries its message.
    ErrorDirective(String),
    /// A file could not be read.
    Unreadable { path: PathBuf, reason: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedCommand { found } => {
                write!(f, "expected command name, got {found}")
            }
            Self::UnknownCommand(name) => {
                write!(f, "unknown command {name}")
            }
            Self::MissingArgument { command } => {
                write!(
                    f,
                    "missing argument, command {command} \
                     takes a single string argument"
                )
            }
            Self::UnexpectedArgument { command, found } => {
                write!(
                    f,
                    "unexpected {found}, command {command} \
                     takes a single string argument"
                )
            }
            Self::UnexpectedToken(kind) => {
                write!(f, "unexpected {kind}")
            }
            Self::IncludeDepthExceeded { max } => {
                write!(f, "maximum include depth of {max} reached")
            }
            Self::ErrorDirective(message) => f.write_str(message),
            Self::Unreadable { path, reason } => {
                write!(f, "cannot read {}: {reason}", path.display())
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {pos}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub pos: PosInfo,
}

impl ParseError {
    pub(crate) const fn new(kind: ParseErrorKind, pos: PosInfo) -> Self {
        Self { kind, pos }
    }
}

/// Preprocessor entry point: configuration plus file access.
///
/// Every call to [`Parser::parse`] or [`Parser::parse_str`] starts a
/// fresh session, so `require` bookkeeping never leaks between calls.
#[derive(Debug, Clone, Default)]
pub struct Parser<L = FsLoader> {
    config: Config,
    loader: L,
}

impl Parser {
    /// Parser reading from the local filesystem.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            loader: FsLoader,
        }
    }
}

impl<L: Loader> Parser<L> {
    /// Parser reading files through `loader`.
    #[must_use]
    pub const fn with_loader(config: Config, loader: L) -> Self {
        Self { config, loader }
    }

    /// Configuration applied to every parse.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Loader used to read and identify files.
    #[must_use]
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// Parse the file at `path` and everything it includes.
    ///
    /// # Errors
    ///
    /// Returns the first lexical, syntactic, include or read error
    /// encountered anywhere in the include tree.
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<FileNode, Error> {
        resolver::parse_file(&self.config, &self.loader, path.as_ref())
    }

    /// Parse in-memory `content` under the logical name `name`.
    ///
    /// Relative includes resolve against the directory part of
    /// `name`, or the working directory if it has none.
    ///
    /// # Errors
    ///
    /// Same as [`Parser::parse`].
    pub fn parse_str(&self, name: &str, content: &str) -> Result<FileNode, Error> {
        resolver::parse_source(&self.config, &self.loader, name, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Include,
    Require,
    Error,
}

/// Turn one file's token stream into nodes of the session's current
/// file, following directives as they come.
pub(crate) fn parse_tokens<L: Loader>(
    session: &mut Session<'_, L>,
    mut tokens: Scanner<'_>,
) -> Result<(), Error> {
    while let Some(token) = tokens.next() {
        let token = token?;
        match token.kind {
            TokenKind::Text => session.push(Node::Text(TextNode {
                pos: token.pos,
                text: token.text,
            })),
            TokenKind::Comment => session.push(Node::Comment(CommentNode {
                pos: token.pos,
                text: token.text,
            })),
            TokenKind::ActionBegin => parse_action(session, &mut tokens, token)?,
            TokenKind::EndOfFile => return Ok(()),
            kind => {
                return Err(
                    ParseError::new(ParseErrorKind::UnexpectedToken(kind), token.pos).into(),
                );
            }
        }
    }
    Ok(())
}

fn parse_action<L: Loader>(
    session: &mut Session<'_, L>,
    tokens: &mut Scanner<'_>,
    begin: Token,
) -> Result<(), Error> {
    let name = next_token(tokens, &begin.pos)?;
    if name.kind != TokenKind::Identifier {
        return Err(ParseError::new(
            ParseErrorKind::ExpectedCommand { found: name.kind },
            name.pos,
        )
        .into());
    }

    let command = match name.text.as_str() {
        "include" => Command::Include,
        "require" => Command::Require,
        "error" => Command::Error,
        _ => {
            return Err(
                ParseError::new(ParseErrorKind::UnknownCommand(name.text), name.pos).into(),
            );
        }
    };

    let argument = single_argument(tokens, &name)?;
    trace!(command = %name.text, argument = %argument.text, at = %begin.pos, "directive");

    match command {
        Command::Include => session.include(&argument.text, Inclusion::Include, begin.pos),
        Command::Require => session.include(&argument.text, Inclusion::Require, begin.pos),
        Command::Error => Err(ParseError::new(
            ParseErrorKind::ErrorDirective(argument.text),
            begin.pos,
        )
        .into()),
    }
}

/// Expect exactly one string argument followed by the end of the
/// directive line.
fn single_argument(tokens: &mut Scanner<'_>, command: &Token) -> Result<Token, Error> {
    let argument = next_token(tokens, &command.pos)?;
    match argument.kind {
        TokenKind::String => {}
        TokenKind::ActionEnd | TokenKind::EndOfFile => {
            return Err(ParseError::new(
                ParseErrorKind::MissingArgument {
                    command: command.text.clone(),
                },
                argument.pos,
            )
            .into());
        }
        found => {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedArgument {
                    command: command.text.clone(),
                    found,
                },
                argument.pos,
            )
            .into());
        }
    }

    let end = next_token(tokens, &argument.pos)?;
    if end.kind != TokenKind::ActionEnd {
        return Err(ParseError::new(
            ParseErrorKind::UnexpectedArgument {
                command: command.text.clone(),
                found: end.kind,
            },
            end.pos,
        )
        .into());
    }
    Ok(argument)
}

fn next_token(tokens: &mut Scanner<'_>, last: &PosInfo) -> Result<Token, Error> {
    match tokens.next() {
        Some(token) => Ok(token?),
        None => Err(ParseError::new(
            ParseErrorKind::UnexpectedToken(TokenKind::EndOfFile),
            last.clone(),
        )
        .into()),
    }
}
