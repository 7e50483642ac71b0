use std::fmt;

/// Position in an original source file.
///
/// Lines and columns are 1-based. Columns count bytes, so a
/// multi-byte character advances the column by its encoded length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PosInfo {
    pub name: String,
    pub line: usize,
    pub column: usize,
}

impl PosInfo {
    /// Position of the first byte of the source called `name`.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line: 1,
            column: 1,
        }
    }

    /// Position of byte `offset` of `text`, where `text` begins at
    /// `self`. Returns `None` unless `offset < text.len()`.
    #[must_use]
    pub fn offset_in(&self, text: &str, offset: usize) -> Option<Self> {
        if offset >= text.len() {
            return None;
        }
        let prefix = &text.as_bytes()[..offset];

        let newlines = prefix.iter().filter(|&&b| b == b'\n').count();
        let column = match prefix.iter().rposition(|&b| b == b'\n') {
            Some(i) => offset - i,
            None => self.column + offset,
        };

        Some(Self {
            name: self.name.clone(),
            line: self.line + newlines,
            column,
        })
    }
}

impl fmt::Display for PosInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.line, self.column)
    }
}

/// Token kinds produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain text passed through to the output.
    Text,
    /// Comment kept in the output (non-stripping commenter).
    Comment,
    /// The trigger starting a directive line.
    ActionBegin,
    /// Bare word inside a directive, e.g. `include`.
    Identifier,
    /// Double-quoted string inside a directive, unescaped.
    String,
    /// Line break terminating a directive.
    ActionEnd,
    /// End of input.
    EndOfFile,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Comment => "comment",
            Self::ActionBegin => "directive start",
            Self::Identifier => "identifier",
            Self::String => "string",
            Self::ActionEnd => "end of line",
            Self::EndOfFile => "end of file",
        };
        f.write_str(name)
    }
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: PosInfo,
}
