//! Comment delimiter definitions consulted by the scanner.

/// A comment style: a begin delimiter and either an end delimiter
/// or the end of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commenter {
    pub begin: String,
    /// `None` means the comment runs to the end of the line. The
    /// newline itself is not part of the comment.
    pub end: Option<String>,
    /// Drop the comment from the output instead of keeping it.
    pub strip: bool,
}

impl Commenter {
    /// Comment running from `begin` to the end of the line.
    #[must_use]
    pub fn prefix(begin: &str) -> Self {
        Self {
            begin: begin.to_string(),
            end: None,
            strip: false,
        }
    }

    /// Comment delimited by `begin` and `end`.
    #[must_use]
    pub fn block(begin: &str, end: &str) -> Self {
        Self {
            begin: begin.to_string(),
            end: Some(end.to_string()),
            strip: false,
        }
    }

    /// C block comments: `/* ... */`.
    #[must_use]
    pub fn c() -> Self {
        Self::block("/*", "*/")
    }

    /// C++ line comments: `// ...`.
    #[must_use]
    pub fn cpp() -> Self {
        Self::prefix("//")
    }

    /// Lisp line comments: `; ...`.
    #[must_use]
    pub fn lisp() -> Self {
        Self::prefix(";")
    }

    /// Set whether matched comments are stripped.
    #[must_use]
    pub const fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    /// Whether `input` starts with this commenter's begin delimiter.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        !self.begin.is_empty() && input.starts_with(&self.begin)
    }

    /// The delimiter that closes this comment.
    #[must_use]
    pub fn terminator(&self) -> &str {
        self.end.as_deref().unwrap_or("\n")
    }
}

/// Ordered collection of commenters. The first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commenters(Vec<Commenter>);

impl Commenters {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, commenter: Commenter) {
        self.0.push(commenter);
    }

    /// First commenter whose begin delimiter prefixes `input`.
    #[must_use]
    pub fn first(&self, input: &str) -> Option<&Commenter> {
        self.0.iter().find(|c| c.matches(input))
    }

    #[must_use]
    pub fn is_comment(&self, input: &str) -> bool {
        self.first(input).is_some()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Commenter> {
        self.0.iter()
    }
}

impl From<Vec<Commenter>> for Commenters {
    fn from(commenters: Vec<Commenter>) -> Self {
        Self(commenters)
    }
}

impl FromIterator<Commenter> for Commenters {
    fn from_iter<I: IntoIterator<Item = Commenter>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Commenters {
    type Item = &'a Commenter;
    type IntoIter = std::slice::Iter<'a, Commenter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
