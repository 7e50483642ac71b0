use crate::commenter::{Commenter, Commenters};

/// Default directive trigger, as in the C preprocessor.
pub const DEFAULT_TRIGGER: &str = "#";

/// Default limit on nested includes.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 128;

/// Preprocessor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// String that begins a directive line.
    pub trigger: String,
    /// Number of nested `include`/`require` levels allowed below the
    /// root file.
    pub max_include_depth: usize,
    /// Comment styles recognized in the text. Triggers inside a
    /// comment do not start a directive.
    pub commenters: Commenters,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            commenters: Commenters::new(),
        }
    }

    /// Set the directive trigger.
    #[must_use]
    pub fn with_trigger(mut self, trigger: &str) -> Self {
        self.trigger = trigger.to_string();
        self
    }

    /// Set the include depth limit.
    #[must_use]
    pub const fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Append a commenter. Earlier commenters take precedence.
    #[must_use]
    pub fn with_commenter(mut self, commenter: Commenter) -> Self {
        self.commenters.push(commenter);
        self
    }

    /// Replace all commenters.
    #[must_use]
    pub fn with_commenters(mut self, commenters: impl Into<Commenters>) -> Self {
        self.commenters = commenters.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
