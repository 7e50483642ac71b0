use std::collections::VecDeque;
use std::fmt;

use crate::commenter::Commenters;
use crate::token::{PosInfo, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Double-quoted string not closed before end of line or input.
    UnterminatedString,
    /// Single-quoted or backtick string inside a directive.
    UnsupportedQuote(char),
    /// Carriage return not followed by a line feed.
    MalformedEndOfLine,
    /// Input ended inside a directive.
    UnexpectedEof,
    /// Character that cannot start any directive token.
    UnexpectedCharacter(char),
    /// Shebang line anywhere but on the first line.
    MisplacedShebang,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated quoted string")
            }
            Self::UnsupportedQuote(ch) => {
                write!(f, "only double-quoted strings are supported, got {ch}")
            }
            Self::MalformedEndOfLine => {
                write!(f, "malformed end-of-line")
            }
            Self::UnexpectedEof => {
                write!(f, "unexpected end of input in directive")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch:?}")
            }
            Self::MisplacedShebang => {
                write!(f, "shebang is only allowed on the first line")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {pos}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub pos: PosInfo,
}

/// Tokenize `input` in one go, stopping at the first lexical error.
///
/// The last token of a successful run is always
/// [`TokenKind::EndOfFile`].
///
/// # Errors
///
/// Returns `LexError` on unterminated strings, stray characters
/// inside a directive, or a directive cut short by end of input.
pub fn tokenize(
    name: &str,
    input: &str,
    trigger: &str,
    commenters: &Commenters,
) -> Result<Vec<Token>, LexError> {
    Scanner::new(name, input, trigger, commenters).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Comment,
    ActionBegin,
    InsideAction,
    Done,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    col: usize,
}

/// Lazy token stream over one source.
///
/// Each scanning state is a method returning the next state; the
/// iterator drives them in a loop until a token is ready. A trigger
/// only starts a directive at the beginning of a line, optionally
/// indented with spaces or tabs. An empty trigger never matches.
pub struct Scanner<'a> {
    name: &'a str,
    input: &'a str,
    trigger: &'a str,
    commenters: &'a Commenters,
    /// Start of the first line, past any byte order mark.
    first: usize,
    state: State,
    pending: VecDeque<Token>,
    cur: Mark,
    start: Mark,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub const fn new(
        name: &'a str,
        input: &'a str,
        trigger: &'a str,
        commenters: &'a Commenters,
    ) -> Self {
        // skip a UTF-8 byte order mark
        let bytes = input.as_bytes();
        let first = if matches!(bytes, [0xEF, 0xBB, 0xBF, ..]) {
            3
        } else {
            0
        };
        let origin = Mark {
            pos: first,
            line: 1,
            col: 1,
        };
        Self {
            name,
            input,
            trigger,
            commenters,
            first,
            state: State::Text,
            pending: VecDeque::new(),
            cur: origin,
            start: origin,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.cur.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cur.pos += ch.len_utf8();
        if ch == '\n' {
            self.cur.line += 1;
            self.cur.col = 1;
        } else {
            self.cur.col += ch.len_utf8();
        }
        Some(ch)
    }

    fn skip(&mut self, s: &str) {
        for _ in s.chars() {
            self.next_char();
        }
    }

    fn consume(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.skip(s);
            true
        } else {
            false
        }
    }

    fn accept_blanks(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.next_char();
        }
    }

    fn pos_of(&self, mark: Mark) -> PosInfo {
        PosInfo {
            name: self.name.to_string(),
            line: mark.line,
            column: mark.col,
        }
    }

    fn ignore(&mut self) {
        self.start = self.cur;
    }

    /// Queue a token spanning from the pending start to `end`. The
    /// pending start then moves to the current position.
    fn emit_until(&mut self, kind: TokenKind, end: Mark) {
        let text = self.input[self.start.pos..end.pos].to_string();
        self.emit_value(kind, text);
    }

    fn emit(&mut self, kind: TokenKind) {
        self.emit_until(kind, self.cur);
    }

    fn emit_value(&mut self, kind: TokenKind, text: String) {
        let pos = self.pos_of(self.start);
        self.pending.push_back(Token { kind, text, pos });
        self.ignore();
    }

    fn error_at(&self, kind: LexErrorKind, mark: Mark) -> LexError {
        LexError {
            kind,
            pos: self.pos_of(mark),
        }
    }

    fn at_trigger(&self, line_start: usize) -> bool {
        !self.trigger.is_empty()
            && self.rest().starts_with(self.trigger)
            && (line_start == self.first || self.input.as_bytes()[line_start - 1] == b'\n')
    }

    fn lex_text(&mut self) -> Result<State, LexError> {
        loop {
            let before = self.cur;
            self.accept_blanks();
            if self.at_trigger(before.pos) {
                // indentation of a directive line is not output
                if before.pos > self.start.pos {
                    self.emit_until(TokenKind::Text, before);
                }
                self.ignore();
                return Ok(State::ActionBegin);
            }
            if self.commenters.is_comment(self.rest()) {
                if self.cur.pos > self.start.pos {
                    self.emit(TokenKind::Text);
                }
                return Ok(State::Comment);
            }
            if self.next_char().is_none() {
                break;
            }
        }

        if self.cur.pos > self.start.pos {
            self.emit(TokenKind::Text);
        }
        self.emit(TokenKind::EndOfFile);
        Ok(State::Done)
    }

    fn lex_comment(&mut self) -> Result<State, LexError> {
        let commenters = self.commenters;
        let Some(commenter) = commenters.first(self.rest()) else {
            return Ok(State::Text);
        };

        self.skip(&commenter.begin);
        let end = commenter.terminator();
        loop {
            if self.rest().starts_with(end) {
                // line comments leave the newline to the text
                if commenter.end.is_some() {
                    self.skip(end);
                }
                break;
            }
            if self.next_char().is_none() {
                break;
            }
        }

        if commenter.strip {
            self.ignore();
        } else {
            self.emit(TokenKind::Comment);
        }

        if self.peek().is_none() {
            self.emit(TokenKind::EndOfFile);
            return Ok(State::Done);
        }
        Ok(State::Text)
    }

    fn lex_action_begin(&mut self) -> Result<State, LexError> {
        let begin = self.cur;
        self.skip(self.trigger);

        if self.peek() == Some('!') {
            if begin.line != 1 {
                return Err(self.error_at(LexErrorKind::MisplacedShebang, begin));
            }
            while let Some(ch) = self.next_char() {
                if ch == '\n' {
                    break;
                }
            }
            self.ignore();
            return Ok(State::Text);
        }

        self.emit(TokenKind::ActionBegin);
        Ok(State::InsideAction)
    }

    fn lex_inside_action(&mut self) -> Result<State, LexError> {
        loop {
            match self.peek() {
                None => {
                    return Err(self.error_at(LexErrorKind::UnexpectedEof, self.cur));
                }
                Some(' ' | '\t') => {
                    self.next_char();
                    self.ignore();
                }
                Some('\n' | '\r') => return self.lex_action_end(),
                Some('"') => return self.lex_quote(),
                Some(ch @ ('\'' | '`')) => {
                    return Err(self.error_at(LexErrorKind::UnsupportedQuote(ch), self.cur));
                }
                Some(ch) if is_ident_char(ch) => {
                    while self.peek().is_some_and(is_ident_char) {
                        self.next_char();
                    }
                    self.emit(TokenKind::Identifier);
                    return Ok(State::InsideAction);
                }
                Some(ch) => {
                    return Err(self.error_at(LexErrorKind::UnexpectedCharacter(ch), self.cur));
                }
            }
        }
    }

    fn lex_action_end(&mut self) -> Result<State, LexError> {
        let here = self.cur;
        if !(self.consume("\n") || self.consume("\r\n")) {
            return Err(self.error_at(LexErrorKind::MalformedEndOfLine, here));
        }
        self.emit(TokenKind::ActionEnd);
        Ok(State::Text)
    }

    fn lex_quote(&mut self) -> Result<State, LexError> {
        let open = self.cur;
        self.next_char();

        let mut value = String::new();
        loop {
            match self.next_char() {
                None | Some('\n') => {
                    return Err(self.error_at(LexErrorKind::UnterminatedString, open));
                }
                Some('\\') => match self.next_char() {
                    None | Some('\n') => {
                        return Err(self.error_at(LexErrorKind::UnterminatedString, open));
                    }
                    Some(ch) => value.push(ch),
                },
                Some('"') => break,
                Some(ch) => value.push(ch),
            }
        }

        self.emit_value(TokenKind::String, value);
        Ok(State::InsideAction)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            let step = match self.state {
                State::Text => self.lex_text(),
                State::Comment => self.lex_comment(),
                State::ActionBegin => self.lex_action_begin(),
                State::InsideAction => self.lex_inside_action(),
                State::Done => return None,
            };
            match step {
                Ok(state) => self.state = state,
                Err(e) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
