use alloc::{boxed::Box, string::String};

use thiserror::Error;

use crate::context::ParseContext;

/// The error conditions the parser can encounter.
///
/// Recoverable conditions are first offered to the [`ErrorPolicy`]; the
/// remaining conditions (for example [`ErrorKind::MaxNestingDepthExceeded`]
/// or malformed UTF-8) have no defined recovery and halt the parse
/// unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ErrorKind {
    /// Input ended while a token or container was incomplete.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A character that fits no grammar production.
    #[error("syntax error")]
    SyntaxError,
    /// Non-whitespace input after the top-level value completed.
    #[error("extra character after the end of the document")]
    ExtraCharacter,
    /// A trailing comma immediately before `]` or `}`.
    #[error("extra comma")]
    ExtraComma,
    /// An object member key was expected.
    #[error("expected object member key")]
    ExpectedKey,
    /// A `:` separating key and value was expected.
    #[error("expected ':'")]
    ExpectedColon,
    /// A value was expected.
    #[error("expected value")]
    ExpectedValue,
    /// A keyword literal other than `true`, `false` or `null`.
    #[error("invalid value")]
    InvalidValue,
    /// A `}` with no open object.
    #[error("unexpected '}}'")]
    UnexpectedRightBrace,
    /// A `]` with no open array.
    #[error("unexpected ']'")]
    UnexpectedRightBracket,
    /// Inside an object, something other than `,` or `}` followed a value.
    #[error("expected ',' or '}}'")]
    ExpectedCommaOrRightBrace,
    /// Inside an array, something other than `,` or `]` followed a value.
    #[error("expected ',' or ']'")]
    ExpectedCommaOrRightBracket,
    /// A control character (U+0000..U+001F) at a structural position, or
    /// unescaped inside a string literal.
    #[error("illegal control character")]
    IllegalControlCharacter,
    /// A raw newline, carriage return or tab inside a string literal.
    #[error("illegal character in string")]
    IllegalCharacterInString,
    /// A backslash escape other than `\" \\ \/ \b \f \n \r \t \u`.
    #[error("illegal escaped character")]
    IllegalEscapedCharacter,
    /// A `\uXXXX` escape with a non-hex digit or a lone low surrogate.
    #[error("invalid unicode escape sequence")]
    InvalidUnicodeEscape,
    /// A high surrogate escape not followed by a low surrogate escape.
    #[error("expected codepoint surrogate pair")]
    ExpectedSurrogatePair,
    /// A surrogate code point encoded directly in UTF-8 (WTF-8/CESU-8).
    #[error("illegal surrogate value")]
    IllegalSurrogateValue,
    /// An overlong UTF-8 encoding.
    #[error("overlong UTF-8 sequence")]
    OverlongUtf8Sequence,
    /// A missing or stray UTF-8 continuation byte.
    #[error("expected UTF-8 continuation byte")]
    ExpectedContinuationByte,
    /// A code point above U+10FFFF.
    #[error("illegal codepoint")]
    IllegalCodepoint,
    /// A numeric literal that fits no lexical phase.
    #[error("invalid number")]
    InvalidNumber,
    /// A `0` immediately followed by another digit.
    #[error("number has a leading zero")]
    LeadingZero,
    /// A comment while comments are disabled.
    #[error("illegal comment")]
    IllegalComment,
    /// A single-quoted string.
    #[error("single quote")]
    SingleQuote,
    /// An opening bracket beyond the configured maximum nesting depth.
    #[error("maximum nesting depth exceeded")]
    MaxNestingDepthExceeded,
}

/// What went wrong: a syntax condition detected by the parser, or a halt
/// requested by the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorSource {
    /// The input violated the grammar or a configured limit.
    #[error("syntax error: {0}")]
    Syntax(#[from] ErrorKind),
    /// An event consumer refused the event stream.
    #[error("visitor error: {0}")]
    Visitor(#[from] VisitError),
}

/// A parse failure with precise position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source} at {line}:{column}")]
pub struct ParseError {
    pub(crate) source: ErrorSource,
    pub(crate) line: usize,
    pub(crate) column: usize,
    pub(crate) offset: usize,
}

impl ParseError {
    pub(crate) fn new(source: ErrorSource, ctx: &ParseContext) -> Self {
        ParseError {
            source,
            line: ctx.line,
            column: ctx.column,
            offset: ctx.offset,
        }
    }

    /// The syntax condition, if the failure originated in the parser.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self.source {
            ErrorSource::Syntax(kind) => Some(kind),
            ErrorSource::Visitor(_) => None,
        }
    }

    /// 1-based line of the offending input.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based byte column of the offending input.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Absolute byte offset of the offending input.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// An error raised by an event consumer to halt the producer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct VisitError {
    msg: String,
}

impl VisitError {
    /// Creates a visitor error carrying `msg`.
    pub fn new(msg: impl Into<String>) -> Self {
        VisitError { msg: msg.into() }
    }
}

/// The answer an [`ErrorPolicy`] gives for a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Apply the built-in recovery for the condition and keep parsing.
    Continue,
    /// Abort the parse with the condition as the error.
    Stop,
}

/// Caller-supplied predicate consulted on every recoverable error
/// condition.
///
/// The policy is supplied at parser construction, may be invoked any number
/// of times, and is never mutated by the parser. The default policy stops
/// on every condition.
pub type ErrorPolicy = Box<dyn Fn(ErrorKind, &ParseContext) -> ErrorAction>;
