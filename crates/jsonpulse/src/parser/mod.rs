//! The incremental parser driver.
//!
//! [`JsonParser`] accumulates input fed as byte chunks and walks it with an
//! explicit state machine. The driving state names the token class expected
//! next; a parallel state stack records the enclosing container for every
//! open nesting level, with [`ParseState::Root`] permanently at the bottom.
//! The string, number and literal lexers each keep a sub-state so a token
//! split across chunks resumes from exactly the byte where input ran out.

mod escape;
mod literal;
mod numbers;
mod utf8;

#[cfg(test)]
mod tests;

use alloc::{boxed::Box, string::String, vec, vec::Vec};
use core::mem;

use bstr::ByteSlice;

pub use numbers::NumberValue;

use crate::{
    context::ParseContext,
    error::{ErrorAction, ErrorKind, ErrorPolicy, ErrorSource, ParseError},
    options::ParseOptions,
    parser::{
        escape::{EscapeStep, UnicodeEscapeAcc},
        literal::{ExpectedLiteralBuffer, LiteralKind, Step},
    },
    tag::SemanticTag,
    visitor::{JsonVisitor, VisitResult},
};

/// Driving state, doubling as the stack marker for open nesting levels.
///
/// `Root`, `Object`, `Array` and `MemberName` appear only on the state
/// stack; the remaining variants drive the byte loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Root,
    Start,
    Accept,
    Done,
    Slash,
    SlashSlash,
    SlashStar,
    SlashStarStar,
    Cr,
    ExpectCommaOrEnd,
    Object,
    ExpectMemberNameOrEnd,
    ExpectMemberName,
    ExpectColon,
    ExpectValueOrEnd,
    ExpectValue,
    Array,
    String,
    MemberName,
    Number,
    Literal,
}

/// Sub-phase of the string lexer, preserved across chunk boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringState {
    Text,
    Escape,
    EscapeUnicode,
    SurrogateBackslash,
    SurrogateU,
    SurrogateUnicode,
}

/// Sub-phase of the number lexer, preserved across chunk boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberState {
    Minus,
    Zero,
    Integer,
    FractionStart,
    FractionDigits,
    Exponent,
    ExponentSign,
    ExponentDigits,
}

// Bytes that interrupt the verbatim fast path inside a string literal:
// every control byte, the closing quote and the escape introducer.
const STRING_STOP: &[u8] = &[
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
    0x0F, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D,
    0x1E, 0x1F, b'"', b'\\',
];

// Whitespace control bytes are consumed before the expect-state default
// arms run; any other control byte gets its own diagnostic instead of the
// positional one.
fn junk_kind(b: u8, expected: ErrorKind) -> ErrorKind {
    if b < 0x20 {
        ErrorKind::IllegalControlCharacter
    } else {
        expected
    }
}

fn dispatch_number<V: JsonVisitor>(
    visitor: &mut V,
    value: NumberValue<'_>,
    ctx: &ParseContext,
) -> VisitResult {
    match value {
        NumberValue::Int64(n) => visitor.int64_value(n, SemanticTag::None, ctx),
        NumberValue::Uint64(n) => visitor.uint64_value(n, SemanticTag::None, ctx),
        NumberValue::BigInt(text) => visitor.string_value(text, SemanticTag::BigInt, ctx),
        NumberValue::Double(d) => visitor.double_value(d, SemanticTag::None, ctx),
        NumberValue::BigDec(text) => visitor.string_value(text, SemanticTag::BigDec, ctx),
    }
}

/// An incremental, push-based JSON parser.
///
/// Feed input with [`JsonParser::feed`], drive it with
/// [`JsonParser::parse_step`], and close the stream with
/// [`JsonParser::finish`]. Events are pushed into the
/// [`JsonVisitor`] passed to each call; one parser instance parses one
/// document at a time and may be [`reset`](JsonParser::reset) for the next.
pub struct JsonParser {
    source: Vec<u8>,
    head: usize,
    end_of_input: bool,

    state: ParseState,
    state_stack: Vec<ParseState>,
    string_state: StringState,
    number_state: NumberState,
    literal: ExpectedLiteralBuffer,
    escape: UnicodeEscapeAcc,
    high_surrogate: u32,
    pending: Vec<u8>,

    line: usize,
    position: usize,
    mark_position: usize,
    begin_position: usize,
    level: usize,

    done: bool,
    more: bool,
    cursor_mode: bool,

    options: ParseOptions,
    string_double_map: Vec<(String, f64)>,
    policy: ErrorPolicy,
}

impl JsonParser {
    /// Creates a parser with the default error policy, which stops on every
    /// error condition.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self::with_error_policy(options, Box::new(|_, _| ErrorAction::Stop))
    }

    /// Creates a parser consulting `policy` on every recoverable error
    /// condition.
    #[must_use]
    pub fn with_error_policy(options: ParseOptions, policy: ErrorPolicy) -> Self {
        let mut string_double_map = Vec::new();
        if let Some(s) = options.nan_str.clone() {
            string_double_map.push((s, f64::NAN));
        }
        if let Some(s) = options.inf_str.clone() {
            string_double_map.push((s, f64::INFINITY));
        }
        if let Some(s) = options.neginf_str.clone() {
            string_double_map.push((s, f64::NEG_INFINITY));
        }
        JsonParser {
            source: Vec::new(),
            head: 0,
            end_of_input: false,
            state: ParseState::Start,
            state_stack: vec![ParseState::Root],
            string_state: StringState::Text,
            number_state: NumberState::Zero,
            literal: ExpectedLiteralBuffer::none(),
            escape: UnicodeEscapeAcc::new(),
            high_surrogate: 0,
            pending: Vec::new(),
            line: 1,
            position: 0,
            mark_position: 0,
            begin_position: 0,
            level: 0,
            done: false,
            more: true,
            cursor_mode: false,
            options,
            string_double_map,
            policy,
        }
    }

    /// Appends a chunk of input. Chunks may split the document anywhere,
    /// including inside a token, an escape sequence or a UTF-8 sequence.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.source.extend_from_slice(chunk);
    }

    /// Consumes as much buffered input as possible, pushing events into
    /// `visitor`.
    ///
    /// Returns `Ok` when the buffered input is exhausted (feed more and call
    /// again), when the document completed, or, in cursor mode, after each
    /// event.
    ///
    /// # Errors
    ///
    /// Returns the first error the active [`ErrorPolicy`] declines to
    /// recover from, any unrecoverable syntax error, or an error raised by
    /// the visitor.
    pub fn parse_step<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        let result = self.parse_step_inner(visitor);
        if self.head > 0 {
            self.source.drain(..self.head);
            self.head = 0;
        }
        result
    }

    /// Declares the input complete and drains everything still buffered,
    /// finalizing any token that is only delimited by end of input.
    ///
    /// # Errors
    ///
    /// As [`JsonParser::parse_step`], plus [`ErrorKind::UnexpectedEof`] when
    /// the document is structurally incomplete and
    /// [`ErrorKind::ExtraCharacter`] for trailing non-whitespace.
    pub fn finish<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        self.end_of_input = true;
        while !self.done {
            self.parse_step(visitor)?;
        }
        self.check_done()
    }

    /// Verifies that everything after the completed document is whitespace.
    ///
    /// # Errors
    ///
    /// Offers [`ErrorKind::ExtraCharacter`] to the error policy for each
    /// non-whitespace byte; the built-in recovery skips the byte.
    pub fn check_done(&mut self) -> Result<(), ParseError> {
        while self.head < self.source.len() {
            let b = self.source[self.head];
            // A `\r` suspends into the Cr state exactly like the main
            // loop, so a `\n` arriving in the next chunk is not counted
            // as a second line.
            if self.state == ParseState::Cr {
                if b == b'\n' {
                    self.advance(1);
                    self.mark_position = self.position;
                }
                self.state = self.pop_state();
                continue;
            }
            if self.consume_ws(b) {
                continue;
            }
            self.offer(ErrorKind::ExtraCharacter)?;
            self.advance(1);
        }
        self.source.clear();
        self.head = 0;
        Ok(())
    }

    /// Returns the parser to its initial state, keeping options, error
    /// policy and buffer capacity, so the instance can parse another
    /// document.
    pub fn reset(&mut self) {
        self.source.clear();
        self.head = 0;
        self.end_of_input = false;
        self.state = ParseState::Start;
        self.state_stack.clear();
        self.state_stack.push(ParseState::Root);
        self.string_state = StringState::Text;
        self.number_state = NumberState::Zero;
        self.literal = ExpectedLiteralBuffer::none();
        self.escape.reset();
        self.high_surrogate = 0;
        self.pending.clear();
        self.line = 1;
        self.position = 0;
        self.mark_position = 0;
        self.begin_position = 0;
        self.level = 0;
        self.done = false;
        self.more = true;
    }

    /// In cursor mode, [`JsonParser::parse_step`] returns after every
    /// pushed event instead of running until input is exhausted.
    pub fn set_cursor_mode(&mut self, on: bool) {
        self.cursor_mode = on;
    }

    /// Returns `true` once a complete top-level value has been parsed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done || self.state == ParseState::Accept
    }

    /// Returns `true` when all buffered input is consumed but the document
    /// is not yet complete.
    #[must_use]
    pub fn needs_more_input(&self) -> bool {
        !self.is_complete() && self.head >= self.source.len()
    }

    /// 1-based line number at the current input position.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based byte column at the current input position.
    #[must_use]
    pub fn column(&self) -> usize {
        self.position - self.mark_position + 1
    }

    /// Absolute byte offset of the current input position.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.position
    }

    /// Current container nesting depth.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    fn parse_step_inner<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        self.more = true;
        loop {
            if self.state == ParseState::Accept {
                visitor.flush();
                self.done = true;
                self.more = false;
                self.state = ParseState::Done;
                return Ok(());
            }
            if self.head >= self.source.len() {
                if !self.end_of_input {
                    return Ok(());
                }
                match self.state {
                    ParseState::Done => {
                        self.more = false;
                        return Ok(());
                    }
                    // Numbers have no closing delimiter; end of input
                    // finalizes one that stopped in an accepting sub-phase.
                    ParseState::Number => {
                        match self.number_state {
                            NumberState::Zero | NumberState::Integer => {
                                self.end_integer_value(visitor)?;
                            }
                            NumberState::FractionDigits | NumberState::ExponentDigits => {
                                self.end_fraction_value(visitor)?;
                            }
                            _ => return self.fatal(ErrorKind::UnexpectedEof),
                        }
                        continue;
                    }
                    ParseState::Cr | ParseState::SlashSlash => {
                        self.state = self.pop_state();
                        continue;
                    }
                    _ => return self.fatal(ErrorKind::UnexpectedEof),
                }
            }
            while self.head < self.source.len() && self.more {
                if self.state == ParseState::Accept {
                    break;
                }
                let b = self.source[self.head];
                self.step_byte(b, visitor)?;
            }
            if !self.more && self.state != ParseState::Accept {
                return Ok(());
            }
        }
    }

    fn step_byte<V: JsonVisitor>(&mut self, b: u8, visitor: &mut V) -> Result<(), ParseError> {
        match self.state {
            ParseState::String => self.lex_string(visitor),
            ParseState::Number => self.lex_number(visitor),
            ParseState::Literal => self.lex_literal(visitor),
            ParseState::Start => self.step_start(b, visitor),
            ParseState::ExpectCommaOrEnd => self.step_expect_comma_or_end(b, visitor),
            ParseState::ExpectMemberNameOrEnd => self.step_expect_member_name(b, visitor, true),
            ParseState::ExpectMemberName => self.step_expect_member_name(b, visitor, false),
            ParseState::ExpectColon => self.step_expect_colon(b),
            ParseState::ExpectValueOrEnd => self.step_expect_value_or_end(b, visitor),
            ParseState::ExpectValue => self.step_expect_value(b, visitor),
            ParseState::Slash
            | ParseState::SlashSlash
            | ParseState::SlashStar
            | ParseState::SlashStarStar => self.step_comment(b),
            ParseState::Cr => {
                if b == b'\n' {
                    self.advance(1);
                    self.mark_position = self.position;
                }
                self.state = self.pop_state();
                Ok(())
            }
            ParseState::Done => self.step_done(b),
            // Stack markers and `Accept` never drive the byte loop.
            ParseState::Accept
            | ParseState::Root
            | ParseState::Object
            | ParseState::Array
            | ParseState::MemberName => self.fatal(ErrorKind::SyntaxError),
        }
    }

    fn step_start<V: JsonVisitor>(&mut self, b: u8, visitor: &mut V) -> Result<(), ParseError> {
        if self.consume_ws(b) {
            return Ok(());
        }
        match b {
            b'/' => self.begin_comment(),
            b'}' => self.close_object(visitor),
            b']' => self.close_array(visitor),
            _ => self.begin_value(b, visitor),
        }
    }

    fn step_expect_comma_or_end<V: JsonVisitor>(
        &mut self,
        b: u8,
        visitor: &mut V,
    ) -> Result<(), ParseError> {
        if self.consume_ws(b) {
            return Ok(());
        }
        match b {
            b'/' => self.begin_comment(),
            b',' => {
                self.advance(1);
                match self.parent() {
                    ParseState::Object => self.state = ParseState::ExpectMemberName,
                    ParseState::Array => self.state = ParseState::ExpectValue,
                    _ => return self.fatal(ErrorKind::SyntaxError),
                }
                Ok(())
            }
            b'}' => self.close_object(visitor),
            b']' => self.close_array(visitor),
            _ => {
                match self.parent() {
                    ParseState::Object => {
                        self.offer(junk_kind(b, ErrorKind::ExpectedCommaOrRightBrace))?;
                    }
                    ParseState::Array => {
                        self.offer(junk_kind(b, ErrorKind::ExpectedCommaOrRightBracket))?;
                    }
                    _ => return self.fatal(ErrorKind::SyntaxError),
                }
                self.advance(1);
                Ok(())
            }
        }
    }

    fn step_expect_member_name<V: JsonVisitor>(
        &mut self,
        b: u8,
        visitor: &mut V,
        or_end: bool,
    ) -> Result<(), ParseError> {
        if self.consume_ws(b) {
            return Ok(());
        }
        match b {
            b'/' => self.begin_comment(),
            b'"' => {
                self.begin_position = self.position;
                self.advance(1);
                self.pending.clear();
                self.string_state = StringState::Text;
                self.push_state(ParseState::MemberName);
                self.state = ParseState::String;
                Ok(())
            }
            b'}' => {
                if !or_end && !self.options.allow_trailing_comma {
                    self.offer(ErrorKind::ExtraComma)?;
                }
                self.close_object(visitor)
            }
            b'\'' => {
                self.offer(ErrorKind::SingleQuote)?;
                self.advance(1);
                Ok(())
            }
            _ => {
                self.offer(junk_kind(b, ErrorKind::ExpectedKey))?;
                self.advance(1);
                Ok(())
            }
        }
    }

    fn step_expect_colon(&mut self, b: u8) -> Result<(), ParseError> {
        if self.consume_ws(b) {
            return Ok(());
        }
        match b {
            b'/' => self.begin_comment(),
            b':' => {
                self.advance(1);
                self.state = ParseState::ExpectValue;
                Ok(())
            }
            _ => {
                self.offer(junk_kind(b, ErrorKind::ExpectedColon))?;
                self.advance(1);
                Ok(())
            }
        }
    }

    fn step_expect_value_or_end<V: JsonVisitor>(
        &mut self,
        b: u8,
        visitor: &mut V,
    ) -> Result<(), ParseError> {
        if self.consume_ws(b) {
            return Ok(());
        }
        match b {
            b'/' => self.begin_comment(),
            b']' => self.close_array(visitor),
            b',' => {
                self.offer(ErrorKind::ExpectedValue)?;
                self.advance(1);
                Ok(())
            }
            _ => self.begin_value(b, visitor),
        }
    }

    fn step_expect_value<V: JsonVisitor>(
        &mut self,
        b: u8,
        visitor: &mut V,
    ) -> Result<(), ParseError> {
        if self.consume_ws(b) {
            return Ok(());
        }
        match b {
            b'/' => self.begin_comment(),
            b']' => {
                if self.parent() == ParseState::Array {
                    if !self.options.allow_trailing_comma {
                        self.offer(ErrorKind::ExtraComma)?;
                    }
                } else {
                    self.offer(ErrorKind::ExpectedValue)?;
                }
                self.close_array(visitor)
            }
            b'}' => {
                self.offer(ErrorKind::ExpectedValue)?;
                self.close_object(visitor)
            }
            _ => self.begin_value(b, visitor),
        }
    }

    fn step_comment(&mut self, b: u8) -> Result<(), ParseError> {
        match self.state {
            ParseState::Slash => match b {
                b'/' => {
                    self.advance(1);
                    self.state = ParseState::SlashSlash;
                    Ok(())
                }
                b'*' => {
                    self.advance(1);
                    self.state = ParseState::SlashStar;
                    Ok(())
                }
                _ => self.fatal(ErrorKind::SyntaxError),
            },
            ParseState::SlashSlash => match b {
                // The newline is left for the return state to consume, so
                // line accounting happens exactly once.
                b'\n' | b'\r' => {
                    self.state = self.pop_state();
                    Ok(())
                }
                _ => {
                    self.advance(1);
                    Ok(())
                }
            },
            ParseState::SlashStar => match b {
                b'*' => {
                    self.advance(1);
                    self.state = ParseState::SlashStarStar;
                    Ok(())
                }
                b'\n' => {
                    self.advance(1);
                    self.line += 1;
                    self.mark_position = self.position;
                    Ok(())
                }
                b'\r' => {
                    self.advance(1);
                    self.line += 1;
                    self.mark_position = self.position;
                    self.push_state(ParseState::SlashStar);
                    self.state = ParseState::Cr;
                    Ok(())
                }
                _ => {
                    self.advance(1);
                    Ok(())
                }
            },
            ParseState::SlashStarStar => match b {
                b'/' => {
                    self.advance(1);
                    self.state = self.pop_state();
                    Ok(())
                }
                // A run of stars may still end the comment.
                b'*' => {
                    self.advance(1);
                    Ok(())
                }
                _ => {
                    self.advance(1);
                    self.state = ParseState::SlashStar;
                    Ok(())
                }
            },
            _ => self.fatal(ErrorKind::SyntaxError),
        }
    }

    fn step_done(&mut self, b: u8) -> Result<(), ParseError> {
        if self.consume_ws(b) {
            return Ok(());
        }
        self.offer(ErrorKind::ExtraCharacter)?;
        self.advance(1);
        Ok(())
    }

    fn begin_value<V: JsonVisitor>(&mut self, b: u8, visitor: &mut V) -> Result<(), ParseError> {
        match b {
            b'{' => self.begin_object(visitor),
            b'[' => self.begin_array(visitor),
            b'"' => {
                self.begin_position = self.position;
                self.advance(1);
                self.pending.clear();
                self.string_state = StringState::Text;
                self.state = ParseState::String;
                Ok(())
            }
            b'-' => {
                self.begin_number(b, NumberState::Minus);
                Ok(())
            }
            b'0' => {
                self.begin_number(b, NumberState::Zero);
                Ok(())
            }
            b'1'..=b'9' => {
                self.begin_number(b, NumberState::Integer);
                Ok(())
            }
            b'n' | b't' | b'f' => self.begin_literal(b, visitor),
            b'\'' => {
                self.offer(ErrorKind::SingleQuote)?;
                self.advance(1);
                Ok(())
            }
            _ => {
                self.offer(junk_kind(b, ErrorKind::ExpectedValue))?;
                self.advance(1);
                Ok(())
            }
        }
    }

    fn begin_object<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        // Checked before the bracket is consumed so the error points at it.
        if self.level >= self.options.max_nesting_depth {
            return self.fatal(ErrorKind::MaxNestingDepthExceeded);
        }
        self.begin_position = self.position;
        self.advance(1);
        self.level += 1;
        self.push_state(ParseState::Object);
        self.state = ParseState::ExpectMemberNameOrEnd;
        let ctx = self.ctx();
        let res = visitor.begin_object(SemanticTag::None, &ctx);
        self.visit(res)
    }

    fn begin_array<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        if self.level >= self.options.max_nesting_depth {
            return self.fatal(ErrorKind::MaxNestingDepthExceeded);
        }
        self.begin_position = self.position;
        self.advance(1);
        self.level += 1;
        self.push_state(ParseState::Array);
        self.state = ParseState::ExpectValueOrEnd;
        let ctx = self.ctx();
        let res = visitor.begin_array(SemanticTag::None, &ctx);
        self.visit(res)
    }

    fn close_object<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        if self.parent() != ParseState::Object {
            if self.level == 0 {
                return self.fatal(ErrorKind::UnexpectedRightBrace);
            }
            return self.fatal(ErrorKind::ExpectedCommaOrRightBracket);
        }
        self.advance(1);
        self.pop_state();
        self.level -= 1;
        self.state = if self.level == 0 {
            ParseState::Accept
        } else {
            ParseState::ExpectCommaOrEnd
        };
        let ctx = self.ctx();
        let res = visitor.end_object(&ctx);
        self.visit(res)
    }

    fn close_array<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        if self.parent() != ParseState::Array {
            if self.level == 0 {
                return self.fatal(ErrorKind::UnexpectedRightBracket);
            }
            return self.fatal(ErrorKind::ExpectedCommaOrRightBrace);
        }
        self.advance(1);
        self.pop_state();
        self.level -= 1;
        self.state = if self.level == 0 {
            ParseState::Accept
        } else {
            ParseState::ExpectCommaOrEnd
        };
        let ctx = self.ctx();
        let res = visitor.end_array(&ctx);
        self.visit(res)
    }

    fn begin_number(&mut self, b: u8, sub: NumberState) {
        self.begin_position = self.position;
        self.pending.clear();
        self.pending.push(b);
        self.advance(1);
        self.number_state = sub;
        self.state = ParseState::Number;
    }

    fn begin_literal<V: JsonVisitor>(&mut self, b: u8, visitor: &mut V) -> Result<(), ParseError> {
        self.begin_position = self.position;
        let expected: &[u8] = match b {
            b'n' => b"null",
            b't' => b"true",
            _ => b"false",
        };
        let rest = &self.source[self.head..];
        if rest.len() >= expected.len() && &rest[..expected.len()] == expected {
            let kind = match b {
                b'n' => LiteralKind::Null,
                b't' => LiteralKind::True,
                _ => LiteralKind::False,
            };
            self.advance(expected.len());
            return self.end_literal_value(kind, visitor);
        }
        // Slow path: the keyword may be split across chunks or malformed.
        self.literal = ExpectedLiteralBuffer::new(b);
        self.advance(1);
        self.state = ParseState::Literal;
        Ok(())
    }

    fn lex_literal<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        while self.head < self.source.len() {
            let b = self.source[self.head];
            match self.literal.step(b) {
                Step::NeedMore => self.advance(1),
                Step::Done(kind) => {
                    self.advance(1);
                    return self.end_literal_value(kind, visitor);
                }
                Step::Reject => return self.fatal(ErrorKind::InvalidValue),
            }
        }
        Ok(())
    }

    fn end_literal_value<V: JsonVisitor>(
        &mut self,
        kind: LiteralKind,
        visitor: &mut V,
    ) -> Result<(), ParseError> {
        let ctx = self.ctx();
        let res = match kind {
            LiteralKind::Null => visitor.null_value(SemanticTag::None, &ctx),
            LiteralKind::True => visitor.bool_value(true, SemanticTag::None, &ctx),
            LiteralKind::False => visitor.bool_value(false, SemanticTag::None, &ctx),
        };
        self.after_value();
        self.visit(res)
    }

    fn lex_number<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        while self.head < self.source.len() {
            let b = self.source[self.head];
            match self.number_state {
                NumberState::Minus => match b {
                    b'0' => self.take_number_byte(b, NumberState::Zero),
                    b'1'..=b'9' => self.take_number_byte(b, NumberState::Integer),
                    _ => return self.fatal(ErrorKind::InvalidNumber),
                },
                NumberState::Zero => match b {
                    b'.' => self.take_number_byte(b, NumberState::FractionStart),
                    b'e' | b'E' => self.take_number_byte(b, NumberState::Exponent),
                    b'0'..=b'9' => return self.fatal(ErrorKind::LeadingZero),
                    _ => return self.end_integer_value(visitor),
                },
                NumberState::Integer => {
                    if b.is_ascii_digit() {
                        self.take_digit_run();
                    } else {
                        match b {
                            b'.' => self.take_number_byte(b, NumberState::FractionStart),
                            b'e' | b'E' => self.take_number_byte(b, NumberState::Exponent),
                            _ => return self.end_integer_value(visitor),
                        }
                    }
                }
                NumberState::FractionStart => match b {
                    b'0'..=b'9' => self.take_number_byte(b, NumberState::FractionDigits),
                    _ => return self.fatal(ErrorKind::InvalidNumber),
                },
                NumberState::FractionDigits => {
                    if b.is_ascii_digit() {
                        self.take_digit_run();
                    } else {
                        match b {
                            b'e' | b'E' => self.take_number_byte(b, NumberState::Exponent),
                            _ => return self.end_fraction_value(visitor),
                        }
                    }
                }
                NumberState::Exponent => match b {
                    b'+' | b'-' => self.take_number_byte(b, NumberState::ExponentSign),
                    b'0'..=b'9' => self.take_number_byte(b, NumberState::ExponentDigits),
                    _ => return self.fatal(ErrorKind::InvalidNumber),
                },
                NumberState::ExponentSign => match b {
                    b'0'..=b'9' => self.take_number_byte(b, NumberState::ExponentDigits),
                    _ => return self.fatal(ErrorKind::InvalidNumber),
                },
                NumberState::ExponentDigits => {
                    if b.is_ascii_digit() {
                        self.take_digit_run();
                    } else {
                        return self.end_fraction_value(visitor);
                    }
                }
            }
        }
        // Out of input mid-number; the lexeme so far is saved in `pending`.
        Ok(())
    }

    fn take_number_byte(&mut self, b: u8, next: NumberState) {
        self.pending.push(b);
        self.advance(1);
        self.number_state = next;
    }

    fn take_digit_run(&mut self) {
        let rest = &self.source[self.head..];
        let n = rest
            .iter()
            .position(|c| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        self.pending.extend_from_slice(&rest[..n]);
        self.advance(n);
    }

    fn end_integer_value<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        let buf = mem::take(&mut self.pending);
        let ctx = self.ctx();
        let Ok(text) = core::str::from_utf8(&buf) else {
            return self.fatal(ErrorKind::InvalidNumber);
        };
        let res = dispatch_number(visitor, numbers::classify_integer(text), &ctx);
        self.after_value();
        self.pending = buf;
        self.pending.clear();
        self.visit(res)
    }

    fn end_fraction_value<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        let buf = mem::take(&mut self.pending);
        let ctx = self.ctx();
        let Ok(text) = core::str::from_utf8(&buf) else {
            return self.fatal(ErrorKind::InvalidNumber);
        };
        let value = match numbers::classify_fraction(text, &self.options) {
            Ok(value) => value,
            Err(kind) => return self.fatal(kind),
        };
        let res = dispatch_number(visitor, value, &ctx);
        self.after_value();
        self.pending = buf;
        self.pending.clear();
        self.visit(res)
    }

    fn lex_string<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        while self.head < self.source.len() {
            match self.string_state {
                StringState::Text => {
                    let rest = &self.source[self.head..];
                    let Some(i) = rest.find_byteset(STRING_STOP) else {
                        // Whole remainder is verbatim content; save it and
                        // suspend until the next chunk.
                        self.pending.extend_from_slice(rest);
                        let n = rest.len();
                        self.advance(n);
                        return Ok(());
                    };
                    self.pending.extend_from_slice(&rest[..i]);
                    self.advance(i);
                    match self.source[self.head] {
                        b'"' => {
                            self.advance(1);
                            return self.end_string_value(visitor);
                        }
                        b'\\' => {
                            self.advance(1);
                            self.string_state = StringState::Escape;
                        }
                        b'\n' | b'\r' | b'\t' => {
                            self.offer(ErrorKind::IllegalCharacterInString)?;
                            self.advance(1);
                        }
                        _ => {
                            self.offer(ErrorKind::IllegalControlCharacter)?;
                            self.advance(1);
                        }
                    }
                }
                StringState::Escape => {
                    let decoded = match self.source[self.head] {
                        b'"' => b'"',
                        b'\\' => b'\\',
                        b'/' => b'/',
                        b'b' => 0x08,
                        b'f' => 0x0C,
                        b'n' => b'\n',
                        b'r' => b'\r',
                        b't' => b'\t',
                        b'u' => {
                            self.advance(1);
                            self.escape.reset();
                            self.string_state = StringState::EscapeUnicode;
                            continue;
                        }
                        _ => return self.fatal(ErrorKind::IllegalEscapedCharacter),
                    };
                    self.advance(1);
                    self.pending.push(decoded);
                    self.string_state = StringState::Text;
                }
                StringState::EscapeUnicode => match self.escape.feed(self.source[self.head]) {
                    EscapeStep::Invalid => return self.fatal(ErrorKind::InvalidUnicodeEscape),
                    EscapeStep::NeedMore => self.advance(1),
                    EscapeStep::Unit(unit) => {
                        self.advance(1);
                        if (0xD800..=0xDBFF).contains(&unit) {
                            self.high_surrogate = unit;
                            self.string_state = StringState::SurrogateBackslash;
                        } else if (0xDC00..=0xDFFF).contains(&unit) {
                            // A low surrogate with no preceding high half.
                            return self.fatal(ErrorKind::InvalidUnicodeEscape);
                        } else {
                            self.push_scalar(unit)?;
                            self.string_state = StringState::Text;
                        }
                    }
                },
                StringState::SurrogateBackslash => {
                    if self.source[self.head] == b'\\' {
                        self.advance(1);
                        self.string_state = StringState::SurrogateU;
                    } else {
                        return self.fatal(ErrorKind::ExpectedSurrogatePair);
                    }
                }
                StringState::SurrogateU => {
                    if self.source[self.head] == b'u' {
                        self.advance(1);
                        self.escape.reset();
                        self.string_state = StringState::SurrogateUnicode;
                    } else {
                        return self.fatal(ErrorKind::ExpectedSurrogatePair);
                    }
                }
                StringState::SurrogateUnicode => match self.escape.feed(self.source[self.head]) {
                    EscapeStep::Invalid => return self.fatal(ErrorKind::InvalidUnicodeEscape),
                    EscapeStep::NeedMore => self.advance(1),
                    EscapeStep::Unit(unit) => {
                        self.advance(1);
                        if !(0xDC00..=0xDFFF).contains(&unit) {
                            return self.fatal(ErrorKind::ExpectedSurrogatePair);
                        }
                        let cp = 0x10000 + ((self.high_surrogate - 0xD800) << 10) + (unit - 0xDC00);
                        self.push_scalar(cp)?;
                        self.string_state = StringState::Text;
                    }
                },
            }
        }
        Ok(())
    }

    fn push_scalar(&mut self, cp: u32) -> Result<(), ParseError> {
        let Some(c) = char::from_u32(cp) else {
            return self.fatal(ErrorKind::IllegalCodepoint);
        };
        let mut buf = [0u8; 4];
        self.pending.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    fn end_string_value<V: JsonVisitor>(&mut self, visitor: &mut V) -> Result<(), ParseError> {
        let buf = mem::take(&mut self.pending);
        let text = match core::str::from_utf8(&buf) {
            Ok(text) => text,
            Err(e) => {
                let kind = utf8::classify_invalid(&buf[e.valid_up_to()..]);
                return self.fatal(kind);
            }
        };
        let ctx = self.ctx();
        let res = if self.parent() == ParseState::MemberName {
            self.pop_state();
            self.state = ParseState::ExpectColon;
            visitor.key(text, &ctx)
        } else if let Some(d) = self.string_double(text) {
            self.after_value();
            visitor.double_value(d, SemanticTag::None, &ctx)
        } else {
            self.after_value();
            visitor.string_value(text, SemanticTag::None, &ctx)
        };
        self.pending = buf;
        self.pending.clear();
        self.visit(res)
    }

    fn string_double(&self, text: &str) -> Option<f64> {
        self.string_double_map
            .iter()
            .find(|(mapped, _)| mapped == text)
            .map(|&(_, d)| d)
    }

    fn begin_comment(&mut self) -> Result<(), ParseError> {
        if !self.options.allow_comments {
            return self.fatal(ErrorKind::IllegalComment);
        }
        self.advance(1);
        self.push_state(self.state);
        self.state = ParseState::Slash;
        Ok(())
    }

    fn consume_ws(&mut self, b: u8) -> bool {
        match b {
            b' ' | b'\t' => {
                self.advance(1);
                true
            }
            b'\n' => {
                self.advance(1);
                self.line += 1;
                self.mark_position = self.position;
                true
            }
            b'\r' => {
                self.advance(1);
                self.line += 1;
                self.mark_position = self.position;
                self.push_state(self.state);
                self.state = ParseState::Cr;
                true
            }
            _ => false,
        }
    }

    fn after_value(&mut self) {
        self.state = match self.parent() {
            ParseState::Object | ParseState::Array => ParseState::ExpectCommaOrEnd,
            _ => ParseState::Accept,
        };
    }

    fn advance(&mut self, n: usize) {
        self.head += n;
        self.position += n;
    }

    fn parent(&self) -> ParseState {
        self.state_stack.last().copied().unwrap_or(ParseState::Root)
    }

    fn push_state(&mut self, state: ParseState) {
        self.state_stack.push(state);
    }

    fn pop_state(&mut self) -> ParseState {
        self.state_stack.pop().unwrap_or(ParseState::Root)
    }

    fn ctx(&self) -> ParseContext {
        ParseContext {
            line: self.line,
            column: self.position - self.mark_position + 1,
            offset: self.position,
            begin_position: self.begin_position,
        }
    }

    fn visit(&mut self, res: VisitResult) -> Result<(), ParseError> {
        match res {
            Ok(()) => {
                self.more = !self.cursor_mode;
                Ok(())
            }
            Err(e) => {
                self.more = false;
                let ctx = self.ctx();
                Err(ParseError::new(ErrorSource::Visitor(e), &ctx))
            }
        }
    }

    fn offer(&mut self, kind: ErrorKind) -> Result<(), ParseError> {
        let ctx = self.ctx();
        match (self.policy)(kind, &ctx) {
            ErrorAction::Continue => Ok(()),
            ErrorAction::Stop => {
                self.more = false;
                Err(ParseError::new(ErrorSource::Syntax(kind), &ctx))
            }
        }
    }

    fn fatal(&mut self, kind: ErrorKind) -> Result<(), ParseError> {
        self.more = false;
        let ctx = self.ctx();
        Err(ParseError::new(ErrorSource::Syntax(kind), &ctx))
    }
}
