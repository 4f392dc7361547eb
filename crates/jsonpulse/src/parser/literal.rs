//! Byte-at-a-time matcher for the keyword literals `null`, `true` and
//! `false`, used when a literal straddles a chunk boundary.

/// Which keyword the matcher is expecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LiteralKind {
    Null,
    True,
    False,
}

/// What happened after feeding one more byte into the literal matcher?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched *and* we consumed the last byte of the literal.
    Done(LiteralKind),
    /// Byte did **not** match the expected byte.
    Reject,
}

/// `None`  ➜  we are **not** in the middle of a literal
/// `Some`  ➜  `(remaining_bytes, kind)` while matching
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer(Option<(&'static [u8], LiteralKind)>);

impl ExpectedLiteralBuffer {
    /// No literal is in flight
    pub(crate) fn none() -> Self {
        ExpectedLiteralBuffer(None)
    }

    /// Start matching after the *first* byte (`n`, `t`, or `f`)
    pub(crate) fn new(first: u8) -> Self {
        match first {
            b'n' => ExpectedLiteralBuffer(Some((b"ull", LiteralKind::Null))),
            b't' => ExpectedLiteralBuffer(Some((b"rue", LiteralKind::True))),
            b'f' => ExpectedLiteralBuffer(Some((b"alse", LiteralKind::False))),
            _ => ExpectedLiteralBuffer::none(),
        }
    }

    /// Give the matcher the next input byte and learn what to do next.
    pub(crate) fn step(&mut self, b: u8) -> Step {
        // If we are not in the middle of a literal, any byte is a reject
        let Some((bytes, kind)) = self.0.take() else {
            return Step::Reject;
        };

        match bytes.split_first() {
            Some((expected, rest)) if *expected == b => {
                if rest.is_empty() {
                    Step::Done(kind)
                } else {
                    self.0 = Some((rest, kind));
                    Step::NeedMore
                }
            }
            _ => {
                // Mismatch; restore the state we took at the top
                self.0 = Some((bytes, kind));
                Step::Reject
            }
        }
    }
}
