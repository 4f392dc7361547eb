//! Accumulator for four-digit `\uXXXX` escape units.
//!
//! The accumulator takes one ASCII hexadecimal digit per call and yields the
//! 16-bit code unit once four digits are in. It deliberately produces a raw
//! `u32` rather than a `char`: the unit may be half of a surrogate pair, and
//! pairing is the caller's job.

/// What happened after feeding one more byte into the accumulator?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EscapeStep {
    /// Byte was a hex digit, but fewer than four have arrived.
    NeedMore,
    /// Fourth hex digit arrived; here is the decoded code unit.
    Unit(u32),
    /// Byte was not an ASCII hex digit.
    Invalid,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct UnicodeEscapeAcc {
    acc: u32,
    len: u8,
}

impl UnicodeEscapeAcc {
    pub(crate) fn new() -> Self {
        UnicodeEscapeAcc { acc: 0, len: 0 }
    }

    pub(crate) fn reset(&mut self) {
        self.acc = 0;
        self.len = 0;
    }

    /// Feed the next input byte. The accumulator resets itself after
    /// yielding a unit; it does not reset on `Invalid`.
    pub(crate) fn feed(&mut self, b: u8) -> EscapeStep {
        let digit = match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'a'..=b'f' => u32::from(b - b'a') + 10,
            b'A'..=b'F' => u32::from(b - b'A') + 10,
            _ => return EscapeStep::Invalid,
        };
        self.acc = (self.acc << 4) | digit;
        self.len += 1;
        if self.len == 4 {
            let unit = self.acc;
            self.reset();
            EscapeStep::Unit(unit)
        } else {
            EscapeStep::NeedMore
        }
    }
}
