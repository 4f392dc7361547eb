//! Classification of malformed UTF-8 found in a finished string token.
//!
//! String bytes are collected verbatim and validated once, when the closing
//! quote arrives. On failure, the bytes at the first invalid position are
//! inspected to name the specific defect instead of a generic syntax error.

use crate::error::ErrorKind;

/// Classifies the defect at the start of `suffix`, the remainder of a string
/// token beginning at its first invalid byte.
pub(crate) fn classify_invalid(suffix: &[u8]) -> ErrorKind {
    let Some(&lead) = suffix.first() else {
        return ErrorKind::ExpectedContinuationByte;
    };
    let next = suffix.get(1).copied();
    match lead {
        // A continuation byte with no lead byte before it.
        0x80..=0xBF => ErrorKind::ExpectedContinuationByte,
        // Two-byte sequences that can only encode U+0000..U+007F.
        0xC0 | 0xC1 => ErrorKind::OverlongUtf8Sequence,
        // E0 followed by 80..9F would re-encode a two-byte range.
        0xE0 if next.is_some_and(|b| (0x80..0xA0).contains(&b)) => ErrorKind::OverlongUtf8Sequence,
        // ED A0..BF encodes U+D800..U+DFFF.
        0xED if next.is_some_and(|b| (0xA0..=0xBF).contains(&b)) => ErrorKind::IllegalSurrogateValue,
        // F0 followed by 80..8F would re-encode a three-byte range.
        0xF0 if next.is_some_and(|b| (0x80..0x90).contains(&b)) => ErrorKind::OverlongUtf8Sequence,
        // F4 90.. encodes above U+10FFFF.
        0xF4 if next.is_some_and(|b| b >= 0x90) => ErrorKind::IllegalCodepoint,
        0xF5..=0xFF => ErrorKind::IllegalCodepoint,
        _ => ErrorKind::ExpectedContinuationByte,
    }
}
