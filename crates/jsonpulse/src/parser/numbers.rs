//! Classification of completed numeric lexemes into typed events.

use crate::{error::ErrorKind, options::ParseOptions};

/// The typed outcome of classifying one numeric literal.
///
/// Borrowed variants reference the literal text held by the parser; they are
/// reported as tagged string events so no precision is ever silently lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue<'a> {
    /// An integer that fits `i64`.
    Int64(i64),
    /// A non-negative integer above `i64::MAX` that fits `u64`.
    Uint64(u64),
    /// An integer outside machine range; the exact decimal text.
    BigInt(&'a str),
    /// A binary double, possibly infinite after overflow.
    Double(f64),
    /// An exact decimal; produced in lossless modes.
    BigDec(&'a str),
}

/// Classifies a literal with no fraction and no exponent.
///
/// Overflow is a representation fallback, not an error: the text is passed
/// through tagged as a big integer.
pub(crate) fn classify_integer(text: &str) -> NumberValue<'_> {
    if text.starts_with('-') {
        match text.parse::<i64>() {
            Ok(n) => NumberValue::Int64(n),
            Err(_) => NumberValue::BigInt(text),
        }
    } else {
        match text.parse::<u64>() {
            Ok(n) => match i64::try_from(n) {
                Ok(signed) => NumberValue::Int64(signed),
                Err(_) => NumberValue::Uint64(n),
            },
            Err(_) => NumberValue::BigInt(text),
        }
    }
}

/// Classifies a literal carrying a fraction or an exponent.
pub(crate) fn classify_fraction<'a>(
    text: &'a str,
    options: &ParseOptions,
) -> Result<NumberValue<'a>, ErrorKind> {
    if options.lossless_number {
        return Ok(NumberValue::BigDec(text));
    }
    match text.parse::<f64>() {
        Ok(d) if d.is_infinite() && options.lossless_bignum => Ok(NumberValue::BigDec(text)),
        Ok(d) => Ok(NumberValue::Double(d)),
        Err(_) => Err(ErrorKind::InvalidNumber),
    }
}
