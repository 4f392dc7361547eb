/// Semantic annotation attached to an emitted value.
///
/// A tag distinguishes a value's intended exact representation from its
/// default one. The parser produces [`SemanticTag::BigInt`] and
/// [`SemanticTag::BigDec`] for numeric literals that cannot (or, in lossless
/// mode, must not) be narrowed into machine types; the remaining tags exist
/// for consumers that re-encode events into richer wire formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SemanticTag {
    /// No semantic annotation; the carried value is exact as-is.
    #[default]
    None,
    /// The text of the event is an arbitrary-precision decimal integer.
    BigInt,
    /// The text of the event is an arbitrary-precision decimal number.
    BigDec,
    /// The text of the event is a hexadecimal floating point number.
    BigFloat,
    /// The text of the event is an RFC 3339 date-time.
    DateTime,
    /// The number of seconds since the POSIX epoch.
    EpochSecond,
    /// The number of milliseconds since the POSIX epoch.
    EpochMilli,
    /// The number of nanoseconds since the POSIX epoch.
    EpochNano,
    /// The bytes of the event are base16-encoded text.
    Base16,
    /// The bytes of the event are base64-encoded text.
    Base64,
    /// The bytes of the event are base64url-encoded text.
    Base64Url,
}

impl SemanticTag {
    /// Returns `true` if the tag is [`SemanticTag::None`].
    #[must_use]
    pub fn is_none(self) -> bool {
        matches!(self, SemanticTag::None)
    }
}
