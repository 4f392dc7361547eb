use alloc::string::String;

/// Configuration for [`JsonParser`](crate::JsonParser).
///
/// All fields are plain data; construct with struct update syntax from
/// [`ParseOptions::default`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum container nesting depth. An opening `{` or `[` that would
    /// exceed this limit fails the parse before the container is entered.
    pub max_nesting_depth: usize,
    /// Accept `//` line comments and `/* */` block comments between tokens.
    pub allow_comments: bool,
    /// Accept a single comma before a closing `]` or `}`.
    pub allow_trailing_comma: bool,
    /// Report every number with a fractional part or exponent as its exact
    /// decimal text (tagged [`BigDec`](crate::SemanticTag::BigDec)) instead
    /// of a binary double.
    pub lossless_number: bool,
    /// Report numbers whose magnitude overflows a double as exact decimal
    /// text instead of an infinity.
    pub lossless_bignum: bool,
    /// String literal to report as a NaN double, for example `"NaN"`.
    pub nan_str: Option<String>,
    /// String literal to report as positive infinity.
    pub inf_str: Option<String>,
    /// String literal to report as negative infinity.
    pub neginf_str: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_nesting_depth: 1024,
            allow_comments: false,
            allow_trailing_comma: false,
            lossless_number: false,
            lossless_bignum: false,
            nan_str: None,
            inf_str: None,
            neginf_str: None,
        }
    }
}
