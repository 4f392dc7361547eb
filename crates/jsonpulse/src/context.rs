/// Position snapshot handed to every visitor call and error-policy
/// invocation.
///
/// Values describe the input consumed so far: `line` starts at 1, `column`
/// is the 1-based byte column on the current line, and `offset` is the
/// absolute byte offset from the start of the stream. `begin_position` is
/// the offset at which the value currently being reported began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    /// 1-based line number.
    pub line: usize,
    /// 1-based byte column on the current line.
    pub column: usize,
    /// Absolute byte offset from the start of the input.
    pub offset: usize,
    /// Byte offset at which the current token began.
    pub begin_position: usize,
}
