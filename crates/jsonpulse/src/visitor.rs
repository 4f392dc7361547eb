//! The push-side event protocol.
//!
//! A [`JsonVisitor`] receives one call per structural token or scalar the
//! parser completes. Every method has a default body returning `Ok(())`, so
//! an implementation only overrides the events it cares about. Returning
//! `Err` from any method aborts the parse with
//! [`ErrorSource::Visitor`](crate::ErrorSource::Visitor).

use crate::{SemanticTag, context::ParseContext, error::VisitError};

/// Result of a single visitor callback.
pub type VisitResult = Result<(), VisitError>;

/// A borrowed view of a homogeneous numeric array, delivered in one call by
/// producers that know the element type up front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedArrayView<'a> {
    /// 64-bit floats.
    F64(&'a [f64]),
    /// Signed 64-bit integers.
    I64(&'a [i64]),
    /// Unsigned 64-bit integers.
    U64(&'a [u64]),
}

impl TypedArrayView<'_> {
    /// Number of elements in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            TypedArrayView::F64(v) => v.len(),
            TypedArrayView::I64(v) => v.len(),
            TypedArrayView::U64(v) => v.len(),
        }
    }

    /// Returns `true` if the view holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receiver of parse events.
///
/// The parser invokes methods in document order. Between a `begin_object`
/// and its matching `end_object` every `key` call is followed by exactly one
/// value event (scalar or nested container); arrays receive value events
/// with no interleaved keys.
#[allow(unused_variables)]
pub trait JsonVisitor {
    /// An object of unknown length begins.
    fn begin_object(&mut self, tag: SemanticTag, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// An object whose member count is known up front begins.
    ///
    /// Defaults to [`JsonVisitor::begin_object`].
    fn begin_object_with_length(
        &mut self,
        length: usize,
        tag: SemanticTag,
        ctx: &ParseContext,
    ) -> VisitResult {
        self.begin_object(tag, ctx)
    }

    /// The current object ends.
    fn end_object(&mut self, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// An array of unknown length begins.
    fn begin_array(&mut self, tag: SemanticTag, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// An array whose element count is known up front begins.
    ///
    /// Defaults to [`JsonVisitor::begin_array`].
    fn begin_array_with_length(
        &mut self,
        length: usize,
        tag: SemanticTag,
        ctx: &ParseContext,
    ) -> VisitResult {
        self.begin_array(tag, ctx)
    }

    /// The current array ends.
    fn end_array(&mut self, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// An object member key.
    fn key(&mut self, name: &str, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// A string value.
    fn string_value(&mut self, value: &str, tag: SemanticTag, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// A byte-string value.
    fn byte_string_value(
        &mut self,
        value: &[u8],
        tag: SemanticTag,
        ctx: &ParseContext,
    ) -> VisitResult {
        Ok(())
    }

    /// A byte-string value carrying a raw numeric tag from the wire format.
    ///
    /// Defaults to [`JsonVisitor::byte_string_value`] with
    /// [`SemanticTag::None`].
    fn byte_string_value_with_raw_tag(
        &mut self,
        value: &[u8],
        raw_tag: u64,
        ctx: &ParseContext,
    ) -> VisitResult {
        self.byte_string_value(value, SemanticTag::None, ctx)
    }

    /// A signed 64-bit integer value.
    fn int64_value(&mut self, value: i64, tag: SemanticTag, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// An unsigned 64-bit integer value.
    fn uint64_value(&mut self, value: u64, tag: SemanticTag, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// A double value.
    fn double_value(&mut self, value: f64, tag: SemanticTag, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// A boolean value.
    fn bool_value(&mut self, value: bool, tag: SemanticTag, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// A null value.
    fn null_value(&mut self, tag: SemanticTag, ctx: &ParseContext) -> VisitResult {
        Ok(())
    }

    /// A packed numeric array.
    ///
    /// The default expands the view into `begin_array_with_length`, one
    /// scalar event per element, and `end_array`.
    fn typed_array(
        &mut self,
        view: TypedArrayView<'_>,
        tag: SemanticTag,
        ctx: &ParseContext,
    ) -> VisitResult {
        self.begin_array_with_length(view.len(), tag, ctx)?;
        match view {
            TypedArrayView::F64(values) => {
                for &v in values {
                    self.double_value(v, SemanticTag::None, ctx)?;
                }
            }
            TypedArrayView::I64(values) => {
                for &v in values {
                    self.int64_value(v, SemanticTag::None, ctx)?;
                }
            }
            TypedArrayView::U64(values) => {
                for &v in values {
                    self.uint64_value(v, SemanticTag::None, ctx)?;
                }
            }
        }
        self.end_array(ctx)
    }

    /// The event stream for one document is complete; release any buffered
    /// output.
    fn flush(&mut self) {}
}

/// A visitor that ignores every event. Useful for validation-only parses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardVisitor;

impl JsonVisitor for DiscardVisitor {}
