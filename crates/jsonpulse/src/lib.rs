//! An incremental, resumable, push-based JSON parser.
//!
//! Input arrives in arbitrary byte chunks via [`JsonParser::feed`]; the
//! parser walks the accumulated bytes and pushes one callback per completed
//! token into a caller-supplied [`JsonVisitor`]. Parsing suspends losslessly
//! at any chunk boundary, including mid-string, mid-number and mid-escape,
//! and resumes when more input is fed.
//!
//! ```rust
//! use jsonpulse::{DiscardVisitor, JsonParser, ParseOptions};
//!
//! let mut parser = JsonParser::new(ParseOptions::default());
//! let mut visitor = DiscardVisitor;
//! parser.feed(br#"{"a": [1, 2.5, tr"#);
//! parser.parse_step(&mut visitor).unwrap();
//! parser.feed(br#"ue]}"#);
//! parser.finish(&mut visitor).unwrap();
//! assert!(parser.is_complete());
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod context;
mod error;
mod options;
mod parser;
mod tag;
mod visitor;

pub use context::ParseContext;
pub use error::{ErrorAction, ErrorKind, ErrorPolicy, ErrorSource, ParseError, VisitError};
pub use options::ParseOptions;
pub use parser::{JsonParser, NumberValue};
pub use tag::SemanticTag;
pub use visitor::{DiscardVisitor, JsonVisitor, TypedArrayView, VisitResult};
