//! Value parser implementations for field tokenization.
//!
//! Parsers turn opaque field values into `u64` token IDs. The document side
//! (`parse_value`) and the query side (`parse_assign`) may differ per parser:
//! a range parser can emit covering interval IDs at build time and a single
//! point ID at query time. The two stock parsers are symmetric.
//!
//! # Available Parsers
//!
//! - [`common::CommonParser`] - canonicalizes values to strings and allocates
//!   dense IDs from a shared [`IdAllocator`] (the `"default"` parser)
//! - [`number::NumberParser`] - maps integers to their `u64` image directly

use std::fmt::Debug;
use std::sync::Arc;

use crate::document::FieldValue;
use crate::error::{PilumError, Result};

pub mod allocator;
pub mod common;
pub mod number;

pub use allocator::{IdAllocator, StringIdAllocator};
pub use common::CommonParser;
pub use number::NumberParser;

/// Token identifier assigned by a value parser. Equal tokens mean equal
/// values within one field.
pub type TokenId = u64;

/// Registry name of the default parser.
pub const PARSER_NAME_DEFAULT: &str = "default";
/// Registry name of the string-canonicalizing parser.
pub const PARSER_NAME_COMMON: &str = "common";
/// Registry name of the numeric parser.
pub const PARSER_NAME_NUMBER: &str = "number";

/// Trait for field value parsers.
///
/// Parsers are shared by the builder and the built index, so implementations
/// must be `Send + Sync`; `parse_assign` runs on the concurrent query path
/// and must not mutate shared state.
pub trait FieldValueParser: Send + Sync + Debug {
    /// Get the registry name of this parser.
    fn name(&self) -> &'static str;

    /// Tokenize a document-side value into token IDs.
    fn parse_value(&self, value: &FieldValue) -> Result<Vec<TokenId>>;

    /// Tokenize a query-side value into token IDs.
    ///
    /// A value never seen at build time yields an empty list: it can match
    /// nothing, which is not an error.
    fn parse_assign(&self, value: &FieldValue) -> Result<Vec<TokenId>>;
}

/// Construct the named parser, sharing `allocator` where the parser needs
/// dense string IDs. Unknown names are a config error.
pub fn new_parser(
    name: &str,
    allocator: &Arc<dyn IdAllocator>,
) -> Result<Box<dyn FieldValueParser>> {
    match name {
        PARSER_NAME_DEFAULT | PARSER_NAME_COMMON => {
            Ok(Box::new(CommonParser::new(allocator.clone())))
        }
        PARSER_NAME_NUMBER => Ok(Box::new(NumberParser)),
        other => Err(PilumError::config(format!("unknown parser: {other}"))),
    }
}
