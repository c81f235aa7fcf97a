//! The default parser: string canonicalization plus dense ID allocation.

use std::sync::Arc;

use crate::document::FieldValue;
use crate::error::{PilumError, Result};

use super::{FieldValueParser, IdAllocator, PARSER_NAME_COMMON, TokenId};

/// Canonicalizes integers, booleans and text to a common string form, then
/// maps the string through a shared [`IdAllocator`]. `3` and `"3"` tokenize
/// identically.
#[derive(Debug)]
pub struct CommonParser {
    allocator: Arc<dyn IdAllocator>,
}

impl CommonParser {
    /// Create a parser backed by `allocator`.
    pub fn new(allocator: Arc<dyn IdAllocator>) -> Self {
        CommonParser { allocator }
    }

    fn canonical(value: &FieldValue) -> Result<String> {
        match value {
            FieldValue::Integer(i) => Ok(i.to_string()),
            FieldValue::Boolean(b) => Ok(b.to_string()),
            FieldValue::Text(s) => Ok(s.clone()),
            FieldValue::Float(_) => Err(PilumError::parse(
                value.to_string(),
                "float values are not supported by the common parser",
            )),
        }
    }
}

impl FieldValueParser for CommonParser {
    fn name(&self) -> &'static str {
        PARSER_NAME_COMMON
    }

    fn parse_value(&self, value: &FieldValue) -> Result<Vec<TokenId>> {
        let canonical = Self::canonical(value)?;
        Ok(vec![self.allocator.alloc(&canonical)])
    }

    fn parse_assign(&self, value: &FieldValue) -> Result<Vec<TokenId>> {
        let canonical = Self::canonical(value)?;
        // Unknown values cannot match anything; an empty token list is fine.
        Ok(self.allocator.find(&canonical).into_iter().collect())
    }
}
