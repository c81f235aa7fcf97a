//! Numeric parser: integers map to their two's-complement `u64` image.

use crate::document::FieldValue;
use crate::error::{PilumError, Result};

use super::{FieldValueParser, PARSER_NAME_NUMBER, TokenId};

/// Parses integers (and integral text) without any allocation table; the
/// token is the value itself. Build and query sides are symmetric.
#[derive(Debug, Default)]
pub struct NumberParser;

impl NumberParser {
    fn token_of(value: &FieldValue) -> Result<TokenId> {
        match value {
            FieldValue::Integer(i) => Ok(*i as TokenId),
            FieldValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(|i| i as TokenId)
                .map_err(|err| PilumError::parse(value.to_string(), err.to_string())),
            other => Err(PilumError::parse(
                other.to_string(),
                "number parser accepts integers and integral text only",
            )),
        }
    }
}

impl FieldValueParser for NumberParser {
    fn name(&self) -> &'static str {
        PARSER_NAME_NUMBER
    }

    fn parse_value(&self, value: &FieldValue) -> Result<Vec<TokenId>> {
        Ok(vec![Self::token_of(value)?])
    }

    fn parse_assign(&self, value: &FieldValue) -> Result<Vec<TokenId>> {
        Ok(vec![Self::token_of(value)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_and_text_agree() {
        let parser = NumberParser;
        let from_int = parser.parse_value(&FieldValue::Integer(-7)).unwrap();
        let from_text = parser.parse_value(&FieldValue::Text(" -7 ".into())).unwrap();
        assert_eq!(from_int, from_text);
    }

    #[test]
    fn test_non_numeric_rejected() {
        let parser = NumberParser;
        assert!(parser.parse_value(&FieldValue::Text("sh".into())).is_err());
        assert!(parser.parse_value(&FieldValue::Boolean(true)).is_err());
        assert!(parser.parse_assign(&FieldValue::Float(0.5)).is_err());
    }
}
