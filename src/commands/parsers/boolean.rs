//! `true` / `false` arguments

use super::{peek_word, read_word};
use crate::commands::cursor::Cursor;
use crate::commands::error::ParseError;
use crate::commands::suggestion::Suggestion;
use crate::commands::value::Value;
use std::fmt;

const LITERALS: [&str; 2] = ["true", "false"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanParser;

impl BooleanParser {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn parse_token(&self, cursor: &mut Cursor<'_>) -> Result<Value, ParseError> {
        match read_word(cursor) {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(ParseError::new(format!("'{}' is not a valid boolean", other))),
        }
    }

    /// The literals starting with whatever has been typed so far
    pub(crate) fn suggest_token(&self, cursor: &Cursor<'_>) -> Vec<Suggestion> {
        let typed = peek_word(cursor);
        LITERALS
            .iter()
            .filter(|literal| literal.starts_with(typed))
            .map(|literal| Suggestion::plain(*literal))
            .collect()
    }
}

impl fmt::Display for BooleanParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bool")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exact_literals() {
        let parser = BooleanParser::new();
        assert_eq!(parser.parse_token(&mut Cursor::new("true")), Ok(Value::Bool(true)));
        assert_eq!(parser.parse_token(&mut Cursor::new("false x")), Ok(Value::Bool(false)));
        assert_eq!(
            parser.parse_token(&mut Cursor::new("True")).unwrap_err().message(),
            "'True' is not a valid boolean"
        );
        assert!(parser.parse_token(&mut Cursor::new("yes")).is_err());
    }

    #[test]
    fn test_suggests_by_prefix() {
        let parser = BooleanParser::new();
        let texts = |input: &str| -> Vec<String> {
            parser
                .suggest_token(&Cursor::new(input))
                .iter()
                .map(|s| s.text().to_string())
                .collect()
        };
        assert_eq!(texts(""), vec!["true", "false"]);
        assert_eq!(texts("f"), vec!["false"]);
        assert!(texts("x").is_empty());
    }
}
