//! String arguments: single words, quoted spans and greedy remainders

use super::{read_quoted, read_word};
use crate::commands::cursor::Cursor;
use crate::commands::error::{ParseError, SetupError};
use crate::commands::value::Value;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a string argument is lexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringMode {
    /// The next run of non-space chars
    Word,
    /// A `"..."` span if the token starts with one, otherwise a word
    Quoted,
    /// Everything up to the end of input
    Greedy,
}

#[derive(Debug, Clone)]
pub struct StringParser {
    mode: StringMode,
    pattern: Option<Pattern>,
}

#[derive(Debug, Clone)]
struct Pattern {
    source: String,
    anchored: Regex,
}

impl StringParser {
    pub fn new(mode: StringMode) -> Self {
        Self {
            mode,
            pattern: None,
        }
    }

    pub fn word() -> Self {
        Self::new(StringMode::Word)
    }

    pub fn quoted() -> Self {
        Self::new(StringMode::Quoted)
    }

    pub fn greedy() -> Self {
        Self::new(StringMode::Greedy)
    }

    /// Require the whole value to match `pattern`.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, SetupError> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern))?;
        self.pattern = Some(Pattern {
            source: pattern.to_string(),
            anchored,
        });
        Ok(self)
    }

    pub fn mode(&self) -> StringMode {
        self.mode
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(|p| p.source.as_str())
    }

    pub(crate) fn parse_token(&self, cursor: &mut Cursor<'_>) -> Result<Value, ParseError> {
        let quoted = match self.mode {
            StringMode::Quoted => read_quoted(cursor),
            _ => None,
        };
        let value = match (quoted, self.mode) {
            (Some(_), _) if !matches!(cursor.peek(), None | Some(' ')) => {
                return Err(ParseError::new("Expected a space after the closing quote."));
            }
            (Some(content), _) => content,
            (None, StringMode::Greedy) => cursor.consume_remainder(),
            (None, _) => {
                let word = read_word(cursor);
                if word.is_empty() {
                    return Err(ParseError::new("Expected a word, but got nothing."));
                }
                word
            }
        };
        self.validate(value)?;
        Ok(Value::String(value.to_string()))
    }

    fn validate(&self, value: &str) -> Result<(), ParseError> {
        match &self.pattern {
            Some(pattern) if !pattern.anchored.is_match(value) => Err(ParseError::new(format!(
                "'{}' does not match the required pattern '{}'",
                value, pattern.source
            ))),
            _ => Ok(()),
        }
    }
}

impl PartialEq for StringParser {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.pattern() == other.pattern()
    }
}

impl fmt::Display for StringParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.mode {
            StringMode::Word => "word",
            StringMode::Quoted => "string",
            StringMode::Greedy => "greedy",
        };
        match self.pattern() {
            Some(pattern) => write!(f, "{}({})", name, pattern),
            None => write!(f, "{}", name),
        }
    }
}
