//! Value parsers
//!
//!     A value parser turns the token at the cursor into a typed [`Value`]. Parsers must
//!     consume exactly one token: after a successful parse the next char has to be a space or
//!     the end of input, and the cursor must never move backwards. The engine checks both and
//!     treats a violation as a [`SetupError`](super::error::SetupError).
//!
//!     Independently of parsing, every parser can offer [`Suggestion`]s for the token at a
//!     position, which is what drives autocomplete.
//!
//!     The built-in parsers cover strings ([`StringParser`]), numbers ([`NumberParser`]) and
//!     booleans ([`BooleanParser`]). Anything else plugs in through the [`ArgumentParser`]
//!     trait and [`ValueParser::custom`].

pub mod boolean;
pub mod number;
pub mod string;

pub use boolean::BooleanParser;
pub use number::{NumberKind, NumberParser};
pub use string::{StringMode, StringParser};

use super::cursor::Cursor;
use super::error::ParseError;
use super::suggestion::Suggestion;
use super::value::{Arguments, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^ ]*").expect("valid word pattern"));
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.*?)""#).expect("valid quote pattern"));

/// A parser for argument values
///
/// `C` is the caller's context type, handed through unchanged so parsers can look things up
/// (e.g. the names of online players) while parsing or suggesting.
pub trait ArgumentParser<C>: Send + Sync {
    fn parse(&self, context: &C, cursor: &mut Cursor<'_>) -> Result<Value, ParseError>;

    /// Suggestions for the token starting at the cursor position; must not move the cursor
    fn suggest(&self, _context: &C, _arguments: &Arguments, _cursor: &Cursor<'_>) -> Vec<Suggestion> {
        Vec::new()
    }

    /// Short name used in diagnostics
    fn describe(&self) -> String;
}

/// The parser attached to an argument node
pub enum ValueParser<C> {
    String(StringParser),
    Number(NumberParser),
    Boolean(BooleanParser),
    Custom(Arc<dyn ArgumentParser<C>>),
}

impl<C> ValueParser<C> {
    pub fn custom(parser: impl ArgumentParser<C> + 'static) -> Self {
        ValueParser::Custom(Arc::new(parser))
    }

    pub fn parse(&self, context: &C, cursor: &mut Cursor<'_>) -> Result<Value, ParseError> {
        match self {
            ValueParser::String(parser) => parser.parse_token(cursor),
            ValueParser::Number(parser) => parser.parse_token(cursor),
            ValueParser::Boolean(parser) => parser.parse_token(cursor),
            ValueParser::Custom(parser) => parser.parse(context, cursor),
        }
    }

    pub fn suggest(&self, context: &C, arguments: &Arguments, cursor: &Cursor<'_>) -> Vec<Suggestion> {
        match self {
            ValueParser::String(_) | ValueParser::Number(_) => Vec::new(),
            ValueParser::Boolean(parser) => parser.suggest_token(cursor),
            ValueParser::Custom(parser) => parser.suggest(context, arguments, cursor),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ValueParser::String(parser) => parser.to_string(),
            ValueParser::Number(parser) => parser.to_string(),
            ValueParser::Boolean(parser) => parser.to_string(),
            ValueParser::Custom(parser) => parser.describe(),
        }
    }
}

impl<C> Clone for ValueParser<C> {
    fn clone(&self) -> Self {
        match self {
            ValueParser::String(parser) => ValueParser::String(parser.clone()),
            ValueParser::Number(parser) => ValueParser::Number(parser.clone()),
            ValueParser::Boolean(parser) => ValueParser::Boolean(parser.clone()),
            ValueParser::Custom(parser) => ValueParser::Custom(Arc::clone(parser)),
        }
    }
}

/// Built-in parsers compare by configuration, custom parsers by identity.
impl<C> PartialEq for ValueParser<C> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueParser::String(a), ValueParser::String(b)) => a == b,
            (ValueParser::Number(a), ValueParser::Number(b)) => a == b,
            (ValueParser::Boolean(a), ValueParser::Boolean(b)) => a == b,
            (ValueParser::Custom(a), ValueParser::Custom(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl<C> fmt::Debug for ValueParser<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueParser({})", self.describe())
    }
}

impl<C> From<StringParser> for ValueParser<C> {
    fn from(parser: StringParser) -> Self {
        ValueParser::String(parser)
    }
}

impl<C> From<NumberParser> for ValueParser<C> {
    fn from(parser: NumberParser) -> Self {
        ValueParser::Number(parser)
    }
}

impl<C> From<BooleanParser> for ValueParser<C> {
    fn from(parser: BooleanParser) -> Self {
        ValueParser::Boolean(parser)
    }
}

/// Read the next maximal run of chars other than ' ' (possibly empty). Tabs belong to the word.
pub fn read_word<'a>(cursor: &mut Cursor<'a>) -> &'a str {
    cursor
        .read_pattern(&WORD)
        .and_then(|captures| captures.get(0))
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// Read a `"..."` span and return its content, or `None` without moving the cursor.
pub fn read_quoted<'a>(cursor: &mut Cursor<'a>) -> Option<&'a str> {
    cursor
        .read_pattern(&QUOTED)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// The word at the cursor, without consuming it
pub fn peek_word<'a>(cursor: &Cursor<'a>) -> &'a str {
    let mut lookahead = cursor.clone();
    read_word(&mut lookahead)
}
