//! Declarative command paths from usage strings
//!
//!     A usage string describes one command path, tokens separated by spaces:
//!
//!         greet <name> [times:int] loudly
//!
//!     - `word` is a literal that has to be typed as is
//!     - `<id>` / `<id:parser>` is a required argument
//!     - `[id]` / `[id:parser]` is an optional argument
//!
//!     Parser names are resolved against a [`ParserRegistry`]; arguments without one use the
//!     `string` parser. Everything is resolved when the path is built, nothing is looked up
//!     while parsing.

use super::error::SetupError;
use super::executable::Executable;
use super::parsers::{BooleanParser, NumberParser, StringParser, ValueParser};
use super::tree::CommandNode;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static REQUIRED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<([^<>]*)>$").expect("valid required pattern"));
static OPTIONAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([^\[\]]*)\]$").expect("valid optional pattern"));

const DEFAULT_PARSER: &str = "string";

/// Named value parsers available to usage strings
pub struct ParserRegistry<C> {
    parsers: HashMap<String, ValueParser<C>>,
}

impl<C> ParserRegistry<C> {
    /// A registry without any parsers
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, parser: impl Into<ValueParser<C>>) -> &mut Self {
        self.parsers.insert(name.into(), parser.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ValueParser<C>> {
        self.parsers.get(name)
    }

    /// Build the node path described by `usage`, ending in a leaf for `executable`.
    pub fn path<T>(&self, usage: &str, executable: Executable<C, T>) -> Result<CommandNode<C, T>, SetupError> {
        let nodes = usage
            .split_whitespace()
            .map(|token| self.node(usage, token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CommandNode::path(nodes, executable))
    }

    fn node<T>(&self, usage: &str, token: &str) -> Result<CommandNode<C, T>, SetupError> {
        let (spec, optional) = match (REQUIRED.captures(token), OPTIONAL.captures(token)) {
            (Some(captures), _) => (captures.get(1).map_or("", |m| m.as_str()), false),
            (None, Some(captures)) => (captures.get(1).map_or("", |m| m.as_str()), true),
            (None, None) => {
                if token.contains(['<', '>', '[', ']']) {
                    return Err(invalid(usage, format!("malformed token '{}'", token)));
                }
                return Ok(CommandNode::literal(token));
            }
        };

        let (id, parser_name) = match spec.split_once(':') {
            Some((id, parser)) => (id, parser),
            None => (spec, DEFAULT_PARSER),
        };
        if id.is_empty() {
            return Err(invalid(usage, format!("argument '{}' has no id", token)));
        }
        let parser = self.get(parser_name).ok_or_else(|| SetupError::UnknownParser {
            name: parser_name.to_string(),
        })?;
        Ok(CommandNode::argument(id, parser.clone(), optional))
    }
}

fn invalid(usage: &str, reason: String) -> SetupError {
    SetupError::InvalidUsage {
        usage: usage.to_string(),
        reason,
    }
}

impl<C> Default for ParserRegistry<C> {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("string", StringParser::quoted())
            .register("word", StringParser::word())
            .register("greedy", StringParser::greedy())
            .register("bool", BooleanParser::new())
            .register("byte", NumberParser::i8())
            .register("short", NumberParser::i16())
            .register("int", NumberParser::i32())
            .register("long", NumberParser::i64())
            .register("float", NumberParser::f32())
            .register("double", NumberParser::f64());
        registry
    }
}
