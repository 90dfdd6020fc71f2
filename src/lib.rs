//! # command-tree
//!
//! A command-string matching engine.
//!
//! Commands are described as a tree of literal and typed-argument nodes. Parsing a raw input
//! string finds every path through the tree the input satisfies, binds the parsed argument
//! values and records, for every path that could not continue, where and why it stopped along
//! with suggestions for that position. Callers pick the match with the highest priority, or show
//! the deepest failure and its suggestions.
//!
//! See the [commands module](commands) for the layout.

pub mod commands;

pub use commands::{
    ArgumentParser, Arguments, BooleanParser, CacheKey, CommandNode, CommandTree, Commands,
    CommandsConfig, Completion, Cursor, Executable, NodeKind, NumberParser, Outcome, ParseError,
    ParseFailure, ParseMatch, ParseResult, ParserRegistry, Segment, SegmentNode, SetupError,
    StringParser, Suggestion, Value, ValueParser,
};
