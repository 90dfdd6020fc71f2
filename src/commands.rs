//! Command matching
//!
//! Layout, leaves first:
//!
//!   cursor        Byte cursor over the raw input
//!   parsers       Value parsers (string, number, boolean, custom)
//!   tree          Nodes, merging, validity and the build/freeze lifecycle
//!   usage         Usage strings → node paths
//!   context       Per-call parse state and the segment stack
//!   engine        The recursive matcher
//!   result        Matches, failures, suggestions and selection helpers
//!
//! A typical round trip:
//!
//!   1. Register usages on a [`CommandTree`] (or attach hand-built [`CommandNode`]s).
//!   2. [`CommandTree::freeze`] it into [`Commands`].
//!   3. [`Commands::parse`] a context and an input string.
//!   4. Execute [`ParseResult::best_match`], or report [`ParseResult::deepest_failure`] and
//!      offer [`ParseResult::completion`].

pub mod config;
pub mod context;
pub mod cursor;
mod engine;
pub mod error;
pub mod executable;
pub mod parsers;
pub mod result;
pub mod suggestion;
pub mod tree;
pub mod usage;
pub mod value;

pub use self::config::CommandsConfig;
pub use context::{Segment, SegmentNode};
pub use cursor::Cursor;
pub use error::{ParseError, SetupError};
pub use executable::Executable;
pub use parsers::{ArgumentParser, BooleanParser, NumberParser, StringParser, ValueParser};
pub use result::{Completion, Outcome, ParseFailure, ParseMatch, ParseResult};
pub use suggestion::Suggestion;
pub use tree::{CacheKey, CommandNode, CommandTree, Commands, NodeKind};
pub use usage::ParserRegistry;
pub use value::{Arguments, Value};
