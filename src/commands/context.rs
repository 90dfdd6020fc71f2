//! Per-call parse state
//!
//!     A [`ParseContext`] lives for exactly one parse call. It owns the caller's context value,
//!     the cursor, the stack of visited segments and the result being filled.
//!
//!     The segment stack mirrors the recursion: [`ParseContext::enter`] pushes a segment for a
//!     node at the current cursor position, runs the visit, then pops the segment and puts the
//!     cursor back where the segment started. Every exit path of the visit goes through that
//!     pop, which is what lets siblings be tried against the same start position.
//!
//!     Argument bindings are stored on the segments themselves, so leaving a branch drops its
//!     bindings with it.

use super::config::CommandsConfig;
use super::cursor::Cursor;
use super::error::ParseError;
use super::executable::Executable;
use super::parsers::ValueParser;
use super::result::{ParseFailure, ParseMatch, ParseResult};
use super::suggestion::Suggestion;
use super::tree::{CacheKey, CommandNode};
use super::value::{Arguments, Value};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// What a segment visited, as plain data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentNode {
    Root,
    Literal { token: String },
    Argument { id: String, optional: bool },
}

/// One level of the matched path: the node, where it started and what it bound
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    position: usize,
    node: SegmentNode,
    value: Option<Value>,
    #[serde(skip)]
    bound: bool,
}

impl Segment {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn node(&self) -> &SegmentNode {
        &self.node
    }

    /// The parsed value of an argument segment, `None` for other segments and skipped arguments
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

pub(crate) struct ParseContext<'a, C, T> {
    context: C,
    cursor: Cursor<'a>,
    segments: Vec<Segment>,
    key: Option<CacheKey>,
    validity: HashMap<usize, bool>,
    result: ParseResult<C, T>,
}

impl<'a, C, T> ParseContext<'a, C, T> {
    pub(crate) fn new(context: C, input: &'a str, key: Option<CacheKey>, config: Arc<CommandsConfig>) -> Self {
        Self {
            context,
            cursor: Cursor::new(input),
            segments: Vec::new(),
            key,
            validity: HashMap::new(),
            result: ParseResult::new(input, config),
        }
    }

    pub(crate) fn context(&self) -> &C {
        &self.context
    }

    /// Validity of `node` for this call's context, each node evaluated at most once per call
    pub(crate) fn is_valid(&mut self, node: &CommandNode<C, T>) -> bool {
        node.resolve_valid(&self.context, self.key, &mut self.validity)
    }

    pub(crate) fn cursor(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    pub(crate) fn position(&self) -> usize {
        self.cursor.position()
    }

    pub(crate) fn parse_value(&mut self, parser: &ValueParser<C>) -> Result<Value, ParseError> {
        parser.parse(&self.context, &mut self.cursor)
    }

    /// Suggestions of `parser` for the token at the cursor, given the bindings so far
    pub(crate) fn suggest_value(&self, parser: &ValueParser<C>) -> Vec<Suggestion> {
        parser.suggest(&self.context, &self.arguments(), &self.cursor)
    }

    /// Visit `node` inside its own segment, restoring the cursor afterwards.
    pub(crate) fn enter<R>(&mut self, node: &CommandNode<C, T>, visit: impl FnOnce(&mut Self) -> R) -> R {
        let position = self.cursor.position();
        trace!(node = %node.kind(), position, depth = self.segments.len(), "enter");
        self.segments.push(Segment {
            position,
            node: node.kind().segment(),
            value: None,
            bound: false,
        });
        let outcome = visit(self);
        if let Some(segment) = self.segments.pop() {
            self.cursor.set_position(segment.position);
        }
        outcome
    }

    /// Bind the current argument segment, `None` meaning explicitly skipped.
    pub(crate) fn bind(&mut self, value: Option<Value>) {
        if let Some(segment) = self.segments.last_mut() {
            segment.value = value;
            segment.bound = true;
        }
    }

    /// Bindings of every argument bound so far on the current path
    pub(crate) fn arguments(&self) -> Arguments {
        let mut arguments = Arguments::new();
        for segment in self.segments.iter().filter(|segment| segment.bound) {
            if let SegmentNode::Argument { id, .. } = &segment.node {
                arguments.insert(id.clone(), segment.value.clone());
            }
        }
        arguments
    }

    pub(crate) fn match_count(&self) -> usize {
        self.result.matches().len()
    }

    pub(crate) fn fail(&mut self, position: usize, reason: impl Into<String>, suggestions: Vec<Suggestion>) {
        let reason = reason.into();
        trace!(position, reason = %reason, "failure");
        let failure = ParseFailure::new(position, reason, self.segments.clone(), suggestions);
        self.result.add_failure(failure);
    }

    pub(crate) fn finish(self) -> ParseResult<C, T> {
        self.result
    }
}

impl<'a, C: Clone, T> ParseContext<'a, C, T> {
    pub(crate) fn record_match(&mut self, executable: &Arc<Executable<C, T>>) {
        trace!(priority = executable.priority(), "match");
        let found = ParseMatch::new(
            Arc::clone(executable),
            self.context.clone(),
            self.arguments(),
            self.segments.clone(),
        );
        self.result.add_match(found);
    }
}
