//! Matching engine
//!
//!     The engine walks the tree depth-first, one procedure per node kind, and records what it
//!     finds in the parse context's result. Nothing is pruned on success: every path that can
//!     consume the whole input becomes a match, and every path that gives up leaves a failure
//!     behind, anchored at the position where it gave up.
//!
//!     Per node:
//!
//!     1. Nodes that are not valid for the context are skipped with their whole subtree,
//!        without a failure.
//!     2. Literals read the next run of non-space chars and must equal their token.
//!        Arguments let their parser consume a value and bind it. Root nodes consume nothing.
//!     3. Descent: a node's own executable matches if the input is exhausted and reports
//!        "Too many arguments." otherwise. Leaves (root-kind children) are tried at the same
//!        position. Other children are tried after a single separating space, or directly at
//!        position 0.
//!
//!     Optional arguments add a second path: when trying the argument produced no match, the
//!     argument is bound to "no value" and descent is retried from just before the argument's
//!     start, so the separator consumed on the way in is read again.

use super::context::ParseContext;
use super::error::SetupError;
use super::parsers::{read_word, ValueParser};
use super::tree::{CommandNode, NodeKind};
use tracing::trace;

impl<C: Clone, T> CommandNode<C, T> {
    pub(crate) fn visit(&self, cx: &mut ParseContext<'_, C, T>) -> Result<(), SetupError> {
        if !cx.is_valid(self) {
            trace!(node = %self.kind(), "skipped, not valid for context");
            return Ok(());
        }
        match self.kind() {
            NodeKind::Root => self.descend(cx),
            NodeKind::Literal(token) => self.visit_literal(token, cx),
            NodeKind::Argument {
                id,
                parser,
                optional,
            } => self.visit_argument(id, parser, *optional, cx),
        }
    }

    fn visit_literal(&self, token: &str, cx: &mut ParseContext<'_, C, T>) -> Result<(), SetupError> {
        let start = cx.position();
        let found = read_word(cx.cursor());
        if found != token {
            let got = if found.is_empty() {
                "nothing".to_string()
            } else {
                format!("'{}'", found)
            };
            cx.fail(
                start,
                format!("Expected '{}', but got {}.", token, got),
                vec![token.into()],
            );
            return Ok(());
        }
        self.descend(cx)
    }

    fn visit_argument(
        &self,
        id: &str,
        parser: &ValueParser<C>,
        optional: bool,
        cx: &mut ParseContext<'_, C, T>,
    ) -> Result<(), SetupError> {
        let start = cx.position();
        let matches_before = cx.match_count();

        match cx.parse_value(parser) {
            Ok(value) => {
                let end = cx.position();
                if end < start {
                    return Err(SetupError::CursorMovedBackwards {
                        parser: parser.describe(),
                        argument: id.to_string(),
                    });
                }
                if !matches!(cx.cursor().peek(), None | Some(' ')) {
                    return Err(SetupError::PartialToken {
                        parser: parser.describe(),
                        argument: id.to_string(),
                    });
                }

                // the token may still be in the middle of being typed, offer what else fits
                if cx.cursor().is_at_end() {
                    cx.cursor().set_position(start);
                    let alternatives = cx.suggest_value(parser);
                    if !alternatives.is_empty() {
                        cx.fail(start, "Alternative Usages", alternatives);
                    }
                    cx.cursor().set_position(end);
                }

                cx.bind(Some(value));
                self.descend(cx)?;
            }
            Err(err) => {
                cx.cursor().set_position(start);
                let suggestions = cx.suggest_value(parser);
                cx.fail(start, err.message(), suggestions);
            }
        }

        if optional && cx.match_count() == matches_before {
            trace!(argument = id, "skipping optional argument");
            cx.bind(None);
            let realigned = cx.cursor().step_back(start);
            cx.cursor().set_position(realigned);
            self.descend(cx)?;
        }
        Ok(())
    }

    /// Leaf candidacy of this node, then its children.
    fn descend(&self, cx: &mut ParseContext<'_, C, T>) -> Result<(), SetupError> {
        let start = cx.position();

        if let Some(executable) = self.executable() {
            if executable.is_valid(cx.context()) {
                if cx.cursor().is_at_end() {
                    cx.record_match(executable);
                } else {
                    cx.fail(start, "Too many arguments.", Vec::new());
                }
            }
        }

        for leaf in self.children().iter().filter(|child| child.kind().is_root()) {
            cx.enter(leaf, |cx| leaf.visit(cx))?;
        }

        let consuming: Vec<_> = self
            .children()
            .iter()
            .filter(|child| !child.kind().is_root())
            .collect();
        if consuming.is_empty() {
            return Ok(());
        }

        let delimited = start == 0 || cx.cursor().read() == Some(' ');
        if delimited {
            for child in consuming {
                cx.enter(child, |cx| child.visit(cx))?;
            }
            return Ok(());
        }

        cx.cursor().set_position(start);
        if consuming.iter().all(|child| child.is_tree_optional()) {
            for child in consuming {
                cx.enter(child, |cx| child.gather_skipped(cx));
            }
        } else {
            cx.fail(start, "Not enough arguments.", Vec::new());
        }
        Ok(())
    }

    /// Record every executable reachable by skipping this optional subtree.
    fn gather_skipped(&self, cx: &mut ParseContext<'_, C, T>) {
        if !cx.is_valid(self) {
            return;
        }
        if matches!(self.kind(), NodeKind::Argument { .. }) {
            cx.bind(None);
        }
        if let Some(executable) = self.executable() {
            if executable.is_valid(cx.context()) {
                cx.record_match(executable);
            }
        }
        for child in self.children() {
            cx.enter(child, |cx| child.gather_skipped(cx));
        }
    }
}
