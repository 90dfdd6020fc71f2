//! Matches, failures and what callers derive from them
//!
//! A [`ParseResult`] holds everything one parse call produced: every complete path through the
//! tree ([`ParseMatch`]) and every place a path gave up ([`ParseFailure`]). Selection is left to
//! the caller, with helpers for the usual choices:
//!
//! - [`ParseResult::best_match`]: highest priority, ties go to the first match found.
//! - [`ParseResult::deepest_failure`]: the failure furthest into the input, the most specific
//!   explanation of what went wrong.
//! - [`ParseResult::suggestions_at`] / [`ParseResult::completion`]: suggestions for
//!   autocomplete, deduplicated by text.

use super::config::{CommandsConfig, DuplicatePolicy};
use super::context::Segment;
use super::executable::Executable;
use super::suggestion::Suggestion;
use super::value::Arguments;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A complete path through the tree, ready to execute
pub struct ParseMatch<C, T> {
    executable: Arc<Executable<C, T>>,
    context: C,
    arguments: Arguments,
    path: Vec<Segment>,
}

impl<C, T> ParseMatch<C, T> {
    pub(crate) fn new(executable: Arc<Executable<C, T>>, context: C, arguments: Arguments, path: Vec<Segment>) -> Self {
        Self {
            executable,
            context,
            arguments,
            path,
        }
    }

    /// Run the executable. Every call invokes it again.
    pub fn execute(&self) -> T {
        self.executable.invoke(&self.context, &self.arguments)
    }

    pub fn executable(&self) -> &Arc<Executable<C, T>> {
        &self.executable
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    pub fn priority(&self) -> i32 {
        self.executable.priority()
    }

    pub fn label(&self) -> Option<&str> {
        self.executable.label()
    }
}

impl<C, T> fmt::Debug for ParseMatch<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseMatch")
            .field("executable", &self.executable)
            .field("arguments", &self.arguments)
            .field("path", &self.path)
            .finish()
    }
}

/// A positioned reason why a path stopped, with suggestions for that position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseFailure {
    position: usize,
    reason: String,
    path: Vec<Segment>,
    suggestions: Vec<Suggestion>,
}

impl ParseFailure {
    pub fn new(position: usize, reason: impl Into<String>, path: Vec<Segment>, suggestions: Vec<Suggestion>) -> Self {
        Self {
            position,
            reason: reason.into(),
            path,
            suggestions,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }
}

/// Suggestions anchored at one input position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub position: usize,
    pub suggestions: Vec<Suggestion>,
}

/// What a caller should do with a result
#[derive(Debug)]
pub enum Outcome<'r, C, T> {
    Matched(&'r ParseMatch<C, T>),
    Failed(&'r ParseFailure),
    Unknown(&'r str),
}

impl<C, T> fmt::Display for Outcome<'_, C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Matched(found) => match found.label() {
                Some(label) => write!(f, "Matched '{}'", label),
                None => write!(f, "Matched"),
            },
            Outcome::Failed(failure) => write!(f, "{} (at {})", failure.reason(), failure.position()),
            Outcome::Unknown(message) => write!(f, "{}", message),
        }
    }
}

pub struct ParseResult<C, T> {
    input: String,
    config: Arc<CommandsConfig>,
    matches: Vec<ParseMatch<C, T>>,
    failures: Vec<ParseFailure>,
}

impl<C, T> ParseResult<C, T> {
    pub(crate) fn new(input: &str, config: Arc<CommandsConfig>) -> Self {
        Self {
            input: input.to_string(),
            config,
            matches: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn add_match(&mut self, found: ParseMatch<C, T>) {
        self.matches.push(found);
    }

    pub(crate) fn add_failure(&mut self, failure: ParseFailure) {
        self.failures.push(failure);
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn matches(&self) -> &[ParseMatch<C, T>] {
        &self.matches
    }

    pub fn failures(&self) -> &[ParseFailure] {
        &self.failures
    }

    pub fn into_matches(self) -> Vec<ParseMatch<C, T>> {
        self.matches
    }

    /// The match with the highest priority. Equal priorities resolve to the first one found,
    /// i.e. declaration order of the tree.
    pub fn best_match(&self) -> Option<&ParseMatch<C, T>> {
        self.matches.iter().fold(None, |best, candidate| match best {
            Some(best) if best.priority() >= candidate.priority() => Some(best),
            _ => Some(candidate),
        })
    }

    /// The failure with the greatest position, the first one recorded on ties
    pub fn deepest_failure(&self) -> Option<&ParseFailure> {
        self.failures.iter().fold(None, |deepest, candidate| match deepest {
            Some(deepest) if deepest.position() >= candidate.position() => Some(deepest),
            _ => Some(candidate),
        })
    }

    /// All suggestions of failures recorded at `position`, deduplicated by text.
    pub fn suggestions_at(&self, position: usize) -> Vec<Suggestion> {
        let policy = &self.config.suggestions;
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut collected: Vec<Suggestion> = Vec::new();

        let candidates = self
            .failures
            .iter()
            .filter(|failure| failure.position() == position)
            .flat_map(|failure| failure.suggestions());
        for suggestion in candidates {
            match seen.get(suggestion.text()) {
                Some(&index) => {
                    if policy.duplicates == DuplicatePolicy::KeepLast {
                        collected[index] = suggestion.clone();
                    }
                }
                None => {
                    seen.insert(suggestion.text(), collected.len());
                    collected.push(suggestion.clone());
                }
            }
        }

        if policy.limit > 0 {
            collected.truncate(policy.limit);
        }
        collected
    }

    /// Suggestions at the furthest position any failure offered some
    pub fn completion(&self) -> Option<Completion> {
        let position = self
            .failures
            .iter()
            .filter(|failure| !failure.suggestions().is_empty())
            .map(ParseFailure::position)
            .max()?;
        Some(Completion {
            position,
            suggestions: self.suggestions_at(position),
        })
    }

    pub fn outcome(&self) -> Outcome<'_, C, T> {
        if let Some(found) = self.best_match() {
            return Outcome::Matched(found);
        }
        match self.deepest_failure() {
            Some(failure) => Outcome::Failed(failure),
            None => Outcome::Unknown(&self.config.diagnostics.unknown_command),
        }
    }

    /// A serializable snapshot of this result
    pub fn report(&self) -> ParseReport {
        ParseReport {
            input: self.input.clone(),
            matches: self
                .matches
                .iter()
                .map(|found| MatchReport {
                    priority: found.priority(),
                    label: found.label().map(str::to_string),
                    arguments: found.arguments().clone(),
                    path: found.path().to_vec(),
                })
                .collect(),
            failures: self.failures.clone(),
            completion: self.completion(),
        }
    }
}

impl<C, T> fmt::Debug for ParseResult<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseResult")
            .field("input", &self.input)
            .field("matches", &self.matches)
            .field("failures", &self.failures)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub input: String,
    pub matches: Vec<MatchReport>,
    pub failures: Vec<ParseFailure>,
    pub completion: Option<Completion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub priority: i32,
    pub label: Option<String>,
    pub arguments: Arguments,
    pub path: Vec<Segment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::config::SuggestionsConfig;

    fn result_with(config: CommandsConfig) -> ParseResult<(), i32> {
        ParseResult::new("input", Arc::new(config))
    }

    fn found(priority: i32, label: &str) -> ParseMatch<(), i32> {
        let executable = Executable::new(move |_, _: &Arguments| priority)
            .with_priority(priority)
            .with_label(label);
        ParseMatch::new(Arc::new(executable), (), Arguments::new(), Vec::new())
    }

    fn failure(position: usize, suggestions: Vec<Suggestion>) -> ParseFailure {
        ParseFailure::new(position, format!("failed at {}", position), Vec::new(), suggestions)
    }

    #[test]
    fn test_best_match_prefers_priority_then_order() {
        let mut result = result_with(CommandsConfig::default());
        result.add_match(found(5, "low"));
        result.add_match(found(10, "high"));
        result.add_match(found(10, "late"));
        assert_eq!(result.best_match().and_then(ParseMatch::label), Some("high"));
        assert_eq!(result.best_match().map(ParseMatch::execute), Some(10));
    }

    #[test]
    fn test_deepest_failure() {
        let mut result = result_with(CommandsConfig::default());
        result.add_failure(failure(2, vec![]));
        result.add_failure(failure(7, vec![]));
        result.add_failure(failure(7, vec![]));
        result.add_failure(failure(3, vec![]));
        let deepest = result.deepest_failure().unwrap();
        assert_eq!(deepest.position(), 7);
        assert!(std::ptr::eq(deepest, &result.failures()[1]));
    }

    #[test]
    fn test_suggestions_keep_first_by_default() {
        let mut result = result_with(CommandsConfig::default());
        result.add_failure(failure(4, vec![Suggestion::tooltip("a", "first"), "b".into()]));
        result.add_failure(failure(4, vec![Suggestion::tooltip("a", "second")]));
        result.add_failure(failure(1, vec!["c".into()]));

        let suggestions = result.suggestions_at(4);
        assert_eq!(suggestions, vec![Suggestion::tooltip("a", "first"), Suggestion::plain("b")]);
        assert!(result.suggestions_at(2).is_empty());
    }

    #[test]
    fn test_suggestions_keep_last_and_limit() {
        let mut config = CommandsConfig::default();
        config.suggestions = SuggestionsConfig {
            duplicates: DuplicatePolicy::KeepLast,
            limit: 1,
        };
        let mut result = result_with(config);
        result.add_failure(failure(4, vec![Suggestion::tooltip("a", "first"), "b".into()]));
        result.add_failure(failure(4, vec![Suggestion::tooltip("a", "second")]));
        assert_eq!(result.suggestions_at(4), vec![Suggestion::tooltip("a", "second")]);
    }

    #[test]
    fn test_completion_uses_furthest_suggesting_failure() {
        let mut result = result_with(CommandsConfig::default());
        result.add_failure(failure(0, vec!["x".into()]));
        result.add_failure(failure(5, vec!["y".into()]));
        result.add_failure(failure(9, vec![]));
        let completion = result.completion().unwrap();
        assert_eq!(completion.position, 5);
        assert_eq!(completion.suggestions, vec![Suggestion::plain("y")]);
    }

    #[test]
    fn test_outcome_without_anything_recorded() {
        let result = result_with(CommandsConfig::default());
        assert!(matches!(result.outcome(), Outcome::Unknown(_)));
        insta::assert_snapshot!(result.outcome().to_string(), @"Unknown or incomplete command.");
    }
}
