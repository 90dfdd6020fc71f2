//! Cursor over an immutable command string
//!
//!     A cursor is nothing more than a byte offset into the input. Value parsers receive it
//!     mutably and consume their token from the current position; the engine reads it back to
//!     decide where the next token starts and rewinds it when backtracking.
//!
//!     Positions are UTF-8 byte offsets and always sit on a char boundary. Apart from
//!     [`Cursor::set_position`] and [`Cursor::reset`], no operation moves the position
//!     backwards. A parser that does so anyway violates its contract; the engine detects this
//!     and reports a [`SetupError`](super::error::SetupError).

use regex::{Captures, Regex};

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    position: usize,
    mark: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            mark: 0,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move to `position`, clamped to the input and floored to a char boundary.
    pub fn set_position(&mut self, position: usize) {
        let mut position = position.min(self.input.len());
        while !self.input.is_char_boundary(position) {
            position -= 1;
        }
        self.position = position;
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Next char without consuming it, `None` at the end of input
    pub fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Consume one char, `None` at the end of input
    pub fn read(&mut self) -> Option<char> {
        let next = self.peek()?;
        self.position += next.len_utf8();
        Some(next)
    }

    /// Match `pattern` without consuming, but only if the match starts at the current position.
    pub fn peek_pattern(&self, pattern: &Regex) -> Option<Captures<'a>> {
        let captures = pattern.captures_at(self.input, self.position)?;
        let start = captures.get(0)?.start();
        (start == self.position).then_some(captures)
    }

    /// Like [`Cursor::peek_pattern`], advancing past the match on success.
    pub fn read_pattern(&mut self, pattern: &Regex) -> Option<Captures<'a>> {
        let captures = self.peek_pattern(pattern)?;
        if let Some(whole) = captures.get(0) {
            self.position = whole.end();
        }
        Some(captures)
    }

    /// Number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.input.len() - self.position
    }

    pub fn peek_remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Read everything up to the end of input.
    pub fn consume_remainder(&mut self) -> &'a str {
        let rest = self.peek_remaining();
        self.position = self.input.len();
        rest
    }

    pub fn mark(&mut self) {
        self.mark = self.position;
    }

    pub fn reset(&mut self) {
        self.position = self.mark;
    }

    /// The char boundary before `position`, or 0.
    pub fn step_back(&self, position: usize) -> usize {
        self.input[..position.min(self.input.len())]
            .char_indices()
            .next_back()
            .map(|(index, _)| index)
            .unwrap_or(0)
    }
}
