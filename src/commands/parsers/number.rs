//! Numeric arguments with inclusive bounds

use super::read_word;
use crate::commands::cursor::Cursor;
use crate::commands::error::ParseError;
use crate::commands::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl NumberKind {
    /// Full range of the kind as `(min, max)`
    pub fn range(self) -> (f64, f64) {
        match self {
            NumberKind::I8 => (f64::from(i8::MIN), f64::from(i8::MAX)),
            NumberKind::I16 => (f64::from(i16::MIN), f64::from(i16::MAX)),
            NumberKind::I32 => (f64::from(i32::MIN), f64::from(i32::MAX)),
            NumberKind::I64 => (i64::MIN as f64, i64::MAX as f64),
            NumberKind::F32 => (f64::from(f32::MIN), f64::from(f32::MAX)),
            NumberKind::F64 => (f64::MIN, f64::MAX),
        }
    }

    fn convert(self, text: &str) -> Option<Value> {
        match self {
            NumberKind::I8 => text.parse().ok().map(Value::I8),
            NumberKind::I16 => text.parse().ok().map(Value::I16),
            NumberKind::I32 => text.parse().ok().map(Value::I32),
            NumberKind::I64 => text.parse().ok().map(Value::I64),
            NumberKind::F32 => text
                .parse::<f32>()
                .ok()
                .filter(|n| !n.is_nan())
                .map(Value::F32),
            NumberKind::F64 => text
                .parse::<f64>()
                .ok()
                .filter(|n| !n.is_nan())
                .map(Value::F64),
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumberKind::I8 => "byte",
            NumberKind::I16 => "short",
            NumberKind::I32 => "integer",
            NumberKind::I64 => "long",
            NumberKind::F32 => "float",
            NumberKind::F64 => "double",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberParser {
    kind: NumberKind,
    min: f64,
    max: f64,
}

impl NumberParser {
    pub fn new(kind: NumberKind) -> Self {
        let (min, max) = kind.range();
        Self { kind, min, max }
    }

    pub fn i8() -> Self {
        Self::new(NumberKind::I8)
    }

    pub fn i16() -> Self {
        Self::new(NumberKind::I16)
    }

    pub fn i32() -> Self {
        Self::new(NumberKind::I32)
    }

    pub fn i64() -> Self {
        Self::new(NumberKind::I64)
    }

    pub fn f32() -> Self {
        Self::new(NumberKind::F32)
    }

    pub fn f64() -> Self {
        Self::new(NumberKind::F64)
    }

    pub fn with_bounds(self, min: f64, max: f64) -> Self {
        Self { min, max, ..self }
    }

    pub fn with_min(self, min: f64) -> Self {
        Self { min, ..self }
    }

    pub fn with_max(self, max: f64) -> Self {
        Self { max, ..self }
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub(crate) fn parse_token(&self, cursor: &mut Cursor<'_>) -> Result<Value, ParseError> {
        let text = read_word(cursor);
        let value = self
            .kind
            .convert(text)
            .ok_or_else(|| ParseError::new(format!("'{}' is not a valid {}", text, self.kind)))?;

        // every kind converts, `as_f64` only fails for non-numbers
        let number = value.as_f64().unwrap_or(f64::NAN);
        if number < self.min {
            return Err(ParseError::new(format!(
                "{} is too small. It has to be greater or equal to {}",
                value, self.min
            )));
        }
        if number > self.max {
            return Err(ParseError::new(format!(
                "{} is too big. It has to be smaller or equal to {}",
                value, self.max
            )));
        }
        Ok(value)
    }
}

impl fmt::Display for NumberParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.min, self.max) == self.kind.range() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}[{}, {}]", self.kind, self.min, self.max)
        }
    }
}
