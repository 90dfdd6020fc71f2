//! The action at the end of a command path

use super::value::Arguments;
use std::fmt;
use std::sync::Arc;

type Validity<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;
type Invoke<C, T> = Arc<dyn Fn(&C, &Arguments) -> T + Send + Sync>;

/// A callable attached to a node, with a priority for tie-breaking and a validity gate.
///
/// `T` is whatever the caller wants back from an execution. Use a `Result` to report execution
/// errors; they come back to the caller of [`ParseMatch::execute`](super::result::ParseMatch::execute)
/// unchanged.
pub struct Executable<C, T> {
    priority: i32,
    label: Option<String>,
    validity: Option<Validity<C>>,
    invoke: Invoke<C, T>,
}

impl<C, T> Executable<C, T> {
    pub fn new<F>(invoke: F) -> Self
    where
        F: Fn(&C, &Arguments) -> T + Send + Sync + 'static,
    {
        Self {
            priority: 0,
            label: None,
            validity: None,
            invoke: Arc::new(invoke),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Only offer this executable for contexts accepted by `predicate`.
    pub fn with_validity<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.validity = Some(Arc::new(predicate));
        self
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_valid(&self, context: &C) -> bool {
        self.validity.as_ref().map_or(true, |predicate| predicate(context))
    }

    pub fn invoke(&self, context: &C, arguments: &Arguments) -> T {
        (self.invoke)(context, arguments)
    }
}

impl<C, T> fmt::Debug for Executable<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable")
            .field("priority", &self.priority)
            .field("label", &self.label)
            .field("gated", &self.validity.is_some())
            .finish()
    }
}
