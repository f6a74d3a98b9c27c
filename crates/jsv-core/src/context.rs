//! # Message Context
//!
//! The per-request variable store the host hands to the callout. The host
//! owns its lifecycle; the callout only reads and writes named entries and
//! reads the message body.
//!
//! [`InMemoryContext`] is a complete implementation for hosts that do not
//! have their own store, and for tests.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

/// A value bound to a context variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// Boolean flag.
    Bool(bool),
    /// Text value.
    String(String),
}

impl ContextValue {
    /// The value as a bool, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(_) => None,
        }
    }

    /// The value as a string slice, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// Host-provided per-request context.
pub trait MessageContext {
    /// Current value of a variable, if bound.
    fn get_variable(&self, name: &str) -> Option<ContextValue>;

    /// Bind a variable, replacing any previous value.
    fn set_variable(&mut self, name: &str, value: ContextValue);

    /// Unbind a variable, returning the previous value.
    fn remove_variable(&mut self, name: &str) -> Option<ContextValue>;

    /// The message body as a byte stream.
    fn content(&self) -> Box<dyn Read + '_>;
}

/// `HashMap`-backed context with an owned message body.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContext {
    variables: HashMap<String, ContextValue>,
    content: Vec<u8>,
}

impl InMemoryContext {
    /// Empty context with an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose body is `content`.
    pub fn with_content(content: impl Into<Vec<u8>>) -> Self {
        Self {
            variables: HashMap::new(),
            content: content.into(),
        }
    }

    /// Replace the message body.
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    /// Bind a variable, builder style.
    pub fn with_variable(mut self, name: &str, value: impl Into<ContextValue>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    /// Borrow a variable without cloning.
    pub fn variable(&self, name: &str) -> Option<&ContextValue> {
        self.variables.get(name)
    }

    /// All bound variables.
    pub fn variables(&self) -> &HashMap<String, ContextValue> {
        &self.variables
    }
}

impl MessageContext for InMemoryContext {
    fn get_variable(&self, name: &str) -> Option<ContextValue> {
        self.variables.get(name).cloned()
    }

    fn set_variable(&mut self, name: &str, value: ContextValue) {
        self.variables.insert(name.to_string(), value);
    }

    fn remove_variable(&mut self, name: &str) -> Option<ContextValue> {
        self.variables.remove(name)
    }

    fn content(&self) -> Box<dyn Read + '_> {
        Box::new(self.content.as_slice())
    }
}
