//! Error types and result aliases for the invocation logger.
//!
//! Two kinds of failure exist. A [`Fault`] is what a callable raises; it is
//! carried through interception untouched. [`InvocationLoggerError`] covers
//! failures of the layer itself, most importantly class construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A fault raised by a callable.
///
/// `kind` plays the role of an exception class name (`"RuntimeError"`,
/// `"AttributeError"`, ...), `message` its text and `state` any extra
/// payload the raiser wants to hand to its caller.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct Fault {
    pub kind: String,
    pub message: String,
    pub state: Option<Value>,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            state: None,
        }
    }

    /// Attach a payload to the fault
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    pub fn attribute_error(message: impl Into<String>) -> Self {
        Self::new("AttributeError", message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new("TypeError", message)
    }

    /// Name of the fault's kind, as written to the sink
    pub fn kind_name(&self) -> &str {
        &self.kind
    }
}

#[derive(Error, Debug)]
pub enum InvocationLoggerError {
    #[error("Construction error: {0}")]
    ConstructionError(String),

    #[error("Fault: {0}")]
    Fault(#[from] Fault),
}

pub type Result<T> = std::result::Result<T, InvocationLoggerError>;
