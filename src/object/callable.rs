use super::instance::{Instance, WeakInstance};
use crate::error::Fault;
use crate::sink::{same_sink, Sink};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Signature shared by every method body in the object model
pub type MethodFn = dyn Fn(&Instance, &CallArgs) -> Result<Value, Fault> + Send + Sync;

/// Arguments of a single call
///
/// Positional values and named `(name, value)` pairs both keep the order
/// the caller supplied them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub named: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a named argument
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    /// Look an argument up the way a parameter list would bind it: by
    /// position first, then by name.
    pub fn bind(&self, index: usize, name: &str) -> Option<&Value> {
        self.positional(index).or_else(|| self.named(name))
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// A named, documented operation that runs against a receiver instance
///
/// Cloning is cheap; the body is shared.
#[derive(Clone)]
pub struct Callable {
    name: String,
    doc: Option<String>,
    func: Arc<MethodFn>,
    /// Sinks of every logging layer around the body, innermost first
    interceptors: Vec<Arc<dyn Sink>>,
}

impl Callable {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Instance, &CallArgs) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            doc: None,
            func: Arc::new(func),
            interceptors: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Whether this callable is a logging replacement for another one
    pub fn is_intercepted(&self) -> bool {
        !self.interceptors.is_empty()
    }

    /// Whether any logging layer of this callable already records to `sink`
    pub fn logs_to(&self, sink: &Arc<dyn Sink>) -> bool {
        self.interceptors.iter().any(|layer| same_sink(layer, sink))
    }

    pub fn call(&self, receiver: &Instance, args: &CallArgs) -> Result<Value, Fault> {
        (self.func)(receiver, args)
    }

    /// Build a replacement carrying this callable's name and doc but a
    /// different body that logs to `sink`. The result is marked as
    /// intercepted for `sink` on top of any layers this callable has.
    pub(crate) fn replaced_by<F>(&self, sink: Arc<dyn Sink>, func: F) -> Self
    where
        F: Fn(&Instance, &CallArgs) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        let mut interceptors = self.interceptors.clone();
        interceptors.push(sink);
        Self {
            name: self.name.clone(),
            doc: self.doc.clone(),
            func: Arc::new(func),
            interceptors,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("layers", &self.interceptors.len())
            .finish()
    }
}

/// A callable fixed to one receiver
///
/// The receiver is held weakly so that a bound method stored in its own
/// instance's attribute table does not keep that instance alive.
#[derive(Clone)]
pub struct BoundMethod {
    callable: Callable,
    receiver: WeakInstance,
}

impl BoundMethod {
    pub fn new(callable: Callable, receiver: &Instance) -> Self {
        Self {
            callable,
            receiver: receiver.downgrade(),
        }
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    pub fn call(&self, args: &CallArgs) -> Result<Value, Fault> {
        let receiver = self.receiver.upgrade().ok_or_else(|| {
            Fault::new(
                "ReferenceError",
                format!("receiver of '{}' no longer exists", self.callable.name()),
            )
        })?;
        self.callable.call(&receiver, args)
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod").field("callable", &self.callable).finish()
    }
}
