//! Classes: named namespaces of attributes with ordered ancestors
//!
//! A [`Class`] is immutable once built. Attribute lookup walks the class and
//! its linearized ancestors, so the most-derived definition of a name wins.

use super::callable::{BoundMethod, CallArgs, Callable};
use super::instance::Instance;
use super::linearize::linearize;
use super::metaclass::{ClassDraft, Metaclass};
use crate::error::{Fault, InvocationLoggerError, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Attributes of a class or instance, keyed by name
pub type Namespace = BTreeMap<String, Attribute>;

/// Getter signature for computed attributes
pub type PropertyFn = dyn Fn(&Instance) -> std::result::Result<Value, Fault> + Send + Sync;

#[derive(Clone)]
pub struct Property {
    getter: Arc<PropertyFn>,
}

impl Property {
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn(&Instance) -> std::result::Result<Value, Fault> + Send + Sync + 'static,
    {
        Self {
            getter: Arc::new(getter),
        }
    }

    pub fn get(&self, receiver: &Instance) -> std::result::Result<Value, Fault> {
        (self.getter)(receiver)
    }
}

/// Anything a name can resolve to
#[derive(Clone)]
pub enum Attribute {
    /// An operation taking the receiver as its first argument
    Method(Callable),
    /// A callable already fixed to one receiver
    Bound(BoundMethod),
    Field(Value),
    Property(Property),
}

impl Attribute {
    pub fn is_callable(&self) -> bool {
        matches!(self, Attribute::Method(_) | Attribute::Bound(_))
    }

    pub fn as_method(&self) -> Option<&Callable> {
        match self {
            Attribute::Method(callable) => Some(callable),
            _ => None,
        }
    }

    /// Whether this attribute is a logging replacement
    pub fn is_intercepted(&self) -> bool {
        match self {
            Attribute::Method(callable) => callable.is_intercepted(),
            Attribute::Bound(bound) => bound.callable().is_intercepted(),
            _ => false,
        }
    }

    /// Invoke the attribute for `receiver`, faulting if it is not callable
    pub fn invoke(
        &self,
        name: &str,
        receiver: &Instance,
        args: &CallArgs,
    ) -> std::result::Result<Value, Fault> {
        match self {
            Attribute::Method(callable) => callable.call(receiver, args),
            Attribute::Bound(bound) => bound.call(args),
            Attribute::Field(_) | Attribute::Property(_) => {
                Err(Fault::type_error(format!("'{}' object is not callable", name)))
            }
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Method(callable) => f.debug_tuple("Method").field(callable).finish(),
            Attribute::Bound(bound) => f.debug_tuple("Bound").field(bound).finish(),
            Attribute::Field(value) => f.debug_tuple("Field").field(value).finish(),
            Attribute::Property(_) => f.write_str("Property"),
        }
    }
}

pub struct Class {
    name: String,
    label: String,
    bases: Vec<Arc<Class>>,
    ancestors: Vec<Arc<Class>>,
    namespace: Namespace,
    metaclass: Arc<Metaclass>,
}

impl Class {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label used in log prefixes; defaults to the name
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bases(&self) -> &[Arc<Class>] {
        &self.bases
    }

    pub fn metaclass(&self) -> &Arc<Metaclass> {
        &self.metaclass
    }

    /// Attributes declared directly on this class
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// This class followed by its ancestors in resolution order
    pub fn mro(&self) -> impl Iterator<Item = &Class> {
        std::iter::once(self).chain(self.ancestors.iter().map(|c| c.as_ref()))
    }

    /// Resolve a name through the class hierarchy
    pub fn lookup(&self, name: &str) -> Option<&Attribute> {
        self.mro().find_map(|class| class.namespace.get(name))
    }

    /// Every name visible on this class, in order of first occurrence
    /// along the resolution order
    pub fn dir(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.mro()
            .flat_map(|class| class.namespace.keys().map(String::as_str))
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.mro().any(|class| std::ptr::eq(class, other))
    }

    fn full_order(class: &Arc<Class>) -> Vec<Arc<Class>> {
        let mut order = vec![class.clone()];
        order.extend(class.ancestors.iter().cloned());
        order
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("mro", &self.mro().map(|c| c.name.as_str()).collect::<Vec<_>>())
            .field("metaclass", &self.metaclass.name())
            .finish()
    }
}

/// Builder for [`Class`]
///
/// # Examples
///
/// ```
/// use invocation_logger::object::{CallArgs, Class, Instance};
/// use serde_json::json;
///
/// let class = Class::builder("Greeter")
///     .method("greet", |_, args| {
///         let name = args.bind(0, "name").cloned().unwrap_or(json!("world"));
///         Ok(json!(format!("hello {}", name.as_str().unwrap_or_default())))
///     })
///     .build()
///     .unwrap();
///
/// let greeter = Instance::new(&class);
/// let reply = greeter.call("greet", &CallArgs::new().arg("bob")).unwrap();
/// assert_eq!(reply, json!("hello bob"));
/// ```
pub struct ClassBuilder {
    name: String,
    label: Option<String>,
    bases: Vec<Arc<Class>>,
    namespace: Namespace,
    metaclass: Option<Arc<Metaclass>>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            bases: Vec::new(),
            namespace: Namespace::new(),
            metaclass: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn base(mut self, base: Arc<Class>) -> Self {
        self.bases.push(base);
        self
    }

    pub fn metaclass(mut self, metaclass: Arc<Metaclass>) -> Self {
        self.metaclass = Some(metaclass);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.namespace.insert(name.into(), attribute);
        self
    }

    pub fn method<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Instance, &CallArgs) -> std::result::Result<Value, Fault> + Send + Sync + 'static,
    {
        let name = name.into();
        let callable = Callable::new(name.clone(), func);
        self.attribute(name, Attribute::Method(callable))
    }

    /// Add an already constructed callable under its own name
    pub fn callable(self, callable: Callable) -> Self {
        let name = callable.name().to_string();
        self.attribute(name, Attribute::Method(callable))
    }

    pub fn field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attribute(name, Attribute::Field(value.into()))
    }

    pub fn property<F>(self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Instance) -> std::result::Result<Value, Fault> + Send + Sync + 'static,
    {
        self.attribute(name, Attribute::Property(Property::new(getter)))
    }

    /// Linearize the bases, pick the construction mechanism, run it and
    /// finalize the class.
    ///
    /// Bound methods belong to instances, so a namespace still holding one
    /// once construction has run is rejected.
    pub fn build(self) -> Result<Arc<Class>> {
        let ancestors = linearize(&self.bases, Class::full_order).ok_or_else(|| {
            InvocationLoggerError::ConstructionError(format!(
                "cannot create a consistent method resolution order for bases {}",
                self.bases.iter().map(|b| b.name()).collect::<Vec<_>>().join(", ")
            ))
        })?;
        let metaclass = self.select_metaclass()?;

        let mut draft = ClassDraft {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            bases: self.bases,
            ancestors,
            namespace: self.namespace,
        };
        metaclass.construct(&mut draft)?;

        if let Some(name) = draft
            .namespace
            .iter()
            .find_map(|(name, attribute)| matches!(attribute, Attribute::Bound(_)).then_some(name))
        {
            return Err(InvocationLoggerError::ConstructionError(format!(
                "'{}' on class '{}' is bound to an instance",
                name, draft.name
            )));
        }

        Ok(Arc::new(Class {
            name: draft.name,
            label: draft.label,
            bases: draft.bases,
            ancestors: draft.ancestors,
            namespace: draft.namespace,
            metaclass,
        }))
    }

    /// The most-derived metaclass among the requested one and those of the
    /// bases. Anything else is a conflict.
    fn select_metaclass(&self) -> Result<Arc<Metaclass>> {
        let mut candidates: Vec<Arc<Metaclass>> = Vec::new();
        candidates.push(self.metaclass.clone().unwrap_or_else(Metaclass::root));
        candidates.extend(self.bases.iter().map(|base| base.metaclass.clone()));

        candidates
            .iter()
            .find(|candidate| candidates.iter().all(|other| candidate.is_subclass_of(other)))
            .cloned()
            .ok_or_else(|| {
                InvocationLoggerError::ConstructionError(format!(
                    "metaclass conflict for '{}': no metaclass among {} derives from all others",
                    self.name,
                    candidates.iter().map(|m| m.name()).collect::<Vec<_>>().join(", ")
                ))
            })
    }
}
