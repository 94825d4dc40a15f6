//! Live objects
//!
//! An [`Instance`] is a shared handle: cloning it yields the same object, and
//! [`Instance::ptr_eq`] tells whether two handles refer to one object. Each
//! instance owns an attribute table that is consulted before its class.

use super::callable::CallArgs;
use super::class::{Attribute, Class, Namespace};
use crate::error::Fault;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// Name of the optional initializer run by [`Instance::create`]
pub const INITIALIZER: &str = "__init__";

struct InstanceInner {
    class: Arc<Class>,
    attributes: RwLock<Namespace>,
}

#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

/// Non-owning handle to an [`Instance`]
#[derive(Clone)]
pub struct WeakInstance {
    inner: Weak<InstanceInner>,
}

impl WeakInstance {
    pub fn upgrade(&self) -> Option<Instance> {
        self.inner.upgrade().map(|inner| Instance { inner })
    }
}

impl Instance {
    /// Create an instance without running any initializer
    pub fn new(class: &Arc<Class>) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                class: class.clone(),
                attributes: RwLock::new(Namespace::new()),
            }),
        }
    }

    /// Create an instance and run the class's `__init__`, if it has one
    pub fn create(class: &Arc<Class>, args: &CallArgs) -> Result<Self, Fault> {
        let instance = Self::new(class);
        if let Some(init) = class.lookup(INITIALIZER) {
            init.invoke(INITIALIZER, &instance, args)?;
        }
        Ok(instance)
    }

    pub fn class(&self) -> &Arc<Class> {
        &self.inner.class
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakInstance {
        WeakInstance {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Resolve a name: own attributes first, then the class hierarchy
    pub fn resolve(&self, name: &str) -> Option<Attribute> {
        if let Some(attribute) = self.read_attributes().get(name) {
            return Some(attribute.clone());
        }
        self.inner.class.lookup(name).cloned()
    }

    /// Call the operation `name` resolves to
    pub fn call(&self, name: &str, args: &CallArgs) -> Result<Value, Fault> {
        // Resolve first so no lock is held while the body runs
        let attribute = self.resolve(name).ok_or_else(|| self.missing(name))?;
        attribute.invoke(name, self, args)
    }

    /// Read a data attribute; properties are evaluated
    pub fn get_field(&self, name: &str) -> Result<Value, Fault> {
        match self.resolve(name) {
            Some(Attribute::Field(value)) => Ok(value),
            Some(Attribute::Property(property)) => property.get(self),
            Some(_) => Err(Fault::type_error(format!(
                "'{}.{}' is callable, not a field",
                self.inner.class.name(),
                name
            ))),
            None => Err(self.missing(name)),
        }
    }

    pub fn set_field(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.set_attribute(name, Attribute::Field(value.into()));
    }

    /// Overwrite an entry of this instance's own attribute table
    pub fn set_attribute(&self, name: impl Into<String>, attribute: Attribute) {
        self.write_attributes().insert(name.into(), attribute);
    }

    pub fn own_attribute(&self, name: &str) -> Option<Attribute> {
        self.read_attributes().get(name).cloned()
    }

    pub fn has_own_attribute(&self, name: &str) -> bool {
        self.read_attributes().contains_key(name)
    }

    /// Names in this instance's own attribute table
    pub fn own_attribute_names(&self) -> Vec<String> {
        self.read_attributes().keys().cloned().collect()
    }

    fn missing(&self, name: &str) -> Fault {
        Fault::attribute_error(format!(
            "'{}' object has no attribute '{}'",
            self.inner.class.name(),
            name
        ))
    }

    fn read_attributes(&self) -> RwLockReadGuard<'_, Namespace> {
        self.inner.attributes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_attributes(&self) -> RwLockWriteGuard<'_, Namespace> {
        self.inner.attributes.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.inner.class.name())
            .field("attributes", &self.own_attribute_names())
            .finish()
    }
}
