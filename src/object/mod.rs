//! Reflective object model
//!
//! Instrumentation needs to enumerate the operations of a type, walk its
//! ancestors and rewrite its namespace while it is being constructed. This
//! module provides exactly that surface:
//!
//! - **Class**: immutable namespace of attributes with C3-ordered ancestors
//! - **Metaclass**: the construction mechanism of a class, composable by derivation
//! - **Instance**: a live object with its own attribute table
//! - **Callable**: a named operation invoked against a receiver
//!
//! Values are `serde_json::Value`s throughout.

pub mod callable;
pub mod class;
pub mod instance;
mod linearize;
pub mod metaclass;

pub use callable::{BoundMethod, CallArgs, Callable, MethodFn};
pub use class::{Attribute, Class, ClassBuilder, Namespace, Property};
pub use instance::{Instance, WeakInstance, INITIALIZER};
pub use metaclass::{ClassDraft, ConstructionHook, Metaclass};
