//! Call interception for types and instances
//!
//! Two entry points instrument the public operations of an object model
//! class so that every call is logged to a [`Sink`](crate::sink::Sink):
//!
//! - [`wrap_type`] builds a new instrumented subclass usable for any future instance
//! - [`wrap_instance`] instruments one existing instance in place
//!
//! Each logged call produces exactly two records, `"%s(%s)"` with the
//! prefix and rendered arguments before the call, then either `"%s: %s"`
//! with the rendered result or `"%s: raised %s (\"%s\")"` with the fault's
//! kind and message after it. Results and faults pass through unchanged.
//!
//! # Components
//!
//! - **stringify**: renders arguments and results as text
//! - **interceptor**: wraps one callable with the two log records
//! - **discovery**: enumerates public callables through a class hierarchy
//! - **type_instrumentor** / **instance_instrumentor**: the two entry points

pub mod discovery;
pub mod instance_instrumentor;
pub mod interceptor;
pub mod stringify;
pub mod type_instrumentor;

pub use discovery::{discover_into, is_public, public_members, Member, PRIVATE_MARKER};
pub use instance_instrumentor::wrap_instance;
pub use interceptor::{intercept, CALL_TEMPLATE, FAULT_TEMPLATE, PANIC_KIND, RESULT_TEMPLATE};
pub use stringify::{stringify_args, stringify_result, Render, NONE_TEXT};
pub use type_instrumentor::{
    wrap_type, wrap_type_with, InstrumentationHook, WrapOptions, INSTRUMENTATION_METACLASS,
};
