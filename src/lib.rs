//! Transparent invocation logging.
//!
//! This crate instruments the public operations of a type, or of a single
//! live instance, so that every call is recorded: first the invocation with
//! its arguments, then either the returned value or the raised fault. The
//! wrapped implementation, its results and its faults are left untouched.
//!
//! Types and instances live in a small reflective [`object`] model, which
//! gives the instrumentation what it needs: enumerating members through a
//! class hierarchy and rewriting a namespace while a class is constructed.
//! Log records go to a [`sink::Sink`].
//!
//! # Example
//!
//! ```
//! use invocation_logger::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let account = Class::builder("Account")
//!     .method("deposit", |receiver, args| {
//!         let amount = args.bind(0, "amount").and_then(|v| v.as_i64()).unwrap_or(0);
//!         let balance = receiver.get_field("balance")?.as_i64().unwrap_or(0) + amount;
//!         receiver.set_field("balance", balance);
//!         Ok(json!(balance))
//!     })
//!     .field("balance", 0)
//!     .build()?;
//!
//! let sink = Arc::new(RecordingSink::default());
//! let logged = wrap_type(&account, sink.clone())?;
//!
//! let instance = Instance::new(&logged);
//! instance.call("deposit", &CallArgs::new().arg(10))?;
//!
//! assert_eq!(sink.messages(), vec!["Account.deposit(10)", "Account.deposit: 10"]);
//! # Ok::<(), invocation_logger::InvocationLoggerError>(())
//! ```

pub mod error;
pub mod object;
pub mod proxy;
pub mod sink;

pub use error::{Fault, InvocationLoggerError, Result};
pub use proxy::{wrap_instance, wrap_type, wrap_type_with, WrapOptions};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Fault, InvocationLoggerError, Result};
    pub use crate::object::{
        Attribute, CallArgs, Callable, Class, ClassDraft, ConstructionHook, Instance, Metaclass,
    };
    pub use crate::proxy::{wrap_instance, wrap_type, wrap_type_with, Render, WrapOptions};
    pub use crate::sink::{NullSink, RecordingSink, Sink, TracingSink};
}
