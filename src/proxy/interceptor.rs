//! Bracketing a single callable with log records

use super::stringify::{stringify_args, stringify_result};
use crate::object::Callable;
use crate::sink::Sink;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Logged before the original runs: prefix, rendered arguments
pub const CALL_TEMPLATE: &str = "%s(%s)";
/// Logged after a normal return: prefix, rendered result
pub const RESULT_TEMPLATE: &str = "%s: %s";
/// Logged after a fault: prefix, fault kind, fault message
pub const FAULT_TEMPLATE: &str = "%s: raised %s (\"%s\")";
/// Fault kind reported when the original panics
pub const PANIC_KIND: &str = "panic";

/// Wrap `original` so that every call is logged to `sink`
///
/// The replacement keeps the original's name, doc and calling convention.
/// Each invocation produces exactly two records: the call record before
/// delegating and either the result or the fault record afterwards. The
/// result or fault itself is handed back untouched. A panic in the original
/// is logged as a fault of kind `panic` and then resumed.
pub fn intercept(original: &Callable, prefix: impl Into<String>, sink: Arc<dyn Sink>) -> Callable {
    let prefix = prefix.into();
    let inner = original.clone();

    original.replaced_by(sink.clone(), move |receiver, args| {
        let record = stringify_args(args);
        sink.log(CALL_TEMPLATE, &[prefix.as_str(), record.as_str()]);

        match panic::catch_unwind(AssertUnwindSafe(|| inner.call(receiver, args))) {
            Ok(Ok(value)) => {
                let rendered = stringify_result(&value);
                sink.log(RESULT_TEMPLATE, &[prefix.as_str(), rendered.as_str()]);
                Ok(value)
            }
            Ok(Err(fault)) => {
                sink.log(
                    FAULT_TEMPLATE,
                    &[prefix.as_str(), fault.kind_name(), fault.message.as_str()],
                );
                Err(fault)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                sink.log(FAULT_TEMPLATE, &[prefix.as_str(), PANIC_KIND, message.as_str()]);
                panic::resume_unwind(payload)
            }
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
