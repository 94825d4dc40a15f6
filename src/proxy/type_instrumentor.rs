//! Instrumenting a whole type
//!
//! [`wrap_type`] builds a subclass of the target whose construction step
//! installs intercepted versions of every public operation. The step lives
//! in a metaclass, so when the target already has a construction mechanism
//! of its own the two are combined by deriving a metaclass from both, and
//! the target's own hooks still run for the new type.

use super::discovery::{discover_into, wrap_declared};
use crate::error::Result;
use crate::object::{Class, ClassDraft, ConstructionHook, Metaclass};
use crate::sink::Sink;
use std::sync::Arc;
use tracing::debug;

/// Name of the metaclass carrying the instrumentation step
pub const INSTRUMENTATION_METACLASS: &str = "InvocationLogger";

/// Options for [`wrap_type_with`]
#[derive(Debug, Clone, Default)]
pub struct WrapOptions {
    /// Label used in log prefixes; defaults to the target type's name
    pub label: Option<String>,
}

impl WrapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Construction step that intercepts the public operations of the class
/// being built, both those it declares and those it inherits.
pub struct InstrumentationHook {
    sink: Arc<dyn Sink>,
}

impl InstrumentationHook {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self { sink }
    }
}

impl ConstructionHook for InstrumentationHook {
    fn construct(&self, draft: &mut ClassDraft) -> Result<()> {
        let label = draft.label.clone();
        let mut wrapped = wrap_declared(&mut draft.namespace, &label, &self.sink);
        wrapped.extend(discover_into(
            draft.ancestors.iter().map(|class| class.as_ref()),
            &mut draft.namespace,
            &label,
            &self.sink,
        ));

        debug!("Instrumented class {} ({} members wrapped)", label, wrapped.len());
        Ok(())
    }
}

/// Build an instrumented subclass of `target` that logs to `sink`
///
/// The new type is labelled with the target's name. `target` is not
/// modified.
///
/// # Examples
///
/// ```
/// use invocation_logger::object::{CallArgs, Class, Instance};
/// use invocation_logger::sink::RecordingSink;
/// use invocation_logger::wrap_type;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let target = Class::builder("Calculator")
///     .method("double", |_, args| {
///         Ok(json!(args.bind(0, "x").and_then(|v| v.as_i64()).unwrap_or(0) * 2))
///     })
///     .build()
///     .unwrap();
///
/// let sink = Arc::new(RecordingSink::default());
/// let logged = wrap_type(&target, sink.clone()).unwrap();
///
/// let calculator = Instance::new(&logged);
/// assert_eq!(calculator.call("double", &CallArgs::new().arg(21)).unwrap(), json!(42));
/// assert_eq!(sink.messages(), vec!["Calculator.double(21)", "Calculator.double: 42"]);
/// ```
pub fn wrap_type(target: &Arc<Class>, sink: Arc<dyn Sink>) -> Result<Arc<Class>> {
    wrap_type_with(target, sink, WrapOptions::default())
}

/// [`wrap_type`] with explicit options
///
/// Fails with a construction error when one of the target's own
/// construction hooks rejects the new type. The instrumentation metaclass
/// is created afresh for every call and only derives from the root, so
/// deriving it together with the target's metaclass always linearizes.
///
/// Wrapping a type that is already instrumented for another sink layers a
/// second interceptor on top: each sink receives its own records. Wrapping
/// it again for the same sink wraps nothing.
pub fn wrap_type_with(
    target: &Arc<Class>,
    sink: Arc<dyn Sink>,
    options: WrapOptions,
) -> Result<Arc<Class>> {
    let label = options.label.unwrap_or_else(|| target.name().to_string());
    let hook: Arc<dyn ConstructionHook> = Arc::new(InstrumentationHook::new(sink));
    let instrumentation = Metaclass::new(INSTRUMENTATION_METACLASS, Some(hook));

    let existing = target.metaclass();
    let metaclass = if existing.is_root() {
        instrumentation
    } else {
        debug!(
            "Combining instrumentation with metaclass {} of {}",
            existing.name(),
            target.name()
        );
        Metaclass::derive(
            format!("{}[{}]", INSTRUMENTATION_METACLASS, existing.name()),
            vec![instrumentation, existing.clone()],
            None,
        )?
    };

    Class::builder(target.name())
        .label(label)
        .base(target.clone())
        .metaclass(metaclass)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvocationLoggerError;
    use crate::object::{CallArgs, Instance};
    use crate::sink::RecordingSink;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn target() -> Arc<Class> {
        Class::builder("Foo")
            .method("foo", |_, _| Ok(json!(42)))
            .method("_secret", |_, _| Ok(json!("hidden")))
            .field("size", 3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_instrumented_type_derives_from_target() {
        let target = target();
        let logged = wrap_type(&target, Arc::new(RecordingSink::default())).unwrap();

        assert!(logged.is_subclass_of(&target));
        assert_eq!(logged.name(), "Foo");
        assert_eq!(logged.label(), "Foo");
        assert!(!Arc::ptr_eq(&logged, &target));
    }

    #[test]
    fn test_target_is_not_mutated() {
        let target = target();
        let sink = Arc::new(RecordingSink::default());
        let _logged = wrap_type(&target, sink.clone()).unwrap();

        let plain = Instance::new(&target);
        assert_eq!(plain.call("foo", &CallArgs::new()).unwrap(), json!(42));
        assert!(sink.is_empty());
        assert!(!target.namespace()["foo"].is_intercepted());
    }

    #[test]
    fn test_only_public_callables_wrapped() {
        let logged = wrap_type(&target(), Arc::new(RecordingSink::default())).unwrap();

        let names: Vec<&String> = logged.namespace().keys().collect();
        assert_eq!(names, vec!["foo"]);
        assert!(logged.namespace()["foo"].is_intercepted());
    }

    #[test]
    fn test_private_and_fields_untouched_at_call_time() {
        let sink = Arc::new(RecordingSink::default());
        let logged = wrap_type(&target(), sink.clone()).unwrap();
        let instance = Instance::new(&logged);

        assert_eq!(instance.call("_secret", &CallArgs::new()).unwrap(), json!("hidden"));
        assert_eq!(instance.get_field("size").unwrap(), json!(3));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_custom_label() {
        let sink = Arc::new(RecordingSink::default());
        let logged =
            wrap_type_with(&target(), sink.clone(), WrapOptions::new().with_label("Renamed"))
                .unwrap();

        Instance::new(&logged).call("foo", &CallArgs::new()).unwrap();

        assert_eq!(logged.label(), "Renamed");
        assert_eq!(sink.messages(), vec!["Renamed.foo()", "Renamed.foo: 42"]);
    }

    #[test]
    fn test_composes_with_existing_metaclass() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = constructed.clone();
        let registry: Arc<dyn ConstructionHook> =
            Arc::new(move |_draft: &mut ClassDraft| -> Result<()> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        let meta_bar = Metaclass::new("MetaBar", Some(registry));
        let foo = Class::builder("Foo")
            .metaclass(meta_bar.clone())
            .method("foo", |_, _| Ok(json!(42)))
            .build()
            .unwrap();
        assert_eq!(constructed.load(Ordering::SeqCst), 1);

        let sink = Arc::new(RecordingSink::default());
        let logged = wrap_type(&foo, sink.clone()).unwrap();

        // The target's own construction step ran again for the new type
        assert_eq!(constructed.load(Ordering::SeqCst), 2);
        assert!(logged.metaclass().is_subclass_of(&meta_bar));
        assert_eq!(Instance::new(&logged).call("foo", &CallArgs::new()).unwrap(), json!(42));
        assert_eq!(sink.messages(), vec!["Foo.foo()", "Foo.foo: 42"]);
    }

    #[test]
    fn test_methods_injected_by_target_metaclass_are_wrapped() {
        let inject: Arc<dyn ConstructionHook> =
            Arc::new(|draft: &mut ClassDraft| -> Result<()> {
                let name = draft.name.clone();
                draft.namespace.insert(
                    "describe".to_string(),
                    crate::object::Attribute::Method(crate::object::Callable::new(
                        "describe",
                        move |_, _| Ok(json!(name.clone())),
                    )),
                );
                Ok(())
            });
        let foo = Class::builder("Foo")
            .metaclass(Metaclass::new("Describing", Some(inject)))
            .build()
            .unwrap();

        let sink = Arc::new(RecordingSink::default());
        let logged = wrap_type(&foo, sink.clone()).unwrap();
        Instance::new(&logged).call("describe", &CallArgs::new()).unwrap();

        assert_eq!(sink.messages(), vec!["Foo.describe()", "Foo.describe: Foo"]);
    }

    #[test]
    fn test_rejecting_target_metaclass_fails_with_construction_error() {
        let sealed: Arc<dyn ConstructionHook> =
            Arc::new(|draft: &mut ClassDraft| -> Result<()> {
                if draft.bases.is_empty() {
                    Ok(())
                } else {
                    Err(InvocationLoggerError::ConstructionError(format!(
                        "{} is sealed",
                        draft.name
                    )))
                }
            });
        let sealed_class = Class::builder("Sealed")
            .metaclass(Metaclass::new("SealedMeta", Some(sealed)))
            .method("run", |_, _| Ok(Value::Null))
            .build()
            .unwrap();

        let result = wrap_type(&sealed_class, Arc::new(RecordingSink::default()));

        match result {
            Err(InvocationLoggerError::ConstructionError(message)) => {
                assert_eq!(message, "Sealed is sealed");
            }
            _ => panic!("Expected ConstructionError"),
        }
    }

    #[test]
    fn test_subclass_of_instrumented_type() {
        let sink = Arc::new(RecordingSink::default());
        let logged = wrap_type(&target(), sink.clone()).unwrap();
        let child = Class::builder("Child")
            .base(logged)
            .method("extra", |_, _| Ok(json!("more")))
            .build()
            .unwrap();
        let instance = Instance::new(&child);

        instance.call("foo", &CallArgs::new()).unwrap();
        instance.call("extra", &CallArgs::new()).unwrap();

        // Inherited members are not wrapped a second time
        assert!(!child.namespace().contains_key("foo"));
        assert_eq!(
            sink.messages(),
            vec!["Foo.foo()", "Foo.foo: 42", "Child.extra()", "Child.extra: more"]
        );
    }

    #[test]
    fn test_wrapping_instrumented_type_for_same_sink_does_not_double_log() {
        let sink = Arc::new(RecordingSink::default());
        let once = wrap_type(&target(), sink.clone()).unwrap();
        let twice = wrap_type(&once, sink.clone()).unwrap();

        Instance::new(&twice).call("foo", &CallArgs::new()).unwrap();

        assert!(twice.namespace().is_empty());
        assert_eq!(sink.messages(), vec!["Foo.foo()", "Foo.foo: 42"]);
    }

    #[test]
    fn test_wrapping_instrumented_type_for_new_sink_logs_to_both() {
        let first = Arc::new(RecordingSink::default());
        let second = Arc::new(RecordingSink::default());
        let once = wrap_type(&target(), first.clone()).unwrap();
        let twice = wrap_type(&once, second.clone()).unwrap();

        let result = Instance::new(&twice).call("foo", &CallArgs::new()).unwrap();

        assert_eq!(result, json!(42));
        assert_eq!(first.messages(), vec!["Foo.foo()", "Foo.foo: 42"]);
        assert_eq!(second.messages(), vec!["Foo.foo()", "Foo.foo: 42"]);

        // Instances of the first instrumented type still log only once
        first.clear();
        second.clear();
        Instance::new(&once).call("foo", &CallArgs::new()).unwrap();
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }
}
