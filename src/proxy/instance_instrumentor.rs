use super::discovery::public_members;
use super::interceptor::intercept;
use crate::object::{Attribute, BoundMethod, Instance};
use crate::sink::Sink;
use std::sync::Arc;
use tracing::{debug, trace};

/// Instrument one live instance in place
///
/// Every public operation reachable from the instance's class is installed
/// into the instance's own attribute table as an intercepted method bound to
/// this instance. The class and every other instance are left alone and the
/// returned handle is the same object that was passed in.
///
/// When the instance already holds its own method under a public name, plain
/// or bound, that method is the one wrapped and the result is bound to this
/// instance. Names the instance shadows with a data attribute are skipped,
/// since they do not resolve to an operation on this instance. Operations
/// that already log to `sink`, on the class or on the instance, are not
/// wrapped again; those intercepted for another sink get a new layer.
pub fn wrap_instance(instance: &Instance, sink: Arc<dyn Sink>) -> Instance {
    let class = instance.class().clone();
    let label = class.label();
    let mut wrapped = 0;

    for member in public_members(class.mro()) {
        let original = match instance.own_attribute(member.name) {
            None => member.callable.clone(),
            Some(Attribute::Method(own)) => own,
            Some(Attribute::Bound(own)) => own.callable().clone(),
            Some(Attribute::Field(_)) | Some(Attribute::Property(_)) => continue,
        };
        if original.logs_to(&sink) {
            continue;
        }

        trace!("Wrapping {}.{} on instance", label, member.name);
        let prefix = format!("{}.{}", label, member.name);
        let replacement = intercept(&original, prefix, sink.clone());
        instance.set_attribute(
            member.name,
            Attribute::Bound(BoundMethod::new(replacement, instance)),
        );
        wrapped += 1;
    }

    debug!("Instrumented instance of {} ({} members wrapped)", label, wrapped);
    instance.clone()
}
