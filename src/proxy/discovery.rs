//! Finding the public operations of a class hierarchy

use super::interceptor::intercept;
use crate::object::{Attribute, Callable, Class, Namespace};
use crate::sink::Sink;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::trace;

/// Names starting with this marker are private and never wrapped
pub const PRIVATE_MARKER: char = '_';

pub fn is_public(name: &str) -> bool {
    !name.starts_with(PRIVATE_MARKER)
}

/// A public operation reachable through a class hierarchy
#[derive(Debug, Clone)]
pub struct Member<'a> {
    pub name: &'a str,
    pub callable: &'a Callable,
    /// Class whose namespace holds the resolved definition
    pub declared_on: &'a Class,
}

/// Public callable members visible through `chain`, which must be given in
/// resolution order.
///
/// Each name is resolved once: the first class in the chain that defines it
/// wins, exactly like attribute lookup. A name whose winning definition is
/// a field or property is skipped, even if an ancestor defines it as a
/// method.
pub fn public_members<'a, I>(chain: I) -> Vec<Member<'a>>
where
    I: IntoIterator<Item = &'a Class>,
{
    let mut seen: BTreeSet<&'a str> = BTreeSet::new();
    let mut members = Vec::new();

    for class in chain {
        for (name, attribute) in class.namespace() {
            if !seen.insert(name.as_str()) || !is_public(name) {
                continue;
            }
            if let Attribute::Method(callable) = attribute {
                members.push(Member {
                    name: name.as_str(),
                    callable,
                    declared_on: class,
                });
            }
        }
    }

    members
}

/// Install an intercepted version of every public member of `chain` into
/// `namespace`, labelling records `<label>.<name>`.
///
/// Names already present in `namespace` are left alone, as are members that
/// already log to `sink`, so running this any number of times over any
/// overlapping chains never wraps a member twice for the same sink. A member
/// intercepted for some other sink is wrapped again, and each sink sees its
/// own records. Returns the names that were wrapped.
pub fn discover_into<'a, I>(
    chain: I,
    namespace: &mut Namespace,
    label: &str,
    sink: &Arc<dyn Sink>,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a Class>,
{
    let mut wrapped = Vec::new();

    for member in public_members(chain) {
        if namespace.contains_key(member.name) || member.callable.logs_to(sink) {
            continue;
        }
        trace!(
            "Wrapping {}.{} (declared on {})",
            label,
            member.name,
            member.declared_on.name()
        );
        let prefix = format!("{}.{}", label, member.name);
        let replacement = intercept(member.callable, prefix, sink.clone());
        namespace.insert(member.name.to_string(), Attribute::Method(replacement));
        wrapped.push(member.name.to_string());
    }

    wrapped
}

/// Replace the public methods declared directly in `namespace` that do not
/// yet log to `sink` with intercepted versions. Returns the names that were
/// wrapped.
pub fn wrap_declared(namespace: &mut Namespace, label: &str, sink: &Arc<dyn Sink>) -> Vec<String> {
    let mut wrapped = Vec::new();

    for (name, attribute) in namespace.iter_mut() {
        if !is_public(name) {
            continue;
        }
        if let Attribute::Method(callable) = attribute {
            if callable.logs_to(sink) {
                continue;
            }
            trace!("Wrapping declared {}.{}", label, name);
            *callable = intercept(callable, format!("{}.{}", label, name), sink.clone());
            wrapped.push(name.clone());
        }
    }

    wrapped
}
