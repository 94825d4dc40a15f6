//! Construction mechanisms for classes
//!
//! A [`Metaclass`] decides how a class is built. Every metaclass may carry a
//! [`ConstructionHook`]; building a class runs the hooks of its metaclass and
//! all of that metaclass's ancestors over a [`ClassDraft`] before the class is
//! finalized. Combining two construction mechanisms is therefore a matter of
//! deriving a metaclass from both of them.

use super::class::{Class, Namespace};
use super::linearize::linearize;
use crate::error::{InvocationLoggerError, Result};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// One step of class construction
pub trait ConstructionHook: Send + Sync {
    /// Inspect or rewrite the class being built
    fn construct(&self, draft: &mut ClassDraft) -> Result<()>;
}

impl<F> ConstructionHook for F
where
    F: Fn(&mut ClassDraft) -> Result<()> + Send + Sync,
{
    fn construct(&self, draft: &mut ClassDraft) -> Result<()> {
        self(draft)
    }
}

/// A class that has not been finalized yet
pub struct ClassDraft {
    pub name: String,
    pub label: String,
    pub bases: Vec<Arc<Class>>,
    /// Linearized ancestors, most-derived first
    pub ancestors: Vec<Arc<Class>>,
    pub namespace: Namespace,
}

impl ClassDraft {
    /// Ancestor classes in resolution order
    pub fn ancestor_chain(&self) -> impl Iterator<Item = &Class> {
        self.ancestors.iter().map(|class| class.as_ref())
    }
}

pub struct Metaclass {
    name: String,
    bases: Vec<Arc<Metaclass>>,
    ancestors: Vec<Arc<Metaclass>>,
    hook: Option<Arc<dyn ConstructionHook>>,
}

static ROOT: OnceLock<Arc<Metaclass>> = OnceLock::new();

impl Metaclass {
    /// The default construction mechanism every other one derives from
    pub fn root() -> Arc<Metaclass> {
        ROOT.get_or_init(|| {
            Arc::new(Metaclass {
                name: "type".to_string(),
                bases: Vec::new(),
                ancestors: Vec::new(),
                hook: None,
            })
        })
        .clone()
    }

    /// A metaclass deriving directly from the root
    pub fn new(name: impl Into<String>, hook: Option<Arc<dyn ConstructionHook>>) -> Arc<Metaclass> {
        let root = Self::root();
        Arc::new(Metaclass {
            name: name.into(),
            bases: vec![root.clone()],
            ancestors: vec![root],
            hook,
        })
    }

    /// A metaclass combining the given bases
    ///
    /// Fails with a construction error when the bases cannot be linearized
    /// into one consistent order.
    pub fn derive(
        name: impl Into<String>,
        bases: Vec<Arc<Metaclass>>,
        hook: Option<Arc<dyn ConstructionHook>>,
    ) -> Result<Arc<Metaclass>> {
        let name = name.into();
        let bases = if bases.is_empty() {
            vec![Self::root()]
        } else {
            bases
        };

        let ancestors = linearize(&bases, Self::full_order).ok_or_else(|| {
            InvocationLoggerError::ConstructionError(format!(
                "cannot create a consistent construction order for metaclass '{}' from bases {}",
                name,
                bases.iter().map(|b| b.name.as_str()).collect::<Vec<_>>().join(", ")
            ))
        })?;

        Ok(Arc::new(Metaclass {
            name,
            bases,
            ancestors,
            hook,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[Arc<Metaclass>] {
        &self.bases
    }

    pub fn is_root(&self) -> bool {
        self.bases.is_empty()
    }

    /// This metaclass followed by its ancestors
    pub fn mro(&self) -> impl Iterator<Item = &Metaclass> {
        std::iter::once(self).chain(self.ancestors.iter().map(|m| m.as_ref()))
    }

    pub fn is_subclass_of(&self, other: &Metaclass) -> bool {
        self.mro().any(|m| std::ptr::eq(m, other))
    }

    /// Run every hook in the hierarchy, most-base first
    pub(crate) fn construct(&self, draft: &mut ClassDraft) -> Result<()> {
        let chain: Vec<&Metaclass> = self.mro().collect();
        for meta in chain.into_iter().rev() {
            if let Some(hook) = &meta.hook {
                hook.construct(draft)?;
            }
        }
        Ok(())
    }

    fn full_order(meta: &Arc<Metaclass>) -> Vec<Arc<Metaclass>> {
        let mut order = vec![meta.clone()];
        order.extend(meta.ancestors.iter().cloned());
        order
    }
}

impl fmt::Debug for Metaclass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metaclass")
            .field("name", &self.name)
            .field("mro", &self.mro().map(|m| m.name.as_str()).collect::<Vec<_>>())
            .field("has_hook", &self.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_hook(
        log: &Arc<Mutex<Vec<String>>>,
        tag: &'static str,
    ) -> Arc<dyn ConstructionHook> {
        let log = log.clone();
        Arc::new(move |draft: &mut ClassDraft| -> Result<()> {
            log.lock().unwrap().push(format!("{}:{}", tag, draft.name));
            Ok(())
        })
    }

    #[test]
    fn test_root_is_shared() {
        assert!(Arc::ptr_eq(&Metaclass::root(), &Metaclass::root()));
        assert!(Metaclass::root().is_root());
    }

    #[test]
    fn test_new_derives_from_root() {
        let meta = Metaclass::new("Meta", None);

        assert!(meta.is_subclass_of(&Metaclass::root()));
        assert!(!meta.is_root());
        assert_eq!(meta.mro().map(|m| m.name()).collect::<Vec<_>>(), vec!["Meta", "type"]);
    }

    #[test]
    fn test_derive_combines_bases() {
        let a = Metaclass::new("A", None);
        let b = Metaclass::new("B", None);
        let combined = Metaclass::derive("AB", vec![a.clone(), b.clone()], None).unwrap();

        assert!(combined.is_subclass_of(&a));
        assert!(combined.is_subclass_of(&b));
        assert_eq!(
            combined.mro().map(|m| m.name()).collect::<Vec<_>>(),
            vec!["AB", "A", "B", "type"]
        );
    }

    #[test]
    fn test_derive_inconsistent_bases_fails() {
        let a = Metaclass::new("A", None);
        let b = Metaclass::derive("B", vec![a.clone()], None).unwrap();

        let result = Metaclass::derive("Broken", vec![a, b], None);

        match result {
            Err(InvocationLoggerError::ConstructionError(message)) => {
                assert!(message.contains("Broken"));
            }
            _ => panic!("Expected ConstructionError"),
        }
    }

    #[test]
    fn test_hooks_run_most_base_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Metaclass::new("A", Some(recording_hook(&log, "a")));
        let b = Metaclass::new("B", Some(recording_hook(&log, "b")));
        let combined =
            Metaclass::derive("AB", vec![a, b], Some(recording_hook(&log, "ab"))).unwrap();

        Class::builder("Thing").metaclass(combined).build().unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["b:Thing", "a:Thing", "ab:Thing"]);
    }

    #[test]
    fn test_failing_hook_aborts_construction() {
        let hook: Arc<dyn ConstructionHook> = Arc::new(|draft: &mut ClassDraft| -> Result<()> {
            Err(InvocationLoggerError::ConstructionError(format!("{} rejected", draft.name)))
        });
        let meta = Metaclass::new("Strict", Some(hook));

        let result = Class::builder("Thing").metaclass(meta).build();

        assert!(matches!(result, Err(InvocationLoggerError::ConstructionError(_))));
    }
}
