// Declared-type environment, chained the same way the value scopes are.

use super::ty::TypeScheme;
use std::collections::HashMap;
use std::rc::Rc;

/// Maps names to type schemes; lookups fall back to the parent chain.
#[derive(Debug, Clone, Default)]
pub struct TypeEnvironment {
    parent: Option<Rc<TypeEnvironment>>,
    bindings: HashMap<String, TypeScheme>,
}

impl TypeEnvironment {
    /// Creates a new, empty root environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new child environment that inherits from a parent.
    pub fn with_parent(parent: Rc<TypeEnvironment>) -> Self {
        TypeEnvironment {
            parent: Some(parent),
            bindings: HashMap::new(),
        }
    }

    /// Looks up a name in this frame and then its parents.
    pub fn lookup(&self, name: &str) -> Option<&TypeScheme> {
        self.bindings
            .get(name)
            .or_else(|| self.parent.as_ref().and_then(|p| p.lookup(name)))
    }

    /// Binds a name in this frame, shadowing any parent binding.
    pub fn define(&mut self, name: &str, scheme: TypeScheme) {
        self.bindings.insert(name.to_string(), scheme);
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}
