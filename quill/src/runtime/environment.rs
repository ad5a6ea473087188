// Environment for variable bindings and scope management

use crate::runtime::values::Value;
use std::collections::HashMap;

/// One frame of bindings.
pub type Scope = HashMap<String, Value>;

/// The runtime environment: a stack of scopes searched from the top down.
///
/// The bottom scope is the global one. It is created with the environment
/// and is never popped.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates an environment holding only an empty global scope.
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
        log::trace!("push scope (depth {})", self.scopes.len());
    }

    /// Pops the topmost scope. The global scope stays put; popping it
    /// returns `None`.
    pub fn pop_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() == 1 {
            log::warn!("attempted to pop the global scope");
            return None;
        }
        let popped = self.scopes.pop();
        log::trace!("pop scope (depth {})", self.scopes.len());
        popped
    }

    /// Number of scopes on the stack, the global scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Looks up a name, searching from the most recently pushed scope outward.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Defines a new variable or updates an existing one in the top scope.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Defines a variable in the global scope, whatever the current depth.
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.scopes[0].insert(name.to_string(), value);
    }

    /// Updates the binding found first from the top. Hands the value back
    /// if no scope holds `name`.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), Value> {
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
        {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_shadows_and_restores() {
        let mut env = Environment::new();
        env.define("x", Value::Integer(1));

        env.push_scope();
        env.define("x", Value::Integer(2));
        assert_eq!(env.lookup("x"), Some(&Value::Integer(2)));

        env.pop_scope();
        assert_eq!(env.lookup("x"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_assign_updates_nearest_binding() {
        let mut env = Environment::new();
        env.define("x", Value::Integer(1));
        env.push_scope();
        env.define("y", Value::Integer(5));

        assert!(env.assign("x", Value::Integer(10)).is_ok());
        assert_eq!(env.assign("z", Value::Unit), Err(Value::Unit));

        env.pop_scope();
        assert_eq!(env.lookup("x"), Some(&Value::Integer(10)));
        assert!(env.lookup("y").is_none());
    }

    #[test]
    fn test_global_scope_is_never_popped() {
        let mut env = Environment::new();
        env.define("g", Value::Boolean(true));
        assert!(env.pop_scope().is_none());
        assert_eq!(env.depth(), 1);
        assert!(env.contains("g"));
    }

    #[test]
    fn test_define_global_from_nested_scope() {
        let mut env = Environment::new();
        env.push_scope();
        env.define_global("g", Value::Integer(3));
        env.pop_scope();
        assert_eq!(env.lookup("g"), Some(&Value::Integer(3)));
    }
}
