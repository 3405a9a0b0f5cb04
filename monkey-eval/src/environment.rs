use crate::object::Object;
use gc::{Finalize, Gc, GcCell, Trace};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Trace, Finalize)]
pub struct EnvironmentCore {
    store: HashMap<Rc<str>, Gc<Object>>,
    outer: Option<Environment>,
}

/// A shared handle to one scope. Cloning the handle shares the scope. Scopes
/// are collected once no handle or closure can reach them, cycles included.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct Environment {
    environment: Gc<GcCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: None,
            })),
        }
    }

    pub fn new_enclosed(outer: &Environment) -> Environment {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: Some(outer.clone()),
            })),
        }
    }

    /// Looks `key` up in this scope, then in each enclosing scope.
    pub fn get(&self, key: &str) -> Option<Gc<Object>> {
        let env = self.environment.borrow();
        match env.store.get(key) {
            Some(value) => Some(value.clone()),
            None => env.outer.as_ref().and_then(|outer| outer.get(key)),
        }
    }

    /// Binds `key` in this scope, shadowing any binding in enclosing scopes.
    pub fn set(&self, key: Rc<str>, value: Gc<Object>) {
        self.environment.borrow_mut().store.insert(key, value);
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Gc::ptr_eq(&self.environment, &other.environment)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let global = Environment::new();
        global.set("a".into(), Object::integer(1));
        global.set("b".into(), Object::integer(2));

        let inner = Environment::new_enclosed(&global);
        inner.set("b".into(), Object::integer(20));

        assert_eq!(inner.get("a"), Some(Object::integer(1)));
        assert_eq!(inner.get("b"), Some(Object::integer(20)));
        assert_eq!(global.get("b"), Some(Object::integer(2)));
        assert_eq!(inner.get("c"), None);
    }

    #[test]
    fn test_set_writes_innermost() {
        let global = Environment::new();
        let inner = Environment::new_enclosed(&global);
        inner.set("x".into(), Object::boolean(true));

        assert_eq!(global.get("x"), None);
        assert_eq!(inner.get("x"), Some(Object::boolean(true)));
    }

    #[test]
    fn test_unreachable_scope_is_collected() {
        let name: Rc<str> = "x".into();
        let global = Environment::new();

        let inner = Environment::new_enclosed(&global);
        inner.set(name.clone(), Object::integer(1));
        assert_eq!(Rc::strong_count(&name), 2);

        drop(inner);
        gc::force_collect();
        assert_eq!(Rc::strong_count(&name), 1);
    }

    #[test]
    fn test_clones_share_the_scope() {
        let env = Environment::new();
        let alias = env.clone();
        alias.set("x".into(), Object::integer(5));

        assert!(env.ptr_eq(&alias));
        assert_eq!(env.get("x"), Some(Object::integer(5)));
        assert!(!env.ptr_eq(&Environment::new()));
    }
}
