use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// The single global scope of a session. Bindings live until overwritten,
/// or until the `with` statement that introduced them ends.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Environment {
    store: HashMap<Rc<str>, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            store: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.store.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.store.get_mut(key)
    }

    pub fn set(&mut self, key: Rc<str>, value: Value) {
        self.store.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.store.remove(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
