use std::collections::HashMap;

use crate::{CompileError, Result};

/// Loop-variable bindings for one statement-tree compile.
///
/// Each name keeps a stack of bindings, so a nested loop that reuses its parent's induction
/// variable name shadows it and the parent's binding comes back when the inner loop unbinds.
#[derive(Debug)]
pub struct SymbolTable<V> {
    bindings: HashMap<String, Vec<V>>,
}

impl<V: Copy> SymbolTable<V> {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, name: &str, value: V) {
        self.bindings
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    /// Drop the innermost binding of `name`, returning it.
    pub fn unbind(&mut self, name: &str) -> Option<V> {
        let stack = self.bindings.get_mut(name)?;
        let value = stack.pop();
        if stack.is_empty() {
            self.bindings.remove(name);
        }
        value
    }

    pub fn lookup(&self, name: &str) -> Result<V> {
        self.bindings
            .get(name)
            .and_then(|stack| stack.last().copied())
            .ok_or_else(|| CompileError::UndefinedVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of live bindings for `name`.
    pub fn depth(&self, name: &str) -> usize {
        self.bindings.get(name).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<V: Copy> Default for SymbolTable<V> {
    fn default() -> Self {
        Self::new()
    }
}
