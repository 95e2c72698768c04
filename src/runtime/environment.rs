//! Runtime environment: a stack of variable scopes plus a flat function table
//!
//! The stack always holds at least the global scope. Lookups and
//! assignments walk from the innermost scope outward and stop at the first
//! scope that declares the name, so a nested declaration shadows an outer one
//! until its scope is popped.

use std::collections::{BTreeMap, HashMap};

use crate::runtime::value::Scalar;
use crate::utils::{Error, Result};

/// A variable binding
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: Scalar,
    pub mutable: bool,
}

type Scope = HashMap<String, Variable>;

/// Variable scopes and declared functions for one program run
#[derive(Debug)]
pub struct Environment {
    /// Innermost scope last; index 0 is the global scope
    scopes: Vec<Scope>,
    /// Function name -> body source. Declared but never invoked.
    functions: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
            functions: HashMap::new(),
        }
    }

    /// Number of scopes on the stack (1 when only the global scope remains)
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Enter a new nested scope
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
        log::trace!("push scope (depth {})", self.scopes.len());
    }

    /// Exit the current scope
    pub fn pop_scope(&mut self) -> Result<()> {
        if self.scopes.len() == 1 {
            return Err(Error::PopGlobalScope);
        }
        self.scopes.pop();
        log::trace!("pop scope (depth {})", self.scopes.len());
        Ok(())
    }

    /// Run `f` inside a fresh scope.
    ///
    /// The stack is restored to its previous depth on every exit path,
    /// including errors raised by `f`.
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let depth = self.scopes.len();
        self.push_scope();
        let result = f(self);
        self.scopes.truncate(depth);
        log::trace!("leave scope (depth {})", depth);
        result
    }

    /// Declare a variable in the current scope
    pub fn declare_var(&mut self, name: &str, value: Scalar, mutable: bool) -> Result<()> {
        let scope = self.current_scope_mut();
        if scope.contains_key(name) {
            return Err(Error::DuplicateDeclaration {
                name: name.to_string(),
            });
        }
        scope.insert(name.to_string(), Variable { value, mutable });
        Ok(())
    }

    /// Assign to an existing variable in the nearest scope declaring it
    pub fn assign_var(&mut self, name: &str, value: Scalar) -> Result<()> {
        let variable = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
            .ok_or_else(|| Error::UndefinedVariable {
                name: name.to_string(),
            })?;

        if !variable.mutable {
            return Err(Error::ImmutableAssignment {
                name: name.to_string(),
            });
        }

        variable.value = value;
        Ok(())
    }

    /// Look up a variable, searching from the innermost scope outward
    pub fn get_var(&self, name: &str) -> Result<&Variable> {
        self.lookup(name).ok_or_else(|| Error::UndefinedVariable {
            name: name.to_string(),
        })
    }

    /// Check if a variable exists in any active scope
    pub fn has_var(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Every visible binding, with inner declarations hiding outer ones
    pub fn variables(&self) -> BTreeMap<&str, &Variable> {
        let mut visible = BTreeMap::new();
        for scope in self.scopes.iter().rev() {
            for (name, variable) in scope {
                visible.entry(name.as_str()).or_insert(variable);
            }
        }
        visible
    }

    /// Register a function body under `name`
    pub fn declare_function(&mut self, name: &str, body: impl Into<String>) -> Result<()> {
        if self.functions.contains_key(name) {
            return Err(Error::DuplicateFunction {
                name: name.to_string(),
            });
        }
        self.functions.insert(name.to_string(), body.into());
        Ok(())
    }

    /// Retrieve a function body by name
    pub fn get_function(&self, name: &str) -> Result<&str> {
        self.functions
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::UndefinedFunction {
                name: name.to_string(),
            })
    }

    fn lookup(&self, name: &str) -> Option<&Variable> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn current_scope_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
