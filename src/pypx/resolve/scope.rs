//! Variable scopes for pypx
//!
//! A scope is a mapping from variable name to string value, chained to a
//! parent. Component imports create a child scope seeded with the passed
//! arguments; lookups walk child to parent. Values are copied forward when
//! a subtree's resolution completes, never referenced.

use crate::pypx::ast::AttrMap;

/// Variable bindings injected from outside a compilation.
pub type Vars = AttrMap;

/// A link in the scope chain. Inner scopes shadow outer ones.
#[derive(Debug)]
pub struct Scope<'p> {
    vars: Vars,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    /// Root scope for a page or file.
    pub fn root(vars: Vars) -> Scope<'static> {
        Scope { vars, parent: None }
    }

    /// Empty root scope.
    pub fn empty() -> Scope<'static> {
        Scope::root(Vars::new())
    }

    /// Child scope seeded with import arguments.
    pub fn child(&'p self, vars: Vars) -> Scope<'p> {
        Scope {
            vars,
            parent: Some(self),
        }
    }

    /// Look a name up, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        match self.vars.get(name) {
            Some(value) => Some(value.as_str()),
            None => self.parent.and_then(|p| p.lookup(name)),
        }
    }

    /// Collapse the chain into one mapping, inner bindings winning.
    pub fn flatten(&self) -> Vars {
        let mut flat = match self.parent {
            Some(parent) => parent.flatten(),
            None => Vars::new(),
        };
        for (key, value) in &self.vars {
            flat.insert(key.clone(), value.clone());
        }
        flat
    }
}
