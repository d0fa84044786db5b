//! Name tables
//!
//! A module keeps one table for its globals and functions, each function one
//! for its arguments, blocks and instructions. Names within a table are
//! unique; a clash is resolved by appending a counter to the requested name.

use std::collections::HashMap;

use crate::blocks::BasicBlock;
use crate::handle::ValueRef;

/// Entity a name is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    Value(ValueRef),
    Block(BasicBlock),
}

#[derive(Debug, Clone)]
pub(crate) struct SymbolTable {
    names: HashMap<String, Symbol>,
    last_unique: u32,
    separator: &'static str,
}

impl SymbolTable {
    /// Table for module level symbols, clashes become `name.N`
    pub(crate) fn global() -> Self {
        Self {
            names: HashMap::new(),
            last_unique: 0,
            separator: ".",
        }
    }

    /// Table for function local symbols, clashes become `nameN`
    pub(crate) fn local() -> Self {
        Self {
            names: HashMap::new(),
            last_unique: 0,
            separator: "",
        }
    }

    /// Bind `symbol` to `base` or, if taken, to the first free suffixed form.
    /// Returns the name actually bound.
    pub(crate) fn insert_unique(&mut self, base: &str, symbol: Symbol) -> String {
        if !self.names.contains_key(base) {
            self.names.insert(base.to_string(), symbol);
            return base.to_string();
        }

        loop {
            self.last_unique += 1;
            let candidate = format!("{base}{}{}", self.separator, self.last_unique);
            if !self.names.contains_key(&candidate) {
                self.names.insert(candidate.clone(), symbol);
                return candidate;
            }
        }
    }

    pub(crate) fn remove(&mut self, name: &str) {
        self.names.remove(name);
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Symbol> {
        self.names.get(name).copied()
    }
}
