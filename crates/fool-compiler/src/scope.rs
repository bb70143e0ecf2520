//! Nested scope management for the symbol table pass.
//!
//! [`ScopeStack`] holds one name table per nesting level. It handles:
//! - Entering and leaving scopes for programs, functions and class bodies
//! - Declaration with same-scope duplicate detection
//! - Lookup from the innermost scope outward, inner names shadowing outer ones

use rustc_hash::FxHashMap;

use crate::symbols::SymbolEntry;

/// The names declared at one nesting level.
pub type ScopeTable = FxHashMap<String, SymbolEntry>;

// ============================================================================
// ScopeStack
// ============================================================================

/// Stack of scopes, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<ScopeTable>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    /// Enter a new empty scope.
    pub fn push(&mut self) {
        self.scopes.push(ScopeTable::default());
    }

    /// Enter a scope pre-populated with `table`, e.g. an inherited virtual table.
    pub fn push_with(&mut self, table: ScopeTable) {
        self.scopes.push(table);
    }

    /// Leave the current scope, returning its table.
    pub fn pop(&mut self) -> Option<ScopeTable> {
        self.scopes.pop()
    }

    /// Nesting level of the current scope. The first scope pushed is level 0.
    pub fn level(&self) -> u32 {
        self.scopes.len().saturating_sub(1) as u32
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    // ==========================================================================
    // Declaration & Lookup
    // ==========================================================================

    /// Declare `name` in the current scope.
    ///
    /// Returns the existing entry, leaving the scope unchanged, if the name is
    /// already declared at this level.
    pub fn declare(&mut self, name: &str, entry: SymbolEntry) -> Result<(), SymbolEntry> {
        let Some(scope) = self.scopes.last_mut() else {
            return Err(entry);
        };
        if let Some(existing) = scope.get(name) {
            return Err(existing.clone());
        }
        scope.insert(name.to_string(), entry);
        Ok(())
    }

    /// Insert or replace `name` in the current scope.
    pub fn overwrite(&mut self, name: &str, entry: SymbolEntry) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), entry);
        }
    }

    /// Look `name` up in the current scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    /// Look `name` up from the current scope down to level 0.
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Look `name` up at exactly `level`.
    pub fn lookup_at(&self, level: u32, name: &str) -> Option<&SymbolEntry> {
        self.scopes
            .get(level as usize)
            .and_then(|scope| scope.get(name))
    }
}
