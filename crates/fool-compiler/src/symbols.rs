//! Symbol table entries and the resolution side table.
//!
//! The tree is never annotated in place. The symbol table pass fills a
//! [`ResolutionTable`] keyed by [`NodeId`], and every later pass reads it.
//!
//! ## Offsets
//!
//! | kind      | offsets           |
//! |-----------|-------------------|
//! | field     | -1, -2, ...       |
//! | method    | 0, 1, ...         |
//! | parameter | 1, 2, ...         |
//! | local     | -2, -3, ...       |
//!
//! Locals include variables, functions and classes declared in a `let`
//! block or a function body.

use std::fmt;

use fool_core::{ClassId, NodeId, Type};
use rustc_hash::FxHashMap;

// ============================================================================
// Entries
// ============================================================================

/// What kind of declaration produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Variable,
    Function,
    Parameter,
    Field,
    Method,
    Class,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Variable => "var",
            EntryKind::Function => "fun",
            EntryKind::Parameter => "par",
            EntryKind::Field => "field",
            EntryKind::Method => "method",
            EntryKind::Class => "class",
        }
    }

    /// Whether an entry of this kind may be read as a value.
    pub fn is_value(self) -> bool {
        !matches!(self, EntryKind::Method | EntryKind::Class)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared name: where it lives and what type it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    /// Nesting level of the scope holding the entry. 0 is the program root.
    pub nesting_level: u32,
    pub ty: Type,
    /// Frame offset, or dispatch slot for methods.
    pub offset: i32,
    pub kind: EntryKind,
}

impl SymbolEntry {
    pub fn new(nesting_level: u32, ty: Type, offset: i32, kind: EntryKind) -> Self {
        Self {
            nesting_level,
            ty,
            offset,
            kind,
        }
    }

    /// The class this entry declares, for class entries.
    pub fn declared_class(&self) -> Option<ClassId> {
        match (&self.kind, &self.ty) {
            (EntryKind::Class, Type::Class(id)) => Some(*id),
            _ => None,
        }
    }
}

// ============================================================================
// Resolutions
// ============================================================================

/// A use site bound to its declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub entry: SymbolEntry,
    /// Nesting level of the scope the use appears in.
    pub use_level: u32,
}

impl Resolution {
    /// Number of access links to follow from the use's frame to the frame
    /// holding the entry.
    pub fn hops(&self) -> u32 {
        self.use_level.saturating_sub(self.entry.nesting_level)
    }
}

/// A method call `obj.m(..)` bound to the object and the method's slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodResolution {
    pub object: Resolution,
    pub method: SymbolEntry,
    /// Static class of the object.
    pub class: ClassId,
}

/// Side table from node ids to resolution results.
#[derive(Debug, Default, Clone)]
pub struct ResolutionTable {
    uses: FxHashMap<NodeId, Resolution>,
    method_calls: FxHashMap<NodeId, MethodResolution>,
    declarations: FxHashMap<NodeId, SymbolEntry>,
}

impl ResolutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the binding of an identifier, call or `new`.
    pub fn record_use(&mut self, id: NodeId, resolution: Resolution) {
        self.uses.insert(id, resolution);
    }

    pub fn record_method_call(&mut self, id: NodeId, resolution: MethodResolution) {
        self.method_calls.insert(id, resolution);
    }

    /// Record the entry created for a declaration.
    pub fn record_declaration(&mut self, id: NodeId, entry: SymbolEntry) {
        self.declarations.insert(id, entry);
    }

    pub fn use_of(&self, id: NodeId) -> Option<&Resolution> {
        self.uses.get(&id)
    }

    pub fn method_call(&self, id: NodeId) -> Option<&MethodResolution> {
        self.method_calls.get(&id)
    }

    pub fn declaration(&self, id: NodeId) -> Option<&SymbolEntry> {
        self.declarations.get(&id)
    }

    pub fn uses(&self) -> impl Iterator<Item = (NodeId, &Resolution)> {
        self.uses.iter().map(|(id, res)| (*id, res))
    }

    pub fn method_calls(&self) -> impl Iterator<Item = (NodeId, &MethodResolution)> {
        self.method_calls.iter().map(|(id, res)| (*id, res))
    }

    pub fn declarations(&self) -> impl Iterator<Item = (NodeId, &SymbolEntry)> {
        self.declarations.iter().map(|(id, entry)| (*id, entry))
    }

    /// Total number of resolved use sites, method calls included.
    pub fn use_count(&self) -> usize {
        self.uses.len() + self.method_calls.len()
    }
}
