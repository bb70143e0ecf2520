//! Stable identities for AST nodes and classes.
//!
//! Resolution results are not written back into the tree. Every use site
//! carries a [`NodeId`] and later passes look the resolved entry up by it.

use std::fmt;

/// Identifies one AST node within a single program.
///
/// Ids are minted by the AST builder and are unique per builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Identifies a class declared in the program.
///
/// Class ids are dense indices into the class table, assigned in
/// declaration order. Reference types compare by class id, never by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Position of the class in the class table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_roundtrip() {
        let id = NodeId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.to_string(), "node_42");
    }

    #[test]
    fn class_id_indexes_table() {
        let id = ClassId::new(3);
        assert_eq!(id.index(), 3);
        assert_eq!(id.to_string(), "class_3");
        assert!(ClassId::new(1) < ClassId::new(2));
    }
}
