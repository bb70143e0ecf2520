//! FOOL syntax tree.
//!
//! This crate provides:
//! - AST node definitions for declarations, expressions and type expressions
//! - [`AstBuilder`] for constructing trees in a `bumpalo` arena
//!
//! Parsing source text is done elsewhere; whatever produces the tree only has
//! to shape it into these nodes. All nodes borrow from the arena and stay
//! valid for its lifetime.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use fool_ast::{AstBuilder, TypeExpr};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! // let var x:int = 5; in x + 3
//! let program = b.program(
//!     vec![b.var("x", TypeExpr::Int, b.int(5))],
//!     b.add(b.ident("x"), b.int(3)),
//! );
//! assert_eq!(program.declarations.len(), 1);
//! ```

mod builder;
pub mod decl;
pub mod expr;
pub mod ops;
pub mod types;

pub use builder::AstBuilder;
pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use types::*;

use fool_core::Span;

/// A name as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A whole program: `let <declarations> in <body>`, or just `<body>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program<'ast> {
    /// Top-level declarations, in source order. Empty for the bare form.
    pub declarations: &'ast [Decl<'ast>],
    /// The expression whose value is the program's result.
    pub body: &'ast Expr<'ast>,
    pub span: Span,
}

impl<'ast> Program<'ast> {
    /// Whether the program was written with a `let ... in` block.
    pub fn has_declarations(&self) -> bool {
        !self.declarations.is_empty()
    }

    /// Iterate over the top-level class declarations.
    pub fn classes(&self) -> impl Iterator<Item = &'ast ClassDecl<'ast>> + 'ast {
        let declarations: &'ast [Decl<'ast>] = self.declarations;
        declarations.iter().filter_map(|decl| match decl {
            Decl::Class(class) => Some(*class),
            _ => None,
        })
    }
}
