//! Type expressions as written in declarations.
//!
//! Class names are still plain identifiers here; the symbol table pass
//! resolves them into [`fool_core::Type`] values.

use crate::Ident;

/// A type annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    /// `int`
    Int,
    /// `bool`
    Bool,
    /// `(t1, .., tn) -> t`
    Arrow(&'ast ArrowTypeExpr<'ast>),
    /// A class name used as the type of its instances.
    Ref(Ident<'ast>),
    /// The type of `null`. Never written by users, but accepted.
    Empty,
}

/// Function type annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowTypeExpr<'ast> {
    pub params: &'ast [TypeExpr<'ast>],
    pub ret: TypeExpr<'ast>,
}
