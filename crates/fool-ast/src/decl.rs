//! Declaration AST nodes.
//!
//! Every declaration carries a [`NodeId`] so later passes can find the symbol
//! table entry that was created for it.

use fool_core::{NodeId, Span};

use crate::{Expr, Ident, TypeExpr};

/// A declaration inside a `let` block or a function body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decl<'ast> {
    /// `var x:t = e;`
    Var(&'ast VarDecl<'ast>),
    /// `fun f:t (params) let .. in e;`
    Fun(&'ast FunDecl<'ast>),
    /// `class C extends B (fields) { methods }`
    Class(&'ast ClassDecl<'ast>),
}

impl<'ast> Decl<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            Decl::Var(d) => d.id,
            Decl::Fun(d) => d.id,
            Decl::Class(d) => d.id,
        }
    }

    pub fn name(&self) -> Ident<'ast> {
        match self {
            Decl::Var(d) => d.name,
            Decl::Fun(d) => d.name,
            Decl::Class(d) => d.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Decl::Var(d) => d.span,
            Decl::Fun(d) => d.span,
            Decl::Class(d) => d.span,
        }
    }
}

/// A variable declaration with its mandatory initializer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub init: &'ast Expr<'ast>,
    pub span: Span,
}

/// A function declaration. Methods share this shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub params: &'ast [ParamDecl<'ast>],
    pub ret: TypeExpr<'ast>,
    /// Local declarations evaluated before the body.
    pub declarations: &'ast [Decl<'ast>],
    pub body: &'ast Expr<'ast>,
    pub span: Span,
}

/// A method inside a class body.
pub type MethodDecl<'ast> = FunDecl<'ast>;

/// A formal parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

/// A field declared in a class header. Fields are initialized by `new`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

/// A class with an optional superclass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub superclass: Option<Ident<'ast>>,
    pub fields: &'ast [FieldDecl<'ast>],
    pub methods: &'ast [MethodDecl<'ast>],
    pub span: Span,
}
