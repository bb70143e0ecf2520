//! Expression AST nodes.
//!
//! Use sites (identifiers, calls, `new` and method calls) carry a [`NodeId`].
//! The symbol table pass records what each one resolves to in a side table
//! keyed by that id.

use fool_core::{NodeId, Span};

use crate::{BinaryOp, Ident, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Integer, boolean or `null` literal
    Literal(LiteralExpr),
    /// Identifier reference
    Ident(IdentExpr<'ast>),
    /// Call of a function (or of a method from inside its class)
    Call(&'ast CallExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// `if c then { e1 } else { e2 }`
    If(&'ast IfExpr<'ast>),
    /// `print(e)`, evaluates to `e`
    Print(&'ast PrintExpr<'ast>),
    /// `new C(args)`
    New(&'ast NewExpr<'ast>),
    /// `obj.m(args)`
    MethodCall(&'ast MethodCallExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.ident.span,
            Self::Call(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::If(e) => e.span,
            Self::Print(e) => e.span,
            Self::New(e) => e.span,
            Self::MethodCall(e) => e.span,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int(i64),
    Bool(bool),
    Null,
}

/// An identifier used as a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    pub id: NodeId,
    pub ident: Ident<'ast>,
}

/// A call by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub id: NodeId,
    pub callee: Ident<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// A conditional expression. Both branches are mandatory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfExpr<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_expr: &'ast Expr<'ast>,
    pub else_expr: &'ast Expr<'ast>,
    pub span: Span,
}

/// Print a value and yield it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintExpr<'ast> {
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// Object instantiation. Arguments initialize every field, inherited first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub id: NodeId,
    pub class: Ident<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// A method call on an object held in a variable, parameter or field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodCallExpr<'ast> {
    pub id: NodeId,
    pub object: Ident<'ast>,
    pub method: Ident<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}
