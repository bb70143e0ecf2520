//! Programmatic construction of FOOL syntax trees.
//!
//! [`AstBuilder`] allocates every node in a caller-owned arena and mints a
//! fresh [`NodeId`] for each declaration and use site. Methods take `&self`
//! so construction calls can nest freely.

use std::cell::Cell;

use bumpalo::Bump;
use fool_core::{NodeId, Span};

use crate::{
    ArrowTypeExpr, BinaryExpr, BinaryOp, CallExpr, ClassDecl, Decl, Expr, FieldDecl, FunDecl,
    Ident, IdentExpr, IfExpr, LiteralExpr, LiteralKind, MethodCallExpr, MethodDecl, NewExpr,
    ParamDecl, PrintExpr, Program, TypeExpr, UnaryExpr, UnaryOp, VarDecl,
};

/// Builds AST nodes inside a `bumpalo` arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_id: Cell<u32>,
    line: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_id: Cell::new(0),
            line: Cell::new(1),
        }
    }

    /// Set the source line recorded in the spans of nodes built from now on.
    pub fn at_line(&self, line: u32) -> &Self {
        self.line.set(line);
        self
    }

    /// Number of node ids handed out so far.
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    fn next_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId::new(id)
    }

    fn span(&self) -> Span {
        Span::line(self.line.get())
    }

    fn name(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.span())
    }

    fn slice<T: Copy>(&self, items: Vec<T>) -> &'ast [T] {
        self.arena.alloc_slice_fill_iter(items)
    }

    // ==========================================================================
    // Program & Declarations
    // ==========================================================================

    /// `let <declarations> in <body>`
    pub fn program(&self, declarations: Vec<Decl<'ast>>, body: Expr<'ast>) -> Program<'ast> {
        Program {
            declarations: self.slice(declarations),
            body: self.arena.alloc(body),
            span: self.span(),
        }
    }

    /// A program that is a single expression.
    pub fn bare_program(&self, body: Expr<'ast>) -> Program<'ast> {
        self.program(Vec::new(), body)
    }

    pub fn var(&self, name: &str, ty: TypeExpr<'ast>, init: Expr<'ast>) -> Decl<'ast> {
        Decl::Var(self.arena.alloc(VarDecl {
            id: self.next_id(),
            name: self.name(name),
            ty,
            init: self.arena.alloc(init),
            span: self.span(),
        }))
    }

    pub fn fun(
        &self,
        name: &str,
        params: Vec<ParamDecl<'ast>>,
        ret: TypeExpr<'ast>,
        declarations: Vec<Decl<'ast>>,
        body: Expr<'ast>,
    ) -> Decl<'ast> {
        Decl::Fun(self.arena.alloc(self.method(name, params, ret, declarations, body)))
    }

    /// A method, to be placed in a class body.
    pub fn method(
        &self,
        name: &str,
        params: Vec<ParamDecl<'ast>>,
        ret: TypeExpr<'ast>,
        declarations: Vec<Decl<'ast>>,
        body: Expr<'ast>,
    ) -> MethodDecl<'ast> {
        FunDecl {
            id: self.next_id(),
            name: self.name(name),
            params: self.slice(params),
            ret,
            declarations: self.slice(declarations),
            body: self.arena.alloc(body),
            span: self.span(),
        }
    }

    pub fn param(&self, name: &str, ty: TypeExpr<'ast>) -> ParamDecl<'ast> {
        ParamDecl {
            id: self.next_id(),
            name: self.name(name),
            ty,
            span: self.span(),
        }
    }

    pub fn field(&self, name: &str, ty: TypeExpr<'ast>) -> FieldDecl<'ast> {
        FieldDecl {
            id: self.next_id(),
            name: self.name(name),
            ty,
            span: self.span(),
        }
    }

    pub fn class(
        &self,
        name: &str,
        superclass: Option<&str>,
        fields: Vec<FieldDecl<'ast>>,
        methods: Vec<MethodDecl<'ast>>,
    ) -> Decl<'ast> {
        Decl::Class(self.arena.alloc(ClassDecl {
            id: self.next_id(),
            name: self.name(name),
            superclass: superclass.map(|s| self.name(s)),
            fields: self.slice(fields),
            methods: self.slice(methods),
            span: self.span(),
        }))
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    pub fn arrow_type(&self, params: Vec<TypeExpr<'ast>>, ret: TypeExpr<'ast>) -> TypeExpr<'ast> {
        TypeExpr::Arrow(self.arena.alloc(ArrowTypeExpr {
            params: self.slice(params),
            ret,
        }))
    }

    pub fn ref_type(&self, class: &str) -> TypeExpr<'ast> {
        TypeExpr::Ref(self.name(class))
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn literal(&self, kind: LiteralKind) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind,
            span: self.span(),
        })
    }

    pub fn int(&self, value: i64) -> Expr<'ast> {
        self.literal(LiteralKind::Int(value))
    }

    pub fn bool(&self, value: bool) -> Expr<'ast> {
        self.literal(LiteralKind::Bool(value))
    }

    pub fn null(&self) -> Expr<'ast> {
        self.literal(LiteralKind::Null)
    }

    pub fn ident(&self, name: &str) -> Expr<'ast> {
        Expr::Ident(IdentExpr {
            id: self.next_id(),
            ident: self.name(name),
        })
    }

    pub fn call(&self, callee: &str, args: Vec<Expr<'ast>>) -> Expr<'ast> {
        Expr::Call(self.arena.alloc(CallExpr {
            id: self.next_id(),
            callee: self.name(callee),
            args: self.slice(args),
            span: self.span(),
        }))
    }

    pub fn binary(&self, op: BinaryOp, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.arena.alloc(BinaryExpr {
            left: self.arena.alloc(left),
            op,
            right: self.arena.alloc(right),
            span: self.span(),
        }))
    }

    pub fn add(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(BinaryOp::Add, left, right)
    }

    pub fn sub(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(BinaryOp::Sub, left, right)
    }

    pub fn mul(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(BinaryOp::Mul, left, right)
    }

    pub fn div(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(BinaryOp::Div, left, right)
    }

    pub fn eq(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(BinaryOp::Equal, left, right)
    }

    pub fn le(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(BinaryOp::LessEqual, left, right)
    }

    pub fn ge(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(BinaryOp::GreaterEqual, left, right)
    }

    pub fn and(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(BinaryOp::And, left, right)
    }

    pub fn or(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(BinaryOp::Or, left, right)
    }

    pub fn not(&self, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::Unary(self.arena.alloc(UnaryExpr {
            op: UnaryOp::Not,
            operand: self.arena.alloc(operand),
            span: self.span(),
        }))
    }

    pub fn if_then_else(
        &self,
        condition: Expr<'ast>,
        then_expr: Expr<'ast>,
        else_expr: Expr<'ast>,
    ) -> Expr<'ast> {
        Expr::If(self.arena.alloc(IfExpr {
            condition: self.arena.alloc(condition),
            then_expr: self.arena.alloc(then_expr),
            else_expr: self.arena.alloc(else_expr),
            span: self.span(),
        }))
    }

    pub fn print(&self, value: Expr<'ast>) -> Expr<'ast> {
        Expr::Print(self.arena.alloc(PrintExpr {
            value: self.arena.alloc(value),
            span: self.span(),
        }))
    }

    pub fn new_object(&self, class: &str, args: Vec<Expr<'ast>>) -> Expr<'ast> {
        Expr::New(self.arena.alloc(NewExpr {
            id: self.next_id(),
            class: self.name(class),
            args: self.slice(args),
            span: self.span(),
        }))
    }

    pub fn method_call(&self, object: &str, method: &str, args: Vec<Expr<'ast>>) -> Expr<'ast> {
        Expr::MethodCall(self.arena.alloc(MethodCallExpr {
            id: self.next_id(),
            object: self.name(object),
            method: self.name(method),
            args: self.slice(args),
            span: self.span(),
        }))
    }
}
