//! Type Check Pass - Validate every expression against the subtype relation.
//!
//! Runs after a successful symbol table pass and reads its resolution table
//! and class table. Like the symbol table pass it collects errors and always
//! walks the whole program. An expression whose type could not be determined
//! yields `None` so that one mistake is reported once.

use fool_ast::{
    BinaryExpr, BinaryOp, ClassDecl, Decl, Expr, FunDecl, LiteralKind, Program, UnaryOp,
};
use fool_core::{ArrowType, CompilationError, CompilationErrors, Span, Type};

use crate::class_table::ClassTable;
use crate::symbols::ResolutionTable;
use crate::type_rels::{is_subtype, lowest_common_ancestor};

/// Output of the type check pass.
#[derive(Debug, Default)]
pub struct TypeCheckOutput {
    /// Type of the program body, when it could be determined.
    pub program_type: Option<Type>,
    pub errors: CompilationErrors,
}

impl TypeCheckOutput {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Type checker for one program.
pub struct TypeChecker<'a> {
    resolutions: &'a ResolutionTable,
    classes: &'a ClassTable,
    errors: CompilationErrors,
}

impl<'a> TypeChecker<'a> {
    pub fn new(resolutions: &'a ResolutionTable, classes: &'a ClassTable) -> Self {
        Self {
            resolutions,
            classes,
            errors: CompilationErrors::new(),
        }
    }

    #[tracing::instrument(name = "type_check", skip_all)]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> TypeCheckOutput {
        tracing::debug!("type check pass started");

        for decl in program.declarations {
            self.check_decl(decl);
        }
        let program_type = self.check_expr(program.body);

        tracing::debug!(
            errors = self.errors.len(),
            program_type = ?program_type,
            "type check pass finished"
        );

        TypeCheckOutput {
            program_type,
            errors: self.errors,
        }
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    fn check_decl(&mut self, decl: &Decl<'_>) {
        match decl {
            Decl::Var(var) => {
                let found = self.check_expr(var.init);
                if let (Some(found), Some(entry)) = (found, self.resolutions.declaration(var.id)) {
                    if !is_subtype(&found, &entry.ty, self.classes) {
                        self.mismatch(
                            format!(
                                "incompatible value for variable '{}': expected {}, found {}",
                                var.name.name,
                                self.name(&entry.ty),
                                self.name(&found)
                            ),
                            var.span,
                        );
                    }
                }
            }
            Decl::Fun(fun) => self.check_function(fun, "function"),
            Decl::Class(class) => self.check_class(class),
        }
    }

    fn check_function(&mut self, fun: &FunDecl<'_>, what: &str) {
        for decl in fun.declarations {
            self.check_decl(decl);
        }
        let found = self.check_expr(fun.body);

        let declared = self
            .resolutions
            .declaration(fun.id)
            .and_then(|entry| entry.ty.as_arrow())
            .map(|arrow| (*arrow.ret).clone());
        if let (Some(found), Some(declared)) = (found, declared) {
            if !is_subtype(&found, &declared, self.classes) {
                self.mismatch(
                    format!(
                        "wrong return type for {what} '{}': expected {}, found {}",
                        fun.name.name,
                        self.name(&declared),
                        self.name(&found)
                    ),
                    fun.body.span(),
                );
            }
        }
    }

    fn check_class(&mut self, class: &ClassDecl<'_>) {
        self.check_overrides(class);
        for method in class.methods {
            self.check_function(method, "method");
        }
    }

    /// Overriding members must be subtypes of what they replace.
    fn check_overrides(&mut self, class: &ClassDecl<'_>) {
        let classes = self.classes;
        let Some(parent) = self
            .resolutions
            .declaration(class.id)
            .and_then(|entry| entry.declared_class())
            .and_then(|id| classes.get(id))
            .and_then(|layout| layout.superclass)
            .and_then(|sup| classes.get(sup))
        else {
            return;
        };

        for field in class.fields {
            let Some(entry) = self.resolutions.declaration(field.id) else {
                continue;
            };
            if let Some(inherited) = parent.field_type(entry.offset) {
                if !is_subtype(&entry.ty, inherited, classes) {
                    self.invalid_override(
                        class,
                        field.name.name,
                        format!(
                            "field type {} is not a subtype of {}",
                            self.name(&entry.ty),
                            self.name(inherited)
                        ),
                        field.span,
                    );
                }
            }
        }

        for method in class.methods {
            let Some(entry) = self.resolutions.declaration(method.id) else {
                continue;
            };
            if let Some(inherited) = parent.method_type(entry.offset) {
                let inherited = Type::Arrow(inherited.clone());
                if !is_subtype(&entry.ty, &inherited, classes) {
                    self.invalid_override(
                        class,
                        method.name.name,
                        format!(
                            "method type {} is not a subtype of {}",
                            self.name(&entry.ty),
                            self.name(&inherited)
                        ),
                        method.span,
                    );
                }
            }
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn check_expr(&mut self, expr: &Expr<'_>) -> Option<Type> {
        match expr {
            Expr::Literal(lit) => Some(match lit.kind {
                LiteralKind::Int(_) => Type::Int,
                LiteralKind::Bool(_) => Type::Bool,
                LiteralKind::Null => Type::Empty,
            }),

            Expr::Ident(ident) => {
                let res = self.resolutions.use_of(ident.id)?;
                if !res.entry.kind.is_value() {
                    self.errors.push(CompilationError::NotAValue {
                        name: ident.ident.name.to_string(),
                        span: ident.ident.span,
                    });
                    return None;
                }
                Some(res.entry.ty.clone())
            }

            Expr::Call(call) => {
                let args = self.check_exprs(call.args);
                let res = self.resolutions.use_of(call.id)?;
                let Some(arrow) = res.entry.ty.as_arrow() else {
                    self.errors.push(CompilationError::NotCallable {
                        name: call.callee.name.to_string(),
                        span: call.callee.span,
                    });
                    return None;
                };
                self.check_args(call.callee.name, &arrow.params, &args, call.span);
                Some((*arrow.ret).clone())
            }

            Expr::Binary(binary) => self.check_binary(binary),

            Expr::Unary(unary) => {
                let operand = self.check_expr(unary.operand);
                match unary.op {
                    UnaryOp::Not => {
                        self.expect(operand.as_ref(), &Type::Bool, "operand of '!'", unary.span)
                    }
                }
                Some(Type::Bool)
            }

            Expr::If(if_expr) => {
                let condition = self.check_expr(if_expr.condition);
                self.expect(
                    condition.as_ref(),
                    &Type::Bool,
                    "condition of 'if'",
                    if_expr.condition.span(),
                );
                let then_ty = self.check_expr(if_expr.then_expr);
                let else_ty = self.check_expr(if_expr.else_expr);
                let (then_ty, else_ty) = (then_ty?, else_ty?);
                let joined = lowest_common_ancestor(&then_ty, &else_ty, self.classes);
                if joined.is_none() {
                    self.mismatch(
                        format!(
                            "incompatible branches of 'if': {} and {}",
                            self.name(&then_ty),
                            self.name(&else_ty)
                        ),
                        if_expr.span,
                    );
                }
                joined
            }

            Expr::Print(print) => self.check_expr(print.value),

            Expr::New(new) => {
                let args = self.check_exprs(new.args);
                let res = self.resolutions.use_of(new.id)?;
                let class = res.entry.declared_class()?;
                let fields = self.classes.get(class)?.fields.clone();
                self.check_args(new.class.name, &fields, &args, new.span);
                Some(Type::Ref(class))
            }

            Expr::MethodCall(call) => {
                let args = self.check_exprs(call.args);
                let res = self.resolutions.method_call(call.id)?;
                let arrow: &ArrowType = res.method.ty.as_arrow()?;
                self.check_args(call.method.name, &arrow.params, &args, call.span);
                Some((*arrow.ret).clone())
            }
        }
    }

    fn check_exprs(&mut self, exprs: &[Expr<'_>]) -> Vec<Option<Type>> {
        exprs.iter().map(|expr| self.check_expr(expr)).collect()
    }

    fn check_binary(&mut self, binary: &BinaryExpr<'_>) -> Option<Type> {
        let left = self.check_expr(binary.left);
        let right = self.check_expr(binary.right);
        let op = binary.op;

        if op.is_arithmetic() {
            self.expect_operands(op, &Type::Int, &left, &right, binary.span);
            return Some(Type::Int);
        }
        if op.is_logical() {
            self.expect_operands(op, &Type::Bool, &left, &right, binary.span);
            return Some(Type::Bool);
        }

        match op {
            BinaryOp::LessEqual | BinaryOp::GreaterEqual => {
                self.expect_operands(op, &Type::Int, &left, &right, binary.span);
            }
            _ => {
                if let (Some(left), Some(right)) = (&left, &right) {
                    let arrows = left.as_arrow().is_some() || right.as_arrow().is_some();
                    let related = is_subtype(left, right, self.classes)
                        || is_subtype(right, left, self.classes);
                    if arrows || !related {
                        self.mismatch(
                            format!(
                                "cannot compare {} with {}",
                                self.name(left),
                                self.name(right)
                            ),
                            binary.span,
                        );
                    }
                }
            }
        }
        Some(Type::Bool)
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    fn check_args(&mut self, name: &str, params: &[Type], args: &[Option<Type>], span: Span) {
        if params.len() != args.len() {
            self.errors.push(CompilationError::ArgumentCountMismatch {
                name: name.to_string(),
                expected: params.len(),
                found: args.len(),
                span,
            });
            return;
        }

        for (i, (param, arg)) in params.iter().zip(args).enumerate() {
            if let Some(arg) = arg {
                if !is_subtype(arg, param, self.classes) {
                    self.mismatch(
                        format!(
                            "argument {} of '{name}': expected {}, found {}",
                            i + 1,
                            self.name(param),
                            self.name(arg)
                        ),
                        span,
                    );
                }
            }
        }
    }

    fn expect_operands(
        &mut self,
        op: BinaryOp,
        expected: &Type,
        left: &Option<Type>,
        right: &Option<Type>,
        span: Span,
    ) {
        let what = format!("operand of '{op}'");
        self.expect(left.as_ref(), expected, &what, span);
        self.expect(right.as_ref(), expected, &what, span);
    }

    /// Report unless `found` is unknown or a subtype of `expected`.
    fn expect(&mut self, found: Option<&Type>, expected: &Type, what: &str, span: Span) {
        if let Some(found) = found {
            if !is_subtype(found, expected, self.classes) {
                self.mismatch(
                    format!(
                        "{what} must be {}, found {}",
                        self.name(expected),
                        self.name(found)
                    ),
                    span,
                );
            }
        }
    }

    fn mismatch(&mut self, message: String, span: Span) {
        self.errors
            .push(CompilationError::TypeMismatch { message, span });
    }

    fn invalid_override(&mut self, class: &ClassDecl<'_>, member: &str, message: String, span: Span) {
        self.errors.push(CompilationError::InvalidOverride {
            class: class.name.name.to_string(),
            member: member.to_string(),
            message,
            span,
        });
    }

    fn name(&self, ty: &Type) -> String {
        self.classes.type_name(ty)
    }
}
