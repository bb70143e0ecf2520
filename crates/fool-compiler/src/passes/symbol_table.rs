//! Symbol Table Pass - Bind every name, assign offsets, lay out classes.
//!
//! One depth-first walk over the program that declares every name in its
//! scope, resolves every use site against the scope stack and builds the
//! class table with inherited virtual tables.
//!
//! ## Responsibilities
//!
//! - Assign frame offsets to variables, functions, classes and parameters
//! - Lay out fields and dispatch slots, reusing inherited offsets on override
//! - Record the entry and use level of every identifier, call and `new`
//! - Resolve `obj.m(..)` through the static class of `obj`
//!
//! ## Scopes
//!
//! ```text
//! level 0   let-block of the program: vars, funs, classes
//! level 1   class body (seeded with the inherited virtual table)
//!           or the parameters and locals of a top-level function
//! level 2+  method bodies and nested functions
//! ```
//!
//! Errors are collected and the walk always runs to completion.

use fool_ast::{
    ClassDecl, Decl, Expr, FunDecl, Ident, MethodCallExpr, NewExpr, Program, TypeExpr,
};
use fool_core::{ArrowType, ClassId, CompilationError, CompilationErrors, NodeId, Type};
use rustc_hash::FxHashSet;

use crate::class_table::{ClassDescriptor, ClassTable};
use crate::scope::ScopeStack;
use crate::symbols::{EntryKind, MethodResolution, Resolution, ResolutionTable, SymbolEntry};

/// First offset handed to a local declaration in a frame.
const FIRST_LOCAL_OFFSET: i32 = -2;
/// First offset handed to a parameter.
const FIRST_PARAM_OFFSET: i32 = 1;

/// Output of the symbol table pass.
#[derive(Debug, Default)]
pub struct SymbolTableOutput {
    pub resolutions: ResolutionTable,
    pub classes: ClassTable,
    /// Collected errors. Later passes only run when this is empty.
    pub errors: CompilationErrors,
}

impl SymbolTableOutput {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Builds the symbol table for one program.
pub struct SymbolTableBuilder {
    scopes: ScopeStack,
    classes: ClassTable,
    resolutions: ResolutionTable,
    errors: CompilationErrors,
    /// Next free local offset in the current frame.
    decl_offset: i32,
}

impl Default for SymbolTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTableBuilder {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            classes: ClassTable::new(),
            resolutions: ResolutionTable::new(),
            errors: CompilationErrors::new(),
            decl_offset: FIRST_LOCAL_OFFSET,
        }
    }

    /// Run the pass over a whole program.
    #[tracing::instrument(name = "symbol_table", skip_all)]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> SymbolTableOutput {
        tracing::debug!(
            declarations = program.declarations.len(),
            "symbol table pass started"
        );

        self.scopes.push();
        self.decl_offset = FIRST_LOCAL_OFFSET;
        for decl in program.declarations {
            self.visit_decl(decl);
        }
        self.visit_expr(program.body);
        self.scopes.pop();

        tracing::debug!(
            classes = self.classes.len(),
            uses = self.resolutions.use_count(),
            errors = self.errors.len(),
            "symbol table pass finished"
        );

        SymbolTableOutput {
            resolutions: self.resolutions,
            classes: self.classes,
            errors: self.errors,
        }
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    fn visit_decl(&mut self, decl: &Decl<'_>) {
        match decl {
            Decl::Var(var) => {
                // The initializer cannot see the variable it initializes.
                self.visit_expr(var.init);
                let ty = self.resolve_type(&var.ty);
                let offset = self.next_local_offset(ty.words());
                let entry = SymbolEntry::new(self.scopes.level(), ty, offset, EntryKind::Variable);
                self.declare(var.id, var.name, entry);
            }
            Decl::Fun(fun) => {
                let (params, ret) = self.signature(fun);
                let ty = Type::arrow(params.clone(), ret);
                let offset = self.next_local_offset(ty.words());
                let entry = SymbolEntry::new(self.scopes.level(), ty, offset, EntryKind::Function);
                // Declared before the body so the function can call itself.
                self.declare(fun.id, fun.name, entry);
                self.visit_function_body(fun, params);
            }
            Decl::Class(class) => self.visit_class(class),
        }
    }

    /// Declare `name` in the current scope and remember the entry for `id`.
    fn declare(&mut self, id: NodeId, name: Ident<'_>, entry: SymbolEntry) {
        tracing::debug!(
            name = name.name,
            kind = %entry.kind,
            level = entry.nesting_level,
            offset = entry.offset,
            "declared"
        );
        self.resolutions.record_declaration(id, entry.clone());
        let kind = entry.kind;
        if self.scopes.declare(name.name, entry).is_err() {
            self.errors.push(CompilationError::DuplicateDeclaration {
                kind: kind.as_str(),
                name: name.name.to_string(),
                span: name.span,
            });
        }
    }

    /// Reserve `words` slots below the last local. A two-word value has its
    /// frame word at the returned offset and its code address just below.
    fn next_local_offset(&mut self, words: usize) -> i32 {
        let offset = self.decl_offset;
        self.decl_offset -= words as i32;
        offset
    }

    /// Resolve the parameter and return types of a function or method.
    fn signature(&mut self, fun: &FunDecl<'_>) -> (Vec<Type>, Type) {
        let params = fun
            .params
            .iter()
            .map(|param| self.resolve_type(&param.ty))
            .collect();
        let ret = self.resolve_type(&fun.ret);
        (params, ret)
    }

    /// Open the function's own scope: parameters, local declarations, body.
    fn visit_function_body(&mut self, fun: &FunDecl<'_>, param_types: Vec<Type>) {
        let saved_offset = self.decl_offset;
        self.decl_offset = FIRST_LOCAL_OFFSET;
        self.scopes.push();
        let level = self.scopes.level();

        // Arguments are pushed last to first, so the frame word of a
        // two-word argument sits above its code address.
        let mut next_word = FIRST_PARAM_OFFSET;
        for (param, ty) in fun.params.iter().zip(param_types) {
            let words = ty.words() as i32;
            let offset = next_word + words - 1;
            next_word += words;
            let entry = SymbolEntry::new(level, ty, offset, EntryKind::Parameter);
            self.declare(param.id, param.name, entry);
        }

        for decl in fun.declarations {
            self.visit_decl(decl);
        }
        self.visit_expr(fun.body);

        self.scopes.pop();
        self.decl_offset = saved_offset;
    }

    // ==========================================================================
    // Classes
    // ==========================================================================

    fn visit_class(&mut self, class: &ClassDecl<'_>) {
        // Still declared and walked, so errors in its body are reported and
        // later uses of its name resolve.
        if self.scopes.level() != 0 {
            self.errors.push(CompilationError::NestedClass {
                name: class.name.name.to_string(),
                span: class.name.span,
            });
        }

        let superclass = class.superclass.and_then(|sup| {
            let found = self.classes.lookup(sup.name);
            if found.is_none() {
                self.errors.push(CompilationError::MissingSuperclass {
                    class: class.name.name.to_string(),
                    superclass: sup.name.to_string(),
                    span: sup.span,
                });
            }
            found
        });

        // Registered before the members so fields and methods can refer to
        // their own class.
        let id = self.classes.declare(class.name.name, superclass);
        let offset = self.next_local_offset(1);
        let entry = SymbolEntry::new(self.scopes.level(), Type::Class(id), offset, EntryKind::Class);
        self.declare(class.id, class.name, entry);

        let inherited = self
            .classes
            .vtable(id)
            .map(|vtable| vtable.to_scope())
            .unwrap_or_default();
        self.scopes.push_with(inherited);

        let mut declared: FxHashSet<&str> = FxHashSet::default();
        self.visit_fields(id, class, &mut declared);
        self.visit_methods(id, class, &mut declared);

        self.scopes.pop();

        if let Some(layout) = self.classes.get(id) {
            tracing::debug!(
                class = %layout.name,
                superclass = ?layout.superclass,
                fields = layout.fields.len(),
                methods = layout.methods.len(),
                "class laid out"
            );
        }
    }

    fn visit_fields<'ast>(
        &mut self,
        id: ClassId,
        class: &ClassDecl<'ast>,
        declared: &mut FxHashSet<&'ast str>,
    ) {
        let level = self.scopes.level();
        let mut next_offset = self
            .classes
            .get(id)
            .map_or(-1, ClassDescriptor::next_field_offset);

        for field in class.fields {
            let ty = self.resolve_type(&field.ty);
            if !declared.insert(field.name.name) {
                self.errors.push(CompilationError::DuplicateDeclaration {
                    kind: EntryKind::Field.as_str(),
                    name: field.name.name.to_string(),
                    span: field.name.span,
                });
                continue;
            }

            let inherited = self.inherited_member(field.name.name);
            let offset = match inherited {
                Some((EntryKind::Method, _)) => {
                    self.push_collision(class, field.name, EntryKind::Field, EntryKind::Method);
                    continue;
                }
                Some((_, offset)) => {
                    let index = self.classes.get(id).and_then(|l| l.field_index(offset));
                    if let Some(slot) =
                        index.and_then(|i| self.layout_mut(id).and_then(|l| l.fields.get_mut(i)))
                    {
                        *slot = ty.clone();
                    }
                    offset
                }
                None => {
                    let offset = next_offset;
                    next_offset -= ty.words() as i32;
                    if let Some(layout) = self.layout_mut(id) {
                        layout.fields.push(ty.clone());
                    }
                    offset
                }
            };

            let entry = SymbolEntry::new(level, ty, offset, EntryKind::Field);
            self.add_member(id, field.id, field.name, entry);
        }
    }

    fn visit_methods<'ast>(
        &mut self,
        id: ClassId,
        class: &ClassDecl<'ast>,
        declared: &mut FxHashSet<&'ast str>,
    ) {
        let level = self.scopes.level();
        let mut next_offset = self
            .classes
            .get(id)
            .map_or(0, |layout| layout.methods.len() as i32);

        for method in class.methods {
            let (params, ret) = self.signature(method);
            let arrow = ArrowType::new(params.clone(), ret);

            if !declared.insert(method.name.name) {
                self.errors.push(CompilationError::DuplicateDeclaration {
                    kind: EntryKind::Method.as_str(),
                    name: method.name.name.to_string(),
                    span: method.name.span,
                });
                self.visit_function_body(method, params);
                continue;
            }

            let inherited = self.inherited_member(method.name.name);
            let offset = match inherited {
                Some((EntryKind::Field, _)) => {
                    self.push_collision(class, method.name, EntryKind::Method, EntryKind::Field);
                    self.visit_function_body(method, params);
                    continue;
                }
                Some((_, offset)) => {
                    if let Some(slot) = usize::try_from(offset)
                        .ok()
                        .and_then(|i| self.layout_mut(id).and_then(|l| l.methods.get_mut(i)))
                    {
                        *slot = arrow.clone();
                    }
                    offset
                }
                None => {
                    let offset = next_offset;
                    next_offset += 1;
                    if let Some(layout) = self.layout_mut(id) {
                        layout.methods.push(arrow.clone());
                    }
                    offset
                }
            };

            let entry = SymbolEntry::new(level, Type::Arrow(arrow), offset, EntryKind::Method);
            self.add_member(id, method.id, method.name, entry);
            self.visit_function_body(method, params);
        }
    }

    /// Put a member in both the class body scope and the class's virtual table.
    fn add_member(&mut self, class: ClassId, id: NodeId, name: Ident<'_>, entry: SymbolEntry) {
        tracing::debug!(
            name = name.name,
            kind = %entry.kind,
            offset = entry.offset,
            "member declared"
        );
        self.resolutions.record_declaration(id, entry.clone());
        if let Some(vtable) = self.classes.vtable_mut(class) {
            vtable.insert(name.name, entry.clone());
        }
        self.scopes.overwrite(name.name, entry);
    }

    /// Kind and offset of a member already in the class body scope.
    fn inherited_member(&self, name: &str) -> Option<(EntryKind, i32)> {
        self.scopes
            .lookup_local(name)
            .map(|entry| (entry.kind, entry.offset))
    }

    fn layout_mut(&mut self, id: ClassId) -> Option<&mut ClassDescriptor> {
        self.classes.get_mut(id)
    }

    fn push_collision(
        &mut self,
        class: &ClassDecl<'_>,
        name: Ident<'_>,
        kind: EntryKind,
        other: EntryKind,
    ) {
        self.errors.push(CompilationError::FieldMethodCollision {
            kind: kind.as_str(),
            other: other.as_str(),
            class: class.name.name.to_string(),
            name: name.name.to_string(),
            span: name.span,
        });
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    fn resolve_type(&mut self, ty: &TypeExpr<'_>) -> Type {
        match ty {
            TypeExpr::Int => Type::Int,
            TypeExpr::Bool => Type::Bool,
            TypeExpr::Empty => Type::Empty,
            TypeExpr::Arrow(arrow) => {
                let params = arrow.params.iter().map(|p| self.resolve_type(p)).collect();
                let ret = self.resolve_type(&arrow.ret);
                Type::arrow(params, ret)
            }
            TypeExpr::Ref(name) => match self.classes.lookup(name.name) {
                Some(id) => Type::Ref(id),
                None => {
                    self.errors.push(CompilationError::UndeclaredClass {
                        name: name.name.to_string(),
                        span: name.span,
                    });
                    Type::Empty
                }
            },
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn visit_expr(&mut self, expr: &Expr<'_>) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Ident(ident) => self.resolve_use(ident.id, ident.ident),
            Expr::Call(call) => {
                self.resolve_use(call.id, call.callee);
                self.visit_exprs(call.args);
            }
            Expr::Binary(binary) => {
                self.visit_expr(binary.left);
                self.visit_expr(binary.right);
            }
            Expr::Unary(unary) => self.visit_expr(unary.operand),
            Expr::If(if_expr) => {
                self.visit_expr(if_expr.condition);
                self.visit_expr(if_expr.then_expr);
                self.visit_expr(if_expr.else_expr);
            }
            Expr::Print(print) => self.visit_expr(print.value),
            Expr::New(new) => self.resolve_new(new),
            Expr::MethodCall(call) => self.resolve_method_call(call),
        }
    }

    fn visit_exprs(&mut self, exprs: &[Expr<'_>]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    /// Bind a name to the innermost declaration visible from here.
    fn resolve_use(&mut self, id: NodeId, name: Ident<'_>) {
        let use_level = self.scopes.level();
        match self.scopes.lookup(name.name) {
            Some(entry) => {
                tracing::trace!(
                    name = name.name,
                    use_level,
                    decl_level = entry.nesting_level,
                    offset = entry.offset,
                    "resolved"
                );
                let resolution = Resolution {
                    entry: entry.clone(),
                    use_level,
                };
                self.resolutions.record_use(id, resolution);
            }
            None => self.errors.push(CompilationError::UndeclaredIdentifier {
                name: name.name.to_string(),
                span: name.span,
            }),
        }
    }

    fn resolve_new(&mut self, new: &NewExpr<'_>) {
        self.visit_exprs(new.args);

        // Classes live at level 0 unless one was wrongly nested, in which
        // case the nearest one wins.
        let use_level = self.scopes.level();
        let entry = (0..=use_level)
            .rev()
            .find_map(|level| {
                self.scopes
                    .lookup_at(level, new.class.name)
                    .filter(|entry| entry.kind == EntryKind::Class)
            })
            .cloned();
        match entry {
            Some(entry) => {
                tracing::trace!(class = new.class.name, offset = entry.offset, "resolved new");
                self.resolutions
                    .record_use(new.id, Resolution { entry, use_level });
            }
            None => self.errors.push(CompilationError::UndeclaredClass {
                name: new.class.name.to_string(),
                span: new.class.span,
            }),
        }
    }

    fn resolve_method_call(&mut self, call: &MethodCallExpr<'_>) {
        self.visit_exprs(call.args);

        let use_level = self.scopes.level();
        let Some(object) = self.scopes.lookup(call.object.name).cloned() else {
            self.errors.push(CompilationError::UndeclaredIdentifier {
                name: call.object.name.to_string(),
                span: call.object.span,
            });
            return;
        };

        let Some(class) = object.ty.as_class_ref() else {
            self.errors.push(CompilationError::NotAnObject {
                name: call.object.name.to_string(),
                span: call.object.span,
            });
            return;
        };

        let method = self
            .classes
            .vtable(class)
            .and_then(|vtable| vtable.get(call.method.name))
            .filter(|entry| entry.kind == EntryKind::Method)
            .cloned();
        let Some(method) = method else {
            self.errors.push(CompilationError::UndeclaredMethod {
                class: self.classes.name_of(class).to_string(),
                method: call.method.name.to_string(),
                span: call.method.span,
            });
            return;
        };

        tracing::trace!(
            object = call.object.name,
            method = call.method.name,
            slot = method.offset,
            "resolved method call"
        );
        self.resolutions.record_method_call(
            call.id,
            MethodResolution {
                object: Resolution {
                    entry: object,
                    use_level,
                },
                method,
                class,
            },
        );
    }
}
