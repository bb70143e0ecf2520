//! Expressions: each one leaves its value on the stack, one word or two for a
//! function value.

use fool_ast::{
    BinaryExpr, BinaryOp, CallExpr, Expr, LiteralKind, MethodCallExpr, NewExpr, UnaryOp,
};
use fool_core::InternalError;

use super::CodeGenerator;
use crate::bytecode::Instruction;
use crate::symbols::EntryKind;

/// Representation of `null`. Never a heap address.
const NULL: i64 = -1;

impl CodeGenerator<'_> {
    pub(super) fn gen_expr(&mut self, expr: &Expr<'_>) -> Result<(), InternalError> {
        match expr {
            Expr::Literal(lit) => {
                let value = match lit.kind {
                    LiteralKind::Int(value) => value,
                    LiteralKind::Bool(value) => i64::from(value),
                    LiteralKind::Null => NULL,
                };
                self.emitter.push(value);
            }

            Expr::Ident(ident) => {
                let res = self.use_of(ident.id, ident.ident.span)?;
                if !res.entry.kind.is_value() {
                    return Err(InternalError::new(
                        format!("'{}' is a {}, not a value", ident.ident.name, res.entry.kind),
                        ident.ident.span,
                    ));
                }
                self.emit_load_value(res);
            }

            Expr::Call(call) => self.gen_call(call)?,
            Expr::Binary(binary) => self.gen_binary(binary)?,

            Expr::Unary(unary) => match unary.op {
                UnaryOp::Not => {
                    self.gen_expr(unary.operand)?;
                    self.emitter.push(0);
                    self.gen_select(0, 1);
                }
            },

            Expr::If(if_expr) => {
                let then_label = self.emitter.fresh_label();
                let end_label = self.emitter.fresh_label();

                self.gen_expr(if_expr.condition)?;
                self.emitter.push(1);
                self.emitter.branch_equal(then_label);
                self.gen_expr(if_expr.else_expr)?;
                self.emitter.branch(end_label);
                self.emitter.place(then_label);
                self.gen_expr(if_expr.then_expr)?;
                self.emitter.place(end_label);
            }

            Expr::Print(print) => {
                self.gen_expr(print.value)?;
                self.emitter.emit(Instruction::Print);
            }

            Expr::New(new) => self.gen_new(new)?,
            Expr::MethodCall(call) => self.gen_method_call(call)?,
        }
        Ok(())
    }

    // ==========================================================================
    // Operators
    // ==========================================================================

    fn gen_binary(&mut self, binary: &BinaryExpr<'_>) -> Result<(), InternalError> {
        let arithmetic = match binary.op {
            BinaryOp::Add => Some(Instruction::Add),
            BinaryOp::Sub => Some(Instruction::Sub),
            BinaryOp::Mul => Some(Instruction::Mult),
            BinaryOp::Div => Some(Instruction::Div),
            _ => None,
        };
        if let Some(instruction) = arithmetic {
            self.gen_expr(binary.left)?;
            self.gen_expr(binary.right)?;
            self.emitter.emit(instruction);
            return Ok(());
        }

        match binary.op {
            BinaryOp::Equal => {
                self.gen_expr(binary.left)?;
                self.gen_expr(binary.right)?;
                self.gen_select(0, 1);
            }
            BinaryOp::LessEqual => {
                self.gen_expr(binary.left)?;
                self.gen_expr(binary.right)?;
                self.gen_compare_less_equal();
            }
            BinaryOp::GreaterEqual => {
                // a >= b is b <= a
                self.gen_expr(binary.right)?;
                self.gen_expr(binary.left)?;
                self.gen_compare_less_equal();
            }
            BinaryOp::Or => self.gen_short_circuit(binary, 1)?,
            BinaryOp::And => self.gen_short_circuit(binary, 0)?,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {}
        }
        Ok(())
    }

    /// With two values on the stack, leave `equal` if they are equal and
    /// `different` otherwise.
    fn gen_select(&mut self, different: i64, equal: i64) {
        let equal_label = self.emitter.fresh_label();
        let end_label = self.emitter.fresh_label();

        self.emitter.branch_equal(equal_label);
        self.emitter.push(different);
        self.emitter.branch(end_label);
        self.emitter.place(equal_label);
        self.emitter.push(equal);
        self.emitter.place(end_label);
    }

    fn gen_compare_less_equal(&mut self) {
        let true_label = self.emitter.fresh_label();
        let end_label = self.emitter.fresh_label();

        self.emitter.branch_less_equal(true_label);
        self.emitter.push(0);
        self.emitter.branch(end_label);
        self.emitter.place(true_label);
        self.emitter.push(1);
        self.emitter.place(end_label);
    }

    /// `||` with `decisive = 1`, `&&` with `decisive = 0`. The right operand
    /// only runs when the left one is not decisive.
    fn gen_short_circuit(
        &mut self,
        binary: &BinaryExpr<'_>,
        decisive: i64,
    ) -> Result<(), InternalError> {
        let decided_label = self.emitter.fresh_label();
        let end_label = self.emitter.fresh_label();

        self.gen_expr(binary.left)?;
        self.emitter.push(decisive);
        self.emitter.branch_equal(decided_label);
        self.gen_expr(binary.right)?;
        self.emitter.push(decisive);
        self.emitter.branch_equal(decided_label);
        self.emitter.push(1 - decisive);
        self.emitter.branch(end_label);
        self.emitter.place(decided_label);
        self.emitter.push(decisive);
        self.emitter.place(end_label);
        Ok(())
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    /// Push the arguments last to first, so argument 1 ends up at `fp + 1`.
    fn gen_args(&mut self, args: &[Expr<'_>]) -> Result<(), InternalError> {
        for arg in args.iter().rev() {
            self.gen_expr(arg)?;
        }
        Ok(())
    }

    fn gen_call(&mut self, call: &CallExpr<'_>) -> Result<(), InternalError> {
        let res = self.use_of(call.id, call.callee.span)?;
        if res.entry.kind == EntryKind::Class {
            return Err(InternalError::new(
                format!("class '{}' called as a function", call.callee.name),
                call.callee.span,
            ));
        }

        // control link
        self.emitter.emit(Instruction::LoadFp);
        self.gen_args(call.args)?;
        self.emit_frame(res.hops());
        if res.entry.kind == EntryKind::Method {
            // A sibling method: the frame reached is the object itself.
            self.emit_dispatch_call(res.entry.offset);
        } else {
            self.emit_value_call(res.entry.offset);
        }
        Ok(())
    }

    fn gen_method_call(&mut self, call: &MethodCallExpr<'_>) -> Result<(), InternalError> {
        let res = self.method_call(call.id, call.span)?;

        self.emitter.emit(Instruction::LoadFp);
        self.gen_args(call.args)?;
        // The object itself becomes the access link.
        self.emit_frame(res.object.hops());
        self.emit_load_offset(res.object.entry.offset);
        self.emit_dispatch_call(res.method.offset);
        Ok(())
    }

    /// Store the field values, then the dispatch table address, on the heap.
    /// The object reference is the address of the latter.
    fn gen_new(&mut self, new: &NewExpr<'_>) -> Result<(), InternalError> {
        let res = self.use_of(new.id, new.class.span)?;
        let classes = self.classes;
        let layout = res
            .entry
            .declared_class()
            .and_then(|class| classes.get(class))
            .ok_or_else(|| {
                InternalError::new(format!("'{}' is not a class", new.class.name), new.class.span)
            })?;

        for arg in new.args {
            self.gen_expr(arg)?;
        }
        // Last word first, so field 1 ends up just below the object.
        for _ in 0..layout.field_words() {
            self.emit_heap_store();
        }

        self.emitter
            .push(self.options.memsize + i64::from(res.entry.offset));
        self.emitter.emit(Instruction::LoadWord);
        self.emitter.emit(Instruction::LoadHp);
        self.emitter.emit(Instruction::StoreWord);
        self.emitter.emit(Instruction::LoadHp);
        self.emit_heap_bump();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use fool_ast::{AstBuilder, Program, TypeExpr};

    use crate::codegen::CodeGenerator;
    use crate::options::CompilerOptions;
    use crate::passes::SymbolTableBuilder;

    fn text(program: &Program<'_>, options: CompilerOptions) -> Vec<String> {
        let symbols = SymbolTableBuilder::new().run(program);
        assert!(symbols.is_success(), "{}", symbols.errors);
        CodeGenerator::new(&symbols.resolutions, &symbols.classes, options)
            .generate(program)
            .unwrap()
            .instructions()
            .iter()
            .map(|i| i.to_string())
            .collect()
    }

    #[test]
    fn null_is_minus_one() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let lines = text(&b.bare_program(b.null()), CompilerOptions::default());
        assert_eq!(lines, ["push -1", "halt"]);
    }

    #[test]
    fn greater_equal_swaps_operands() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let lines = text(
            &b.bare_program(b.ge(b.int(1), b.int(2))),
            CompilerOptions::default(),
        );
        assert_eq!(
            lines,
            [
                "push 2", "push 1", "bleq label0", "push 0", "b label1", "label0:", "push 1",
                "label1:", "halt",
            ]
        );
    }

    #[test]
    fn or_skips_right_operand_when_left_is_true() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let lines = text(
            &b.bare_program(b.or(b.bool(true), b.bool(false))),
            CompilerOptions::default(),
        );
        assert_eq!(
            lines,
            [
                "push 1", "push 1", "beq label0", "push 0", "push 1", "beq label0", "push 0",
                "b label1", "label0:", "push 1", "label1:", "halt",
            ]
        );
    }

    #[test]
    fn if_evaluates_else_branch_inline() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let lines = text(
            &b.bare_program(b.if_then_else(b.bool(true), b.int(1), b.int(2))),
            CompilerOptions::default(),
        );
        assert_eq!(
            lines,
            [
                "push 1", "push 1", "beq label0", "push 2", "b label1", "label0:", "push 1",
                "label1:", "halt",
            ]
        );
    }

    #[test]
    fn print_keeps_value_on_stack() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let lines = text(&b.bare_program(b.print(b.int(4))), CompilerOptions::default());
        assert_eq!(lines, ["push 4", "print", "halt"]);
    }

    #[test]
    fn new_loads_dispatch_table_from_global_slot() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let class = b.class(
            "P",
            None,
            vec![b.field("x", TypeExpr::Int), b.field("y", TypeExpr::Int)],
            vec![],
        );
        let program = b.program(vec![class], b.new_object("P", vec![b.int(7), b.int(8)]));
        let lines = text(&program, CompilerOptions::default().with_memsize(500));

        let store = ["lhp", "sw", "lhp", "push 1", "add", "shp"];
        let mut expected = vec!["push 0", "lhp", "push 7", "push 8"];
        expected.extend(store);
        expected.extend(store);
        expected.extend(["push 498", "lw", "lhp", "sw", "lhp"]);
        expected.extend(["lhp", "push 1", "add", "shp", "halt"]);
        assert_eq!(lines, expected);
    }

    #[test]
    fn method_call_uses_object_as_access_link() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let class = b.class(
            "A",
            None,
            vec![],
            vec![b.method("m", vec![], TypeExpr::Int, vec![], b.int(1))],
        );
        let program = b.program(
            vec![class, b.var("a", b.ref_type("A"), b.new_object("A", vec![]))],
            b.method_call("a", "m", vec![]),
        );
        let lines = text(&program, CompilerOptions::default());
        let halt = lines.iter().position(|l| l == "halt").unwrap();
        assert_eq!(
            &lines[halt - 13..halt],
            [
                "lfp", "lfp", "push -3", "add", "lw", "stm", "ltm", "ltm", "lw", "push 0", "add",
                "lw", "js",
            ]
        );
    }

    #[test]
    fn call_to_method_from_its_class_goes_through_dispatch() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let class = b.class(
            "A",
            None,
            vec![],
            vec![
                b.method("m", vec![], TypeExpr::Int, vec![], b.int(1)),
                b.method("n", vec![], TypeExpr::Int, vec![], b.call("m", vec![])),
            ],
        );
        let program = b.program(vec![class], b.int(0));
        let lines = text(&program, CompilerOptions::default());

        let body = lines.iter().position(|l| l == "function1:").unwrap();
        assert_eq!(
            &lines[body + 3..body + 14],
            ["lfp", "lfp", "lw", "stm", "ltm", "ltm", "lw", "push 0", "add", "lw", "js"]
        );
    }
}
