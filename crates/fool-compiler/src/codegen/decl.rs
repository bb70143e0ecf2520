//! Declarations: each one leaves its value in the current frame, one word or
//! two for a function.

use fool_ast::{ClassDecl, Decl, FunDecl};
use fool_core::{InternalError, Type};

use super::CodeGenerator;
use crate::bytecode::{Instruction, Label};

impl CodeGenerator<'_> {
    pub(super) fn gen_decl(&mut self, decl: &Decl<'_>) -> Result<(), InternalError> {
        match decl {
            Decl::Var(var) => self.gen_expr(var.init),
            Decl::Fun(fun) => {
                let entry = self.emitter.fresh_function();
                self.gen_function(fun, entry)?;
                self.emitter.emit(Instruction::LoadFp);
                self.emitter.push_label(entry);
                Ok(())
            }
            Decl::Class(class) => self.gen_class(class),
        }
    }

    /// Generate an out-of-line function or method body starting at `entry`.
    fn gen_function(&mut self, fun: &FunDecl<'_>, entry: Label) -> Result<(), InternalError> {
        tracing::trace!(name = fun.name.name, label = %entry, "function body");

        let signature = self
            .declaration(fun.id, fun.span)?
            .ty
            .as_arrow()
            .ok_or_else(|| {
                InternalError::new(format!("'{}' has no function type", fun.name.name), fun.span)
            })?;
        let param_words: usize = signature.params.iter().map(Type::words).sum();
        let returns_function = signature.ret.words() == 2;
        let mut local_words = 0;
        for decl in fun.declarations {
            local_words += self.declaration(decl.id(), decl.span())?.ty.words();
        }

        let pending = self.emitter.begin_function(entry);
        self.emitter.emit(Instruction::CopyFp);
        self.emitter.emit(Instruction::LoadRa);

        for decl in fun.declarations {
            self.gen_decl(decl)?;
        }
        self.gen_expr(fun.body)?;

        self.emitter.emit(Instruction::StoreTm);
        if returns_function {
            self.gen_return_frame_word(param_words);
        }
        self.emitter.emit_repeated(Instruction::Pop, local_words);
        self.emitter.emit(Instruction::StoreRa);
        if returns_function {
            // The control link now sits where the last parameter word was.
            self.emitter.emit_repeated(Instruction::Pop, param_words);
        } else {
            // access link
            self.emitter.emit(Instruction::Pop);
            self.emitter.emit_repeated(Instruction::Pop, param_words);
        }
        self.emitter.emit(Instruction::StoreFp);
        self.emitter.emit(Instruction::LoadTm);
        self.emitter.emit(Instruction::LoadRa);
        self.emitter.emit(Instruction::JumpSubroutine);

        self.emitter.end_function(pending);
        Ok(())
    }

    /// With the code address of a returned function value in `tm` and its
    /// frame word on the stack, move the control link one word down and put
    /// the frame word in its old slot, where the caller will find it.
    fn gen_return_frame_word(&mut self, param_words: usize) {
        let control_link = param_words as i64 + 1;

        self.emitter.emit(Instruction::LoadFp);
        self.emitter.push(control_link);
        self.emitter.emit(Instruction::Add);
        self.emitter.emit(Instruction::LoadWord);
        self.emitter.emit(Instruction::LoadFp);
        self.emitter.push(control_link - 1);
        self.emitter.emit(Instruction::Add);
        self.emitter.emit(Instruction::StoreWord);

        self.emitter.emit(Instruction::LoadFp);
        self.emitter.push(control_link);
        self.emitter.emit(Instruction::Add);
        self.emitter.emit(Instruction::StoreWord);
    }

    /// Generate every method body, then build the dispatch table on the heap
    /// and leave its address in the class's slot.
    fn gen_class(&mut self, class: &ClassDecl<'_>) -> Result<(), InternalError> {
        let id = self
            .declaration(class.id, class.span)?
            .declared_class()
            .ok_or_else(|| {
                InternalError::new(format!("'{}' is not a class entry", class.name.name), class.span)
            })?;

        let mut table = match self.classes.get(id).and_then(|layout| layout.superclass) {
            Some(parent) => self.dispatch.get(&parent).cloned().ok_or_else(|| {
                InternalError::new(
                    format!("superclass of '{}' has no dispatch table", class.name.name),
                    class.span,
                )
            })?,
            None => Vec::new(),
        };

        for method in class.methods {
            let slot = self.declaration(method.id, method.span)?.offset;
            let entry = self.emitter.fresh_function();
            self.gen_function(method, entry)?;

            match usize::try_from(slot) {
                Ok(slot) if slot < table.len() => table[slot] = entry,
                Ok(slot) if slot == table.len() => table.push(entry),
                _ => {
                    return Err(InternalError::new(
                        format!("method '{}' has dispatch slot {slot}", method.name.name),
                        method.span,
                    ));
                }
            }
        }

        tracing::trace!(class = class.name.name, slots = table.len(), "dispatch table");

        self.emitter.emit(Instruction::LoadHp);
        for entry in &table {
            self.emitter.push_label(*entry);
            self.emit_heap_store();
        }

        self.dispatch.insert(id, table);
        Ok(())
    }
}
