//! Code generation for the stack machine.
//!
//! ## Activation records
//!
//! ```text
//!          | control link   |  caller's fp
//!          | argument n     |
//!          | ...            |
//!          | argument 1     |  fp + 1
//!   fp --> | access link    |  fp of the declaring scope, or the object
//!          | return address |  fp - 1
//!          | local 1        |  fp - 2
//!          | ...            |
//! ```
//!
//! ## Function values
//!
//! A function value is two words: the frame it was declared in, which
//! becomes the access link of every call through it, and its code address
//! one word below. A slot at offset `o` holding a function value means the
//! frame at `o` and the address at `o - 1`. The frame lives on the stack, so
//! a function value must not outlive the activation that declared it.
//!
//! ## Objects
//!
//! An object reference points at the word holding its dispatch table
//! address. Field `k` (offset `-k`) sits `k` words below it. A method runs
//! with the object as its access link, so fields are reached like any other
//! variable one level up.
//!
//! Dispatch tables are built on the heap when a class declaration is
//! evaluated. The class's own frame slot holds the table address, which is
//! what `new` loads from `memsize + offset`.

mod decl;
mod expr;

use fool_ast::Program;
use fool_core::{ClassId, InternalError, NodeId, Span};
use rustc_hash::FxHashMap;

use crate::bytecode::{CodeUnit, Instruction, Label};
use crate::class_table::ClassTable;
use crate::emit::Emitter;
use crate::options::CompilerOptions;
use crate::symbols::{MethodResolution, Resolution, ResolutionTable, SymbolEntry};

/// Lowers a resolved program to a [`CodeUnit`].
///
/// Assumes both semantic passes succeeded. Anything missing from the
/// resolution table is reported as an [`InternalError`].
pub struct CodeGenerator<'a> {
    resolutions: &'a ResolutionTable,
    classes: &'a ClassTable,
    options: CompilerOptions,
    emitter: Emitter,
    /// Entry labels of every class's methods, indexed by dispatch slot.
    dispatch: FxHashMap<ClassId, Vec<Label>>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(
        resolutions: &'a ResolutionTable,
        classes: &'a ClassTable,
        options: CompilerOptions,
    ) -> Self {
        Self {
            resolutions,
            classes,
            options,
            emitter: Emitter::new(),
            dispatch: FxHashMap::default(),
        }
    }

    #[tracing::instrument(name = "codegen", skip_all)]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self, program: &Program<'_>) -> Result<CodeUnit, InternalError> {
        tracing::debug!(memsize = self.options.memsize, "code generation started");

        if program.has_declarations() {
            // Placeholder in the access link slot of the outermost frame.
            self.emitter.push(0);
            for decl in program.declarations {
                self.gen_decl(decl)?;
            }
        }
        self.gen_expr(program.body)?;
        self.emitter.emit(Instruction::Halt);

        let unit = self.emitter.finish();
        tracing::debug!(
            instructions = unit.len(),
            functions = unit.function_count(),
            "code generation finished"
        );
        Ok(unit)
    }

    /// Dispatch labels generated for `class`, by slot.
    pub fn dispatch_table(&self, class: ClassId) -> Option<&[Label]> {
        self.dispatch.get(&class).map(Vec::as_slice)
    }

    // ==========================================================================
    // Lookups
    // ==========================================================================

    fn use_of(&self, id: NodeId, span: Span) -> Result<&'a Resolution, InternalError> {
        self.resolutions
            .use_of(id)
            .ok_or_else(|| InternalError::new(format!("{id} has no resolved entry"), span))
    }

    fn method_call(&self, id: NodeId, span: Span) -> Result<&'a MethodResolution, InternalError> {
        self.resolutions
            .method_call(id)
            .ok_or_else(|| InternalError::new(format!("method call {id} is unresolved"), span))
    }

    fn declaration(&self, id: NodeId, span: Span) -> Result<&'a SymbolEntry, InternalError> {
        self.resolutions
            .declaration(id)
            .ok_or_else(|| InternalError::new(format!("declaration {id} has no entry"), span))
    }

    // ==========================================================================
    // Shared Sequences
    // ==========================================================================

    /// Push the frame `hops` access links up from the current one.
    fn emit_frame(&mut self, hops: u32) {
        self.emitter.emit(Instruction::LoadFp);
        self.emitter
            .emit_repeated(Instruction::LoadWord, hops as usize);
    }

    /// With a frame (or object) address on the stack, load the word at `offset`.
    fn emit_load_offset(&mut self, offset: i32) {
        self.emitter.push(i64::from(offset));
        self.emitter.emit(Instruction::Add);
        self.emitter.emit(Instruction::LoadWord);
    }

    /// Load the value a resolved name refers to, one or two words.
    fn emit_load_value(&mut self, res: &Resolution) {
        let offset = res.entry.offset;
        self.emit_frame(res.hops());
        self.emit_load_offset(offset);
        if res.entry.ty.words() == 2 {
            self.emit_frame(res.hops());
            self.emit_load_offset(offset - 1);
        }
    }

    /// Pop a word and append it to the heap.
    fn emit_heap_store(&mut self) {
        self.emitter.emit(Instruction::LoadHp);
        self.emitter.emit(Instruction::StoreWord);
        self.emit_heap_bump();
    }

    /// `hp = hp + 1`
    fn emit_heap_bump(&mut self) {
        self.emitter.emit(Instruction::LoadHp);
        self.emitter.push(1);
        self.emitter.emit(Instruction::Add);
        self.emitter.emit(Instruction::StoreHp);
    }

    /// Finish a method call once the object is on the stack: keep it as the
    /// access link, load the code address from dispatch slot `slot` and jump.
    fn emit_dispatch_call(&mut self, slot: i32) {
        self.emitter.emit(Instruction::StoreTm);
        self.emitter.emit(Instruction::LoadTm);
        self.emitter.emit(Instruction::LoadTm);
        self.emitter.emit(Instruction::LoadWord);
        self.emit_load_offset(slot);
        self.emitter.emit(Instruction::JumpSubroutine);
    }

    /// Finish a call through a function value once the frame holding it is on
    /// the stack: push its declaring frame as the access link, load its code
    /// address and jump.
    fn emit_value_call(&mut self, offset: i32) {
        self.emitter.emit(Instruction::StoreTm);
        self.emitter.emit(Instruction::LoadTm);
        self.emit_load_offset(offset);
        self.emitter.emit(Instruction::LoadTm);
        self.emit_load_offset(offset - 1);
        self.emitter.emit(Instruction::JumpSubroutine);
    }
}
