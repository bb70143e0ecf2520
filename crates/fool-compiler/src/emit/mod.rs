//! Instruction emitter for the code generator.
//!
//! The [`Emitter`] appends instructions to the body currently being
//! generated. Function and method bodies are generated out of line: opening
//! one sets the enclosing code aside, and closing it moves the finished body
//! after the main program.
//!
//! # Example
//!
//! ```
//! use fool_compiler::emit::Emitter;
//! use fool_compiler::bytecode::Instruction;
//!
//! let mut emitter = Emitter::new();
//! let entry = emitter.fresh_function();
//! let outer = emitter.begin_function(entry);
//! emitter.emit(Instruction::CopyFp);
//! emitter.end_function(outer);
//!
//! emitter.push_label(entry);
//! emitter.emit(Instruction::Halt);
//!
//! let unit = emitter.finish();
//! assert_eq!(unit.to_string(), "push function0\nhalt\nfunction0:\ncfp\n");
//! ```

mod labels;

use crate::bytecode::{CodeUnit, Instruction, Label};
pub use labels::LabelGenerator;

/// Code set aside while a function body is being generated.
#[derive(Debug)]
#[must_use = "pass to `Emitter::end_function` to restore the enclosing code"]
pub struct PendingFunction {
    outer: Vec<Instruction>,
}

/// Emits instructions for one compilation.
#[derive(Debug, Default)]
pub struct Emitter {
    /// Body currently being generated.
    code: Vec<Instruction>,
    /// Finished function and method bodies.
    functions: Vec<Instruction>,
    labels: LabelGenerator,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    pub fn emit(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    /// Emit `instruction` `count` times.
    pub fn emit_repeated(&mut self, instruction: Instruction, count: usize) {
        self.code
            .extend(std::iter::repeat_n(instruction, count));
    }

    pub fn push(&mut self, value: i64) {
        self.emit(Instruction::Push(value));
    }

    pub fn push_label(&mut self, label: Label) {
        self.emit(Instruction::PushLabel(label));
    }

    /// Number of instructions in the current body.
    pub fn current_len(&self) -> usize {
        self.code.len()
    }

    // ==========================================================================
    // Labels & Branches
    // ==========================================================================

    pub fn fresh_label(&mut self) -> Label {
        self.labels.fresh_label()
    }

    pub fn fresh_function(&mut self) -> Label {
        self.labels.fresh_function()
    }

    /// Place `label` before the next instruction.
    pub fn place(&mut self, label: Label) {
        self.emit(Instruction::Label(label));
    }

    pub fn branch(&mut self, target: Label) {
        self.emit(Instruction::Branch(target));
    }

    pub fn branch_equal(&mut self, target: Label) {
        self.emit(Instruction::BranchEqual(target));
    }

    pub fn branch_less_equal(&mut self, target: Label) {
        self.emit(Instruction::BranchLessEqual(target));
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Start an out-of-line body at `entry`.
    pub fn begin_function(&mut self, entry: Label) -> PendingFunction {
        let outer = std::mem::take(&mut self.code);
        self.place(entry);
        PendingFunction { outer }
    }

    /// Finish the current out-of-line body and resume the enclosing code.
    pub fn end_function(&mut self, pending: PendingFunction) {
        let body = std::mem::replace(&mut self.code, pending.outer);
        self.functions.extend(body);
    }

    /// The main program followed by every function body.
    pub fn finish(mut self) -> CodeUnit {
        self.code.append(&mut self.functions);
        CodeUnit::new(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_functions_are_moved_out_of_line() {
        let mut emitter = Emitter::new();
        emitter.push(0);

        let outer = emitter.fresh_function();
        let outer_pending = emitter.begin_function(outer);
        emitter.emit(Instruction::CopyFp);

        let inner = emitter.fresh_function();
        let inner_pending = emitter.begin_function(inner);
        emitter.emit(Instruction::LoadRa);
        emitter.end_function(inner_pending);

        emitter.push_label(inner);
        emitter.end_function(outer_pending);

        emitter.push_label(outer);
        emitter.emit(Instruction::Halt);

        let text = emitter.finish().to_string();
        assert_eq!(
            text,
            "push 0\npush function0\nhalt\n\
             function1:\nlra\n\
             function0:\ncfp\npush function1\n"
        );
    }

    #[test]
    fn repeated_emission() {
        let mut emitter = Emitter::new();
        emitter.emit_repeated(Instruction::LoadWord, 3);
        emitter.emit_repeated(Instruction::Pop, 0);
        assert_eq!(emitter.current_len(), 3);
    }

    #[test]
    fn branches_reference_fresh_labels() {
        let mut emitter = Emitter::new();
        let target = emitter.fresh_label();
        emitter.branch_equal(target);
        emitter.branch_less_equal(target);
        emitter.branch(target);
        emitter.place(target);

        let unit = emitter.finish();
        assert_eq!(unit.to_string(), "beq label0\nbleq label0\nb label0\nlabel0:\n");
    }
}
