//! Compiled output.

use std::fmt;

use super::{Instruction, Label, LabelKind};

/// The instruction stream of one program.
///
/// The main program comes first and ends with `halt`; every function and
/// method body follows it, each starting with its label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeUnit {
    instructions: Vec<Instruction>,
}

impl CodeUnit {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// All instructions, label placements included.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Number of executable instructions.
    pub fn len(&self) -> usize {
        self.instructions.iter().filter(|i| !i.is_label()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Labels placed in this unit, in order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.instructions.iter().filter_map(|i| match i {
            Instruction::Label(label) => Some(*label),
            _ => None,
        })
    }

    /// Number of function and method bodies.
    pub fn function_count(&self) -> usize {
        self.labels()
            .filter(|label| label.kind == LabelKind::Function)
            .count()
    }
}

impl fmt::Display for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CodeUnit {
        CodeUnit::new(vec![
            Instruction::Push(1),
            Instruction::Halt,
            Instruction::Label(Label::function(0)),
            Instruction::CopyFp,
            Instruction::Label(Label::branch(0)),
            Instruction::JumpSubroutine,
        ])
    }

    #[test]
    fn counts_skip_labels() {
        let unit = sample();
        assert_eq!(unit.instructions().len(), 6);
        assert_eq!(unit.len(), 4);
        assert_eq!(unit.function_count(), 1);
        assert_eq!(unit.labels().count(), 2);
    }

    #[test]
    fn text_is_one_instruction_per_line() {
        assert_eq!(
            sample().to_string(),
            "push 1\nhalt\nfunction0:\ncfp\nlabel0:\njs\n"
        );
    }

    #[test]
    fn empty_unit() {
        assert!(CodeUnit::default().is_empty());
    }
}
