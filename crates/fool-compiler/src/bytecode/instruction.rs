//! The target machine's instruction set.
//!
//! The machine has a single memory shared by a downward-growing stack and an
//! upward-growing heap, and the registers `fp`, `sp`, `hp`, `ra` and `tm`.

use std::fmt;

// ============================================================================
// Labels
// ============================================================================

/// Which counter a label was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// Branch target inside an expression.
    Branch,
    /// Entry point of a function or method body.
    Function,
}

/// A symbolic code address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    pub kind: LabelKind,
    pub index: u32,
}

impl Label {
    pub const fn branch(index: u32) -> Self {
        Self {
            kind: LabelKind::Branch,
            index,
        }
    }

    pub const fn function(index: u32) -> Self {
        Self {
            kind: LabelKind::Function,
            index,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LabelKind::Branch => write!(f, "label{}", self.index),
            LabelKind::Function => write!(f, "function{}", self.index),
        }
    }
}

// ============================================================================
// Instructions
// ============================================================================

/// One machine instruction, or a label marking the next instruction.
///
/// Binary operations pop the top of stack `v1`, then `v2`, and push the
/// result of `v2 op v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    // =========================================================================
    // Stack
    // =========================================================================
    /// Push an integer.
    Push(i64),
    /// Push the code address of a label.
    PushLabel(Label),
    /// Discard the top of stack.
    Pop,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    Add,
    Sub,
    Mult,
    Div,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Unconditional branch.
    Branch(Label),
    /// Pop two values, branch if they are equal.
    BranchEqual(Label),
    /// Pop `v1` then `v2`, branch if `v2 <= v1`.
    BranchLessEqual(Label),
    /// Pop an address, save the next instruction in `ra`, jump.
    JumpSubroutine,
    /// Placement of a label. Not executed.
    Label(Label),

    // =========================================================================
    // Registers
    // =========================================================================
    /// Push `fp`.
    LoadFp,
    /// Pop into `fp`.
    StoreFp,
    /// Copy `sp` into `fp`.
    CopyFp,
    /// Push `ra`.
    LoadRa,
    /// Pop into `ra`.
    StoreRa,
    /// Push `tm`.
    LoadTm,
    /// Pop into `tm`.
    StoreTm,
    /// Push `hp`.
    LoadHp,
    /// Pop into `hp`.
    StoreHp,

    // =========================================================================
    // Memory
    // =========================================================================
    /// Pop an address, push the word stored there.
    LoadWord,
    /// Pop an address, then a value, and store the value at the address.
    StoreWord,

    // =========================================================================
    // Misc
    // =========================================================================
    /// Print the top of stack without popping it.
    Print,
    Halt,
}

impl Instruction {
    /// Assembler mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Push(_) | Instruction::PushLabel(_) => "push",
            Instruction::Pop => "pop",
            Instruction::Add => "add",
            Instruction::Sub => "sub",
            Instruction::Mult => "mult",
            Instruction::Div => "div",
            Instruction::Branch(_) => "b",
            Instruction::BranchEqual(_) => "beq",
            Instruction::BranchLessEqual(_) => "bleq",
            Instruction::JumpSubroutine => "js",
            Instruction::Label(_) => "label",
            Instruction::LoadFp => "lfp",
            Instruction::StoreFp => "sfp",
            Instruction::CopyFp => "cfp",
            Instruction::LoadRa => "lra",
            Instruction::StoreRa => "sra",
            Instruction::LoadTm => "ltm",
            Instruction::StoreTm => "stm",
            Instruction::LoadHp => "lhp",
            Instruction::StoreHp => "shp",
            Instruction::LoadWord => "lw",
            Instruction::StoreWord => "sw",
            Instruction::Print => "print",
            Instruction::Halt => "halt",
        }
    }

    /// Whether this is a label placement rather than an executable instruction.
    pub fn is_label(&self) -> bool {
        matches!(self, Instruction::Label(_))
    }

    /// The label this instruction refers to or places.
    pub fn label(&self) -> Option<Label> {
        match self {
            Instruction::PushLabel(label)
            | Instruction::Branch(label)
            | Instruction::BranchEqual(label)
            | Instruction::BranchLessEqual(label)
            | Instruction::Label(label) => Some(*label),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "push {value}"),
            Instruction::Label(label) => write!(f, "{label}:"),
            Instruction::PushLabel(label)
            | Instruction::Branch(label)
            | Instruction::BranchEqual(label)
            | Instruction::BranchLessEqual(label) => write!(f, "{} {label}", self.mnemonic()),
            other => f.write_str(other.mnemonic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_names() {
        assert_eq!(Label::branch(3).to_string(), "label3");
        assert_eq!(Label::function(0).to_string(), "function0");
        assert_ne!(Label::branch(1), Label::function(1));
    }

    #[test]
    fn text_format() {
        assert_eq!(Instruction::Push(-1).to_string(), "push -1");
        assert_eq!(
            Instruction::PushLabel(Label::function(2)).to_string(),
            "push function2"
        );
        assert_eq!(
            Instruction::BranchLessEqual(Label::branch(4)).to_string(),
            "bleq label4"
        );
        assert_eq!(Instruction::Label(Label::branch(4)).to_string(), "label4:");
        assert_eq!(Instruction::Mult.to_string(), "mult");
        assert_eq!(Instruction::JumpSubroutine.to_string(), "js");
        assert_eq!(Instruction::CopyFp.to_string(), "cfp");
    }

    #[test]
    fn label_references() {
        assert_eq!(
            Instruction::Branch(Label::branch(1)).label(),
            Some(Label::branch(1))
        );
        assert_eq!(Instruction::Add.label(), None);
        assert!(Instruction::Label(Label::branch(0)).is_label());
        assert!(!Instruction::Halt.is_label());
    }
}
