//! Stack machine instructions.
//!
//! - [`Instruction`]: the instruction set, printed one per line as the
//!   machine's assembler text
//! - [`Label`]: symbolic code addresses for branches and function entries
//! - [`CodeUnit`]: the output of one compilation

mod instruction;
mod unit;

pub use instruction::{Instruction, Label, LabelKind};
pub use unit::CodeUnit;
