//! Fresh label allocation.
//!
//! Branch labels and function labels come from two independent counters.
//! Neither is ever reset, so no two labels of one compilation coincide.

use crate::bytecode::Label;

/// Hands out unique labels.
#[derive(Debug, Default)]
pub struct LabelGenerator {
    next_branch: u32,
    next_function: u32,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh branch target.
    pub fn fresh_label(&mut self) -> Label {
        let label = Label::branch(self.next_branch);
        self.next_branch += 1;
        label
    }

    /// A fresh function entry label.
    pub fn fresh_function(&mut self) -> Label {
        let label = Label::function(self.next_function);
        self.next_function += 1;
        label
    }

    /// Number of branch labels handed out.
    pub fn label_count(&self) -> u32 {
        self.next_branch
    }

    /// Number of function labels handed out.
    pub fn function_count(&self) -> u32 {
        self.next_function
    }
}
