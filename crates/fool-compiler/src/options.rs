//! Compiler configuration.

/// Default size of the target machine's memory, in words.
pub const DEFAULT_MEMSIZE: i64 = 10000;

/// Options controlling a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Memory size of the target machine. Top-level declarations live at
    /// `memsize + offset`, so this must match the machine the code runs on.
    pub memsize: i64,
    /// Run the type checking pass before code generation.
    pub type_check: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            memsize: DEFAULT_MEMSIZE,
            type_check: true,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memsize(mut self, memsize: i64) -> Self {
        self.memsize = memsize;
        self
    }

    /// Skip or enable the type checking pass. Scope resolution always runs.
    pub fn with_type_check(mut self, type_check: bool) -> Self {
        self.type_check = type_check;
        self
    }
}
