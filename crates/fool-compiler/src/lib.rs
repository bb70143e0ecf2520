//! FOOL Compiler
//!
//! A multi-pass compiler from the FOOL syntax tree to stack machine code.
//!
//! ## Architecture
//!
//! - **Pass 1 (Symbol Table)**: Declare every name, compute frame offsets and
//!   class layouts, resolve every use site
//! - **Pass 2 (Type Check)**: Validate expressions and overrides against the
//!   subtype relation
//! - **Pass 3 (Code Generation)**: Lower the resolved tree to instructions
//!
//! Each semantic pass collects all of its errors. A pass only runs when the
//! previous one reported none.
//!
//! ## Modules
//!
//! - [`bytecode`]: Instruction set, labels and the compiled [`CodeUnit`]
//! - [`class_table`]: Class layouts and virtual tables
//! - [`codegen`]: Code generator
//! - [`emit`]: Instruction emitter and label allocation
//! - [`options`]: Compiler configuration
//! - [`passes`]: Symbol table and type check passes
//! - [`scope`]: Nested scopes used while building the symbol table
//! - [`symbols`]: Symbol entries and the resolution side table
//! - [`type_rels`]: Subtyping and least upper bounds

pub mod bytecode;
pub mod class_table;
pub mod codegen;
pub mod emit;
pub mod options;
pub mod passes;
pub mod scope;
pub mod symbols;
pub mod type_rels;

pub use bytecode::{CodeUnit, Instruction, Label, LabelKind};
pub use class_table::{ClassDescriptor, ClassTable, VirtualTable};
pub use codegen::CodeGenerator;
pub use options::{CompilerOptions, DEFAULT_MEMSIZE};
pub use passes::{SymbolTableBuilder, SymbolTableOutput, TypeCheckOutput, TypeChecker};
pub use symbols::{EntryKind, MethodResolution, Resolution, ResolutionTable, SymbolEntry};
pub use type_rels::{is_subtype, lowest_common_ancestor};

pub use fool_core::{CompilationError, CompilationErrors, FoolError, InternalError};

use fool_ast::Program;
use fool_core::Type;

/// Everything produced by a successful compilation.
#[derive(Debug)]
pub struct Compiled {
    pub code: CodeUnit,
    pub resolutions: ResolutionTable,
    pub classes: ClassTable,
    /// Type of the program body. `None` when type checking was disabled.
    pub program_type: Option<Type>,
}

/// Results of the semantic passes, ready for code generation.
#[derive(Debug)]
pub struct Analysis {
    pub resolutions: ResolutionTable,
    pub classes: ClassTable,
    pub program_type: Option<Type>,
}

/// The compiler entry point.
#[derive(Debug, Default, Clone, Copy)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Run the semantic passes only.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn analyze(&self, program: &Program<'_>) -> Result<Analysis, CompilationErrors> {
        let symbols = SymbolTableBuilder::new().run(program);
        if !symbols.is_success() {
            tracing::debug!(errors = symbols.errors.len(), "scope errors, stopping");
            return Err(symbols.errors);
        }

        let program_type = if self.options.type_check {
            let checked = TypeChecker::new(&symbols.resolutions, &symbols.classes).run(program);
            if !checked.is_success() {
                tracing::debug!(errors = checked.errors.len(), "type errors, stopping");
                return Err(checked.errors);
            }
            checked.program_type
        } else {
            None
        };

        Ok(Analysis {
            resolutions: symbols.resolutions,
            classes: symbols.classes,
            program_type,
        })
    }

    /// Compile a program to stack machine code.
    #[tracing::instrument(skip_all)]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, program: &Program<'_>) -> Result<Compiled, FoolError> {
        let analysis = self.analyze(program)?;
        let code = CodeGenerator::new(&analysis.resolutions, &analysis.classes, self.options)
            .generate(program)?;

        Ok(Compiled {
            code,
            resolutions: analysis.resolutions,
            classes: analysis.classes,
            program_type: analysis.program_type,
        })
    }
}

/// Compile with default options.
pub fn compile(program: &Program<'_>) -> Result<Compiled, FoolError> {
    Compiler::default().compile(program)
}
