//! FOOL
//!
//! Compiler for FOOL, a small functional and object-oriented language, to
//! the code of a stack virtual machine.
//!
//! The work is split across three crates, re-exported here:
//!
//! - [`core`]: spans, identifiers, semantic types and errors
//! - [`ast`]: the arena-allocated syntax tree and its builder
//! - [`compiler`]: symbol tables, type checking and code generation
//!
//! # Example
//!
//! ```
//! use fool::prelude::*;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! // let var x:int = 5; in x + 3
//! let program = b.program(
//!     vec![b.var("x", TypeExpr::Int, b.int(5))],
//!     b.add(b.ident("x"), b.int(3)),
//! );
//!
//! let compiled = compile(&program).unwrap();
//! assert_eq!(compiled.program_type, Some(Type::Int));
//! assert!(compiled.code.to_string().starts_with("push 0\npush 5\n"));
//! ```

pub use fool_ast as ast;
pub use fool_compiler as compiler;
pub use fool_core as core;

pub use fool_compiler::{Compiled, Compiler, CompilerOptions, compile};
pub use fool_core::{CompilationError, CompilationErrors, FoolError, InternalError};

pub mod prelude {
    pub use bumpalo::Bump;
    pub use fool_ast::{AstBuilder, BinaryOp, Decl, Expr, Program, TypeExpr};
    pub use fool_compiler::bytecode::{CodeUnit, Instruction, Label, LabelKind};
    pub use fool_compiler::{
        Analysis, ClassTable, Compiled, Compiler, CompilerOptions, DEFAULT_MEMSIZE, EntryKind,
        ResolutionTable, SymbolEntry, compile, is_subtype, lowest_common_ancestor,
    };
    pub use fool_core::{
        ArrowType, ClassId, CompilationError, CompilationErrors, FoolError, InternalError, NodeId,
        Span, Type,
    };
}
