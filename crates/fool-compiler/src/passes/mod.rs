//! Compiler passes.
//!
//! - [`symbol_table`]: Pass 1 - declare names, assign offsets, lay out classes, resolve uses
//! - [`type_check`]: Pass 2 - check every expression against the subtype relation
//!
//! Code generation is the final pass and lives in [`crate::codegen`].

pub mod symbol_table;
pub mod type_check;

pub use symbol_table::{SymbolTableBuilder, SymbolTableOutput};
pub use type_check::{TypeCheckOutput, TypeChecker};
