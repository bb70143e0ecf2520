//! FOOL Core
//!
//! Types shared by every stage of the FOOL compiler:
//!
//! - [`Span`]: source locations attached to nodes and diagnostics
//! - [`NodeId`] and [`ClassId`]: stable identities for AST nodes and classes
//! - [`Type`] and [`ArrowType`]: semantic types after name resolution
//! - [`CompilationError`], [`CompilationErrors`], [`InternalError`] and
//!   [`FoolError`]: the error hierarchy

mod error;
mod ids;
mod span;
mod types;

pub use error::{CompilationError, CompilationErrors, FoolError, InternalError};
pub use ids::{ClassId, NodeId};
pub use span::Span;
pub use types::{ArrowType, Type};
