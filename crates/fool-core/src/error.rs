//! Error types for the FOOL compiler.
//!
//! ## Error Hierarchy
//!
//! ```text
//! FoolError (top-level wrapper)
//! ├── CompilationErrors - every semantic error collected by the scope and type passes
//! └── InternalError     - a malformed tree reached code generation
//! ```
//!
//! Semantic errors are collected, never thrown one at a time: a pass keeps
//! going after an error so that independent mistakes are all reported by a
//! single run. Internal errors abort immediately since they mean an earlier
//! pass broke its contract.

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Semantic Errors
// ============================================================================

/// A scope or type error found while analysing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// A name was declared twice in the same scope.
    #[error("at {span}: {kind} '{name}' already declared")]
    DuplicateDeclaration {
        /// What was being declared ("var", "fun", "par", "class", "field", "method").
        kind: &'static str,
        name: String,
        span: Span,
    },

    /// A variable, parameter or function name could not be resolved.
    #[error("at {span}: identifier '{name}' not declared")]
    UndeclaredIdentifier { name: String, span: Span },

    /// A class name could not be resolved.
    #[error("at {span}: class '{name}' not declared")]
    UndeclaredClass { name: String, span: Span },

    /// A method call named a method the object's class does not have.
    #[error("at {span}: class '{class}' has no method '{method}'")]
    UndeclaredMethod {
        class: String,
        method: String,
        span: Span,
    },

    /// A class extends a class that was not declared before it.
    #[error("at {span}: superclass '{superclass}' of class '{class}' not declared")]
    MissingSuperclass {
        class: String,
        superclass: String,
        span: Span,
    },

    /// A field and a method share a name across the inheritance chain.
    #[error("at {span}: {kind} '{name}' in class '{class}' collides with an inherited {other}")]
    FieldMethodCollision {
        /// Kind of the new member ("field" or "method").
        kind: &'static str,
        /// Kind of the inherited member it clashes with.
        other: &'static str,
        class: String,
        name: String,
        span: Span,
    },

    /// A class declaration appeared below the program's top level.
    #[error("at {span}: class '{name}' must be declared at top level")]
    NestedClass { name: String, span: Span },

    /// A method was called on something that is not an object.
    #[error("at {span}: '{name}' is not an object")]
    NotAnObject { name: String, span: Span },

    /// An override does not respect the inherited member's type.
    #[error("at {span}: '{member}' in class '{class}' is not a valid override: {message}")]
    InvalidOverride {
        class: String,
        member: String,
        message: String,
        span: Span,
    },

    /// An expression has the wrong type for its context.
    #[error("at {span}: {message}")]
    TypeMismatch { message: String, span: Span },

    /// A call, method call or `new` has the wrong number of arguments.
    #[error("at {span}: '{name}' expects {expected} argument(s), found {found}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// The callee of a call does not have an arrow type.
    #[error("at {span}: '{name}' is not a function")]
    NotCallable { name: String, span: Span },

    /// A method or class name was used where a value is expected.
    #[error("at {span}: '{name}' cannot be used as a value")]
    NotAValue { name: String, span: Span },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::DuplicateDeclaration { span, .. } => *span,
            CompilationError::UndeclaredIdentifier { span, .. } => *span,
            CompilationError::UndeclaredClass { span, .. } => *span,
            CompilationError::UndeclaredMethod { span, .. } => *span,
            CompilationError::MissingSuperclass { span, .. } => *span,
            CompilationError::FieldMethodCollision { span, .. } => *span,
            CompilationError::NestedClass { span, .. } => *span,
            CompilationError::NotAnObject { span, .. } => *span,
            CompilationError::InvalidOverride { span, .. } => *span,
            CompilationError::TypeMismatch { span, .. } => *span,
            CompilationError::ArgumentCountMismatch { span, .. } => *span,
            CompilationError::NotCallable { span, .. } => *span,
            CompilationError::NotAValue { span, .. } => *span,
        }
    }

    /// Whether this error comes from scope resolution rather than typing.
    pub fn is_scope_error(&self) -> bool {
        matches!(
            self,
            CompilationError::DuplicateDeclaration { .. }
                | CompilationError::UndeclaredIdentifier { .. }
                | CompilationError::UndeclaredClass { .. }
                | CompilationError::UndeclaredMethod { .. }
                | CompilationError::MissingSuperclass { .. }
                | CompilationError::FieldMethodCollision { .. }
                | CompilationError::NestedClass { .. }
                | CompilationError::NotAnObject { .. }
        )
    }
}

/// All semantic errors reported for one program, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationErrors {
    errors: Vec<CompilationError>,
}

impl CompilationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CompilationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: CompilationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilationError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<CompilationError> {
        self.errors
    }
}

impl fmt::Display for CompilationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompilationErrors {}

impl From<Vec<CompilationError>> for CompilationErrors {
    fn from(errors: Vec<CompilationError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for CompilationErrors {
    type Item = CompilationError;
    type IntoIter = std::vec::IntoIter<CompilationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

// ============================================================================
// Internal Errors
// ============================================================================

/// A broken invariant detected during code generation.
///
/// Code generation only runs on trees that passed both semantic passes, so
/// this is never a user-facing condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("internal compiler error at {span}: {message}")]
pub struct InternalError {
    pub message: String,
    pub span: Span,
}

impl InternalError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The error returned by the compilation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoolError {
    /// The program has scope or type errors.
    #[error(transparent)]
    Semantic(#[from] CompilationErrors),

    /// Code generation hit a malformed tree.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl FoolError {
    /// The collected semantic errors, if that is what this is.
    pub fn semantic(&self) -> Option<&CompilationErrors> {
        match self {
            FoolError::Semantic(errors) => Some(errors),
            FoolError::Internal(_) => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, FoolError::Internal(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
