//! Semantic types.
//!
//! These are the types after name resolution: class names in the source have
//! been replaced by [`ClassId`]s. The subtype relation over them lives in the
//! compiler crate because it needs the class table.

use std::fmt;

use crate::ClassId;

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Integers.
    Int,
    /// Booleans, a subtype of `Int`.
    Bool,
    /// Function and method types.
    Arrow(ArrowType),
    /// An instance of a class.
    Ref(ClassId),
    /// The type of a class declaration itself. Never a value type.
    Class(ClassId),
    /// The type of `null`, bottom of the reference types.
    Empty,
}

impl Type {
    /// Build an arrow type.
    pub fn arrow(params: Vec<Type>, ret: Type) -> Self {
        Type::Arrow(ArrowType::new(params, ret))
    }

    /// Machine words a value of this type occupies. A function value is its
    /// declaring frame plus its code address.
    pub fn words(&self) -> usize {
        match self {
            Type::Arrow(_) => 2,
            _ => 1,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Ref(_))
    }

    pub fn as_arrow(&self) -> Option<&ArrowType> {
        match self {
            Type::Arrow(arrow) => Some(arrow),
            _ => None,
        }
    }

    /// The class an instance of this type belongs to.
    pub fn as_class_ref(&self) -> Option<ClassId> {
        match self {
            Type::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Arrow(arrow) => write!(f, "{arrow}"),
            Type::Ref(id) => write!(f, "ref {id}"),
            Type::Class(id) => write!(f, "class {id}"),
            Type::Empty => write!(f, "null"),
        }
    }
}

/// A function or method signature: `(p1, .., pn) -> ret`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrowType {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
}

impl ArrowType {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for ArrowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}
